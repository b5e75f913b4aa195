//! What a native constructor receives, and the registry's constructor type.
use super::NativeRule;
use crate::types::{NamedParam, Param};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("missing argument '{0}'")]
    MissingArgument(String),
    #[error("invalid argument '{name}': {reason}")]
    InvalidArgument { name: String, reason: String },
}

/// Maps a native identifier's validated arguments to a rule body.
pub type NativeConstructor = Arc<dyn Fn(&Arguments<'_>) -> Result<NativeRule, BuildError> + Send + Sync>;

/// Validated, coerced arguments handed to a native constructor.
#[derive(Debug, Clone, Copy)]
pub struct Arguments<'a> {
    factory: &'a str,
    params: &'a [NamedParam],
}

impl<'a> Arguments<'a> {
    pub fn new(factory: &'a str, params: &'a [NamedParam]) -> Self {
        Self { factory, params }
    }

    /// Name of the factory being instantiated.
    pub fn factory(&self) -> &'a str { self.factory }

    pub fn params(&self) -> &'a [NamedParam] { self.params }

    /// First value bound to `name`.
    pub fn get(&self, name: &str) -> Option<&'a Param> {
        self.params.iter().find(|p| p.name == name).map(|p| &p.param)
    }

    pub fn required(&self, name: &str) -> Result<&'a Param, BuildError> {
        self.get(name).ok_or_else(|| BuildError::MissingArgument(name.to_string()))
    }

    /// Every value bound to `name`, in argument order.
    pub fn all(&self, name: &str) -> Vec<&'a Param> {
        self.params.iter().filter(|p| p.name == name).map(|p| &p.param).collect()
    }
}
