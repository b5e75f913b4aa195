//! Defines the error types for the validation module.
use crate::types::{NamedParam, ParamType};
use thiserror::Error;

/// Why a factory refused to build an instance.
///
/// These are definitional errors: the rule itself is malformed relative to
/// its declared parameters, so they always propagate to the caller.
#[derive(Error, Debug)]
pub enum InstantiationError {
    /// An argument names a slot the factory does not declare.
    #[error("'{factory}' has no parameter named '{name}'")]
    ParameterName { factory: String, name: String },

    /// A required slot received no argument.
    #[error("'{factory}' requires an argument for '{name}'")]
    ParameterRequirement { factory: String, name: String },

    /// A single-valued slot received several arguments.
    #[error("'{factory}' parameter '{name}' takes one value but was given {count}")]
    ParameterArray { factory: String, name: String, count: usize },

    /// An argument could not be coerced to its declared type.
    #[error("'{factory}' parameter '{}' expects {expected}, found {}", .param.name, .param.param.param_type())]
    ParameterType { factory: String, param: NamedParam, expected: ParamType },

    /// Validation passed but construction did not.
    #[error("could not instantiate '{factory}': {reason}")]
    ParameterizedInstantiation {
        factory: String,
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl InstantiationError {
    pub(crate) fn construction(factory: &str, reason: impl Into<String>) -> Self {
        InstantiationError::ParameterizedInstantiation {
            factory: factory.to_string(),
            reason: reason.into(),
            source: None,
        }
    }

    /// Name of the factory that raised the error.
    pub fn factory(&self) -> &str {
        match self {
            InstantiationError::ParameterName { factory, .. }
            | InstantiationError::ParameterRequirement { factory, .. }
            | InstantiationError::ParameterArray { factory, .. }
            | InstantiationError::ParameterType { factory, .. }
            | InstantiationError::ParameterizedInstantiation { factory, .. } => factory,
        }
    }
}
