//! Errors raised while registering or loading factories.
use crate::sheet::AddressError;
use crate::type_system::TreeError;
use crate::validation::InstantiationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("factory '{0}' is already registered")]
    DuplicateFactory(String),

    #[error("unknown factory '{0}'")]
    UnknownFactory(String),

    #[error("factory '{factory}' is bound to unknown native implementation '{id}'")]
    UnknownNative { factory: String, id: String },

    #[error("a {0} node does not build an instance; only factory nodes do")]
    NotAnInstance(&'static str),

    /// Every problem the tree checker found, not only the first.
    #[error("factory '{factory}' has {} tree error(s); first: {}", .errors.len(), first(.errors))]
    MalformedTree { factory: String, errors: Vec<TreeError> },

    #[error(transparent)]
    Instantiation(#[from] InstantiationError),

    #[error("invalid rule definition: {0}")]
    Definition(#[from] serde_json::Error),

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error("could not read rule definitions: {0}")]
    Io(#[from] std::io::Error),
}

fn first(errors: &[TreeError]) -> String {
    errors.first().map(ToString::to_string).unwrap_or_default()
}
