//! Factories and the registry that owns them.
pub mod definition;
pub mod error;
pub mod factory;
pub mod registry;

pub use definition::{BodyDefinition, FactoryDefinition, NodeDefinition};
pub use error::RegistryError;
pub use factory::{FactoryBody, InstanceFactory};
pub use registry::Registry;
