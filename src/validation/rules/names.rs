//! Rule: every argument names a declared parameter.
use crate::store::InstanceFactory;
use crate::types::NamedParam;
use crate::validation::error::InstantiationError;

pub(crate) fn validate_names(factory: &InstanceFactory, arguments: &[NamedParam]) -> Result<(), InstantiationError> {
    match arguments.iter().find(|a| factory.param(&a.name).is_none()) {
        Some(unknown) => Err(InstantiationError::ParameterName {
            factory: factory.name().to_string(),
            name: unknown.name.clone(),
        }),
        None => Ok(()),
    }
}
