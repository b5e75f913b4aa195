//! Rule: every required parameter is bound at least once.
use crate::store::InstanceFactory;
use crate::types::NamedParam;
use crate::validation::error::InstantiationError;

pub(crate) fn validate_requirements(factory: &InstanceFactory, arguments: &[NamedParam]) -> Result<(), InstantiationError> {
    let missing = factory
        .params()
        .filter(|info| info.is_required)
        .find(|info| !arguments.iter().any(|a| a.name == info.name));

    match missing {
        Some(info) => Err(InstantiationError::ParameterRequirement {
            factory: factory.name().to_string(),
            name: info.name.clone(),
        }),
        None => Ok(()),
    }
}
