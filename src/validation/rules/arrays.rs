//! Rule: only array parameters may be bound more than once.
use crate::store::InstanceFactory;
use crate::types::NamedParam;
use crate::validation::error::InstantiationError;
use indexmap::IndexMap;

pub(crate) fn validate_arrays(factory: &InstanceFactory, arguments: &[NamedParam]) -> Result<(), InstantiationError> {
    // Insertion order keeps the reported slot deterministic.
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for argument in arguments {
        *counts.entry(argument.name.as_str()).or_insert(0) += 1;
    }

    for (name, count) in counts {
        let is_array = factory.param(name).map_or(false, |info| info.is_array);
        if count > 1 && !is_array {
            return Err(InstantiationError::ParameterArray {
                factory: factory.name().to_string(),
                name: name.to_string(),
                count,
            });
        }
    }
    Ok(())
}
