//! Rule: every argument coerces to its declared type.
use crate::store::InstanceFactory;
use crate::types::{convert, NamedParam};
use crate::validation::error::InstantiationError;

/// Consumes the arguments and returns them coerced, or the first that refuses.
pub(crate) fn coerce_types(factory: &InstanceFactory, arguments: Vec<NamedParam>) -> Result<Vec<NamedParam>, InstantiationError> {
    let mut coerced = Vec::with_capacity(arguments.len());
    for argument in arguments {
        // Names were checked by the earlier rule.
        let Some(info) = factory.param(&argument.name) else {
            return Err(InstantiationError::ParameterName {
                factory: factory.name().to_string(),
                name: argument.name,
            });
        };

        match convert::convert_to(&argument.param, info.ty) {
            Some(param) => coerced.push(NamedParam { name: argument.name, param }),
            None => {
                return Err(InstantiationError::ParameterType {
                    factory: factory.name().to_string(),
                    expected: info.ty,
                    param: argument,
                })
            }
        }
    }
    Ok(coerced)
}
