//! The validator that runs every argument rule in a fixed order.
use super::error::InstantiationError;
use super::rules::{arrays, names, requirements, types};
use crate::store::InstanceFactory;
use crate::types::NamedParam;

/// Checks an argument list against a factory's formal parameters.
///
/// Rules run cheapest first and stop at the first failure:
/// 1. every argument names a declared slot,
/// 2. every required slot is bound,
/// 3. only array slots are bound more than once,
/// 4. every argument coerces to its declared type.
pub struct Validator<'a> {
    factory: &'a InstanceFactory,
}

impl<'a> Validator<'a> {
    pub fn new(factory: &'a InstanceFactory) -> Self {
        Self { factory }
    }

    /// Returns the arguments with every value coerced to its declared type.
    pub fn validate(&self, arguments: Vec<NamedParam>) -> Result<Vec<NamedParam>, InstantiationError> {
        names::validate_names(self.factory, &arguments)?;
        requirements::validate_requirements(self.factory, &arguments)?;
        arrays::validate_arrays(self.factory, &arguments)?;
        types::coerce_types(self.factory, arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::InstanceKind;
    use crate::types::{Param, ParamInfo, ParamType};
    use rstest::rstest;

    fn factory() -> InstanceFactory {
        InstanceFactory::native(
            "Probe",
            "",
            InstanceKind::Matcher,
            vec![
                ParamInfo::new("input", ParamType::String),
                ParamInfo::new("limit", ParamType::Int).optional(),
                ParamInfo::new("options", ParamType::String).array().optional(),
            ],
            "test.probe",
        )
    }

    fn arg(name: &str, value: Param) -> NamedParam { NamedParam::new(name, value) }

    #[test]
    fn test_valid_arguments_are_coerced() {
        let out = Validator::new(&factory())
            .validate(vec![arg("input", Param::int(4)), arg("limit", Param::string("9"))])
            .unwrap();
        assert_eq!(out[0].param.param_type(), ParamType::String);
        assert_eq!(out[1].param.param_type(), ParamType::Int);
    }

    #[test]
    fn test_missing_required_then_added() {
        let f = factory();
        let err = Validator::new(&f).validate(vec![arg("limit", Param::int(1))]).unwrap_err();
        assert!(matches!(err, InstantiationError::ParameterRequirement { ref name, .. } if name == "input"));

        let ok = Validator::new(&f).validate(vec![arg("limit", Param::int(1)), arg("input", Param::string("x"))]);
        assert!(ok.is_ok());
    }

    #[rstest]
    #[case("limit", true)]
    #[case("options", false)]
    fn test_repeated_names(#[case] slot: &str, #[case] rejected: bool) {
        let args = vec![
            arg("input", Param::string("x")),
            arg(slot, Param::int(1)),
            arg(slot, Param::int(2)),
        ];
        let result = Validator::new(&factory()).validate(args);
        assert_eq!(matches!(result, Err(InstantiationError::ParameterArray { .. })), rejected);
    }

    #[test]
    fn test_check_order_name_before_requirement() {
        // Both an unknown name and a missing requirement: the name check wins.
        let err = Validator::new(&factory()).validate(vec![arg("bogus", Param::int(1))]).unwrap_err();
        assert!(matches!(err, InstantiationError::ParameterName { ref name, .. } if name == "bogus"));
    }

    #[test]
    fn test_check_order_array_before_type() {
        let args = vec![
            arg("input", Param::string("x")),
            arg("limit", Param::string("not a number")),
            arg("limit", Param::string("also not")),
        ];
        let err = Validator::new(&factory()).validate(args).unwrap_err();
        assert!(matches!(err, InstantiationError::ParameterArray { count: 2, .. }));
    }

    #[test]
    fn test_type_error_records_offending_param() {
        let args = vec![arg("input", Param::string("x")), arg("limit", Param::string("ten"))];
        match Validator::new(&factory()).validate(args).unwrap_err() {
            InstantiationError::ParameterType { param, expected, .. } => {
                assert_eq!(param.name, "limit");
                assert_eq!(expected, ParamType::Int);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
