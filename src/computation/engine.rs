//! The two-phase probe: good data first, error correction second.
use super::ledger::InstanceResult;
use super::rules::CellRules;
use crate::instance::EvalContext;
use smallvec::SmallVec;
use tracing::trace;

/// Runs the rules covering one cell against that cell's trial value.
///
/// A cell may be covered by several attachments; their matchers and
/// corrections are taken in attachment order, then registration order.
pub struct RuleEngine<'a> {
    rules: SmallVec<[&'a CellRules; 2]>,
}

impl<'a> RuleEngine<'a> {
    pub fn new(rules: impl IntoIterator<Item = &'a CellRules>) -> Self {
        Self { rules: rules.into_iter().collect() }
    }

    /// Probes the cell `ctx` points at.
    ///
    /// Returns `None` when good data fails and no correction applies. Rule
    /// failures never escape: a failing matcher counts as "no match" and a
    /// failing replacer becomes [`InstanceResult::FailureException`].
    pub fn probe(&self, ctx: &EvalContext<'_>) -> Option<InstanceResult> {
        // 1. Good data. Short-circuits on the first rejection; none attached is a pass.
        if self.good_data_passes(ctx) {
            return Some(InstanceResult::Success);
        }

        // 2. Error correction. The first matching pair decides.
        for correction in self.rules.iter().flat_map(|r| r.corrections()) {
            if !matches_or_false(&correction.matcher, ctx) {
                continue;
            }
            let outcome = correction.replacer.replace(ctx).and_then(|value| value.resolve(ctx));
            return Some(match outcome {
                Ok(value) => InstanceResult::FailureReplacement(value),
                Err(cause) => {
                    trace!(cell = %ctx.origin(), replacer = correction.replacer.name(), error = %cause, "replacer failed");
                    InstanceResult::FailureException(cause)
                }
            });
        }
        None
    }

    fn good_data_passes(&self, ctx: &EvalContext<'_>) -> bool {
        self.rules
            .iter()
            .flat_map(|r| r.good_data())
            .all(|matcher| matches_or_false(matcher, ctx))
    }
}

fn matches_or_false(matcher: &crate::instance::Matcher, ctx: &EvalContext<'_>) -> bool {
    match matcher.matches(ctx) {
        Ok(matched) => matched,
        Err(e) => {
            trace!(cell = %ctx.origin(), matcher = matcher.name(), error = %e, "matcher failed; treated as no match");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{CellSource, Instance, Matcher, Replacer};
    use crate::store::Registry;
    use crate::types::{Constant, DereferenceError, EvalError, NamedParam, Param, SpreadsheetVariable};
    use rstest::rstest;

    struct Trial(&'static str);

    impl CellSource for Trial {
        fn cell_text(&self, _sheet: &str, _row: usize, _column: usize) -> Result<String, DereferenceError> {
            Ok(self.0.to_string())
        }
    }

    fn registry() -> Registry { Registry::with_builtins() }

    fn matcher(registry: &Registry, outcome: bool) -> Matcher {
        let against = if outcome { "x" } else { "y" };
        instance(registry, "Exact", vec![NamedParam::new("input", Param::string("x")), NamedParam::new("against", Param::string(against))])
            .into_matcher()
            .unwrap()
    }

    /// A matcher whose evaluation raises: it reads a sheet the detached context lacks.
    fn failing_matcher(registry: &Registry) -> Matcher {
        let cell = SpreadsheetVariable::parse("Nowhere:0:0").unwrap();
        instance(registry, "Exact", vec![NamedParam::new("input", cell), NamedParam::new("against", Param::string("x"))])
            .into_matcher()
            .unwrap()
    }

    fn literal(registry: &Registry, value: &str) -> Replacer {
        instance(registry, "Literal", vec![NamedParam::new("value", Param::string(value))]).into_replacer().unwrap()
    }

    fn failing_replacer(registry: &Registry) -> Replacer {
        let cell = SpreadsheetVariable::parse("Nowhere:0:0").unwrap();
        instance(registry, "Trim", vec![NamedParam::new("input", cell)]).into_replacer().unwrap()
    }

    fn instance(registry: &Registry, name: &str, args: Vec<NamedParam>) -> Instance {
        registry.instantiate(name, args).unwrap()
    }

    fn probe(rules: &CellRules) -> Option<InstanceResult> {
        RuleEngine::new([rules]).probe(&EvalContext::detached())
    }

    #[rstest]
    #[case(vec![true, true], Some(InstanceResult::Success))]
    #[case(vec![], Some(InstanceResult::Success))]
    #[case(vec![true, false], None)]
    #[case(vec![false, true], None)]
    fn test_good_data_cascade(#[case] outcomes: Vec<bool>, #[case] expected: Option<InstanceResult>) {
        let registry = registry();
        let mut rules = CellRules::new();
        for outcome in outcomes {
            rules.push_good_data(matcher(&registry, outcome));
        }
        assert_eq!(probe(&rules), expected);
    }

    #[test]
    fn test_failing_good_data_matcher_counts_as_false() {
        let registry = registry();
        let rules = CellRules::new()
            .with_good_data(failing_matcher(&registry))
            .with_correction(matcher(&registry, true), literal(&registry, "fixed"));
        assert_eq!(probe(&rules), Some(InstanceResult::FailureReplacement(Constant::String("fixed".into()))));
    }

    #[test]
    fn test_first_matching_correction_wins() {
        let registry = registry();
        let rules = CellRules::new()
            .with_good_data(matcher(&registry, false))
            .with_correction(matcher(&registry, false), literal(&registry, "R1"))
            .with_correction(matcher(&registry, true), literal(&registry, "R2"))
            .with_correction(matcher(&registry, true), literal(&registry, "R3"));
        assert_eq!(probe(&rules), Some(InstanceResult::FailureReplacement(Constant::String("R2".into()))));
    }

    #[test]
    fn test_failing_correction_matcher_is_skipped() {
        let registry = registry();
        let rules = CellRules::new()
            .with_good_data(matcher(&registry, false))
            .with_correction(failing_matcher(&registry), literal(&registry, "R1"))
            .with_correction(matcher(&registry, true), literal(&registry, "R2"));
        assert_eq!(probe(&rules), Some(InstanceResult::FailureReplacement(Constant::String("R2".into()))));
    }

    #[test]
    fn test_failing_replacer_becomes_failure_exception() {
        let registry = registry();
        let rules = CellRules::new()
            .with_good_data(matcher(&registry, false))
            .with_correction(matcher(&registry, true), failing_replacer(&registry));
        assert!(matches!(probe(&rules), Some(InstanceResult::FailureException(EvalError::Dereference(_)))));
    }

    #[test]
    fn test_no_matching_correction_is_uncorrectable() {
        let registry = registry();
        let rules = CellRules::new()
            .with_good_data(matcher(&registry, false))
            .with_correction(matcher(&registry, false), literal(&registry, "R1"));
        assert_eq!(probe(&rules), None);
    }

    #[rstest]
    #[case("42", Some(InstanceResult::Success))]
    #[case("43", None)]
    fn test_string_equals_against_trial_value(#[case] trial: &'static str, #[case] expected: Option<InstanceResult>) {
        let registry = registry();
        let rules = CellRules::new().with_good_data(
            instance(
                &registry,
                "String=",
                vec![NamedParam::new("input", SpreadsheetVariable::current()), NamedParam::new("against", Param::string("42"))],
            )
            .into_matcher()
            .unwrap(),
        );
        let source = Trial(trial);
        let ctx = EvalContext::new(&source, "Sheet1", 0, 0);
        assert_eq!(RuleEngine::new([&rules]).probe(&ctx), expected);
    }

    #[test]
    fn test_attachments_are_combined_in_order() {
        let registry = registry();
        let first = CellRules::new().with_good_data(matcher(&registry, true));
        let second = CellRules::new()
            .with_good_data(matcher(&registry, false))
            .with_correction(matcher(&registry, true), literal(&registry, "from second"));
        let result = RuleEngine::new([&first, &second]).probe(&EvalContext::detached());
        assert_eq!(result, Some(InstanceResult::FailureReplacement(Constant::String("from second".into()))));
    }
}
