//! Built-in matchers.
use super::pattern::Pattern;
use crate::instance::{Arguments, BuildError, EvalContext, MatchRule, Matcher, NativeRule};
use crate::types::{EvalError, Param};
use std::sync::Arc;

fn matcher_rule(rule: impl MatchRule + 'static) -> Result<NativeRule, BuildError> {
    Ok(NativeRule::Match(Arc::new(rule)))
}

fn owned(args: &Arguments<'_>, name: &str) -> Result<Param, BuildError> {
    args.required(name).cloned()
}

fn matchers_of(args: &Arguments<'_>, name: &str) -> Result<Vec<Matcher>, BuildError> {
    args.all(name)
        .into_iter()
        .map(|p| {
            p.as_matcher().cloned().map_err(|e| BuildError::InvalidArgument { name: name.to_string(), reason: e.to_string() })
        })
        .collect()
}

#[derive(Debug)]
struct Exact {
    input: Param,
    against: Param,
}

impl MatchRule for Exact {
    fn matches(&self, ctx: &EvalContext<'_>) -> Result<bool, EvalError> {
        Ok(self.input.as_string(ctx)? == self.against.as_string(ctx)?)
    }
}

pub(crate) fn exact(args: &Arguments<'_>) -> Result<NativeRule, BuildError> {
    matcher_rule(Exact { input: owned(args, "input")?, against: owned(args, "against")? })
}

#[derive(Debug)]
struct StringEquals {
    input: Param,
    against: Param,
}

impl MatchRule for StringEquals {
    fn matches(&self, ctx: &EvalContext<'_>) -> Result<bool, EvalError> {
        Ok(self.input.as_string(ctx)?.trim() == self.against.as_string(ctx)?.trim())
    }
}

pub(crate) fn string_equals(args: &Arguments<'_>) -> Result<NativeRule, BuildError> {
    matcher_rule(StringEquals { input: owned(args, "input")?, against: owned(args, "against")? })
}

#[derive(Debug)]
struct RegexMatch {
    input: Param,
    pattern: Pattern,
}

impl MatchRule for RegexMatch {
    fn matches(&self, ctx: &EvalContext<'_>) -> Result<bool, EvalError> {
        let input = self.input.as_string(ctx)?;
        Ok(self.pattern.get(ctx)?.is_match(&input))
    }
}

pub(crate) fn regex(args: &Arguments<'_>) -> Result<NativeRule, BuildError> {
    let pattern = Pattern::build(args.required("pattern")?, true)?;
    matcher_rule(RegexMatch { input: owned(args, "input")?, pattern })
}

#[derive(Debug)]
struct IntRange {
    input: Param,
    min: Option<Param>,
    max: Option<Param>,
}

impl MatchRule for IntRange {
    fn matches(&self, ctx: &EvalContext<'_>) -> Result<bool, EvalError> {
        let value = self.input.as_int(ctx)?;
        let above = match &self.min {
            Some(min) => value >= min.as_int(ctx)?,
            None => true,
        };
        let below = match &self.max {
            Some(max) => value <= max.as_int(ctx)?,
            None => true,
        };
        Ok(above && below)
    }
}

pub(crate) fn int_range(args: &Arguments<'_>) -> Result<NativeRule, BuildError> {
    matcher_rule(IntRange {
        input: owned(args, "input")?,
        min: args.get("min").cloned(),
        max: args.get("max").cloned(),
    })
}

#[derive(Debug)]
struct RealRange {
    input: Param,
    min: Option<Param>,
    max: Option<Param>,
}

impl MatchRule for RealRange {
    fn matches(&self, ctx: &EvalContext<'_>) -> Result<bool, EvalError> {
        let value = self.input.as_real(ctx)?;
        if value.is_nan() {
            return Ok(false);
        }
        let above = match &self.min {
            Some(min) => value >= min.as_real(ctx)?,
            None => true,
        };
        let below = match &self.max {
            Some(max) => value <= max.as_real(ctx)?,
            None => true,
        };
        Ok(above && below)
    }
}

pub(crate) fn real_range(args: &Arguments<'_>) -> Result<NativeRule, BuildError> {
    matcher_rule(RealRange {
        input: owned(args, "input")?,
        min: args.get("min").cloned(),
        max: args.get("max").cloned(),
    })
}

#[derive(Debug)]
struct Length {
    input: Param,
    min: Option<Param>,
    max: Option<Param>,
}

impl MatchRule for Length {
    fn matches(&self, ctx: &EvalContext<'_>) -> Result<bool, EvalError> {
        let len = self.input.as_string(ctx)?.chars().count() as i64;
        let above = match &self.min {
            Some(min) => len >= min.as_int(ctx)?,
            None => true,
        };
        let below = match &self.max {
            Some(max) => len <= max.as_int(ctx)?,
            None => true,
        };
        Ok(above && below)
    }
}

pub(crate) fn length(args: &Arguments<'_>) -> Result<NativeRule, BuildError> {
    matcher_rule(Length {
        input: owned(args, "input")?,
        min: args.get("min").cloned(),
        max: args.get("max").cloned(),
    })
}

#[derive(Debug)]
struct IsInt {
    input: Param,
}

impl MatchRule for IsInt {
    fn matches(&self, ctx: &EvalContext<'_>) -> Result<bool, EvalError> {
        Ok(self.input.as_string(ctx)?.trim().parse::<i64>().is_ok())
    }
}

pub(crate) fn is_int(args: &Arguments<'_>) -> Result<NativeRule, BuildError> {
    matcher_rule(IsInt { input: owned(args, "input")? })
}

#[derive(Debug)]
struct IsReal {
    input: Param,
}

impl MatchRule for IsReal {
    fn matches(&self, ctx: &EvalContext<'_>) -> Result<bool, EvalError> {
        Ok(self.input.as_string(ctx)?.trim().parse::<f64>().map_or(false, |r| r.is_finite()))
    }
}

pub(crate) fn is_real(args: &Arguments<'_>) -> Result<NativeRule, BuildError> {
    matcher_rule(IsReal { input: owned(args, "input")? })
}

#[derive(Debug)]
struct Empty {
    input: Param,
}

impl MatchRule for Empty {
    fn matches(&self, ctx: &EvalContext<'_>) -> Result<bool, EvalError> {
        Ok(self.input.as_string(ctx)?.trim().is_empty())
    }
}

pub(crate) fn empty(args: &Arguments<'_>) -> Result<NativeRule, BuildError> {
    matcher_rule(Empty { input: owned(args, "input")? })
}

#[derive(Debug)]
struct Not {
    inner: Matcher,
}

impl MatchRule for Not {
    fn matches(&self, ctx: &EvalContext<'_>) -> Result<bool, EvalError> {
        Ok(!self.inner.matches(ctx)?)
    }
}

pub(crate) fn not(args: &Arguments<'_>) -> Result<NativeRule, BuildError> {
    let inner = matchers_of(args, "matcher")?
        .into_iter()
        .next()
        .ok_or_else(|| BuildError::MissingArgument("matcher".to_string()))?;
    matcher_rule(Not { inner })
}

#[derive(Debug)]
struct All {
    matchers: Vec<Matcher>,
}

impl MatchRule for All {
    fn matches(&self, ctx: &EvalContext<'_>) -> Result<bool, EvalError> {
        for m in &self.matchers {
            if !m.matches(ctx)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

pub(crate) fn all(args: &Arguments<'_>) -> Result<NativeRule, BuildError> {
    matcher_rule(All { matchers: matchers_of(args, "matchers")? })
}

#[derive(Debug)]
struct Any {
    matchers: Vec<Matcher>,
}

impl MatchRule for Any {
    fn matches(&self, ctx: &EvalContext<'_>) -> Result<bool, EvalError> {
        for m in &self.matchers {
            if m.matches(ctx)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

pub(crate) fn any(args: &Arguments<'_>) -> Result<NativeRule, BuildError> {
    matcher_rule(Any { matchers: matchers_of(args, "matchers")? })
}

#[derive(Debug)]
struct OneOf {
    input: Param,
    options: Vec<Param>,
}

impl MatchRule for OneOf {
    fn matches(&self, ctx: &EvalContext<'_>) -> Result<bool, EvalError> {
        let input = self.input.as_string(ctx)?;
        for option in &self.options {
            if option.as_string(ctx)? == input {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

pub(crate) fn one_of(args: &Arguments<'_>) -> Result<NativeRule, BuildError> {
    matcher_rule(OneOf { input: owned(args, "input")?, options: args.all("options").into_iter().cloned().collect() })
}

#[cfg(test)]
mod tests {
    use crate::instance::{CellSource, EvalContext};
    use crate::store::{Registry, RegistryError};
    use crate::types::{DereferenceError, NamedParam, Param, SpreadsheetVariable};
    use rstest::rstest;

    struct OneCell(&'static str);

    impl CellSource for OneCell {
        fn cell_text(&self, sheet: &str, row: usize, column: usize) -> Result<String, DereferenceError> {
            match (sheet, row, column) {
                ("S", 0, 0) => Ok(self.0.to_string()),
                ("S", _, 0) => Err(DereferenceError::Row { sheet: sheet.to_string(), row }),
                _ => Err(DereferenceError::Sheet(sheet.to_string())),
            }
        }
    }

    fn arg(name: &str, value: impl Into<Param>) -> NamedParam { NamedParam::new(name, value) }

    fn run(name: &str, args: Vec<NamedParam>) -> bool {
        let registry = Registry::with_builtins();
        let matcher = registry.instantiate(name, args).unwrap().into_matcher().unwrap();
        matcher.matches(&EvalContext::detached()).unwrap()
    }

    #[rstest]
    #[case("42", "42", true)]
    #[case("43", "42", false)]
    #[case(" 42 ", "42", true)]
    fn test_string_equals(#[case] input: &str, #[case] against: &str, #[case] expected: bool) {
        assert_eq!(run("String=", vec![arg("input", Param::string(input)), arg("against", Param::string(against))]), expected);
    }

    #[rstest]
    #[case("abc", "abc", true)]
    #[case(" abc", "abc", false)]
    fn test_exact(#[case] input: &str, #[case] against: &str, #[case] expected: bool) {
        assert_eq!(run("Exact", vec![arg("input", Param::string(input)), arg("against", Param::string(against))]), expected);
    }

    #[rstest]
    #[case("2024-01-05", r"\d{4}-\d{2}-\d{2}", true)]
    #[case("x2024-01-05", r"\d{4}-\d{2}-\d{2}", false)]
    fn test_regex_matches_whole_input(#[case] input: &str, #[case] pattern: &str, #[case] expected: bool) {
        assert_eq!(run("Regex", vec![arg("input", Param::string(input)), arg("pattern", Param::string(pattern))]), expected);
    }

    #[rstest]
    #[case(Param::int(5), Some(1), Some(10), true)]
    #[case(Param::string("11"), Some(1), Some(10), false)]
    #[case(Param::int(-3), None, Some(0), true)]
    #[case(Param::int(0), Some(1), None, false)]
    fn test_int_range(#[case] input: Param, #[case] min: Option<i64>, #[case] max: Option<i64>, #[case] expected: bool) {
        let mut args = vec![arg("input", input)];
        args.extend(min.map(|m| arg("min", Param::int(m))));
        args.extend(max.map(|m| arg("max", Param::int(m))));
        assert_eq!(run("IntRange", args), expected);
    }

    #[rstest]
    #[case("2.5", true)]
    #[case("7", false)]
    fn test_real_range(#[case] input: &str, #[case] expected: bool) {
        let args = vec![arg("input", Param::string(input)), arg("min", Param::real(0.0)), arg("max", Param::real(5.0))];
        assert_eq!(run("RealRange", args), expected);
    }

    #[rstest]
    #[case("IsInt", "12", true)]
    #[case("IsInt", "1.5", false)]
    #[case("IsReal", "1.5", true)]
    #[case("IsReal", "inf", false)]
    #[case("Empty", "   ", true)]
    #[case("Empty", "a", false)]
    fn test_unary_predicates(#[case] name: &str, #[case] input: &str, #[case] expected: bool) {
        assert_eq!(run(name, vec![arg("input", Param::string(input))]), expected);
    }

    #[test]
    fn test_length_counts_characters() {
        let args = vec![arg("input", Param::string("héllo")), arg("max", Param::int(5))];
        assert!(run("Length", args));
    }

    #[test]
    fn test_combinators() {
        let registry = Registry::with_builtins();
        let yes = |text: &str| {
            registry
                .instantiate("Exact", vec![arg("input", Param::string(text)), arg("against", Param::string("yes"))])
                .unwrap()
        };

        assert!(!run("Not", vec![arg("matcher", yes("yes"))]));
        assert!(run("All", vec![arg("matchers", yes("yes")), arg("matchers", yes("yes"))]));
        assert!(!run("All", vec![arg("matchers", yes("yes")), arg("matchers", yes("no"))]));
        assert!(run("Any", vec![arg("matchers", yes("no")), arg("matchers", yes("yes"))]));
        assert!(!run("Any", vec![arg("matchers", yes("no"))]));
    }

    #[test]
    fn test_one_of() {
        let options = || vec![arg("options", Param::string("red")), arg("options", Param::string("green"))];
        let mut args = vec![arg("input", Param::string("green"))];
        args.extend(options());
        assert!(run("OneOf", args));

        let mut args = vec![arg("input", Param::string("blue"))];
        args.extend(options());
        assert!(!run("OneOf", args));
    }

    #[test]
    fn test_reads_the_grid_through_the_context() {
        let registry = Registry::with_builtins();
        let matcher = registry
            .instantiate(
                "IsInt",
                vec![arg("input", SpreadsheetVariable::current())],
            )
            .unwrap()
            .into_matcher()
            .unwrap();

        let source = OneCell("17");
        assert!(matcher.matches(&EvalContext::new(&source, "S", 0, 0)).unwrap());
        // A missing row is a dereference error, never a default.
        assert!(matcher.matches(&EvalContext::new(&source, "S", 3, 0)).is_err());
    }

    #[test]
    fn test_deferred_pattern_errors_at_evaluation() {
        let registry = Registry::with_builtins();
        let matcher = registry
            .instantiate(
                "Regex",
                vec![arg("input", Param::string("a")), arg("pattern", SpreadsheetVariable::parse("S:0:0").unwrap())],
            )
            .unwrap()
            .into_matcher()
            .unwrap();
        let source = OneCell("(");
        assert!(matcher.matches(&EvalContext::new(&source, "S", 0, 0)).is_err());
    }

    #[test]
    fn test_not_rejects_plain_values() {
        let registry = Registry::with_builtins();
        let err = registry.instantiate("Not", vec![arg("matcher", Param::string("yes"))]).unwrap_err();
        assert!(matches!(err, RegistryError::Instantiation(_)));
    }
}
