//! Built-in replacers.
use super::pattern::Pattern;
use crate::instance::{Arguments, BuildError, EvalContext, NativeRule, ReplaceRule};
use crate::types::{EvalError, Param};
use std::sync::Arc;

fn replacer_rule(rule: impl ReplaceRule + 'static) -> Result<NativeRule, BuildError> {
    Ok(NativeRule::Replace(Arc::new(rule)))
}

#[derive(Debug)]
struct Literal {
    value: Param,
}

impl ReplaceRule for Literal {
    fn replace(&self, ctx: &EvalContext<'_>) -> Result<Param, EvalError> {
        Ok(Param::Constant(self.value.resolve(ctx)?))
    }
}

pub(crate) fn literal(args: &Arguments<'_>) -> Result<NativeRule, BuildError> {
    replacer_rule(Literal { value: args.required("value")?.clone() })
}

/// A replacer that maps its text input through a plain string function.
struct MapText {
    input: Param,
    op: fn(&str) -> String,
    label: &'static str,
}

impl std::fmt::Debug for MapText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapText").field("input", &self.input).field("op", &self.label).finish()
    }
}

impl ReplaceRule for MapText {
    fn replace(&self, ctx: &EvalContext<'_>) -> Result<Param, EvalError> {
        let text = self.input.as_string(ctx)?;
        Ok(Param::string((self.op)(&text)))
    }
}

fn map_text(args: &Arguments<'_>, label: &'static str, op: fn(&str) -> String) -> Result<NativeRule, BuildError> {
    replacer_rule(MapText { input: args.required("input")?.clone(), op, label })
}

pub(crate) fn trim(args: &Arguments<'_>) -> Result<NativeRule, BuildError> {
    map_text(args, "trim", |s| s.trim().to_string())
}

pub(crate) fn upper(args: &Arguments<'_>) -> Result<NativeRule, BuildError> {
    map_text(args, "upper", str::to_uppercase)
}

pub(crate) fn lower(args: &Arguments<'_>) -> Result<NativeRule, BuildError> {
    map_text(args, "lower", str::to_lowercase)
}

#[derive(Debug)]
struct Concat {
    parts: Vec<Param>,
}

impl ReplaceRule for Concat {
    fn replace(&self, ctx: &EvalContext<'_>) -> Result<Param, EvalError> {
        let mut out = String::new();
        for part in &self.parts {
            out.push_str(&part.as_string(ctx)?);
        }
        Ok(Param::string(out))
    }
}

pub(crate) fn concat(args: &Arguments<'_>) -> Result<NativeRule, BuildError> {
    replacer_rule(Concat { parts: args.all("parts").into_iter().cloned().collect() })
}

#[derive(Debug)]
struct RegexReplace {
    input: Param,
    pattern: Pattern,
    replacement: Param,
}

impl ReplaceRule for RegexReplace {
    fn replace(&self, ctx: &EvalContext<'_>) -> Result<Param, EvalError> {
        let input = self.input.as_string(ctx)?;
        let replacement = self.replacement.as_string(ctx)?;
        let regex = self.pattern.get(ctx)?;
        Ok(Param::string(regex.replace_all(&input, replacement.as_str()).into_owned()))
    }
}

pub(crate) fn regex_replace(args: &Arguments<'_>) -> Result<NativeRule, BuildError> {
    replacer_rule(RegexReplace {
        input: args.required("input")?.clone(),
        pattern: Pattern::build(args.required("pattern")?, false)?,
        replacement: args.required("replacement")?.clone(),
    })
}

#[derive(Debug)]
struct ClampInt {
    input: Param,
    min: Option<Param>,
    max: Option<Param>,
}

impl ReplaceRule for ClampInt {
    fn replace(&self, ctx: &EvalContext<'_>) -> Result<Param, EvalError> {
        let mut value = self.input.as_int(ctx)?;
        if let Some(min) = &self.min {
            value = value.max(min.as_int(ctx)?);
        }
        if let Some(max) = &self.max {
            value = value.min(max.as_int(ctx)?);
        }
        Ok(Param::int(value))
    }
}

pub(crate) fn clamp_int(args: &Arguments<'_>) -> Result<NativeRule, BuildError> {
    replacer_rule(ClampInt {
        input: args.required("input")?.clone(),
        min: args.get("min").cloned(),
        max: args.get("max").cloned(),
    })
}
