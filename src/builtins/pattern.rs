//! Regular expressions taken as rule arguments.
use crate::instance::{BuildError, EvalContext};
use crate::types::{EvalError, Param};
use regex::Regex;
use std::borrow::Cow;

/// A pattern compiled up front when it is a constant, or on each evaluation
/// when it comes from a variable.
#[derive(Debug)]
pub(crate) enum Pattern {
    Compiled(Regex),
    Deferred { source: Param, anchored: bool },
}

fn anchor(pattern: &str, anchored: bool) -> Cow<'_, str> {
    if anchored {
        Cow::Owned(format!("^(?:{pattern})$"))
    } else {
        Cow::Borrowed(pattern)
    }
}

impl Pattern {
    /// `anchored` patterns must match the whole input.
    pub(crate) fn build(param: &Param, anchored: bool) -> Result<Self, BuildError> {
        match param {
            Param::Constant(c) => {
                let text = c.to_string();
                Regex::new(&anchor(&text, anchored))
                    .map(Pattern::Compiled)
                    .map_err(|e| BuildError::InvalidArgument { name: "pattern".to_string(), reason: e.to_string() })
            }
            other => Ok(Pattern::Deferred { source: other.clone(), anchored }),
        }
    }

    pub(crate) fn get(&self, ctx: &EvalContext<'_>) -> Result<Cow<'_, Regex>, EvalError> {
        match self {
            Pattern::Compiled(regex) => Ok(Cow::Borrowed(regex)),
            Pattern::Deferred { source, anchored } => {
                let text = source.as_string(ctx)?;
                Regex::new(&anchor(&text, *anchored))
                    .map(Cow::Owned)
                    .map_err(|e| EvalError::Rule(format!("invalid pattern '{text}': {e}")))
            }
        }
    }
}
