//! The value algebra every rule argument lives in.
//!
//! A [`Param`] is either a fixed [`Constant`], a [`Variable`] that is read
//! lazily, or a composed [`Instance`]. Two access paths exist:
//!
//! - the optional conversions in [`convert`], used by validation and tree
//!   folding to coerce without raising, and
//! - the typed accessors (`as_string`, `as_int`, ...) used by rule bodies,
//!   which raise [`EvalError::Value`] when the value cannot be read.

use super::error::EvalError;
use super::variable::{SpreadsheetVariable, Variable};
use crate::instance::{EvalContext, Instance, Matcher, Replacer};
use crate::sheet::CellRange;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// The closed set of argument types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamType {
    String,
    Int,
    Real,
    Char,
    Matcher,
    Replacer,
}

impl ParamType {
    /// Matcher and Replacer are instance types; the rest hold plain values.
    pub fn is_instance(&self) -> bool {
        matches!(self, ParamType::Matcher | ParamType::Replacer)
    }

    pub fn is_primitive(&self) -> bool { !self.is_instance() }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamType::String => "String",
            ParamType::Int => "Int",
            ParamType::Real => "Real",
            ParamType::Char => "Char",
            ParamType::Matcher => "Matcher",
            ParamType::Replacer => "Replacer",
        };
        f.write_str(name)
    }
}

/// An immutable primitive value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Constant {
    String(String),
    Int(i64),
    Real(f64),
    Char(char),
}

impl Constant {
    pub fn param_type(&self) -> ParamType {
        match self {
            Constant::String(_) => ParamType::String,
            Constant::Int(_) => ParamType::Int,
            Constant::Real(_) => ParamType::Real,
            Constant::Char(_) => ParamType::Char,
        }
    }

    /// Best-effort coercion to another primitive type.
    ///
    /// Returns the value unchanged when it already has the requested type and
    /// `None` when the pairing has no sensible coercion.
    pub fn convert(&self, ty: ParamType) -> Option<Constant> {
        match (self, ty) {
            (c, ParamType::String) => Some(match c {
                Constant::String(s) => Constant::String(s.clone()),
                other => Constant::String(other.to_string()),
            }),

            (Constant::Int(i), ParamType::Int) => Some(Constant::Int(*i)),
            (Constant::String(s), ParamType::Int) => s.trim().parse().ok().map(Constant::Int),
            (Constant::Real(r), ParamType::Int) => {
                let whole = r.is_finite() && r.fract() == 0.0 && r.abs() < i64::MAX as f64;
                whole.then(|| Constant::Int(*r as i64))
            }
            (Constant::Char(c), ParamType::Int) => c.to_digit(10).map(|d| Constant::Int(d as i64)),

            (Constant::Real(r), ParamType::Real) => Some(Constant::Real(*r)),
            (Constant::Int(i), ParamType::Real) => Some(Constant::Real(*i as f64)),
            (Constant::String(s), ParamType::Real) => s.trim().parse().ok().map(Constant::Real),
            (Constant::Char(c), ParamType::Real) => c.to_digit(10).map(|d| Constant::Real(d as f64)),

            (Constant::Char(c), ParamType::Char) => Some(Constant::Char(*c)),
            (Constant::String(s), ParamType::Char) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(Constant::Char(c)),
                    _ => None,
                }
            }
            (Constant::Int(i), ParamType::Char) => u32::try_from(*i)
                .ok()
                .and_then(|d| char::from_digit(d, 10))
                .map(Constant::Char),
            (Constant::Real(_), ParamType::Char) => None,

            (_, ParamType::Matcher | ParamType::Replacer) => None,
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::String(s) => f.write_str(s),
            Constant::Int(i) => write!(f, "{}", i),
            Constant::Real(r) => write!(f, "{}", r),
            Constant::Char(c) => write!(f, "{}", c),
        }
    }
}

/// A polymorphic rule argument.
#[derive(Debug, Clone)]
pub enum Param {
    Constant(Constant),
    Variable(Variable),
    Instance(Instance),
}

impl Param {
    pub fn string(value: impl Into<String>) -> Self { Param::Constant(Constant::String(value.into())) }
    pub fn int(value: i64) -> Self { Param::Constant(Constant::Int(value)) }
    pub fn real(value: f64) -> Self { Param::Constant(Constant::Real(value)) }
    pub fn character(value: char) -> Self { Param::Constant(Constant::Char(value)) }

    /// The type this value currently presents. Spreadsheet cells are text.
    pub fn param_type(&self) -> ParamType {
        match self {
            Param::Constant(c) => c.param_type(),
            Param::Variable(v) => v.param_type(),
            Param::Instance(i) => i.kind().param_type(),
        }
    }

    /// Reads the value behind this parameter, dereferencing variables.
    pub fn resolve(&self, ctx: &EvalContext<'_>) -> Result<Constant, EvalError> {
        match self {
            Param::Constant(c) => Ok(c.clone()),
            Param::Variable(v) => v.read(ctx),
            Param::Instance(i) => Err(EvalError::Value {
                expected: ParamType::String,
                found: format!("{} '{}'", i.kind().param_type(), i.name()),
            }),
        }
    }

    fn coerce(&self, ctx: &EvalContext<'_>, ty: ParamType) -> Result<Constant, EvalError> {
        let value = self.resolve(ctx)?;
        value.convert(ty).ok_or_else(|| EvalError::Value { expected: ty, found: value.to_string() })
    }

    pub fn as_string(&self, ctx: &EvalContext<'_>) -> Result<String, EvalError> {
        match self.coerce(ctx, ParamType::String)? {
            Constant::String(s) => Ok(s),
            other => Ok(other.to_string()),
        }
    }

    pub fn as_int(&self, ctx: &EvalContext<'_>) -> Result<i64, EvalError> {
        match self.coerce(ctx, ParamType::Int)? {
            Constant::Int(i) => Ok(i),
            other => Err(EvalError::Value { expected: ParamType::Int, found: other.to_string() }),
        }
    }

    pub fn as_real(&self, ctx: &EvalContext<'_>) -> Result<f64, EvalError> {
        match self.coerce(ctx, ParamType::Real)? {
            Constant::Real(r) => Ok(r),
            other => Err(EvalError::Value { expected: ParamType::Real, found: other.to_string() }),
        }
    }

    pub fn as_char(&self, ctx: &EvalContext<'_>) -> Result<char, EvalError> {
        match self.coerce(ctx, ParamType::Char)? {
            Constant::Char(c) => Ok(c),
            other => Err(EvalError::Value { expected: ParamType::Char, found: other.to_string() }),
        }
    }

    pub fn as_matcher(&self) -> Result<&Matcher, EvalError> {
        match self {
            Param::Instance(Instance::Matcher(m)) => Ok(m),
            other => Err(EvalError::Value { expected: ParamType::Matcher, found: other.describe() }),
        }
    }

    /// Never fails: a plain value is a replacer that yields itself.
    pub fn as_replacer(&self) -> Replacer {
        match self {
            Param::Instance(Instance::Replacer(r)) => r.clone(),
            other => Replacer::verbatim(other.clone()),
        }
    }

    /// Every grid address this parameter reads, including those of nested instances.
    pub fn references(&self) -> Vec<CellRange> {
        match self {
            Param::Constant(_) | Param::Variable(Variable::Simple(_)) => Vec::new(),
            Param::Variable(Variable::Spreadsheet(v)) => vec![v.target().clone()],
            Param::Instance(i) => i.references().to_vec(),
        }
    }

    fn describe(&self) -> String {
        match self {
            Param::Constant(c) => c.to_string(),
            Param::Variable(Variable::Simple(v)) => format!("variable '{}'", v.name()),
            Param::Variable(Variable::Spreadsheet(v)) => format!("cell {}", v.target()),
            Param::Instance(i) => format!("{} '{}'", i.kind().param_type(), i.name()),
        }
    }
}

impl From<Constant> for Param {
    fn from(value: Constant) -> Self { Param::Constant(value) }
}

impl From<Variable> for Param {
    fn from(value: Variable) -> Self { Param::Variable(value) }
}

impl From<SpreadsheetVariable> for Param {
    fn from(value: SpreadsheetVariable) -> Self { Param::Variable(Variable::Spreadsheet(value)) }
}

impl From<Instance> for Param {
    fn from(value: Instance) -> Self { Param::Instance(value) }
}

impl From<Matcher> for Param {
    fn from(value: Matcher) -> Self { Param::Instance(Instance::Matcher(value)) }
}

impl From<Replacer> for Param {
    fn from(value: Replacer) -> Self { Param::Instance(Instance::Replacer(value)) }
}

/// One bound argument. Equality and hashing look at the slot name only.
#[derive(Debug, Clone)]
pub struct NamedParam {
    pub name: String,
    pub param: Param,
}

impl NamedParam {
    pub fn new(name: impl Into<String>, param: impl Into<Param>) -> Self {
        Self { name: name.into(), param: param.into() }
    }
}

impl PartialEq for NamedParam {
    fn eq(&self, other: &Self) -> bool { self.name == other.name }
}

impl Eq for NamedParam {}

impl Hash for NamedParam {
    fn hash<H: Hasher>(&self, state: &mut H) { self.name.hash(state) }
}

/// Non-raising conversions, one per target type.
pub mod convert {
    use super::{Param, ParamType};
    use crate::instance::Instance;

    pub fn convert_to(param: &Param, ty: ParamType) -> Option<Param> {
        match ty {
            ParamType::String => string(param),
            ParamType::Int => int(param),
            ParamType::Real => real(param),
            ParamType::Char => character(param),
            ParamType::Matcher => matcher(param),
            ParamType::Replacer => Some(replacer(param)),
        }
    }

    // Variables are read lazily, so they are accepted here and coerced when read.
    fn primitive(param: &Param, ty: ParamType) -> Option<Param> {
        match param {
            Param::Constant(c) => c.convert(ty).map(Param::Constant),
            Param::Variable(v) => v.accepts(ty).then(|| param.clone()),
            Param::Instance(_) => None,
        }
    }

    pub fn string(param: &Param) -> Option<Param> { primitive(param, ParamType::String) }
    pub fn int(param: &Param) -> Option<Param> { primitive(param, ParamType::Int) }
    pub fn real(param: &Param) -> Option<Param> { primitive(param, ParamType::Real) }
    pub fn character(param: &Param) -> Option<Param> { primitive(param, ParamType::Char) }

    /// Only real matchers convert to a matcher.
    pub fn matcher(param: &Param) -> Option<Param> {
        match param {
            Param::Instance(Instance::Matcher(_)) => Some(param.clone()),
            _ => None,
        }
    }

    /// Always succeeds by wrapping non-replacers verbatim.
    pub fn replacer(param: &Param) -> Param {
        match param {
            Param::Instance(Instance::Replacer(_)) => param.clone(),
            other => Param::Instance(Instance::Replacer(other.as_replacer())),
        }
    }
}
