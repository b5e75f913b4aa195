//! Mutable parameters: directly held values and live grid references.
use super::error::EvalError;
use super::param::{Constant, ParamType};
use crate::instance::EvalContext;
use crate::sheet::{AddressError, CellRange};
use std::str::FromStr;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone)]
pub enum Variable {
    Simple(SimpleVariable),
    Spreadsheet(SpreadsheetVariable),
}

impl Variable {
    pub fn param_type(&self) -> ParamType {
        match self {
            Variable::Simple(v) => v.get().param_type(),
            Variable::Spreadsheet(_) => ParamType::String,
        }
    }

    /// Whether a slot of type `ty` may hold this variable.
    pub(crate) fn accepts(&self, ty: ParamType) -> bool {
        match self {
            Variable::Simple(v) => v.get().convert(ty).is_some(),
            Variable::Spreadsheet(_) => ty.is_primitive(),
        }
    }

    pub fn read(&self, ctx: &EvalContext<'_>) -> Result<Constant, EvalError> {
        match self {
            Variable::Simple(v) => Ok(v.get()),
            Variable::Spreadsheet(v) => v.read(ctx).map(Constant::String),
        }
    }
}

/// A named value that can be rebound after rules have captured it.
///
/// Clones share the same slot.
#[derive(Debug, Clone)]
pub struct SimpleVariable {
    name: String,
    value: Arc<RwLock<Constant>>,
}

impl SimpleVariable {
    pub fn new(name: impl Into<String>, value: Constant) -> Self {
        Self { name: name.into(), value: Arc::new(RwLock::new(value)) }
    }

    pub fn name(&self) -> &str { &self.name }

    pub fn get(&self) -> Constant {
        self.value.read().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }

    pub fn set(&self, value: Constant) {
        *self.value.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = value;
    }
}

/// A weak reference into the grid, resolved against the evaluating cell on every read.
///
/// Wildcard fields mean "the cell being evaluated".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpreadsheetVariable {
    target: CellRange,
}

impl SpreadsheetVariable {
    pub fn new(target: CellRange) -> Self { Self { target } }

    /// The evaluating cell itself (`*:*:*`).
    pub fn current() -> Self { Self { target: CellRange::any() } }

    pub fn parse(text: &str) -> Result<Self, AddressError> { text.parse() }

    pub fn target(&self) -> &CellRange { &self.target }

    pub fn read(&self, ctx: &EvalContext<'_>) -> Result<String, EvalError> {
        ctx.read(&self.target)
    }
}

impl FromStr for SpreadsheetVariable {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self { target: s.parse()? })
    }
}
