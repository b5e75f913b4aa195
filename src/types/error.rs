//! Runtime evaluation errors raised while reading rule arguments.
use super::param::ParamType;
use thiserror::Error;

/// Raised when a spreadsheet reference points outside the workbook.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DereferenceError {
    #[error("no sheet named '{0}'")]
    Sheet(String),
    #[error("row {row} is outside sheet '{sheet}'")]
    Row { sheet: String, row: usize },
    #[error("column {column} is outside sheet '{sheet}'")]
    Column { sheet: String, column: usize },
}

/// Errors raised inside `matches()` / `replace()` bodies.
///
/// The execution protocol recovers from these locally; they only surface to a
/// caller that uses the typed accessors directly.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// A typed accessor could not coerce the value it found.
    #[error("cannot read {found:?} as {expected}")]
    Value { expected: ParamType, found: String },
    #[error(transparent)]
    Dereference(#[from] DereferenceError),
    /// A rule body reported its own failure.
    #[error("{0}")]
    Rule(String),
}
