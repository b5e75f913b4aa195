//! Errors raised by grid operations.
use super::address::{AddressError, CellRange};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SheetError {
    #[error("no sheet named '{0}'")]
    UnknownSheet(String),

    #[error("a sheet named '{0}' already exists")]
    DuplicateSheet(String),

    #[error("cell {row}:{column} is outside sheet '{sheet}'")]
    OutOfBounds { sheet: String, row: usize, column: usize },

    #[error("row {row} of sheet '{sheet}' has {found} cells but the sheet has {expected} columns")]
    RowShape { sheet: String, row: usize, expected: usize, found: usize },

    #[error("range {range} does not address sheet '{sheet}'")]
    SheetMismatch { sheet: String, range: CellRange },

    #[error(transparent)]
    Address(#[from] AddressError),
}
