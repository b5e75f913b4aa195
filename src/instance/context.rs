//! The view of the grid a rule sees while it runs.
use crate::sheet::{CellAddress, CellRange};
use crate::types::{DereferenceError, EvalError};

/// Read access to cell text by concrete address.
pub trait CellSource {
    fn cell_text(&self, sheet: &str, row: usize, column: usize) -> Result<String, DereferenceError>;
}

/// A source with no cells; every read fails to dereference.
struct Detached;

impl CellSource for Detached {
    fn cell_text(&self, sheet: &str, _row: usize, _column: usize) -> Result<String, DereferenceError> {
        Err(DereferenceError::Sheet(sheet.to_string()))
    }
}

static DETACHED: Detached = Detached;

/// Evaluation context: the grid to read from and the cell being evaluated.
pub struct EvalContext<'a> {
    source: &'a dyn CellSource,
    sheet: &'a str,
    row: usize,
    column: usize,
}

impl<'a> EvalContext<'a> {
    pub fn new(source: &'a dyn CellSource, sheet: &'a str, row: usize, column: usize) -> Self {
        Self { source, sheet, row, column }
    }

    /// A context without a grid, for rules built purely from constants.
    pub fn detached() -> EvalContext<'static> {
        EvalContext { source: &DETACHED, sheet: "", row: 0, column: 0 }
    }

    pub fn origin(&self) -> CellAddress {
        CellAddress { sheet: self.sheet.to_string(), row: self.row, column: self.column }
    }

    /// Dereferences `target`, filling wildcards from the evaluating cell.
    pub fn read(&self, target: &CellRange) -> Result<String, EvalError> {
        let (sheet, row, column) = target.resolve(self.sheet, self.row, self.column);
        Ok(self.source.cell_text(sheet, row, column)?)
    }
}
