//! Cell addresses in their `"<sheet>:<row>:<column>"` text form.
//!
//! Indices are 0-based and `*` is the wildcard token. A wildcard sheet is only
//! valid when the row and column are wildcards too.
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const WILDCARD: &str = "*";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("address '{0}' is not of the form <sheet>:<row>:<column>")]
    Format(String),
    #[error("{field} '{text}' is neither an index nor '*'")]
    Index { field: &'static str, text: String },
    #[error("address '{0}' names a row or column but not a sheet")]
    WildcardSheet(String),
}

/// A possibly wildcarded address.
///
/// Used two ways: as a *set* of cells when rules are attached
/// ([`CellRange::contains`]), and as a *relative* reference when a rule reads
/// the grid ([`CellRange::resolve`]), where a wildcard means "the evaluating cell".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRange {
    sheet: Option<String>,
    row: Option<usize>,
    column: Option<usize>,
}

impl CellRange {
    pub fn new(sheet: Option<String>, row: Option<usize>, column: Option<usize>) -> Result<Self, AddressError> {
        let range = Self { sheet, row, column };
        if range.sheet.is_none() && (range.row.is_some() || range.column.is_some()) {
            return Err(AddressError::WildcardSheet(range.to_string()));
        }
        Ok(range)
    }

    /// `*:*:*`
    pub fn any() -> Self { Self { sheet: None, row: None, column: None } }

    /// A single concrete cell.
    pub fn cell(sheet: impl Into<String>, row: usize, column: usize) -> Self {
        Self { sheet: Some(sheet.into()), row: Some(row), column: Some(column) }
    }

    /// Every cell of one sheet.
    pub fn sheet(sheet: impl Into<String>) -> Self {
        Self { sheet: Some(sheet.into()), row: None, column: None }
    }

    pub fn sheet_name(&self) -> Option<&str> { self.sheet.as_deref() }
    pub fn row(&self) -> Option<usize> { self.row }
    pub fn column(&self) -> Option<usize> { self.column }

    pub fn contains(&self, sheet: &str, row: usize, column: usize) -> bool {
        self.sheet.as_deref().map_or(true, |s| s == sheet)
            && self.row.map_or(true, |r| r == row)
            && self.column.map_or(true, |c| c == column)
    }

    /// Fills wildcards from the evaluating cell.
    pub fn resolve<'a>(&'a self, sheet: &'a str, row: usize, column: usize) -> (&'a str, usize, usize) {
        (
            self.sheet.as_deref().unwrap_or(sheet),
            self.row.unwrap_or(row),
            self.column.unwrap_or(column),
        )
    }
}

fn parse_index(field: &'static str, text: &str) -> Result<Option<usize>, AddressError> {
    if text == WILDCARD {
        return Ok(None);
    }
    text.trim()
        .parse()
        .map(Some)
        .map_err(|_| AddressError::Index { field, text: text.to_string() })
}

impl FromStr for CellRange {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Split from the right so sheet names may contain ':'.
        let mut parts = s.rsplitn(3, ':');
        let (column, row, sheet) = match (parts.next(), parts.next(), parts.next()) {
            (Some(c), Some(r), Some(s)) if !s.is_empty() => (c, r, s),
            _ => return Err(AddressError::Format(s.to_string())),
        };

        let sheet = if sheet == WILDCARD { None } else { Some(sheet.to_string()) };
        let row = parse_index("row", row)?;
        let column = parse_index("column", column)?;
        Self::new(sheet, row, column).map_err(|_| AddressError::WildcardSheet(s.to_string()))
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sheet {
            Some(s) => write!(f, "{}:", s)?,
            None => write!(f, "{}:", WILDCARD)?,
        }
        match self.row {
            Some(r) => write!(f, "{}:", r)?,
            None => write!(f, "{}:", WILDCARD)?,
        }
        match self.column {
            Some(c) => write!(f, "{}", c),
            None => f.write_str(WILDCARD),
        }
    }
}

/// A concrete cell pointer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CellAddress {
    pub sheet: String,
    pub row: usize,
    pub column: usize,
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.sheet, self.row, self.column)
    }
}
