//! The grid the rules validate: addresses, sheets and the workbook.
pub mod address;
pub mod error;
pub mod grid;
pub mod workbook;

pub use address::{AddressError, CellAddress, CellRange, WILDCARD};
pub use error::SheetError;
pub use grid::{Attachment, Sheet};
pub use workbook::Workbook;
