//! Python bridge. Compiled only with the `python` feature.
pub mod python;

pub use python::PyWorkbook;
