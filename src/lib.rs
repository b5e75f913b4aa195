// Core of the spreadsheet validator.
// Rules are instances built by factories; a workbook probes each cell against
// the rules attached to it and records what it found. The `python` feature
// exposes the workbook as the `_core` extension module.

pub mod analysis;
pub mod builtins;
pub mod computation;
pub mod config;
pub mod display;
pub mod graph;
pub mod instance;
pub mod sheet;
pub mod store;
pub mod tree;
pub mod type_system;
pub mod types;
pub mod validation;

#[cfg(feature = "python")]
pub mod bindings;

pub use analysis::RecomputeReport;
pub use computation::{CellRules, InstanceResult};
pub use config::EngineConfig;
pub use instance::{Instance, InstanceKind, Matcher, Replacer};
pub use sheet::{CellAddress, CellRange, Sheet, SheetError, Workbook};
pub use store::{FactoryDefinition, InstanceFactory, Registry, RegistryError};
pub use types::{Constant, NamedParam, Param, ParamInfo, ParamType};

#[cfg(feature = "python")]
use pyo3::prelude::*;

// --- Module Definition ---
/// Defines the `_core` Python module.
/// The name `_core` marks it as the compiled component behind the Python package.
#[cfg(feature = "python")]
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<bindings::PyWorkbook>()?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    Ok(())
}
