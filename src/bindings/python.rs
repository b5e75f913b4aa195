use crate::computation::{CellRules, InstanceResult};
use crate::config::EngineConfig;
use crate::display::trace;
use crate::sheet::{CellRange, Workbook};
use crate::store::{NodeDefinition, Registry};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

fn value_error(e: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// Flattens a result to `(status, payload)` for the Python side.
fn result_tuple(result: Option<&InstanceResult>) -> (String, Option<String>) {
    match result {
        Some(InstanceResult::Success) => ("success".into(), None),
        Some(InstanceResult::FailureReplacement(v)) => ("replacement".into(), Some(v.to_string())),
        Some(InstanceResult::FailureException(e)) => ("exception".into(), Some(e.to_string())),
        None => ("invalid".into(), None),
    }
}

#[pyclass(name = "_Workbook")]
#[derive(Debug)]
pub struct PyWorkbook {
    book: Workbook,
    registry: Registry,
}

impl PyWorkbook {
    fn build_rules(&self, good_data: Vec<String>, corrections: Vec<(String, String)>) -> PyResult<CellRules> {
        let mut rules = CellRules::new();
        for json in good_data {
            let node: NodeDefinition = serde_json::from_str(&json).map_err(value_error)?;
            let matcher = node.instantiate(&self.registry).map_err(value_error)?.into_matcher();
            rules.push_good_data(matcher.ok_or_else(|| PyValueError::new_err("good data rule is not a matcher"))?);
        }
        for (when, then) in corrections {
            let when: NodeDefinition = serde_json::from_str(&when).map_err(value_error)?;
            let then: NodeDefinition = serde_json::from_str(&then).map_err(value_error)?;
            let matcher = when.instantiate(&self.registry).map_err(value_error)?.into_matcher();
            let replacer = then.instantiate(&self.registry).map_err(value_error)?.into_replacer();
            match (matcher, replacer) {
                (Some(m), Some(r)) => rules.push_correction(m, r),
                _ => return Err(PyValueError::new_err("a correction pairs a matcher with a replacer")),
            }
        }
        Ok(rules)
    }
}

#[pymethods]
impl PyWorkbook {
    #[new]
    #[pyo3(signature = (config_json=None))]
    pub fn new(config_json: Option<&str>) -> PyResult<Self> {
        let config = match config_json {
            Some(json) => EngineConfig::from_json_str(json).map_err(value_error)?,
            None => EngineConfig::default(),
        };
        let mut registry = Registry::with_builtins();
        registry.set_optimize(config.optimize_trees);
        Ok(Self { book: Workbook::new(config), registry })
    }

    /// Registers factories from a JSON array of definitions; returns their names.
    pub fn load_definitions(&mut self, json: &str) -> PyResult<Vec<String>> {
        let loaded = self.registry.load_definitions(json).map_err(value_error)?;
        Ok(loaded.iter().map(|f| f.name().to_string()).collect())
    }

    pub fn factory_names(&self) -> Vec<String> {
        self.registry.factories().map(|f| f.name().to_string()).collect()
    }

    pub fn add_sheet(&mut self, name: &str, columns: usize) -> PyResult<()> {
        self.book.add_sheet(name, columns).map(|_| ()).map_err(value_error)
    }

    pub fn load_rows(&mut self, sheet: &str, rows: Vec<Vec<String>>) -> PyResult<usize> {
        let report = self.book.load_rows(sheet, rows).map_err(value_error)?;
        Ok(report.evaluation_count())
    }

    /// Attaches rules given as JSON factory nodes. Returns how many cells were probed.
    #[pyo3(signature = (sheet, range, good_data, corrections=Vec::new()))]
    pub fn attach(
        &mut self,
        sheet: &str,
        range: &str,
        good_data: Vec<String>,
        corrections: Vec<(String, String)>,
    ) -> PyResult<usize> {
        let range: CellRange = range.parse().map_err(value_error)?;
        let rules = self.build_rules(good_data, corrections)?;
        let report = self.book.attach(sheet, range, rules).map_err(value_error)?;
        Ok(report.evaluation_count())
    }

    pub fn value_at(&self, sheet: &str, row: usize, column: usize) -> PyResult<String> {
        self.book.value_at(sheet, row, column).map(str::to_string).map_err(value_error)
    }

    pub fn set_value_at(&mut self, sheet: &str, row: usize, column: usize, value: String) -> PyResult<usize> {
        let report = self.book.set_value_at(sheet, row, column, value).map_err(value_error)?;
        Ok(report.evaluation_count())
    }

    pub fn try_value_at(&mut self, sheet: &str, row: usize, column: usize, raw: &str) -> PyResult<(String, Option<String>)> {
        let result = self.book.try_value_at(sheet, row, column, raw).map_err(value_error)?;
        Ok(result_tuple(result.as_ref()))
    }

    /// `None` for a cell that has not been probed since the last structural change.
    pub fn result_at(&self, sheet: &str, row: usize, column: usize) -> PyResult<Option<(String, Option<String>)>> {
        let result = self.book.result_at(sheet, row, column).map_err(value_error)?;
        Ok(result.map(result_tuple))
    }

    pub fn recompute_all(&mut self, sheet: &str) -> PyResult<usize> {
        let report = self.book.recompute_all(sheet).map_err(|e| PyRuntimeError::new_err(e.to_string()))?;
        Ok(report.evaluation_count())
    }

    pub fn related_cells(&self, sheet: &str, row: usize, column: usize) -> PyResult<Vec<(String, usize, usize)>> {
        let cells = self.book.related_cells(sheet, row, column).map_err(value_error)?;
        Ok(cells.into_iter().map(|c| (c.sheet, c.row, c.column)).collect())
    }

    pub fn trace_cell(&self, sheet: &str, row: usize, column: usize) -> String {
        trace::format_trace(&self.book, sheet, row, column)
    }
}
