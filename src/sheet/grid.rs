//! One sheet: its cells, rule attachments, results and dependency graph.
use super::address::CellRange;
use super::error::SheetError;
use crate::computation::{CellRules, InstanceResult, Ledger};
use crate::graph::{CellId, DependencyGraph};
use tracing::debug;

/// Rules attached to every cell a range covers.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub range: CellRange,
    pub rules: CellRules,
}

/// A rectangular grid of text cells.
///
/// Rows are stored row-major. Addresses are positional: inserting or removing
/// rows and columns does not rewrite attachment ranges or rule references.
#[derive(Debug, Clone)]
pub struct Sheet {
    name: String,
    columns: usize,
    rows: Vec<Vec<String>>,
    attachments: Vec<Attachment>,
    ledger: Ledger,
    graph: DependencyGraph,
}

impl Sheet {
    pub fn new(name: impl Into<String>, columns: usize) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
            attachments: Vec::new(),
            ledger: Ledger::new(),
            graph: DependencyGraph::new(),
        }
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn row_count(&self) -> usize { self.rows.len() }
    pub fn column_count(&self) -> usize { self.columns }
    pub fn attachments(&self) -> &[Attachment] { &self.attachments }
    pub fn graph(&self) -> &DependencyGraph { &self.graph }

    fn out_of_bounds(&self, row: usize, column: usize) -> SheetError {
        SheetError::OutOfBounds { sheet: self.name.clone(), row, column }
    }

    pub fn value_at(&self, row: usize, column: usize) -> Result<&str, SheetError> {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .map(String::as_str)
            .ok_or_else(|| self.out_of_bounds(row, column))
    }

    pub fn cell_id(&self, row: usize, column: usize) -> Result<CellId, SheetError> {
        if row < self.rows.len() && column < self.columns {
            Ok(CellId::from_coords(row, column, self.columns))
        } else {
            Err(self.out_of_bounds(row, column))
        }
    }

    /// `None` when the cell was never probed, `Some(None)` when its last probe
    /// found no acceptable value and no correction.
    pub fn result_at(&self, row: usize, column: usize) -> Result<Option<Option<&InstanceResult>>, SheetError> {
        let id = self.cell_id(row, column)?;
        Ok(self.ledger.get(id))
    }

    /// Rules covering a cell, in attachment order.
    pub fn rules_for(&self, row: usize, column: usize) -> Vec<&CellRules> {
        self.attachments
            .iter()
            .filter(|a| a.range.contains(&self.name, row, column))
            .map(|a| &a.rules)
            .collect()
    }

    pub(crate) fn set_cell(&mut self, row: usize, column: usize, value: String) -> Result<(), SheetError> {
        let err = self.out_of_bounds(row, column);
        let cell = self.rows.get_mut(row).and_then(|cells| cells.get_mut(column)).ok_or(err)?;
        *cell = value;
        Ok(())
    }

    pub(crate) fn store_result(&mut self, id: CellId, result: Option<InstanceResult>) {
        self.ledger.insert(id, result);
    }

    pub(crate) fn attach(&mut self, range: CellRange, rules: CellRules) -> Result<(), SheetError> {
        if range.sheet_name().map_or(false, |s| s != self.name) {
            return Err(SheetError::SheetMismatch { sheet: self.name.clone(), range });
        }
        self.attachments.push(Attachment { range, rules });
        self.rebuild_graph();
        Ok(())
    }

    fn shape_row(&self, index: usize, mut row: Vec<String>) -> Result<Vec<String>, SheetError> {
        if row.len() > self.columns {
            return Err(SheetError::RowShape {
                sheet: self.name.clone(),
                row: index,
                expected: self.columns,
                found: row.len(),
            });
        }
        row.resize(self.columns, String::new());
        Ok(row)
    }

    /// Replaces every row. Short rows are padded with empty cells.
    pub(crate) fn load_rows(&mut self, rows: Vec<Vec<String>>) -> Result<(), SheetError> {
        let shaped = rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| self.shape_row(i, row))
            .collect::<Result<Vec<_>, _>>()?;
        self.rows = shaped;
        self.rebuild_graph();
        Ok(())
    }

    pub(crate) fn insert_rows(&mut self, at: usize, rows: Vec<Vec<String>>) -> Result<(), SheetError> {
        if at > self.rows.len() {
            return Err(self.out_of_bounds(at, 0));
        }
        let shaped = rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| self.shape_row(at + i, row))
            .collect::<Result<Vec<_>, _>>()?;
        self.rows.splice(at..at, shaped);
        self.rebuild_graph();
        Ok(())
    }

    pub(crate) fn remove_rows(&mut self, at: usize, count: usize) -> Result<Vec<Vec<String>>, SheetError> {
        let end = at.checked_add(count).filter(|&end| end <= self.rows.len()).ok_or_else(|| self.out_of_bounds(at, 0))?;
        let removed = self.rows.drain(at..end).collect();
        self.rebuild_graph();
        Ok(removed)
    }

    pub(crate) fn insert_column(&mut self, at: usize, fill: &str) -> Result<(), SheetError> {
        if at > self.columns {
            return Err(self.out_of_bounds(0, at));
        }
        for row in &mut self.rows {
            row.insert(at, fill.to_string());
        }
        self.columns += 1;
        self.rebuild_graph();
        Ok(())
    }

    pub(crate) fn remove_column(&mut self, at: usize) -> Result<(), SheetError> {
        if at >= self.columns {
            return Err(self.out_of_bounds(0, at));
        }
        for row in &mut self.rows {
            row.remove(at);
        }
        self.columns -= 1;
        self.rebuild_graph();
        Ok(())
    }

    /// Rebuilds the graph and forgets all results, which were keyed by the old shape.
    fn rebuild_graph(&mut self) {
        let graph = DependencyGraph::build(self.rows.len(), self.columns, |row, column| self.targets_of(row, column));
        debug!(
            sheet = %self.name,
            cells = graph.node_count(),
            dependencies = graph.dependency_count(),
            "rebuilt dependency graph"
        );
        self.graph = graph;
        self.ledger.reset(self.rows.len() * self.columns);
    }

    /// In-sheet cells the rules on a cell read. References to other sheets
    /// are dereferenced at evaluation time but are not tracked here.
    fn targets_of(&self, row: usize, column: usize) -> Vec<(usize, usize)> {
        self.rules_for(row, column)
            .into_iter()
            .flat_map(|rules| rules.references())
            .filter(|range| range.sheet_name().map_or(true, |s| s == self.name))
            .map(|range| {
                let (_, r, c) = range.resolve(&self.name, row, column);
                (r, c)
            })
            .collect()
    }
}
