//! Named sheets and the recompute entry points.
//!
//! Every recompute is a plain synchronous call. Probes never write cell
//! values: a trial value is overlaid on the view rules read through, so the
//! persisted grid is the same before and after.
use super::address::{CellAddress, CellRange};
use super::error::SheetError;
use super::grid::Sheet;
use crate::analysis::propagation::{self, RecomputeToken};
use crate::analysis::telemetry::RecomputeReport;
use crate::computation::{CellRules, InstanceResult, RuleEngine};
use crate::config::EngineConfig;
use crate::graph::CellId;
use crate::instance::{CellSource, EvalContext};
use crate::types::DereferenceError;
use indexmap::IndexMap;
use tracing::{debug, instrument};

#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: IndexMap<String, Sheet>,
    config: EngineConfig,
    last_report: Option<RecomputeReport>,
}

/// Reads through to the workbook, except for one cell holding a trial value.
struct TrialView<'a> {
    book: &'a Workbook,
    trial: Option<(&'a str, usize, usize, &'a str)>,
}

impl CellSource for TrialView<'_> {
    fn cell_text(&self, sheet: &str, row: usize, column: usize) -> Result<String, DereferenceError> {
        match self.trial {
            Some((s, r, c, value)) if s == sheet && r == row && c == column => Ok(value.to_string()),
            _ => self.book.cell_text(sheet, row, column),
        }
    }
}

impl CellSource for Workbook {
    fn cell_text(&self, sheet: &str, row: usize, column: usize) -> Result<String, DereferenceError> {
        let grid = self.sheets.get(sheet).ok_or_else(|| DereferenceError::Sheet(sheet.to_string()))?;
        if row >= grid.row_count() {
            return Err(DereferenceError::Row { sheet: sheet.to_string(), row });
        }
        grid.value_at(row, column)
            .map(str::to_string)
            .map_err(|_| DereferenceError::Column { sheet: sheet.to_string(), column })
    }
}

impl Workbook {
    pub fn new(config: EngineConfig) -> Self {
        Self { sheets: IndexMap::new(), config, last_report: None }
    }

    pub fn config(&self) -> &EngineConfig { &self.config }

    pub fn set_propagation_depth(&mut self, depth: usize) {
        self.config.propagation_depth = depth;
    }

    pub fn add_sheet(&mut self, name: impl Into<String>, columns: usize) -> Result<&Sheet, SheetError> {
        let name = name.into();
        if self.sheets.contains_key(&name) {
            return Err(SheetError::DuplicateSheet(name));
        }
        let entry = self.sheets.entry(name.clone()).or_insert_with(|| Sheet::new(name, columns));
        Ok(entry)
    }

    pub fn sheet(&self, name: &str) -> Result<&Sheet, SheetError> {
        self.sheets.get(name).ok_or_else(|| SheetError::UnknownSheet(name.to_string()))
    }

    fn sheet_mut(&mut self, name: &str) -> Result<&mut Sheet, SheetError> {
        self.sheets.get_mut(name).ok_or_else(|| SheetError::UnknownSheet(name.to_string()))
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.sheets.keys().map(String::as_str)
    }

    pub fn value_at(&self, sheet: &str, row: usize, column: usize) -> Result<&str, SheetError> {
        self.sheet(sheet)?.value_at(row, column)
    }

    pub fn result_at(&self, sheet: &str, row: usize, column: usize) -> Result<Option<Option<&InstanceResult>>, SheetError> {
        self.sheet(sheet)?.result_at(row, column)
    }

    /// Cells whose rules read this cell, or that this cell's rules read.
    pub fn related_cells(&self, sheet: &str, row: usize, column: usize) -> Result<Vec<CellAddress>, SheetError> {
        let grid = self.sheet(sheet)?;
        let id = grid.cell_id(row, column)?;
        Ok(grid.graph().related(id).into_iter().map(|other| address(grid, other)).collect())
    }

    /// The report of the most recent recompute of any kind.
    pub fn last_report(&self) -> Option<&RecomputeReport> {
        self.last_report.as_ref()
    }

    /// Attaches rules to every cell of `range` and recomputes the sheet.
    pub fn attach(&mut self, sheet: &str, range: CellRange, rules: CellRules) -> Result<RecomputeReport, SheetError> {
        self.sheet_mut(sheet)?.attach(range, rules)?;
        self.recompute_all(sheet)
    }

    /// Writes a value, then validates it and its dependents.
    #[instrument(level = "debug", skip(self, value))]
    pub fn set_value_at(&mut self, sheet: &str, row: usize, column: usize, value: impl Into<String>) -> Result<RecomputeReport, SheetError> {
        self.sheet_mut(sheet)?.set_cell(row, column, value.into())?;
        self.recompute_from(sheet, row, column, None)
    }

    /// Probes a candidate value without writing it.
    ///
    /// The result is stored against the cell, and dependents are re-probed
    /// against the same overlay. Returns the cell's own result.
    #[instrument(level = "debug", skip(self, raw))]
    pub fn try_value_at(&mut self, sheet: &str, row: usize, column: usize, raw: &str) -> Result<Option<InstanceResult>, SheetError> {
        self.recompute_from(sheet, row, column, Some(raw))?;
        Ok(self.sheet(sheet)?.result_at(row, column)?.flatten().cloned())
    }

    /// Probes every cell once, row by row, without propagation.
    pub fn recompute_all(&mut self, sheet: &str) -> Result<RecomputeReport, SheetError> {
        let grid = self.sheet(sheet)?;
        let cells: Vec<CellId> = (0..grid.row_count() * grid.column_count()).map(CellId::new).collect();
        self.sweep(sheet, cells)
    }

    /// Probes every cell of one row, without propagation.
    pub fn recompute_row(&mut self, sheet: &str, row: usize) -> Result<RecomputeReport, SheetError> {
        let grid = self.sheet(sheet)?;
        if row >= grid.row_count() {
            return Err(SheetError::OutOfBounds { sheet: sheet.to_string(), row, column: 0 });
        }
        let columns = grid.column_count();
        let cells = (0..columns).map(|c| CellId::from_coords(row, c, columns)).collect();
        self.sweep(sheet, cells)
    }

    pub fn load_rows(&mut self, sheet: &str, rows: Vec<Vec<String>>) -> Result<RecomputeReport, SheetError> {
        self.sheet_mut(sheet)?.load_rows(rows)?;
        self.recompute_all(sheet)
    }

    pub fn insert_rows(&mut self, sheet: &str, at: usize, rows: Vec<Vec<String>>) -> Result<RecomputeReport, SheetError> {
        self.sheet_mut(sheet)?.insert_rows(at, rows)?;
        self.recompute_all(sheet)
    }

    pub fn remove_rows(&mut self, sheet: &str, at: usize, count: usize) -> Result<RecomputeReport, SheetError> {
        self.sheet_mut(sheet)?.remove_rows(at, count)?;
        self.recompute_all(sheet)
    }

    pub fn insert_column(&mut self, sheet: &str, at: usize, fill: &str) -> Result<RecomputeReport, SheetError> {
        self.sheet_mut(sheet)?.insert_column(at, fill)?;
        self.recompute_all(sheet)
    }

    pub fn remove_column(&mut self, sheet: &str, at: usize) -> Result<RecomputeReport, SheetError> {
        self.sheet_mut(sheet)?.remove_column(at)?;
        self.recompute_all(sheet)
    }

    /// Bulk path: each listed cell is probed against its stored value.
    fn sweep(&mut self, sheet: &str, cells: Vec<CellId>) -> Result<RecomputeReport, SheetError> {
        let view = TrialView { book: self, trial: None };
        let grid = self.sheet(sheet)?;
        let mut report = RecomputeReport::new();
        let results: Vec<(CellId, Option<InstanceResult>)> = cells
            .into_iter()
            .map(|id| {
                let result = probe(grid, &view, id);
                report.record(address(grid, id), result.as_ref());
                (id, result)
            })
            .collect();

        self.store(sheet, results, report)
    }

    /// Single-cell path: probe the cell, then its dependents per the configured depth.
    fn recompute_from(&mut self, sheet: &str, row: usize, column: usize, trial: Option<&str>) -> Result<RecomputeReport, SheetError> {
        let grid = self.sheet(sheet)?;
        let origin = grid.cell_id(row, column)?;
        let view = TrialView { book: self, trial: trial.map(|value| (sheet, row, column, value)) };

        let mut token = RecomputeToken::new(self.config.propagation_depth);
        let dependents = propagation::schedule(grid.graph(), origin, &mut token);

        let mut report = RecomputeReport::new();
        report.propagated = dependents.len();
        let results: Vec<(CellId, Option<InstanceResult>)> = std::iter::once(origin)
            .chain(dependents)
            .map(|id| {
                let result = probe(grid, &view, id);
                report.record(address(grid, id), result.as_ref());
                (id, result)
            })
            .collect();

        self.store(sheet, results, report)
    }

    fn store(
        &mut self,
        sheet: &str,
        results: Vec<(CellId, Option<InstanceResult>)>,
        report: RecomputeReport,
    ) -> Result<RecomputeReport, SheetError> {
        let grid = self.sheet_mut(sheet)?;
        for (id, result) in results {
            grid.store_result(id, result);
        }
        debug!(
            sheet,
            evaluated = report.evaluation_count(),
            propagated = report.propagated,
            success = report.outcomes.success,
            replaced = report.outcomes.replacement,
            failed = report.outcomes.exception,
            uncorrectable = report.outcomes.uncorrectable,
            "recompute finished"
        );
        self.last_report = Some(report.clone());
        Ok(report)
    }
}

fn address(grid: &Sheet, id: CellId) -> CellAddress {
    let (row, column) = grid.graph().coords(id);
    CellAddress { sheet: grid.name().to_string(), row, column }
}

fn probe(grid: &Sheet, source: &dyn CellSource, id: CellId) -> Option<InstanceResult> {
    let (row, column) = grid.graph().coords(id);
    let ctx = EvalContext::new(source, grid.name(), row, column);
    RuleEngine::new(grid.rules_for(row, column)).probe(&ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{Matcher, Replacer};
    use crate::store::Registry;
    use crate::types::{Constant, EvalError, NamedParam, Param, SpreadsheetVariable};
    use rstest::rstest;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter().map(|r| r.iter().map(|c| c.to_string()).collect()).collect()
    }

    fn cell(text: &str) -> SpreadsheetVariable { SpreadsheetVariable::parse(text).unwrap() }

    fn matcher(registry: &Registry, name: &str, args: Vec<NamedParam>) -> Matcher {
        registry.instantiate(name, args).unwrap().into_matcher().unwrap()
    }

    fn replacer(registry: &Registry, name: &str, args: Vec<NamedParam>) -> Replacer {
        registry.instantiate(name, args).unwrap().into_replacer().unwrap()
    }

    /// "this cell equals `text`"
    fn equals(registry: &Registry, text: &str) -> Matcher {
        matcher(
            registry,
            "String=",
            vec![NamedParam::new("input", SpreadsheetVariable::current()), NamedParam::new("against", Param::string(text))],
        )
    }

    /// "this cell equals the cell at `target`"
    fn equals_cell(registry: &Registry, target: &str) -> Matcher {
        matcher(
            registry,
            "Exact",
            vec![NamedParam::new("input", SpreadsheetVariable::current()), NamedParam::new("against", cell(target))],
        )
    }

    fn always(registry: &Registry) -> Matcher {
        matcher(registry, "Regex", vec![NamedParam::new("input", Param::string("")), NamedParam::new("pattern", Param::string(".*"))])
    }

    fn book(data: &[&[&str]]) -> Workbook {
        let mut book = Workbook::default();
        book.add_sheet("S", data.first().map_or(0, |r| r.len())).unwrap();
        book.load_rows("S", rows(data)).unwrap();
        book
    }

    #[test]
    fn test_string_equals_cell_example() {
        let registry = Registry::with_builtins();
        let mut book = book(&[&["42"]]);
        book.attach("S", CellRange::cell("S", 0, 0), CellRules::new().with_good_data(equals(&registry, "42"))).unwrap();

        assert_eq!(book.try_value_at("S", 0, 0, "42").unwrap(), Some(InstanceResult::Success));
        assert_eq!(book.try_value_at("S", 0, 0, "43").unwrap(), None);
        assert_eq!(book.result_at("S", 0, 0).unwrap(), Some(None));
    }

    #[rstest]
    #[case::success("ok")]
    #[case::replacement("bad")]
    #[case::exception("boom")]
    #[case::uncorrectable("???")]
    fn test_try_value_at_never_writes(#[case] trial: &str) {
        let registry = Registry::with_builtins();
        let failing = replacer(&registry, "Trim", vec![NamedParam::new("input", cell("Missing:0:0"))]);
        let rules = CellRules::new()
            .with_good_data(equals(&registry, "ok"))
            .with_correction(equals(&registry, "bad"), replacer(&registry, "Literal", vec![NamedParam::new("value", Param::string("ok"))]))
            .with_correction(equals(&registry, "boom"), failing);

        let mut book = book(&[&["original"]]);
        book.attach("S", CellRange::sheet("S"), rules).unwrap();

        let before = book.value_at("S", 0, 0).unwrap().to_string();
        let result = book.try_value_at("S", 0, 0, trial).unwrap();
        assert_eq!(book.value_at("S", 0, 0).unwrap(), before);

        match trial {
            "ok" => assert_eq!(result, Some(InstanceResult::Success)),
            "bad" => assert_eq!(result, Some(InstanceResult::FailureReplacement(Constant::String("ok".into())))),
            "boom" => assert!(matches!(result, Some(InstanceResult::FailureException(EvalError::Dereference(_))))),
            _ => assert_eq!(result, None),
        }
    }

    #[test]
    fn test_set_value_persists_and_revalidates_dependents() {
        let registry = Registry::with_builtins();
        let mut book = book(&[&["a", "a"]]);
        // B reads A.
        book.attach("S", CellRange::cell("S", 0, 1), CellRules::new().with_good_data(equals_cell(&registry, "S:0:0")))
            .unwrap();
        assert_eq!(book.result_at("S", 0, 1).unwrap(), Some(Some(&InstanceResult::Success)));

        let report = book.set_value_at("S", 0, 0, "b").unwrap();
        assert_eq!(book.value_at("S", 0, 0).unwrap(), "b");
        assert_eq!(report.evaluated.len(), 2);
        assert_eq!(report.propagated, 1);
        assert_eq!(book.result_at("S", 0, 1).unwrap(), Some(None));
    }

    #[test]
    fn test_dependents_see_the_trial_value() {
        let registry = Registry::with_builtins();
        let mut book = book(&[&["a", "b"]]);
        book.attach("S", CellRange::cell("S", 0, 1), CellRules::new().with_good_data(equals_cell(&registry, "S:0:0")))
            .unwrap();
        assert_eq!(book.result_at("S", 0, 1).unwrap(), Some(None));

        book.try_value_at("S", 0, 0, "b").unwrap();
        assert_eq!(book.result_at("S", 0, 1).unwrap(), Some(Some(&InstanceResult::Success)));
        assert_eq!(book.value_at("S", 0, 0).unwrap(), "a");
    }

    #[test]
    fn test_shared_source_propagates_once_per_dependent() {
        let registry = Registry::with_builtins();
        let mut book = book(&[&["x", "x", "x", "x"]]);
        // Columns 1 and 2 read column 0 twice each (matcher and correction).
        let reads_a = || {
            CellRules::new()
                .with_good_data(equals_cell(&registry, "S:0:0"))
                .with_correction(equals_cell(&registry, "S:0:0"), replacer(&registry, "Literal", vec![NamedParam::new("value", Param::string("x"))]))
        };
        book.attach("S", CellRange::cell("S", 0, 1), reads_a()).unwrap();
        book.attach("S", CellRange::cell("S", 0, 2), reads_a()).unwrap();

        let report = book.set_value_at("S", 0, 0, "y").unwrap();
        let origin = CellAddress { sheet: "S".into(), row: 0, column: 0 };
        assert_eq!(report.times_evaluated(&origin), 1);
        for column in [1, 2] {
            assert_eq!(report.times_evaluated(&CellAddress { sheet: "S".into(), row: 0, column }), 1);
        }
        assert_eq!(report.evaluation_count(), 3);
    }

    #[rstest]
    #[case(1, 2)]
    #[case(3, 4)]
    #[case(0, 1)]
    fn test_cycles_and_depth(#[case] depth: usize, #[case] expected: usize) {
        let registry = Registry::with_builtins();
        let mut book = book(&[&["v", "v", "v", "v"]]);
        book.set_propagation_depth(depth);
        // A ring: each column reads the next, the last reads the first.
        for column in 0..4 {
            let target = format!("S:0:{}", (column + 1) % 4);
            book.attach("S", CellRange::cell("S", 0, column), CellRules::new().with_good_data(equals_cell(&registry, &target)))
                .unwrap();
        }
        let report = book.set_value_at("S", 0, 1, "w").unwrap();
        assert_eq!(report.evaluation_count(), expected);
        assert!(report.evaluated.iter().all(|c| report.times_evaluated(c) == 1));
    }

    #[test]
    fn test_self_reference_does_not_loop() {
        let registry = Registry::with_builtins();
        let mut book = book(&[&["z"]]);
        book.attach("S", CellRange::any(), CellRules::new().with_good_data(equals_cell(&registry, "S:0:0"))).unwrap();
        let report = book.set_value_at("S", 0, 0, "q").unwrap();
        assert_eq!(report.evaluation_count(), 1);
        assert_eq!(report.propagated, 0);
    }

    #[test]
    fn test_bulk_operations_sweep_once() {
        let registry = Registry::with_builtins();
        let mut book = book(&[&["1", "2"]]);
        book.attach("S", CellRange::sheet("S"), CellRules::new().with_good_data(always(&registry))).unwrap();

        let report = book.insert_rows("S", 1, rows(&[&["3", "4"], &["5", "6"]])).unwrap();
        assert_eq!(report.evaluation_count(), 6);
        assert_eq!(report.propagated, 0);
        assert_eq!(book.last_report(), Some(&report));

        let report = book.remove_rows("S", 0, 2).unwrap();
        assert_eq!(report.evaluation_count(), 2);

        let report = book.recompute_row("S", 0).unwrap();
        assert_eq!(report.evaluation_count(), 2);
        assert!(book.recompute_row("S", 4).is_err());
    }

    #[test]
    fn test_column_edits_rebuild_the_graph() {
        let registry = Registry::with_builtins();
        let mut book = book(&[&["a", "a"]]);
        book.attach("S", CellRange::cell("S", 0, 1), CellRules::new().with_good_data(equals_cell(&registry, "S:0:0")))
            .unwrap();
        assert_eq!(book.related_cells("S", 0, 0).unwrap().len(), 1);

        book.insert_column("S", 0, "").unwrap();
        // Addresses are positional: (0,1) now holds the old first column.
        assert_eq!(book.value_at("S", 0, 1).unwrap(), "a");
        assert_eq!(book.sheet("S").unwrap().column_count(), 3);

        book.remove_column("S", 0).unwrap();
        assert_eq!(book.related_cells("S", 0, 1).unwrap(), vec![CellAddress { sheet: "S".into(), row: 0, column: 0 }]);
    }

    #[test]
    fn test_relative_row_wildcard() {
        let registry = Registry::with_builtins();
        let mut book = book(&[&["a", "a"], &["b", "c"]]);
        // Every cell in column 1 must equal column 0 of the same row.
        book.attach("S", CellRange::new(Some("S".into()), None, Some(1)).unwrap(), CellRules::new().with_good_data(equals_cell(&registry, "S:*:0")))
            .unwrap();
        assert_eq!(book.result_at("S", 0, 1).unwrap(), Some(Some(&InstanceResult::Success)));
        assert_eq!(book.result_at("S", 1, 1).unwrap(), Some(None));
        // Column 0 has no rules, so it passes vacuously.
        assert_eq!(book.result_at("S", 1, 0).unwrap(), Some(Some(&InstanceResult::Success)));
        assert_eq!(
            book.related_cells("S", 1, 0).unwrap(),
            vec![CellAddress { sheet: "S".into(), row: 1, column: 1 }]
        );
    }

    #[test]
    fn test_cross_sheet_reads() {
        let registry = Registry::with_builtins();
        let mut book = Workbook::default();
        book.add_sheet("Codes", 1).unwrap();
        book.load_rows("Codes", rows(&[&["EUR"]])).unwrap();
        book.add_sheet("Orders", 1).unwrap();
        book.load_rows("Orders", rows(&[&["EUR"], &["USD"]])).unwrap();

        book.attach("Orders", CellRange::sheet("Orders"), CellRules::new().with_good_data(equals_cell(&registry, "Codes:0:0")))
            .unwrap();
        assert_eq!(book.result_at("Orders", 0, 0).unwrap(), Some(Some(&InstanceResult::Success)));
        assert_eq!(book.result_at("Orders", 1, 0).unwrap(), Some(None));
        // Other sheets are not part of this sheet's graph.
        assert!(book.related_cells("Orders", 0, 0).unwrap().is_empty());
    }

    #[test]
    fn test_dereference_errors_surface_on_direct_reads() {
        let book = book(&[&["a"]]);
        assert_eq!(book.cell_text("Nope", 0, 0), Err(DereferenceError::Sheet("Nope".into())));
        assert_eq!(book.cell_text("S", 5, 0), Err(DereferenceError::Row { sheet: "S".into(), row: 5 }));
        assert_eq!(book.cell_text("S", 0, 5), Err(DereferenceError::Column { sheet: "S".into(), column: 5 }));
    }

    #[test]
    fn test_sheet_errors() {
        let mut book = book(&[&["a"]]);
        assert!(matches!(book.add_sheet("S", 1), Err(SheetError::DuplicateSheet(_))));
        assert!(matches!(book.set_value_at("T", 0, 0, "x"), Err(SheetError::UnknownSheet(_))));
        assert!(matches!(book.try_value_at("S", 3, 0, "x"), Err(SheetError::OutOfBounds { .. })));
        assert_eq!(book.sheet_names().collect::<Vec<_>>(), vec!["S"]);
    }
}
