use crate::computation::{CellRules, InstanceResult};
use crate::instance::Instance;
use crate::sheet::{CellAddress, Sheet, Workbook};
use crate::types::{Param, Variable};
use std::fmt::Write;

/// Renders a cell's value, last result, attached rules and related cells.
///
/// Intended for presentation layers; the text layout is not a stable format.
pub fn format_trace(book: &Workbook, sheet: &str, row: usize, column: usize) -> String {
    let mut output = String::new();
    let target = CellAddress { sheet: sheet.to_string(), row, column };

    let grid = match book.sheet(sheet) {
        Ok(grid) => grid,
        Err(e) => {
            let _ = writeln!(output, "Error: {}", e);
            return output;
        }
    };
    let (value, result) = match (grid.value_at(row, column), grid.result_at(row, column)) {
        (Ok(value), Ok(result)) => (value, result),
        (Err(e), _) | (_, Err(e)) => {
            let _ = writeln!(output, "Error: {}", e);
            return output;
        }
    };

    let _ = writeln!(output, "AUDIT TRACE for cell '{}':", target);
    let _ = writeln!(output, "--------------------------------------------------");
    let _ = writeln!(output, "Value:  {:?}", value);
    let _ = writeln!(output, "Result: {}", format_result(result));

    let mut tracer = Tracer { output };
    let rules = grid.rules_for(row, column);
    tracer.trace_rules(&rules);
    tracer.trace_neighbours(grid, row, column);
    tracer.output
}

fn format_result(result: Option<Option<&InstanceResult>>) -> String {
    match result {
        None => "unchecked".to_string(),
        Some(None) => "invalid, no correction".to_string(),
        Some(Some(InstanceResult::Success)) => "valid".to_string(),
        Some(Some(InstanceResult::FailureReplacement(v))) => format!("invalid, suggest {:?}", v.to_string()),
        Some(Some(InstanceResult::FailureException(e))) => format!("invalid, correction failed: {}", e),
    }
}

struct Tracer {
    output: String,
}

impl Tracer {
    fn trace_rules(&mut self, rules: &[&CellRules]) {
        let good: Vec<_> = rules.iter().flat_map(|r| r.good_data()).collect();
        let corrections: Vec<_> = rules.iter().flat_map(|r| r.corrections()).collect();

        let _ = writeln!(self.output, "|-- Good Data ({})", good.len());
        for (i, m) in good.iter().enumerate() {
            let is_last = i == good.len() - 1;
            let instance = Instance::Matcher((*m).clone());
            self.trace_instance(&instance, "|   ", is_last, "");
        }

        let _ = writeln!(self.output, "|-- Error Correction ({})", corrections.len());
        for (i, c) in corrections.iter().enumerate() {
            let is_last = i == corrections.len() - 1;
            let _ = writeln!(self.output, "|   {} #{}", connector(is_last), i + 1);
            let stem = child_stem("|   ", is_last);
            self.trace_instance(&Instance::Matcher(c.matcher.clone()), &stem, false, "when ");
            self.trace_instance(&Instance::Replacer(c.replacer.clone()), &stem, true, "then ");
        }
    }

    /// Writes one instance line under `stem`, then its arguments one level deeper.
    fn trace_instance(&mut self, instance: &Instance, stem: &str, is_last: bool, label: &str) {
        let _ = writeln!(
            self.output,
            "{}{} {}{} {}",
            stem,
            connector(is_last),
            label,
            instance.kind(),
            instance.name()
        );
        let stem = child_stem(stem, is_last);
        let args = instance.arguments();
        for (i, arg) in args.iter().enumerate() {
            let last_arg = i == args.len() - 1;
            let head = format!("{}{} {}", stem, connector(last_arg), arg.name);
            match &arg.param {
                Param::Instance(inner) => {
                    let _ = writeln!(self.output, "{}:", head);
                    self.trace_instance(inner, &child_stem(&stem, last_arg), true, "");
                }
                Param::Constant(c) => {
                    let _ = writeln!(self.output, "{} = {:?}", head, c.to_string());
                }
                Param::Variable(Variable::Simple(v)) => {
                    let _ = writeln!(self.output, "{} = ${} [{:?}]", head, v.name(), v.get().to_string());
                }
                Param::Variable(Variable::Spreadsheet(v)) => {
                    let _ = writeln!(self.output, "{} = cell {}", head, v.target());
                }
            }
        }
    }

    fn trace_neighbours(&mut self, grid: &Sheet, row: usize, column: usize) {
        let Ok(id) = grid.cell_id(row, column) else { return };
        let graph = grid.graph();
        let render = |ids: Vec<crate::graph::CellId>| -> String {
            if ids.is_empty() {
                return "-".to_string();
            }
            ids.into_iter()
                .map(|other| {
                    let (r, c) = graph.coords(other);
                    format!("{}:{}:{}", grid.name(), r, c)
                })
                .collect::<Vec<_>>()
                .join(", ")
        };
        let _ = writeln!(self.output, "|-- Reads: {}", render(graph.precedents(id)));
        let _ = writeln!(self.output, "`-- Read by: {}", render(graph.dependents(id)));
    }
}

fn connector(is_last: bool) -> &'static str {
    if is_last { "`--" } else { "|--" }
}

fn child_stem(stem: &str, is_last: bool) -> String {
    format!("{}{}", stem, if is_last { "    " } else { "|   " })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::CellRange;
    use crate::store::Registry;
    use crate::types::{NamedParam, SpreadsheetVariable};

    #[test]
    fn test_trace_lists_rules_and_neighbours() {
        let registry = Registry::with_builtins();
        let mut book = Workbook::default();
        book.add_sheet("S", 2).unwrap();
        book.load_rows("S", vec![vec!["a".into(), "b".into()]]).unwrap();

        let inner = registry
            .instantiate(
                "Exact",
                vec![
                    NamedParam::new("input", SpreadsheetVariable::current()),
                    NamedParam::new("against", SpreadsheetVariable::parse("S:0:0").unwrap()),
                ],
            )
            .unwrap();
        let not = registry.instantiate("Not", vec![NamedParam::new("matcher", inner)]).unwrap();
        book.attach("S", CellRange::cell("S", 0, 1), CellRules::new().with_good_data(not.into_matcher().unwrap()))
            .unwrap();

        let text = format_trace(&book, "S", 0, 1);
        assert!(text.starts_with("AUDIT TRACE for cell 'S:0:1':"));
        assert!(text.contains("Result: valid"));
        assert!(text.contains("Matcher Not"));
        assert!(text.contains("Matcher Exact"));
        assert!(text.contains("against = cell S:0:0"));
        assert!(text.contains("|-- Reads: S:0:0"));
        assert!(text.contains("`-- Read by: -"));
    }

    #[test]
    fn test_trace_of_missing_cell() {
        let book = Workbook::default();
        assert!(format_trace(&book, "Nope", 0, 0).starts_with("Error: no sheet named 'Nope'"));
    }
}
