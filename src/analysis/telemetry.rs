use crate::computation::InstanceResult;
use crate::sheet::CellAddress;

/// Tally of probe outcomes for one recompute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutcomeCounts {
    pub success: usize,
    pub replacement: usize,
    pub exception: usize,
    /// Good data failed and no correction applied.
    pub uncorrectable: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecomputeReport {
    /// Every probed cell, in evaluation order.
    pub evaluated: Vec<CellAddress>,
    pub outcomes: OutcomeCounts,
    /// How many of the evaluated cells were reached through propagation.
    pub propagated: usize,
}

impl RecomputeReport {
    pub fn new() -> Self { Self::default() }

    pub fn record(&mut self, cell: CellAddress, result: Option<&InstanceResult>) {
        self.evaluated.push(cell);
        match result {
            Some(InstanceResult::Success) => self.outcomes.success += 1,
            Some(InstanceResult::FailureReplacement(_)) => self.outcomes.replacement += 1,
            Some(InstanceResult::FailureException(_)) => self.outcomes.exception += 1,
            None => self.outcomes.uncorrectable += 1,
        }
    }

    /// Folds another report in after this one.
    pub fn merge(&mut self, other: RecomputeReport) {
        self.evaluated.extend(other.evaluated);
        self.outcomes.success += other.outcomes.success;
        self.outcomes.replacement += other.outcomes.replacement;
        self.outcomes.exception += other.outcomes.exception;
        self.outcomes.uncorrectable += other.outcomes.uncorrectable;
        self.propagated += other.propagated;
    }

    pub fn evaluation_count(&self) -> usize { self.evaluated.len() }

    /// How often `cell` was probed.
    pub fn times_evaluated(&self, cell: &CellAddress) -> usize {
        self.evaluated.iter().filter(|c| *c == cell).count()
    }
}
