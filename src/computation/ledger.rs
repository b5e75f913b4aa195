//! ledger.rs
//! Stores the outcome of the last probe of every cell.

use crate::graph::CellId;
use crate::types::{Constant, EvalError};

/// The outcome of probing one cell.
#[derive(Debug, Clone, PartialEq)]
pub enum InstanceResult {
    /// Every good-data matcher accepted the value.
    Success,
    /// A correction applied but its replacer failed.
    FailureException(EvalError),
    /// A correction applied and suggests this value.
    FailureReplacement(Constant),
}

impl InstanceResult {
    pub fn is_success(&self) -> bool { matches!(self, InstanceResult::Success) }
}

/// A cell that was never probed is distinct from one whose probe produced
/// nothing (good data failed and no correction applied).
#[derive(Debug, Clone, Default, PartialEq)]
enum Slot {
    #[default]
    Unchecked,
    Checked(Option<InstanceResult>),
}

#[derive(Debug, Clone, Default)]
pub struct Ledger {
    // Dense storage indexed by cell id
    results: Vec<Slot>,
}

impl Ledger {
    pub fn new() -> Self { Self::default() }

    pub fn ensure_capacity(&mut self, size: usize) {
        if self.results.len() < size {
            self.results.resize(size, Slot::Unchecked);
        }
    }

    /// `None` when the cell was never probed.
    pub fn get(&self, id: CellId) -> Option<Option<&InstanceResult>> {
        match self.results.get(id.index())? {
            Slot::Unchecked => None,
            Slot::Checked(result) => Some(result.as_ref()),
        }
    }

    pub fn insert(&mut self, id: CellId, result: Option<InstanceResult>) {
        let idx = id.index();
        if idx >= self.results.len() {
            self.results.resize(idx + 1, Slot::Unchecked);
        }
        self.results[idx] = Slot::Checked(result);
    }

    pub fn invalidate(&mut self, ids: impl IntoIterator<Item = CellId>) {
        for id in ids {
            if let Some(slot) = self.results.get_mut(id.index()) {
                *slot = Slot::Unchecked;
            }
        }
    }

    /// Forgets every result; used when the grid's shape changes.
    pub fn reset(&mut self, size: usize) {
        self.results.clear();
        self.results.resize(size, Slot::Unchecked);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unchecked_differs_from_no_result() {
        let mut ledger = Ledger::new();
        ledger.ensure_capacity(4);
        assert_eq!(ledger.get(CellId(1)), None);

        ledger.insert(CellId(1), None);
        assert_eq!(ledger.get(CellId(1)), Some(None));

        ledger.insert(CellId(2), Some(InstanceResult::Success));
        assert_eq!(ledger.get(CellId(2)), Some(Some(&InstanceResult::Success)));

        ledger.invalidate([CellId(1), CellId(2)]);
        assert_eq!(ledger.get(CellId(1)), None);
        assert_eq!(ledger.get(CellId(2)), None);
    }

    #[test]
    fn test_insert_past_the_end_grows() {
        let mut ledger = Ledger::new();
        ledger.insert(CellId(9), Some(InstanceResult::Success));
        assert_eq!(ledger.get(CellId(8)), None);
        assert!(ledger.get(CellId(9)).is_some());
    }
}
