//! Executes the per-cell validation protocol.
pub mod engine;
pub mod ledger;
pub mod rules;

pub use engine::RuleEngine;
pub use ledger::{InstanceResult, Ledger};
pub use rules::{CellRules, Correction};
