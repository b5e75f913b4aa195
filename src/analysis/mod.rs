//! Recompute scheduling and the reports recompute produces.
pub mod propagation;
pub mod telemetry;

pub use propagation::{schedule, RecomputeToken};
pub use telemetry::{OutcomeCounts, RecomputeReport};
