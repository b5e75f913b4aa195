//! Human-readable renderings of workbook state.
pub mod trace;

pub use trace::format_trace;
