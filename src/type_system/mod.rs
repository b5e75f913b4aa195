//! Static analysis for composed rules.
//!
//! This module provides the `TreeChecker`, which inspects a tree-bound factory
//! *before* it is registered and reports every authoring error in one pass:
//! unknown inputs, bad wiring, type mismatches between nodes, a root of the
//! wrong instance type, and required inputs left unconnected.

pub use self::checker::TreeChecker;
pub use self::error::{TreeError, TreeErrorType};

mod checker;
mod error;
mod rules {
    pub mod compatibility;
    pub mod connections;
}
