//! Parse trees: rules composed from other factories.
pub mod interpreter;
pub mod node;

pub use interpreter::{evaluate, evaluate_optimized, Bindings};
pub use node::{InternalNode, ParseNode, TerminalNode, TerminalValue, VariableNode};
