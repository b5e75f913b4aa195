//! Defines the dependency graph between cells.
pub mod dag;
pub mod edge;
pub mod node;

pub use dag::DependencyGraph;
pub use edge::Edge;
pub use node::CellId;
