//! Defines the `Edge` type, representing a relation between two cells.

/// Every reference is stored in both directions so that neighbours can be
/// listed without re-deriving which way the dependency points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    /// `source -> target`: the target's rules read the source.
    /// Example: a rule on B1 compares against A1, so `A1 -> B1` is a dependency.
    Dependency,
    /// The reverse of a dependency: `B1 -> A1` in the example above.
    Adjacent,
}
