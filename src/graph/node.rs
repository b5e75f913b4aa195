//! Defines the `CellId`, the vertex type of a sheet's dependency graph.

/// A dense identifier for one cell: `row * column_count + column`.
///
/// Only meaningful for the grid shape it was computed against; ids are
/// recomputed whenever rows or columns are inserted or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct CellId(pub u32);

impl CellId {
    #[inline(always)]
    pub fn index(&self) -> usize { self.0 as usize }
    pub fn new(idx: usize) -> Self { Self(idx as u32) }

    pub fn from_coords(row: usize, column: usize, columns: usize) -> Self {
        Self::new(row * columns + column)
    }

    /// `(row, column)` for a grid `columns` wide.
    pub fn coords(&self, columns: usize) -> (usize, usize) {
        if columns == 0 {
            return (0, 0);
        }
        (self.index() / columns, self.index() % columns)
    }
}
