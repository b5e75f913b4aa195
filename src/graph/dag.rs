//! dag.rs
//! The per-sheet dependency graph, one vertex per cell.

use super::edge::Edge;
use super::node::CellId;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<CellId, Edge>,
    rows: usize,
    columns: usize,
}

impl DependencyGraph {
    pub fn new() -> Self { Self::default() }

    /// Builds the graph for a `rows` x `columns` grid.
    ///
    /// `targets(row, column)` lists the in-grid cells the rules on that cell
    /// read. Self references and out-of-bounds targets are ignored.
    pub fn build<F>(rows: usize, columns: usize, mut targets: F) -> Self
    where
        F: FnMut(usize, usize) -> Vec<(usize, usize)>,
    {
        let count = rows * columns;
        let mut graph = DiGraph::with_capacity(count, 0);
        for i in 0..count {
            graph.add_node(CellId::new(i));
        }

        let mut seen: HashSet<(CellId, CellId)> = HashSet::new();
        for row in 0..rows {
            for column in 0..columns {
                let cell = CellId::from_coords(row, column, columns);
                for (target_row, target_column) in targets(row, column) {
                    if target_row >= rows || target_column >= columns {
                        continue;
                    }
                    let target = CellId::from_coords(target_row, target_column, columns);
                    if target == cell || !seen.insert((target, cell)) {
                        continue;
                    }
                    // 1. The cell depends on the target.
                    graph.add_edge(NodeIndex::new(target.index()), NodeIndex::new(cell.index()), Edge::Dependency);
                    // 2. The reverse, for adjacency queries.
                    graph.add_edge(NodeIndex::new(cell.index()), NodeIndex::new(target.index()), Edge::Adjacent);
                }
            }
        }

        Self { graph, rows, columns }
    }

    pub fn rows(&self) -> usize { self.rows }
    pub fn columns(&self) -> usize { self.columns }
    pub fn node_count(&self) -> usize { self.graph.node_count() }

    /// Number of dependencies; each is stored as two directed edges.
    pub fn dependency_count(&self) -> usize { self.graph.edge_count() / 2 }

    /// Cell id for in-bounds coordinates.
    pub fn cell_id(&self, row: usize, column: usize) -> Option<CellId> {
        (row < self.rows && column < self.columns).then(|| CellId::from_coords(row, column, self.columns))
    }

    pub fn coords(&self, id: CellId) -> (usize, usize) { id.coords(self.columns) }

    fn neighbours(&self, id: CellId, kind: Edge) -> Vec<CellId> {
        if id.index() >= self.graph.node_count() {
            return Vec::new();
        }
        let mut out: Vec<CellId> = self
            .graph
            .edges_directed(NodeIndex::new(id.index()), Direction::Outgoing)
            .filter(|e| *e.weight() == kind)
            .map(|e| self.graph[e.target()])
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Cells whose rules read `id`, in id order.
    pub fn dependents(&self, id: CellId) -> Vec<CellId> {
        self.neighbours(id, Edge::Dependency)
    }

    /// Cells that the rules on `id` read, in id order.
    pub fn precedents(&self, id: CellId) -> Vec<CellId> {
        self.neighbours(id, Edge::Adjacent)
    }

    /// Cells connected to `id` in either direction.
    pub fn related(&self, id: CellId) -> Vec<CellId> {
        if id.index() >= self.graph.node_count() {
            return Vec::new();
        }
        let mut out: Vec<CellId> = self
            .graph
            .neighbors_directed(NodeIndex::new(id.index()), Direction::Outgoing)
            .map(|n| self.graph[n])
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }
}
