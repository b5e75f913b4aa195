//! Decides which dependents an edit re-probes.
use crate::graph::{CellId, DependencyGraph};
use std::collections::{HashSet, VecDeque};

/// Visited set and hop limit threaded through one propagation.
///
/// A cell is scheduled at most once per token, so shared sources and cyclic
/// references cannot cause repeated or endless re-evaluation.
#[derive(Debug, Clone)]
pub struct RecomputeToken {
    visited: HashSet<CellId>,
    depth_limit: usize,
}

impl RecomputeToken {
    /// `depth_limit` is the number of dependency hops to follow; 0 disables propagation.
    pub fn new(depth_limit: usize) -> Self {
        Self { visited: HashSet::new(), depth_limit }
    }

    pub fn depth_limit(&self) -> usize { self.depth_limit }

    /// Marks `id` visited. Returns `false` if it already was.
    pub fn visit(&mut self, id: CellId) -> bool {
        self.visited.insert(id)
    }

    pub fn has_visited(&self, id: CellId) -> bool {
        self.visited.contains(&id)
    }

    pub fn visited_count(&self) -> usize { self.visited.len() }
}

/// Breadth-first list of the cells to re-probe after `origin` changed.
///
/// The origin itself is never scheduled. Within one hop, cells come in id order.
pub fn schedule(graph: &DependencyGraph, origin: CellId, token: &mut RecomputeToken) -> Vec<CellId> {
    let mut order = Vec::new();
    let mut queue = VecDeque::from([(origin, 0usize)]);
    token.visit(origin);

    while let Some((cell, depth)) = queue.pop_front() {
        if depth >= token.depth_limit {
            continue;
        }
        for dependent in graph.dependents(cell) {
            if token.visit(dependent) {
                order.push(dependent);
                queue.push_back((dependent, depth + 1));
            }
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    // A chain along row 0: column c+1 reads column c. Column 3 also reads column 0.
    fn chain() -> DependencyGraph {
        DependencyGraph::build(1, 4, |_, column| match column {
            0 => vec![],
            3 => vec![(0, 2), (0, 0)],
            c => vec![(0, c - 1)],
        })
    }

    #[rstest]
    #[case(0, vec![])]
    #[case(1, vec![1, 3])]
    #[case(2, vec![1, 3, 2])]
    #[case(10, vec![1, 3, 2])]
    fn test_depth_limit(#[case] depth: usize, #[case] expected: Vec<u32>) {
        let mut token = RecomputeToken::new(depth);
        let order = schedule(&chain(), CellId(0), &mut token);
        assert_eq!(order, expected.into_iter().map(CellId).collect::<Vec<_>>());
    }

    #[test]
    fn test_cycles_terminate_and_skip_origin() {
        // Every cell reads both others.
        let g = DependencyGraph::build(1, 3, |_, column| (0..3).filter(|&c| c != column).map(|c| (0, c)).collect());
        let mut token = RecomputeToken::new(usize::MAX);
        let order = schedule(&g, CellId(1), &mut token);
        assert_eq!(order, vec![CellId(0), CellId(2)]);
        assert_eq!(token.visited_count(), 3);
    }

    #[test]
    fn test_token_is_shared_across_origins() {
        // Two sources feeding one dependent: the dependent runs once.
        let g = DependencyGraph::build(1, 3, |_, column| if column == 2 { vec![(0, 0), (0, 1)] } else { vec![] });
        let mut token = RecomputeToken::new(1);
        let first = schedule(&g, CellId(0), &mut token);
        let second = schedule(&g, CellId(1), &mut token);
        assert_eq!(first, vec![CellId(2)]);
        assert!(second.is_empty());
    }
}
