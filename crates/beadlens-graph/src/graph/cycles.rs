//! Dependency cycle detection.
//!
//! A cycle is a strongly connected component (SCC) of two or more issues in
//! the blocking graph: every member transitively waits on itself. Trackers
//! do not always prevent these upstream, so they are reported rather than
//! rejected.
//!
//! # Algorithm
//!
//! Tarjan's SCC algorithm, run iteratively. The work stack holds
//! `(node, next_child)` frames instead of recursing, so deep chains and
//! adversarial inputs cannot exhaust the thread stack. Complexity O(V + E).
//!
//! Components are numbered in the order Tarjan completes them, starting at
//! 1. Members are listed in DFS discovery order; that order carries no
//! meaning beyond being deterministic for a given input.

#![allow(clippy::module_name_repetitions)]

use petgraph::{Direction, graph::NodeIndex};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::graph::build::IssueGraph;

/// One dependency cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleInfo {
    pub cycle_id: usize,
    pub issue_ids: Vec<String>,
    pub length: usize,
}

impl CycleInfo {
    #[must_use]
    pub fn contains(&self, issue_id: &str) -> bool {
        self.issue_ids.iter().any(|id| id == issue_id)
    }
}

/// Find every dependency cycle in the blocking graph.
#[must_use]
#[instrument(skip(ig), fields(nodes = ig.node_count()))]
pub fn find_cycles(ig: &IssueGraph) -> Vec<CycleInfo> {
    let cycles: Vec<CycleInfo> = strongly_connected_components(ig)
        .into_iter()
        .filter(|component| component.len() > 1)
        .enumerate()
        .map(|(i, component)| {
            let issue_ids: Vec<String> = component
                .into_iter()
                .filter_map(|n| ig.graph.node_weight(NodeIndex::new(n)).cloned())
                .collect();
            CycleInfo {
                cycle_id: i + 1,
                length: issue_ids.len(),
                issue_ids,
            }
        })
        .collect();

    debug!(cycles = cycles.len(), "cycle detection complete");
    cycles
}

/// All SCCs (including singletons) as node-index lists, in completion order.
///
/// Each component lists its members in DFS discovery order.
#[must_use]
pub fn strongly_connected_components(ig: &IssueGraph) -> Vec<Vec<usize>> {
    let g = &ig.graph;
    let n = g.node_count();

    // Successors sorted by index so traversal order follows input order.
    let adjacency: Vec<Vec<usize>> = g
        .node_indices()
        .map(|v| {
            let mut succ: Vec<usize> = g
                .neighbors_directed(v, Direction::Outgoing)
                .map(|w| w.index())
                .collect();
            succ.sort_unstable();
            succ.dedup();
            succ
        })
        .collect();

    let mut tarjan = Tarjan::new(n);
    for root in 0..n {
        if tarjan.index[root].is_none() {
            tarjan.run_from(root, &adjacency);
        }
    }
    tarjan.components
}

/// Iterative Tarjan state.
struct Tarjan {
    next_index: usize,
    index: Vec<Option<usize>>,
    lowlink: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<usize>,
    components: Vec<Vec<usize>>,
}

impl Tarjan {
    fn new(n: usize) -> Self {
        Self {
            next_index: 0,
            index: vec![None; n],
            lowlink: vec![0; n],
            on_stack: vec![false; n],
            stack: Vec::new(),
            components: Vec::new(),
        }
    }

    fn discover(&mut self, v: usize) {
        self.index[v] = Some(self.next_index);
        self.lowlink[v] = self.next_index;
        self.next_index += 1;
        self.stack.push(v);
        self.on_stack[v] = true;
    }

    fn run_from(&mut self, root: usize, adjacency: &[Vec<usize>]) {
        // Frame: (node, index of the next successor to examine).
        let mut work: Vec<(usize, usize)> = vec![(root, 0)];
        self.discover(root);

        while let Some(frame) = work.last_mut() {
            let (v, next_child) = *frame;
            if let Some(&w) = adjacency[v].get(next_child) {
                frame.1 += 1;
                match self.index[w] {
                    None => {
                        self.discover(w);
                        work.push((w, 0));
                    }
                    Some(w_index) if self.on_stack[w] => {
                        self.lowlink[v] = self.lowlink[v].min(w_index);
                    }
                    Some(_) => {}
                }
                continue;
            }

            work.pop();
            if let Some(&(parent, _)) = work.last() {
                self.lowlink[parent] = self.lowlink[parent].min(self.lowlink[v]);
            }

            if Some(self.lowlink[v]) == self.index[v] {
                let mut component = Vec::new();
                while let Some(w) = self.stack.pop() {
                    self.on_stack[w] = false;
                    component.push(w);
                    if w == v {
                        break;
                    }
                }
                component.reverse();
                self.components.push(component);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beadlens_core::Issue;

    /// Each `(a, b)` means "a depends on b".
    fn graph_with_deps(nodes: &[&str], deps: &[(&str, &str)]) -> IssueGraph {
        let issues: Vec<Issue> = nodes
            .iter()
            .map(|&id| {
                deps.iter()
                    .filter(|(from, _)| *from == id)
                    .fold(Issue::new(id, id), |issue, (_, on)| issue.depends_on(*on))
            })
            .collect();
        IssueGraph::build(&issues)
    }

    #[test]
    fn three_node_cycle_is_one_component() {
        let ig = graph_with_deps(&["A", "B", "C"], &[("A", "B"), ("B", "C"), ("C", "A")]);
        let cycles = find_cycles(&ig);

        assert_eq!(cycles.len(), 1);
        let cycle = &cycles[0];
        assert_eq!(cycle.cycle_id, 1);
        assert_eq!(cycle.length, 3);
        for id in ["A", "B", "C"] {
            assert!(cycle.contains(id), "{id} missing from {cycle:?}");
        }
    }

    #[test]
    fn acyclic_graph_has_no_cycles() {
        let ig = graph_with_deps(&["A", "B", "C"], &[("B", "A"), ("C", "B"), ("C", "A")]);
        assert!(find_cycles(&ig).is_empty());
    }

    #[test]
    fn empty_graph_has_no_cycles() {
        assert!(find_cycles(&IssueGraph::build(&[])).is_empty());
    }

    #[test]
    fn self_dependency_is_not_a_cycle() {
        let ig = graph_with_deps(&["A"], &[("A", "A")]);
        assert!(find_cycles(&ig).is_empty());
    }

    #[test]
    fn multiple_cycles_get_sequential_ids() {
        // A ⇄ B, C → D → E → C, F alone
        let ig = graph_with_deps(
            &["A", "B", "C", "D", "E", "F"],
            &[("A", "B"), ("B", "A"), ("C", "D"), ("D", "E"), ("E", "C")],
        );
        let cycles = find_cycles(&ig);

        assert_eq!(cycles.len(), 2);
        assert_eq!(cycles.iter().map(|c| c.cycle_id).collect::<Vec<_>>(), vec![1, 2]);
        let mut lengths: Vec<usize> = cycles.iter().map(|c| c.length).collect();
        lengths.sort_unstable();
        assert_eq!(lengths, vec![2, 3]);
    }

    #[test]
    fn cycle_through_unknown_id_is_not_reported() {
        // A → ghost → A would be a cycle only if ghost were in the snapshot.
        let issues = vec![Issue::new("A", "A").depends_on("ghost")];
        let ig = IssueGraph::build(&issues);
        assert!(find_cycles(&ig).is_empty());
    }

    #[test]
    fn every_node_lands_in_exactly_one_component() {
        let ig = graph_with_deps(
            &["A", "B", "C", "D"],
            &[("A", "B"), ("B", "A"), ("C", "B"), ("D", "C")],
        );
        let components = strongly_connected_components(&ig);
        let mut seen: Vec<usize> = components.into_iter().flatten().collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }

    #[test]
    fn deep_chain_does_not_overflow_stack() {
        let n = 50_000;
        let issues: Vec<Issue> = (0..n)
            .map(|i| {
                let issue = Issue::new(format!("n{i}"), "");
                if i + 1 < n {
                    issue.depends_on(format!("n{}", i + 1))
                } else {
                    issue.depends_on("n0")
                }
            })
            .collect();
        let cycles = find_cycles(&IssueGraph::build(&issues));

        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].length, n);
    }
}
