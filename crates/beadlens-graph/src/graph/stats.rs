//! Density and basic statistics for the dependency graph.
//!
//! # Statistics Provided
//!
//! - **node_count**: Number of issues in the snapshot.
//! - **edge_count**: Distinct blocking pairs between known issues.
//! - **density**: `edge_count / (node_count * (node_count - 1))`. The graph
//!   is directed, so the denominator is not halved. A graph where every
//!   ordered pair has a blocking edge has density 1.0; an empty or
//!   single-node graph has density 0.0.
//! - **isolated_node_count**: Issues with no blocking edges in either
//!   direction.
//! - **max_in_degree** / **max_out_degree**: Most blockers on one issue and
//!   most issues blocked by one issue.
//! - **unresolved_reference_count**: Blocking edges that name an issue
//!   outside the snapshot.

use petgraph::{Direction, visit::IntoNodeIdentifiers};

use crate::graph::build::IssueGraph;

// ---------------------------------------------------------------------------
// GraphStats
// ---------------------------------------------------------------------------

/// Summary statistics for a dependency graph.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    /// Zero for graphs with 0 or 1 node.
    pub density: f64,
    pub isolated_node_count: usize,
    pub max_in_degree: usize,
    pub max_out_degree: usize,
    pub unresolved_reference_count: usize,
}

impl GraphStats {
    /// Compute statistics from an [`IssueGraph`].
    #[must_use]
    pub fn from_graph(ig: &IssueGraph) -> Self {
        let g = &ig.graph;
        let node_count = ig.node_count();
        let edge_count = ig.blocks_edge_count();

        let degrees: Vec<(usize, usize)> = g
            .node_identifiers()
            .map(|idx| {
                (
                    g.neighbors_directed(idx, Direction::Incoming).count(),
                    g.neighbors_directed(idx, Direction::Outgoing).count(),
                )
            })
            .collect();

        Self {
            node_count,
            edge_count,
            density: compute_density(node_count, edge_count),
            isolated_node_count: degrees.iter().filter(|&&(i, o)| i == 0 && o == 0).count(),
            max_in_degree: degrees.iter().map(|&(i, _)| i).max().unwrap_or(0),
            max_out_degree: degrees.iter().map(|&(_, o)| o).max().unwrap_or(0),
            unresolved_reference_count: ig.unresolved_references().len(),
        }
    }

    /// Return `true` if the graph has no blocking edges.
    #[must_use]
    pub const fn is_flat(&self) -> bool {
        self.edge_count == 0
    }
}

/// Graph fill ratio of the blocks relation.
#[must_use]
pub fn density(ig: &IssueGraph) -> f64 {
    compute_density(ig.node_count(), ig.blocks_edge_count())
}

#[allow(clippy::cast_precision_loss)]
fn compute_density(node_count: usize, edge_count: usize) -> f64 {
    if node_count < 2 {
        return 0.0_f64;
    }
    let max_edges = (node_count * (node_count - 1)) as f64;
    edge_count as f64 / max_edges
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
