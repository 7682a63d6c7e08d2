//! Eigenvector centrality ("influencers") via power iteration.
//!
//! # Overview
//!
//! Eigenvector centrality scores issues on the idea that connections to
//! high-scoring issues count for more. It is the dominant eigenvector of the
//! adjacency matrix.
//!
//! # Algorithm
//!
//! The blocking graph is often a DAG, where directed power iteration decays
//! to zero, so the adjacency is symmetrized: a blocking edge in either
//! direction counts as one connection. Power iteration then runs on
//! `A + I`; the identity shift keeps bipartite shapes (stars, chains) from
//! oscillating without changing the eigenvector.
//!
//! 1. Initialize scores uniformly.
//! 2. `score'(v) = score(v) + Σ score(u)` over neighbors `u` of `v`.
//! 3. Normalize to unit L2 norm.
//! 4. Stop when the L2 change drops below the tolerance or the iteration
//!    cap is reached.
//!
//! Isolated issues score 0.0. Reported scores are scaled so the top issue
//! scores 1.0.

use petgraph::Direction;
use tracing::{debug, instrument, warn};

use crate::graph::build::IssueGraph;
use crate::metrics::{
    GraphMetricEntry, IterationLimits, l2_delta, neighbor_lists, normalize_l2, normalize_max, rank,
};

/// Result of eigenvector centrality computation.
#[derive(Debug, Clone)]
pub struct EigenvectorResult {
    pub ranking: Vec<GraphMetricEntry>,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether the tolerance was met within the iteration cap.
    pub converged: bool,
}

/// Rank every issue by symmetrized eigenvector centrality.
#[must_use]
#[instrument(skip(ig), fields(nodes = ig.node_count()))]
pub fn influencers(ig: &IssueGraph, limits: IterationLimits) -> EigenvectorResult {
    let n = ig.node_count();
    if n == 0 {
        return EigenvectorResult {
            ranking: Vec::new(),
            iterations: 0,
            converged: true,
        };
    }

    let neighbors = undirected_neighbors(ig);

    #[allow(clippy::cast_precision_loss)]
    let init_val = 1.0 / (n as f64).sqrt();
    let mut scores: Vec<f64> = vec![init_val; n];

    let mut converged = false;
    let mut iterations = 0;

    for iter in 0..limits.max_iterations {
        iterations = iter + 1;

        let mut new_scores = scores.clone();
        for (v, nbrs) in neighbors.iter().enumerate() {
            for &u in nbrs {
                new_scores[v] += scores[u];
            }
        }
        normalize_l2(&mut new_scores);

        let diff = l2_delta(&scores, &new_scores);
        scores = new_scores;

        if diff < limits.tolerance {
            converged = true;
            break;
        }
    }

    if !converged {
        warn!(iterations, "eigenvector centrality hit iteration cap");
    }

    for (score, nbrs) in scores.iter_mut().zip(&neighbors) {
        if nbrs.is_empty() {
            *score = 0.0;
        }
    }
    normalize_max(&mut scores);

    debug!(iterations, converged, "eigenvector centrality complete");

    EigenvectorResult {
        ranking: rank(ig, &scores),
        iterations,
        converged,
    }
}

/// Neighbors ignoring direction, each listed once.
fn undirected_neighbors(ig: &IssueGraph) -> Vec<Vec<usize>> {
    let incoming = neighbor_lists(ig, Direction::Incoming);
    let outgoing = neighbor_lists(ig, Direction::Outgoing);

    incoming
        .into_iter()
        .zip(outgoing)
        .map(|(mut nbrs, out)| {
            nbrs.extend(out);
            nbrs.sort_unstable();
            nbrs.dedup();
            nbrs
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::score_of;
    use beadlens_core::Issue;

    /// Each `(a, b)` means "a blocks b".
    fn make_graph(nodes: &[&str], edges: &[(&str, &str)]) -> IssueGraph {
        let issues: Vec<Issue> = nodes
            .iter()
            .map(|&id| {
                edges
                    .iter()
                    .filter(|(_, blocked)| *blocked == id)
                    .fold(Issue::new(id, id), |issue, (blocker, _)| issue.depends_on(*blocker))
            })
            .collect();
        IssueGraph::build(&issues)
    }

    fn score(result: &EigenvectorResult, id: &str) -> f64 {
        score_of(&result.ranking, id).expect("issue ranked")
    }

    #[test]
    fn empty_graph_returns_empty() {
        let result = influencers(&make_graph(&[], &[]), IterationLimits::default());
        assert!(result.ranking.is_empty());
        assert!(result.converged);
        assert_eq!(result.iterations, 0);
    }

    #[test]
    fn isolated_nodes_score_zero() {
        let ig = make_graph(&["A", "B", "C"], &[("A", "B")]);
        let result = influencers(&ig, IterationLimits::default());
        assert!((score(&result, "C") - 0.0).abs() < f64::EPSILON);
        assert!(score(&result, "A") > 0.0);
    }

    #[test]
    fn simple_pair_equal_scores() {
        let result = influencers(&make_graph(&["A", "B"], &[("A", "B")]), IterationLimits::default());

        assert!((score(&result, "A") - score(&result, "B")).abs() < 1e-6);
        assert!((score(&result, "A") - 1.0).abs() < 1e-9, "top score normalized to 1");
        assert!(result.converged, "should converge for simple pair");
    }

    #[test]
    fn star_center_highest() {
        // A blocks B, C, D.
        let ig = make_graph(&["A", "B", "C", "D"], &[("A", "B"), ("A", "C"), ("A", "D")]);
        let result = influencers(&ig, IterationLimits::default());

        assert_eq!(result.ranking[0].issue_id, "A");
        assert!(score(&result, "A") > score(&result, "B"));
        assert!((score(&result, "B") - score(&result, "C")).abs() < 1e-6);
        assert!((score(&result, "C") - score(&result, "D")).abs() < 1e-6);
    }

    #[test]
    fn chain_middle_nodes_highest() {
        let ig = make_graph(&["A", "B", "C", "D"], &[("A", "B"), ("B", "C"), ("C", "D")]);
        let result = influencers(&ig, IterationLimits::default());

        assert!(score(&result, "B") > score(&result, "A"));
        assert!(score(&result, "C") > score(&result, "D"));
        assert!((score(&result, "B") - score(&result, "C")).abs() < 1e-6);
    }

    #[test]
    fn iteration_cap_is_respected() {
        let ig = make_graph(&["A", "B", "C", "D"], &[("A", "B"), ("B", "C"), ("C", "D")]);
        let limits = IterationLimits {
            max_iterations: 2,
            tolerance: 1e-15,
        };
        let result = influencers(&ig, limits);

        assert_eq!(result.iterations, 2);
        assert!(!result.converged);
        assert_eq!(result.ranking.len(), 4, "best estimate still returned");
    }

    #[test]
    fn scores_are_within_unit_range() {
        let ig = make_graph(&["A", "B", "C"], &[("A", "B"), ("B", "C"), ("A", "C")]);
        let result = influencers(&ig, IterationLimits::default());

        for entry in &result.ranking {
            assert!((0.0..=1.0).contains(&entry.score), "{entry:?}");
        }
    }
}
