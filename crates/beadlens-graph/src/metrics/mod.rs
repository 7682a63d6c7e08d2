//! Ranking metrics over the blocking graph.
//!
//! # Overview
//!
//! Each metric answers a different question about which issues matter:
//!
//! - **Betweenness centrality** (`betweenness`): which issues sit on the
//!   shortest paths between others (bottlenecks)?
//! - **Keystones** (`keystone`): which issues, once resolved, transitively
//!   unblock the most other issues?
//! - **Eigenvector centrality** (`eigenvector`): which issues are connected
//!   to other well-connected issues (influencers)?
//! - **HITS** (`hits`): which issues block many important issues (hubs)
//!   and which are blocked by many important issues (authorities)?
//!
//! All metrics read an [`IssueGraph`] and return [`GraphMetricEntry`]
//! rankings sorted by descending score, ties broken by ascending issue id.
//! Only issues present in the snapshot are ranked; unresolved references
//! never appear.
//!
//! ```rust,ignore
//! use beadlens_graph::graph::IssueGraph;
//! use beadlens_graph::metrics::{IterationLimits, betweenness, eigenvector, hits, keystone};
//!
//! let ig = IssueGraph::build(&issues);
//! let limits = IterationLimits::default();
//!
//! let bottlenecks = betweenness::bottlenecks(&ig);
//! let keystones = keystone::keystones(&ig);
//! let influencers = eigenvector::influencers(&ig, limits);
//! let hits = hits::hits(&ig, limits);
//! ```

pub mod betweenness;
pub mod eigenvector;
pub mod hits;
pub mod keystone;

use std::cmp::Ordering;

use petgraph::Direction;
use serde::{Deserialize, Serialize};

use crate::graph::build::IssueGraph;

/// One ranked issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphMetricEntry {
    pub issue_id: String,
    /// Display only; never used in computation.
    pub title: String,
    pub score: f64,
}

/// Stopping rule for the power iterations (influencers, hubs/authorities).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationLimits {
    pub max_iterations: usize,
    /// Stop once the L2 norm of the change between iterations drops below this.
    pub tolerance: f64,
}

impl IterationLimits {
    pub const DEFAULT_MAX_ITERATIONS: usize = 100;
    pub const DEFAULT_TOLERANCE: f64 = 1e-6;
}

impl Default for IterationLimits {
    fn default() -> Self {
        Self {
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
            tolerance: Self::DEFAULT_TOLERANCE,
        }
    }
}

/// Order entries by descending score, then ascending issue id.
pub fn sort_entries(entries: &mut [GraphMetricEntry]) {
    entries.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.issue_id.cmp(&b.issue_id))
    });
}

/// Look up the score for `issue_id` in a ranking.
#[must_use]
pub fn score_of(entries: &[GraphMetricEntry], issue_id: &str) -> Option<f64> {
    entries
        .iter()
        .find(|entry| entry.issue_id == issue_id)
        .map(|entry| entry.score)
}

/// Turn node-indexed scores into a sorted ranking.
pub(crate) fn rank(ig: &IssueGraph, scores: &[f64]) -> Vec<GraphMetricEntry> {
    let mut entries: Vec<GraphMetricEntry> = ig
        .graph
        .node_indices()
        .zip(scores)
        .filter_map(|(idx, &score)| {
            let issue_id = ig.issue_id(idx)?;
            Some(GraphMetricEntry {
                issue_id: issue_id.to_string(),
                title: ig.title(issue_id).to_string(),
                score,
            })
        })
        .collect();
    sort_entries(&mut entries);
    entries
}

/// Node-indexed neighbor lists in one direction.
pub(crate) fn neighbor_lists(ig: &IssueGraph, direction: Direction) -> Vec<Vec<usize>> {
    let g = &ig.graph;
    g.node_indices()
        .map(|v| g.neighbors_directed(v, direction).map(|w| w.index()).collect())
        .collect()
}

/// Scale `v` to unit L2 norm. A zero vector is left as-is.
pub(crate) fn normalize_l2(v: &mut [f64]) {
    let norm: f64 = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Scale `v` so its largest entry is 1.0. An all-zero vector is left as-is.
pub(crate) fn normalize_max(v: &mut [f64]) {
    let max = v.iter().copied().fold(0.0_f64, f64::max);
    if max > 0.0 {
        for x in v.iter_mut() {
            *x /= max;
        }
    }
}

/// L2 distance between two equally sized vectors.
pub(crate) fn l2_delta(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}
