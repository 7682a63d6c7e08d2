//! Betweenness centrality via Brandes' algorithm.
//!
//! # Overview
//!
//! Betweenness centrality measures how often an issue lies on shortest paths
//! between other pairs of issues. High-betweenness issues are "bottlenecks":
//! work funnels through them.
//!
//! # Algorithm
//!
//! Brandes' algorithm (2001) for unweighted directed graphs:
//!
//! 1. For each source node `s`, run BFS to compute shortest-path counts
//!    and distances.
//! 2. Accumulate dependency scores in reverse BFS order (farthest nodes first).
//! 3. Sum the dependency scores across all source nodes.
//!
//! Complexity: O(V * E).
//!
//! # Output
//!
//! [`betweenness_scores`] returns raw sums indexed by node. [`bottlenecks`]
//! divides by the maximum so the top issue scores 1.0; a graph with no path
//! of length ≥ 2 leaves every score at 0.0.

use std::collections::VecDeque;

use petgraph::Direction;
use tracing::{debug, instrument};

use crate::graph::build::IssueGraph;
use crate::metrics::{GraphMetricEntry, neighbor_lists, normalize_max, rank};

/// Rank every issue by max-normalized betweenness.
#[must_use]
#[instrument(skip(ig), fields(nodes = ig.node_count()))]
pub fn bottlenecks(ig: &IssueGraph) -> Vec<GraphMetricEntry> {
    let mut scores = betweenness_scores(ig);
    normalize_max(&mut scores);
    rank(ig, &scores)
}

/// Raw (unnormalized) betweenness per node index.
///
/// Isolated nodes and nodes with no shortest paths through them score 0.0.
#[must_use]
pub fn betweenness_scores(ig: &IssueGraph) -> Vec<f64> {
    let n = ig.node_count();
    if n == 0 {
        return Vec::new();
    }

    let successors = neighbor_lists(ig, Direction::Outgoing);
    let mut cb: Vec<f64> = vec![0.0; n];

    // Per-source scratch, reused across sources.
    let mut stack: Vec<usize> = Vec::with_capacity(n);
    let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut sigma: Vec<f64> = vec![0.0; n];
    let mut dist: Vec<i64> = vec![-1; n];
    let mut delta: Vec<f64> = vec![0.0; n];
    let mut queue: VecDeque<usize> = VecDeque::new();

    for s in 0..n {
        stack.clear();
        queue.clear();
        for p in &mut predecessors {
            p.clear();
        }
        sigma.fill(0.0);
        dist.fill(-1);
        delta.fill(0.0);

        sigma[s] = 1.0;
        dist[s] = 0;
        queue.push_back(s);

        while let Some(v) = queue.pop_front() {
            stack.push(v);

            for &w in &successors[v] {
                // First visit to w?
                if dist[w] < 0 {
                    dist[w] = dist[v] + 1;
                    queue.push_back(w);
                }

                // Shortest path to w via v?
                if dist[w] == dist[v] + 1 {
                    sigma[w] += sigma[v];
                    predecessors[w].push(v);
                }
            }
        }

        // Accumulate dependencies in reverse BFS order.
        while let Some(w) = stack.pop() {
            for &v in &predecessors[w] {
                if sigma[w] > 0.0 {
                    delta[v] += (sigma[v] / sigma[w]) * (1.0 + delta[w]);
                }
            }

            if w != s {
                cb[w] += delta[w];
            }
        }
    }

    debug!(
        max = cb.iter().copied().fold(0.0_f64, f64::max),
        "betweenness accumulated"
    );
    cb
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
