//! HITS (Hyperlink-Induced Topic Search) algorithm.
//!
//! # Overview
//!
//! HITS computes two scores for each issue:
//!
//! - **Hub score**: how much an issue points to good authorities. In the
//!   blocking graph, a hub is an issue that blocks many important issues.
//! - **Authority score**: how much an issue is pointed to by good hubs.
//!   An authority is an issue held up by many important blockers.
//!
//! # Algorithm
//!
//! Iterative power method (Kleinberg, 1999) on the raw blocking graph:
//!
//! 1. Initialize all hub and authority scores to 1.0.
//! 2. Authority update: `auth(v) = Σ hub(u)` for all `u → v`.
//! 3. Hub update: `hub(v) = Σ auth(w)` for all `v → w`.
//! 4. Normalize both vectors to unit length (L2 norm).
//! 5. Repeat until both vectors move less than the tolerance, or the
//!    iteration cap is reached.
//!
//! Isolated issues score 0.0 on both axes.

use petgraph::Direction;
use tracing::{debug, instrument, warn};

use crate::graph::build::IssueGraph;
use crate::metrics::{GraphMetricEntry, IterationLimits, l2_delta, neighbor_lists, normalize_l2, rank};

/// Result of the HITS algorithm.
#[derive(Debug, Clone)]
pub struct HitsResult {
    pub hubs: Vec<GraphMetricEntry>,
    pub authorities: Vec<GraphMetricEntry>,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether the algorithm converged within the iteration cap.
    pub converged: bool,
}

/// Compute HITS hub and authority rankings.
#[must_use]
#[instrument(skip(ig), fields(nodes = ig.node_count()))]
pub fn hits(ig: &IssueGraph, limits: IterationLimits) -> HitsResult {
    let n = ig.node_count();
    if n == 0 {
        return HitsResult {
            hubs: Vec::new(),
            authorities: Vec::new(),
            iterations: 0,
            converged: true,
        };
    }

    let incoming = neighbor_lists(ig, Direction::Incoming);
    let outgoing = neighbor_lists(ig, Direction::Outgoing);

    let mut hub: Vec<f64> = vec![1.0; n];
    let mut auth: Vec<f64> = vec![1.0; n];

    let mut converged = false;
    let mut iterations = 0;

    for iter in 0..limits.max_iterations {
        iterations = iter + 1;

        let mut new_auth: Vec<f64> = incoming
            .iter()
            .map(|preds| preds.iter().map(|&u| hub[u]).sum())
            .collect();
        let mut new_hub: Vec<f64> = outgoing
            .iter()
            .map(|succs| succs.iter().map(|&w| new_auth[w]).sum())
            .collect();

        normalize_l2(&mut new_auth);
        normalize_l2(&mut new_hub);

        let diff = l2_delta(&auth, &new_auth).max(l2_delta(&hub, &new_hub));

        auth = new_auth;
        hub = new_hub;

        if diff < limits.tolerance {
            converged = true;
            break;
        }
    }

    if !converged {
        warn!(iterations, "HITS hit iteration cap");
    }
    debug!(iterations, converged, "HITS complete");

    HitsResult {
        hubs: rank(ig, &hub),
        authorities: rank(ig, &auth),
        iterations,
        converged,
    }
}
