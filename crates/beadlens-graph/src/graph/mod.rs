//! Dependency graph construction and structural checks.
//!
//! # Overview
//!
//! This module turns an issue snapshot into the adjacency structures every
//! ranking reads, and answers the structural questions that need no
//! iteration: density, degree extremes, dependency cycles.
//!
//! ## Pipeline
//!
//! ```text
//! &[Issue] (denormalized dependency records)
//!        ↓  build::IssueGraph::build()
//! IssueGraph
//!   ├─ blocked_by / blocks / parent_of adjacency (unknown ids kept)
//!   └─ graph: DiGraph over known ids, edge blocker → blocked
//!        ↓  stats::GraphStats::from_graph()      ↓  cycles::find_cycles()
//! GraphStats (density, degrees, …)            Vec<CycleInfo>
//! ```
//!
//! ## Cache Keys
//!
//! [`IssueGraph::content_hash`] is a BLAKE3 hash of the node and edge sets.
//! Hosts that cache insights can key on it; nothing here caches.
//!
//! ## Typical Usage
//!
//! ```rust,ignore
//! use beadlens_graph::graph::{IssueGraph, GraphStats, find_cycles};
//!
//! let ig = IssueGraph::build(&issues);
//! let stats = GraphStats::from_graph(&ig);
//! let cycles = find_cycles(&ig);
//!
//! println!("nodes={} edges={} density={:.3} cycles={}",
//!     stats.node_count, stats.edge_count, stats.density, cycles.len());
//! ```

pub mod build;
pub mod cycles;
pub mod stats;

// Re-export primary types at module level for convenience.
pub use build::IssueGraph;
pub use cycles::{CycleInfo, find_cycles};
pub use stats::{GraphStats, density};
