#![forbid(unsafe_code)]
//! beadlens-graph library: dependency-graph analytics and snapshot diffs.
//!
//! Everything here is a pure function of in-memory issue snapshots. Nothing
//! reads files, caches results or keeps state between calls, so every
//! component may run concurrently with the others over the same
//! [`graph::IssueGraph`].
//!
//! # Conventions
//!
//! - **Errors**: The analytics never fail; degenerate input yields empty or
//!   zero-valued results. Only the [`external`] adapter returns typed
//!   `thiserror` errors.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod diff;
pub mod external;
pub mod graph;
pub mod insights;
pub mod metrics;

pub use diff::{ChangeType, Diff, DiffChange, SnapshotDiff};
pub use graph::{CycleInfo, GraphStats, IssueGraph};
pub use insights::{Insights, InsightsOptions, compute_insights};
pub use metrics::{GraphMetricEntry, IterationLimits};
