#![forbid(unsafe_code)]
//! beadlens-core library.
//!
//! # Conventions
//!
//! - **Errors**: Use `anyhow::Result` at I/O and config boundaries, typed
//!   `thiserror` errors where callers match on the failure.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod config;
pub mod error;
pub mod model;

pub use model::{DependencyEdge, DependencyKind, Issue, IssueType, Priority, Status};
