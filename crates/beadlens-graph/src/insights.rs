//! Insights: every ranking, the cycle list and density in one record.
//!
//! Pure composition over the graph and metrics modules. The only work done
//! here is truncating each ranking to the configured top-N; the rankings
//! arrive already sorted by descending score with ties broken by issue id.

use std::collections::BTreeMap;

use beadlens_core::Issue;
use beadlens_core::Status;
use beadlens_core::config::AnalyticsConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::graph::{CycleInfo, IssueGraph, density, find_cycles};
use crate::metrics::{
    GraphMetricEntry, IterationLimits, betweenness::bottlenecks, eigenvector::influencers,
    hits::hits, keystone::keystones,
};

/// How much of each ranking to keep and how long to iterate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InsightsOptions {
    pub top_n: usize,
    pub limits: IterationLimits,
}

impl InsightsOptions {
    pub const DEFAULT_TOP_N: usize = 10;
}

impl Default for InsightsOptions {
    fn default() -> Self {
        Self {
            top_n: Self::DEFAULT_TOP_N,
            limits: IterationLimits::default(),
        }
    }
}

impl From<&AnalyticsConfig> for InsightsOptions {
    fn from(config: &AnalyticsConfig) -> Self {
        Self {
            top_n: config.top_n,
            limits: IterationLimits {
                max_iterations: config.max_iterations,
                tolerance: config.tolerance,
            },
        }
    }
}

/// Aggregated analytics for one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    /// Distinct issues in the snapshot.
    pub total_issues: usize,
    pub graph_density: f64,
    pub bottlenecks: Vec<GraphMetricEntry>,
    pub keystones: Vec<GraphMetricEntry>,
    pub influencers: Vec<GraphMetricEntry>,
    pub hubs: Vec<GraphMetricEntry>,
    pub authorities: Vec<GraphMetricEntry>,
    pub cycles: Vec<CycleInfo>,
    /// Per-status tally; sums to `total_issues`.
    #[serde(default)]
    pub status_counts: BTreeMap<Status, usize>,
    /// Blocks edges naming an issue outside the snapshot.
    #[serde(default)]
    pub unresolved_references: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
}

impl Insights {
    /// Run every component over an already-built graph.
    #[must_use]
    #[instrument(skip(ig, options), fields(nodes = ig.node_count(), top_n = options.top_n))]
    pub fn compute(ig: &IssueGraph, options: &InsightsOptions) -> Self {
        let top = |mut ranking: Vec<GraphMetricEntry>| {
            ranking.truncate(options.top_n);
            ranking
        };

        let centrality = influencers(ig, options.limits);
        let hits = hits(ig, options.limits);

        let insights = Self {
            total_issues: ig.node_count(),
            graph_density: density(ig),
            bottlenecks: top(bottlenecks(ig)),
            keystones: top(keystones(ig)),
            influencers: top(centrality.ranking),
            hubs: top(hits.hubs),
            authorities: top(hits.authorities),
            cycles: find_cycles(ig),
            status_counts: ig.status_counts().clone(),
            unresolved_references: ig.unresolved_references().len(),
            content_hash: Some(ig.content_hash.clone()),
        };

        debug!(
            total = insights.total_issues,
            cycles = insights.cycles.len(),
            density = insights.graph_density,
            "insights computed"
        );
        insights
    }

    /// Sum of the per-status tally.
    #[must_use]
    pub fn status_total(&self) -> usize {
        self.status_counts.values().sum()
    }

    /// Whether the snapshot contains at least one dependency cycle.
    #[must_use]
    pub fn has_cycles(&self) -> bool {
        !self.cycles.is_empty()
    }
}

/// Build the graph for `issues` and compute insights over it.
#[must_use]
pub fn compute_insights(issues: &[Issue], options: &InsightsOptions) -> Insights {
    Insights::compute(&IssueGraph::build(issues), options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(n: usize) -> Vec<Issue> {
        (0..n)
            .map(|i| {
                let issue = Issue::new(format!("bd-{i:02}"), format!("Issue {i}"));
                if i == 0 {
                    issue
                } else {
                    issue.depends_on(format!("bd-{:02}", i - 1))
                }
            })
            .collect()
    }

    #[test]
    fn empty_snapshot_yields_empty_record() {
        let insights = compute_insights(&[], &InsightsOptions::default());

        assert_eq!(insights.total_issues, 0);
        assert!(insights.graph_density.abs() < f64::EPSILON);
        assert!(insights.bottlenecks.is_empty());
        assert!(insights.keystones.is_empty());
        assert!(insights.influencers.is_empty());
        assert!(insights.hubs.is_empty());
        assert!(insights.authorities.is_empty());
        assert!(!insights.has_cycles());
    }

    #[test]
    fn rankings_are_truncated_to_top_n() {
        let options = InsightsOptions {
            top_n: 3,
            ..InsightsOptions::default()
        };
        let insights = compute_insights(&chain(8), &options);

        assert_eq!(insights.total_issues, 8);
        assert_eq!(insights.bottlenecks.len(), 3);
        assert_eq!(insights.keystones.len(), 3);
        assert_eq!(insights.influencers.len(), 3);
        assert_eq!(insights.hubs.len(), 3);
        assert_eq!(insights.authorities.len(), 3);
        assert_eq!(insights.keystones[0].issue_id, "bd-00");
        assert!((insights.keystones[0].score - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn small_graphs_keep_every_entry() {
        let insights = compute_insights(&chain(2), &InsightsOptions::default());
        assert_eq!(insights.keystones.len(), 2);
    }

    #[test]
    fn status_counts_tally_to_total() {
        let issues = vec![
            Issue::new("a", "A"),
            Issue::new("b", "B").with_status(Status::Closed),
            Issue::new("c", "C").with_status(Status::InProgress),
        ];
        let insights = compute_insights(&issues, &InsightsOptions::default());

        assert_eq!(insights.status_total(), insights.total_issues);
        assert_eq!(insights.status_counts.get(&Status::Closed), Some(&1));
    }

    #[test]
    fn cycles_and_unresolved_are_reported() {
        let issues = vec![
            Issue::new("a", "A").depends_on("b"),
            Issue::new("b", "B").depends_on("a").depends_on("ghost"),
        ];
        let insights = compute_insights(&issues, &InsightsOptions::default());

        assert!(insights.has_cycles());
        assert_eq!(insights.cycles[0].length, 2);
        assert_eq!(insights.unresolved_references, 1);
        assert!(insights.content_hash.as_deref().is_some_and(|h| h.starts_with("blake3:")));
    }

    #[test]
    fn options_follow_config() {
        let config = AnalyticsConfig {
            top_n: 4,
            max_iterations: 7,
            tolerance: 1e-3,
        };
        let options = InsightsOptions::from(&config);

        assert_eq!(options.top_n, 4);
        assert_eq!(options.limits.max_iterations, 7);
        assert!((options.limits.tolerance - 1e-3).abs() < f64::EPSILON);
    }

    #[test]
    fn serializes_with_snake_case_fields() {
        let insights = compute_insights(&chain(3), &InsightsOptions::default());
        let json = serde_json::to_value(&insights).expect("serialize");

        assert_eq!(json["total_issues"], 3);
        assert!(json["graph_density"].is_number());
        assert!(json["bottlenecks"].is_array());
        assert_eq!(json["status_counts"]["open"], 3);

        let back: Insights = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back.total_issues, insights.total_issues);
        assert_eq!(back.status_counts, insights.status_counts);
        assert_eq!(back.content_hash, insights.content_hash);
    }
}
