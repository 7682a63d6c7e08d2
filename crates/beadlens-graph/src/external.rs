//! Adapter for insights and diff records produced outside this crate.
//!
//! External tools emit the same records in differently cased or shaped
//! forms. Each accepted form is one variant of an untagged enum, and every
//! variant converts into the canonical [`Insights`] / [`Diff`]. The
//! analytics modules never see the external shapes.
//!
//! Accepted insights shapes:
//!
//! - canonical snake_case, as serialized by [`Insights`];
//! - PascalCase "robot" output: `TotalIssues`, `ClusterDensity`,
//!   `Bottlenecks: [{ID, Value}]`, `Keystones`, `Influencers`, `Hubs`,
//!   `Authorities`, `Cycles: [[id, ...]]`;
//! - camelCase: `totalIssues`, `graphDensity`, `bottlenecks: [{issueId,
//!   title, score}]`, `cycles: [{cycleId, issueIds}]`.
//!
//! Accepted diff shapes are canonical snake_case and camelCase. Diff counts
//! are always recomputed from the change list.

use std::collections::{BTreeMap, HashMap};

use beadlens_core::Status;
use beadlens_core::error::ErrorCode;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::diff::{ChangeType, Diff, DiffChange};
use crate::graph::CycleInfo;
use crate::insights::Insights;
use crate::metrics::{GraphMetricEntry, sort_entries};

/// Failure to read an external record.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("input is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unrecognized {record} shape")]
    UnrecognizedShape { record: &'static str },
}

impl AdapterError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Json(_) => ErrorCode::InputParseFailed,
            Self::UnrecognizedShape { .. } => ErrorCode::UnrecognizedShape,
        }
    }
}

// ---------------------------------------------------------------------------
// Insights
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InsightsShape {
    Canonical(Insights),
    Robot(RobotInsights),
    Camel(CamelInsights),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RobotInsights {
    total_issues: usize,
    #[serde(default)]
    cluster_density: f64,
    #[serde(default)]
    bottlenecks: Vec<RobotEntry>,
    #[serde(default)]
    keystones: Vec<RobotEntry>,
    #[serde(default)]
    influencers: Vec<RobotEntry>,
    #[serde(default)]
    hubs: Vec<RobotEntry>,
    #[serde(default)]
    authorities: Vec<RobotEntry>,
    #[serde(default)]
    cycles: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RobotEntry {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Value", default)]
    value: f64,
    #[serde(rename = "Title", default)]
    title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CamelInsights {
    total_issues: usize,
    #[serde(default)]
    graph_density: f64,
    #[serde(default)]
    bottlenecks: Vec<CamelEntry>,
    #[serde(default)]
    keystones: Vec<CamelEntry>,
    #[serde(default)]
    influencers: Vec<CamelEntry>,
    #[serde(default)]
    hubs: Vec<CamelEntry>,
    #[serde(default)]
    authorities: Vec<CamelEntry>,
    #[serde(default)]
    cycles: Vec<CamelCycle>,
    #[serde(default)]
    status_counts: BTreeMap<Status, usize>,
    #[serde(default)]
    unresolved_references: usize,
    #[serde(default)]
    content_hash: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CamelEntry {
    issue_id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CamelCycle {
    issue_ids: Vec<String>,
}

impl From<RobotEntry> for GraphMetricEntry {
    fn from(entry: RobotEntry) -> Self {
        Self {
            issue_id: entry.id,
            title: entry.title,
            score: entry.value,
        }
    }
}

impl From<CamelEntry> for GraphMetricEntry {
    fn from(entry: CamelEntry) -> Self {
        Self {
            issue_id: entry.issue_id,
            title: entry.title,
            score: entry.score,
        }
    }
}

impl From<RobotInsights> for Insights {
    fn from(robot: RobotInsights) -> Self {
        Self {
            total_issues: robot.total_issues,
            graph_density: robot.cluster_density,
            bottlenecks: ranking(robot.bottlenecks),
            keystones: ranking(robot.keystones),
            influencers: ranking(robot.influencers),
            hubs: ranking(robot.hubs),
            authorities: ranking(robot.authorities),
            cycles: number_cycles(robot.cycles),
            ..Self::default()
        }
    }
}

impl From<CamelInsights> for Insights {
    fn from(camel: CamelInsights) -> Self {
        Self {
            total_issues: camel.total_issues,
            graph_density: camel.graph_density,
            bottlenecks: ranking(camel.bottlenecks),
            keystones: ranking(camel.keystones),
            influencers: ranking(camel.influencers),
            hubs: ranking(camel.hubs),
            authorities: ranking(camel.authorities),
            cycles: number_cycles(camel.cycles.into_iter().map(|c| c.issue_ids).collect()),
            status_counts: camel.status_counts,
            unresolved_references: camel.unresolved_references,
            content_hash: camel.content_hash,
        }
    }
}

impl From<InsightsShape> for Insights {
    fn from(shape: InsightsShape) -> Self {
        match shape {
            InsightsShape::Canonical(insights) => insights,
            InsightsShape::Robot(robot) => robot.into(),
            InsightsShape::Camel(camel) => camel.into(),
        }
    }
}

fn ranking<E: Into<GraphMetricEntry>>(entries: Vec<E>) -> Vec<GraphMetricEntry> {
    let mut entries: Vec<GraphMetricEntry> = entries.into_iter().map(Into::into).collect();
    sort_entries(&mut entries);
    entries
}

/// Renumber external cycles from 1, dropping anything shorter than two.
fn number_cycles(cycles: Vec<Vec<String>>) -> Vec<CycleInfo> {
    cycles
        .into_iter()
        .filter(|ids| ids.len() > 1)
        .enumerate()
        .map(|(i, issue_ids)| CycleInfo {
            cycle_id: i + 1,
            length: issue_ids.len(),
            issue_ids,
        })
        .collect()
}

/// Parse an insights record in any accepted shape.
///
/// # Errors
///
/// [`AdapterError::Json`] when `text` is not JSON,
/// [`AdapterError::UnrecognizedShape`] when it matches no accepted shape.
#[instrument(skip(text), fields(bytes = text.len()))]
pub fn parse_insights(text: &str) -> Result<Insights, AdapterError> {
    let value: Value = serde_json::from_str(text)?;
    let shape: InsightsShape = serde_json::from_value(value)
        .map_err(|_| AdapterError::UnrecognizedShape { record: "insights" })?;
    debug!(shape = shape.name(), "insights shape recognized");
    Ok(shape.into())
}

impl InsightsShape {
    const fn name(&self) -> &'static str {
        match self {
            Self::Canonical(_) => "canonical",
            Self::Robot(_) => "robot",
            Self::Camel(_) => "camel",
        }
    }
}

/// Fill empty titles from `titles`, keyed by issue id.
pub fn enrich_titles(insights: &mut Insights, titles: &HashMap<String, String>) {
    let rankings = [
        &mut insights.bottlenecks,
        &mut insights.keystones,
        &mut insights.influencers,
        &mut insights.hubs,
        &mut insights.authorities,
    ];
    for entry in rankings.into_iter().flatten() {
        if !entry.title.is_empty() {
            continue;
        }
        if let Some(title) = titles.get(&entry.issue_id) {
            entry.title.clone_from(title);
        }
    }
}

// ---------------------------------------------------------------------------
// Diff
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DiffShape {
    Canonical { changes: Vec<DiffChange> },
    Camel { changes: Vec<CamelChange> },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CamelChange {
    issue_id: String,
    #[serde(default)]
    title: String,
    change_type: ChangeType,
    #[serde(default)]
    changed_fields: Option<Vec<String>>,
    #[serde(default)]
    previous_values: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    new_values: Option<BTreeMap<String, Value>>,
}

impl From<CamelChange> for DiffChange {
    fn from(change: CamelChange) -> Self {
        Self {
            issue_id: change.issue_id,
            title: change.title,
            change_type: change.change_type,
            changed_fields: change.changed_fields,
            previous_values: change.previous_values,
            new_values: change.new_values,
        }
    }
}

/// Parse a diff record in any accepted shape, recomputing its counts.
///
/// # Errors
///
/// [`AdapterError::Json`] when `text` is not JSON,
/// [`AdapterError::UnrecognizedShape`] when it matches no accepted shape.
#[instrument(skip(text), fields(bytes = text.len()))]
pub fn parse_diff(text: &str) -> Result<Diff, AdapterError> {
    let value: Value = serde_json::from_str(text)?;
    let shape: DiffShape = serde_json::from_value(value)
        .map_err(|_| AdapterError::UnrecognizedShape { record: "diff" })?;

    let changes: Vec<DiffChange> = match shape {
        DiffShape::Canonical { changes } => changes,
        DiffShape::Camel { changes } => changes.into_iter().map(Into::into).collect(),
    };
    Ok(Diff::from_changes(changes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::{InsightsOptions, compute_insights};
    use beadlens_core::Issue;

    #[test]
    fn canonical_insights_pass_through() {
        let issues = vec![Issue::new("a", "A"), Issue::new("b", "B").depends_on("a")];
        let insights = compute_insights(&issues, &InsightsOptions::default());
        let text = serde_json::to_string(&insights).expect("serialize");

        let parsed = parse_insights(&text).expect("canonical shape");
        assert_eq!(parsed.total_issues, 2);
        assert_eq!(parsed.keystones[0].issue_id, "a");
        assert_eq!(parsed.content_hash, insights.content_hash);
    }

    #[test]
    fn robot_shape_is_normalized() {
        let text = r#"{
            "TotalIssues": 3,
            "ClusterDensity": 0.25,
            "Bottlenecks": [{"ID": "b", "Value": 0.5}, {"ID": "a", "Value": 1.0}],
            "Keystones": [{"ID": "a", "Value": 2}],
            "Cycles": [["x", "y"], ["lonely"]]
        }"#;
        let insights = parse_insights(text).expect("robot shape");

        assert_eq!(insights.total_issues, 3);
        assert!((insights.graph_density - 0.25).abs() < f64::EPSILON);
        assert_eq!(insights.bottlenecks[0].issue_id, "a", "re-sorted by score");
        assert_eq!(insights.keystones.len(), 1);
        assert!(insights.hubs.is_empty());
        assert_eq!(insights.cycles.len(), 1);
        assert_eq!(insights.cycles[0].cycle_id, 1);
        assert_eq!(insights.cycles[0].length, 2);
    }

    #[test]
    fn camel_shape_is_normalized() {
        let text = r#"{
            "totalIssues": 2,
            "graphDensity": 0.5,
            "hubs": [{"issueId": "a", "title": "Alpha", "score": 0.9}],
            "cycles": [{"cycleId": 7, "issueIds": ["a", "b"]}],
            "statusCounts": {"open": 2}
        }"#;
        let insights = parse_insights(text).expect("camel shape");

        assert_eq!(insights.total_issues, 2);
        assert_eq!(insights.hubs[0].title, "Alpha");
        assert_eq!(insights.cycles[0].cycle_id, 1, "renumbered");
        assert_eq!(insights.status_counts.get(&Status::Open), Some(&2));
    }

    #[test]
    fn titles_are_enriched_from_lookup() {
        let text = r#"{"TotalIssues": 1, "Hubs": [{"ID": "a", "Value": 1.0}]}"#;
        let mut insights = parse_insights(text).expect("robot shape");
        let titles = HashMap::from([("a".to_string(), "Alpha".to_string())]);

        enrich_titles(&mut insights, &titles);
        assert_eq!(insights.hubs[0].title, "Alpha");
    }

    #[test]
    fn unknown_shape_is_rejected() {
        let err = parse_insights(r#"{"hello": "world"}"#).expect_err("no shape matches");
        assert!(matches!(err, AdapterError::UnrecognizedShape { record: "insights" }));
        assert_eq!(err.code(), ErrorCode::UnrecognizedShape);

        let err = parse_insights("not json").expect_err("invalid json");
        assert_eq!(err.code(), ErrorCode::InputParseFailed);
    }

    #[test]
    fn camel_diff_counts_are_recomputed() {
        let text = r#"{
            "newCount": 99,
            "changes": [
                {"issueId": "a", "title": "A", "changeType": "new"},
                {"issueId": "b", "title": "B", "changeType": "modified",
                 "changedFields": ["title"],
                 "previousValues": {"title": "old"},
                 "newValues": {"title": "B"}}
            ]
        }"#;
        let diff = parse_diff(text).expect("camel diff");

        assert_eq!(diff.new_count, 1);
        assert_eq!(diff.modified_count, 1);
        assert_eq!(diff.changes[1].changed_fields.as_deref(), Some(&["title".to_string()][..]));
    }

    #[test]
    fn canonical_diff_round_trips() {
        let diff = crate::diff::SnapshotDiff::compute(
            &[Issue::new("a", "A")],
            &[Issue::new("a", "B"), Issue::new("c", "C")],
        );
        let text = serde_json::to_string(&diff).expect("serialize");
        assert_eq!(parse_diff(&text).expect("canonical diff"), diff);
    }

    #[test]
    fn diff_without_changes_is_rejected() {
        let err = parse_diff(r#"{"newCount": 1}"#).expect_err("no changes list");
        assert!(matches!(err, AdapterError::UnrecognizedShape { record: "diff" }));
    }
}
