//! Snapshot diff: what changed between a historical and a live issue set.
//!
//! # Classification
//!
//! Every id in the current snapshot is classified against the old one:
//!
//! | old             | current          | change      |
//! |-----------------|------------------|-------------|
//! | absent          | any              | `new`       |
//! | active status   | `closed`         | `closed`    |
//! | `closed`        | active status    | `reopened`  |
//! | any other pair  | tracked field ≠  | `modified`  |
//!
//! Active means open, in-progress or blocked. Tracked fields are
//! [`TRACKED_FIELDS`]. Ids that only exist in the old snapshot are not
//! reported: issues are never hard-deleted, so absence is an upstream
//! anomaly rather than a change.
//!
//! This is a map join over ids; no graph is built.

use std::collections::{BTreeMap, HashMap, HashSet};

use beadlens_core::Issue;
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

/// Fields compared for `modified` changes, in reporting order.
pub const TRACKED_FIELDS: [&str; 6] = [
    "title",
    "status",
    "priority",
    "issue_type",
    "owner",
    "updated_at",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    New,
    Closed,
    Reopened,
    Modified,
}

impl ChangeType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Closed => "closed",
            Self::Reopened => "reopened",
            Self::Modified => "modified",
        }
    }
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reported change.
///
/// `changed_fields` and the value maps are only present for `modified`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffChange {
    pub issue_id: String,
    pub title: String,
    pub change_type: ChangeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changed_fields: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_values: Option<BTreeMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_values: Option<BTreeMap<String, Value>>,
}

impl DiffChange {
    fn status_change(issue: &Issue, change_type: ChangeType) -> Self {
        Self {
            issue_id: issue.id.clone(),
            title: issue.title.clone(),
            change_type,
            changed_fields: None,
            previous_values: None,
            new_values: None,
        }
    }
}

/// Change report between two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diff {
    pub new_count: usize,
    pub closed_count: usize,
    pub modified_count: usize,
    pub reopened_count: usize,
    pub changes: Vec<DiffChange>,
}

impl Diff {
    /// Build a report from a change list, tallying the four counts.
    #[must_use]
    pub fn from_changes(changes: Vec<DiffChange>) -> Self {
        let count = |kind: ChangeType| changes.iter().filter(|c| c.change_type == kind).count();
        Self {
            new_count: count(ChangeType::New),
            closed_count: count(ChangeType::Closed),
            modified_count: count(ChangeType::Modified),
            reopened_count: count(ChangeType::Reopened),
            changes,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Changes of one kind, in report order.
    pub fn changes_of(&self, change_type: ChangeType) -> impl Iterator<Item = &DiffChange> {
        self.changes
            .iter()
            .filter(move |change| change.change_type == change_type)
    }
}

/// An old snapshot indexed by id, ready to be compared against current sets.
#[derive(Debug, Clone)]
pub struct SnapshotDiff<'a> {
    old: HashMap<&'a str, &'a Issue>,
}

impl<'a> SnapshotDiff<'a> {
    /// Index `old` by id. A repeated id keeps its first record; records
    /// without an id are skipped.
    #[must_use]
    pub fn new(old: &'a [Issue]) -> Self {
        let mut index = HashMap::with_capacity(old.len());
        for issue in old.iter().filter(|issue| !issue.id.is_empty()) {
            index.entry(issue.id.as_str()).or_insert(issue);
        }
        Self { old: index }
    }

    /// One-shot comparison of two snapshots.
    #[must_use]
    pub fn compute(old: &[Issue], current: &[Issue]) -> Diff {
        SnapshotDiff::new(old).against(current)
    }

    /// Classify every issue in `current` against the indexed old snapshot.
    ///
    /// Changes follow `current` order; a repeated current id is reported
    /// once, from its first record. Records without an id are skipped.
    #[must_use]
    #[instrument(skip(self, current), fields(old = self.old.len(), current = current.len()))]
    pub fn against(&self, current: &[Issue]) -> Diff {
        let mut seen: HashSet<&str> = HashSet::with_capacity(current.len());
        let changes: Vec<DiffChange> = current
            .iter()
            .filter(|issue| !issue.id.is_empty())
            .filter(|issue| seen.insert(issue.id.as_str()))
            .filter_map(|issue| classify(self.old.get(issue.id.as_str()).copied(), issue))
            .collect();

        let diff = Diff::from_changes(changes);
        debug!(
            new = diff.new_count,
            closed = diff.closed_count,
            reopened = diff.reopened_count,
            modified = diff.modified_count,
            "snapshot diff computed"
        );
        diff
    }
}

fn classify(old: Option<&Issue>, current: &Issue) -> Option<DiffChange> {
    let Some(old) = old else {
        return Some(DiffChange::status_change(current, ChangeType::New));
    };

    if old.status.is_active() && current.status.is_closed() {
        return Some(DiffChange::status_change(current, ChangeType::Closed));
    }
    if old.status.is_closed() && current.status.is_active() {
        return Some(DiffChange::status_change(current, ChangeType::Reopened));
    }

    let before = tracked_values(old);
    let after = tracked_values(current);

    let mut changed_fields = Vec::new();
    let mut previous_values = BTreeMap::new();
    let mut new_values = BTreeMap::new();
    for ((field, prev), (_, next)) in before.into_iter().zip(after) {
        if prev != next {
            changed_fields.push(field.to_string());
            previous_values.insert(field.to_string(), prev);
            new_values.insert(field.to_string(), next);
        }
    }

    if changed_fields.is_empty() {
        return None;
    }

    Some(DiffChange {
        issue_id: current.id.clone(),
        title: current.title.clone(),
        change_type: ChangeType::Modified,
        changed_fields: Some(changed_fields),
        previous_values: Some(previous_values),
        new_values: Some(new_values),
    })
}

/// Tracked field values in [`TRACKED_FIELDS`] order.
fn tracked_values(issue: &Issue) -> [(&'static str, Value); 6] {
    [
        ("title", Value::from(issue.title.as_str())),
        ("status", Value::from(issue.status.as_str())),
        ("priority", Value::from(issue.priority.get())),
        ("issue_type", Value::from(issue.issue_type.as_str())),
        ("owner", issue.owner.as_deref().map_or(Value::Null, Value::from)),
        (
            "updated_at",
            issue.updated_at.map_or(Value::Null, |at| {
                Value::from(at.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use beadlens_core::{Priority, Status};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn issue(id: &str, status: Status, title: &str) -> Issue {
        Issue::new(id, title).with_status(status)
    }

    #[test]
    fn identical_snapshots_produce_empty_diff() {
        let snapshot = vec![issue("A", Status::Open, "X"), issue("B", Status::Closed, "Y")];
        let diff = SnapshotDiff::compute(&snapshot, &snapshot);

        assert!(diff.is_empty());
        assert_eq!(diff, Diff::default());
    }

    #[test]
    fn open_to_closed_is_closed_not_modified() {
        let old = vec![issue("A", Status::Open, "X")];
        let current = vec![issue("A", Status::Closed, "X")];
        let diff = SnapshotDiff::compute(&old, &current);

        assert_eq!(diff.changes.len(), 1);
        assert_eq!(diff.changes[0].change_type, ChangeType::Closed);
        assert_eq!(diff.closed_count, 1);
        assert_eq!(diff.modified_count, 0);
        assert!(diff.changes[0].changed_fields.is_none());
    }

    #[test]
    fn title_edit_is_modified_with_values() {
        let old = vec![issue("A", Status::Open, "X")];
        let current = vec![issue("A", Status::Open, "Y")];
        let diff = SnapshotDiff::compute(&old, &current);

        assert_eq!(diff.modified_count, 1);
        let change = &diff.changes[0];
        assert_eq!(change.change_type, ChangeType::Modified);
        assert_eq!(change.changed_fields.as_deref(), Some(&["title".to_string()][..]));
        assert_eq!(change.previous_values.as_ref().and_then(|m| m.get("title")), Some(&json!("X")));
        assert_eq!(change.new_values.as_ref().and_then(|m| m.get("title")), Some(&json!("Y")));
    }

    #[test]
    fn closed_to_active_is_reopened() {
        for status in [Status::Open, Status::InProgress, Status::Blocked] {
            let old = vec![issue("A", Status::Closed, "X")];
            let current = vec![issue("A", status, "X")];
            let diff = SnapshotDiff::compute(&old, &current);
            assert_eq!(diff.reopened_count, 1, "{status}");
        }
    }

    #[test]
    fn deferred_transitions_are_modifications() {
        let old = vec![issue("A", Status::Deferred, "X")];
        let current = vec![issue("A", Status::Closed, "X")];
        let diff = SnapshotDiff::compute(&old, &current);

        assert_eq!(diff.modified_count, 1);
        assert_eq!(diff.changes[0].changed_fields.as_deref(), Some(&["status".to_string()][..]));
        assert_eq!(
            diff.changes[0].new_values.as_ref().and_then(|m| m.get("status")),
            Some(&json!("closed"))
        );
    }

    #[test]
    fn new_issue_is_reported_once() {
        let current = vec![issue("A", Status::Closed, "X")];
        let diff = SnapshotDiff::compute(&[], &current);

        assert_eq!(diff.new_count, 1);
        assert_eq!(diff.changes.len(), 1);
        assert_eq!(diff.changes[0].change_type, ChangeType::New);
    }

    #[test]
    fn removed_issues_are_not_reported() {
        let old = vec![issue("A", Status::Open, "X"), issue("gone", Status::Open, "Z")];
        let current = vec![issue("A", Status::Open, "X")];
        assert!(SnapshotDiff::compute(&old, &current).is_empty());
    }

    #[test]
    fn multiple_fields_follow_tracked_order() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).single().expect("valid time");
        let old = vec![Issue::new("A", "X")];
        let current = vec![
            Issue::new("A", "X")
                .with_priority(Priority::new(0))
                .with_owner("alice")
                .with_updated_at(at),
        ];
        let diff = SnapshotDiff::compute(&old, &current);
        let change = &diff.changes[0];

        assert_eq!(
            change.changed_fields.clone().unwrap_or_default(),
            vec!["priority", "owner", "updated_at"]
        );
        let previous = change.previous_values.as_ref().expect("previous values");
        let new = change.new_values.as_ref().expect("new values");
        assert_eq!(previous["priority"], json!(2));
        assert_eq!(new["priority"], json!(0));
        assert_eq!(previous["owner"], Value::Null);
        assert_eq!(new["owner"], json!("alice"));
        assert_eq!(new["updated_at"], json!("2026-03-01T12:00:00Z"));
    }

    #[test]
    fn labels_are_not_tracked() {
        let old = vec![Issue::new("A", "X")];
        let current = vec![Issue::new("A", "X").with_label("backend")];
        assert!(SnapshotDiff::compute(&old, &current).is_empty());
    }

    #[test]
    fn changes_follow_current_order() {
        let current = vec![Issue::new("z", "Z"), Issue::new("a", "A"), Issue::new("z", "dup")];
        let diff = SnapshotDiff::compute(&[], &current);

        let ids: Vec<&str> = diff.changes.iter().map(|c| c.issue_id.as_str()).collect();
        assert_eq!(ids, vec!["z", "a"]);
        assert_eq!(diff.changes_of(ChangeType::New).count(), 2);
    }

    #[test]
    fn idless_current_record_is_skipped() {
        let current = vec![Issue::new("", "no id"), Issue::new("a", "A")];
        let diff = SnapshotDiff::compute(&[], &current);

        assert_eq!(diff.new_count, 1);
        assert_eq!(diff.changes.len(), 1);
        assert_eq!(diff.changes[0].issue_id, "a");
    }

    #[test]
    fn idless_old_record_is_not_indexed() {
        let old = vec![Issue::new("", "no id"), Issue::new("a", "A")];
        let differ = SnapshotDiff::new(&old);

        assert_eq!(differ.old.len(), 1);
        assert!(differ.against(&[Issue::new("a", "A")]).is_empty());
    }

    #[test]
    fn serialized_change_omits_empty_maps() {
        let diff = SnapshotDiff::compute(&[], &[Issue::new("A", "X")]);
        let json = serde_json::to_value(&diff).expect("serialize");

        assert_eq!(json["new_count"], 1);
        assert_eq!(json["changes"][0]["change_type"], "new");
        assert!(json["changes"][0].get("changed_fields").is_none());
    }
}
