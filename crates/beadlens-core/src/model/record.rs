//! Lenient parsing of issue records from exported JSON.
//!
//! Export files written by different tracker versions disagree on field
//! names (`assignee` vs `owner`, `type` vs `issue_type`) and occasionally
//! carry values this model does not know. Parsing here never fails on a
//! single bad field: the field falls back to its default. Only a record
//! without a usable `id` is dropped, and it is counted in
//! [`ParsedIssues::skipped`].

use std::collections::BTreeSet;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use super::issue::{DependencyEdge, DependencyKind, Issue, IssueType, Priority, Status};

/// Outcome of parsing a batch of records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedIssues {
    /// Records that produced an issue, in input order.
    pub issues: Vec<Issue>,
    /// Records dropped for lack of an id.
    pub skipped: usize,
}

/// Parse one JSON record into an [`Issue`].
///
/// Returns `None` when the record is not an object or has no non-empty
/// string `id`.
#[must_use]
pub fn parse_issue_record(value: &Value) -> Option<Issue> {
    let obj = value.as_object()?;
    let id = str_field(obj, &["id"])?.trim().to_string();
    if id.is_empty() {
        return None;
    }

    let mut issue = Issue::new(id, str_field(obj, &["title"]).unwrap_or_default());

    issue.status = enum_field(obj, &["status"], &issue.id).unwrap_or_default();
    issue.issue_type = enum_field::<IssueType>(obj, &["issue_type", "type"], &issue.id)
        .unwrap_or_default();
    issue.priority = priority_field(obj);
    issue.owner = str_field(obj, &["owner", "assignee"])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    issue.labels = labels_field(obj);
    issue.created_at = time_field(obj, "created_at");
    issue.updated_at = time_field(obj, "updated_at");
    issue.closed_at = time_field(obj, "closed_at");
    issue.dependencies = dependencies_field(obj, &issue.id);

    Some(issue)
}

/// Parse a sequence of JSON records, skipping unusable ones.
#[must_use]
pub fn parse_issue_records<'a, I>(values: I) -> ParsedIssues
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut parsed = ParsedIssues::default();
    for (index, value) in values.into_iter().enumerate() {
        match parse_issue_record(value) {
            Some(issue) => parsed.issues.push(issue),
            None => {
                warn!(index, "skipping issue record without an id");
                parsed.skipped += 1;
            }
        }
    }
    parsed
}

/// Parse export text: either a JSON array of records or JSONL (one record
/// per line, blank lines ignored).
///
/// # Errors
///
/// Returns an error if the text is neither a JSON array nor valid JSONL.
#[instrument(skip(text), fields(bytes = text.len()))]
pub fn parse_issue_text(text: &str) -> Result<ParsedIssues> {
    let trimmed = text.trim_start();
    if trimmed.starts_with('[') {
        let values: Vec<Value> =
            serde_json::from_str(trimmed).context("parse issue export as JSON array")?;
        return Ok(parse_issue_records(&values));
    }

    let mut values = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(line)
            .with_context(|| format!("parse issue export line {}", line_no + 1))?;
        values.push(value);
    }
    Ok(parse_issue_records(&values))
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

fn str_field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| obj.get(*key).and_then(Value::as_str))
}

fn enum_field<T: FromStr>(obj: &Map<String, Value>, keys: &[&str], id: &str) -> Option<T> {
    let raw = str_field(obj, keys)?;
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            debug!(issue = id, field = keys[0], value = raw, "unknown value, using default");
            None
        }
    }
}

fn priority_field(obj: &Map<String, Value>) -> Priority {
    match obj.get("priority") {
        Some(Value::Number(n)) => n
            .as_u64()
            .map(|v| Priority::new(u8::try_from(v).unwrap_or(u8::MAX)))
            .unwrap_or_default(),
        Some(Value::String(s)) => s
            .trim()
            .trim_start_matches(['P', 'p'])
            .parse::<u8>()
            .map(Priority::new)
            .unwrap_or_default(),
        _ => Priority::default(),
    }
}

fn labels_field(obj: &Map<String, Value>) -> BTreeSet<String> {
    obj.get("labels")
        .and_then(Value::as_array)
        .map(|labels| {
            labels
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn time_field(obj: &Map<String, Value>, key: &str) -> Option<DateTime<Utc>> {
    let raw = obj.get(key)?.as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .ok()
}

fn dependencies_field(obj: &Map<String, Value>, owner: &str) -> Vec<DependencyEdge> {
    let Some(deps) = obj.get("dependencies").and_then(Value::as_array) else {
        return Vec::new();
    };

    deps.iter()
        .filter_map(Value::as_object)
        .filter_map(|dep| {
            let issue_id = str_field(dep, &["issue_id"]).unwrap_or(owner);
            if issue_id != owner {
                debug!(issue = owner, other = issue_id, "dropping edge owned by another issue");
                return None;
            }
            let depends_on_id = str_field(dep, &["depends_on_id", "depends_on"])?.trim();
            if depends_on_id.is_empty() {
                return None;
            }
            // Informational kinds (related, discovered-from) never become edges.
            let kind = str_field(dep, &["type", "kind", "dep_type"])
                .map_or(Some(DependencyKind::Blocks), |k| k.parse().ok())?;
            Some(DependencyEdge {
                issue_id: owner.to_string(),
                depends_on_id: depends_on_id.to_string(),
                kind,
            })
        })
        .collect()
}
