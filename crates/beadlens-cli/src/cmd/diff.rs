//! `blens diff`: classify what changed between two issue exports.

use std::io::{self, Write};
use std::path::PathBuf;

use beadlens_graph::{ChangeType, Diff, DiffChange, SnapshotDiff};
use clap::Args;
use serde_json::Value;
use tracing::{info, instrument};

use crate::cmd::load_issues;
use crate::output::{OutputMode, pretty_kv, pretty_rule, pretty_section, render_mode};

/// Arguments for `blens diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Historical snapshot (JSON array or JSONL).
    #[arg(value_name = "OLD")]
    pub old: PathBuf,

    /// Current snapshot (JSON array or JSONL).
    #[arg(value_name = "CURRENT")]
    pub current: PathBuf,
}

/// Execute `blens diff`.
#[instrument(skip(args), fields(old = %args.old.display(), current = %args.current.display()))]
pub fn run_diff(args: &DiffArgs, output: OutputMode) -> anyhow::Result<()> {
    let old = load_issues(&args.old, output)?;
    let current = load_issues(&args.current, output)?;

    let diff = SnapshotDiff::compute(&old, &current);
    info!(changes = diff.changes.len(), "diff ready");

    render_mode(output, &diff, render_diff_text, render_diff_pretty)
}

/// One row per change: `<type> <id> [field:old->new ...]`.
pub fn render_diff_text(diff: &Diff, w: &mut dyn Write) -> io::Result<()> {
    writeln!(
        w,
        "new={} closed={} reopened={} modified={}",
        diff.new_count, diff.closed_count, diff.reopened_count, diff.modified_count
    )?;
    for change in &diff.changes {
        write!(w, "{}  {}", change.change_type, change.issue_id)?;
        for (field, before, after) in field_changes(change) {
            write!(w, "  {field}:{}->{}", compact(before), compact(after))?;
        }
        writeln!(w)?;
    }
    Ok(())
}

pub fn render_diff_pretty(diff: &Diff, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Snapshot diff")?;
    pretty_kv(w, "New", diff.new_count.to_string())?;
    pretty_kv(w, "Closed", diff.closed_count.to_string())?;
    pretty_kv(w, "Reopened", diff.reopened_count.to_string())?;
    pretty_kv(w, "Modified", diff.modified_count.to_string())?;

    if diff.is_empty() {
        writeln!(w, "\nNo changes.")?;
        return Ok(());
    }

    for change_type in [
        ChangeType::New,
        ChangeType::Closed,
        ChangeType::Reopened,
        ChangeType::Modified,
    ] {
        let mut changes = diff.changes_of(change_type).peekable();
        if changes.peek().is_none() {
            continue;
        }
        writeln!(w)?;
        pretty_section(w, &format!("{change_type}"))?;
        for change in changes {
            writeln!(w, "  {:<14} {}", change.issue_id, change.title)?;
            for (field, before, after) in field_changes(change) {
                writeln!(w, "      {field}: {} → {}", compact(before), compact(after))?;
            }
        }
    }
    pretty_rule(w)
}

/// `(field, previous, new)` triples in `changed_fields` order.
fn field_changes(change: &DiffChange) -> Vec<(&str, &Value, &Value)> {
    let (Some(fields), Some(previous), Some(new)) = (
        change.changed_fields.as_ref(),
        change.previous_values.as_ref(),
        change.new_values.as_ref(),
    ) else {
        return Vec::new();
    };

    fields
        .iter()
        .map(|field| {
            (
                field.as_str(),
                previous.get(field).unwrap_or(&Value::Null),
                new.get(field).unwrap_or(&Value::Null),
            )
        })
        .collect()
}

/// Strings unquoted, null as `-`, everything else as JSON.
fn compact(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
