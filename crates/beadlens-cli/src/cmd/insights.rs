//! `blens insights`: centrality rankings, cycles and density for one issue
//! export.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use beadlens_core::config::{ConfigError, resolve_config};
use beadlens_core::error::ErrorCode;
use beadlens_graph::{GraphMetricEntry, Insights, InsightsOptions, IssueGraph};
use clap::Args;
use tracing::{info, instrument};

use crate::cmd::{fail, load_issues};
use crate::output::{OutputMode, pretty_kv, pretty_rule, pretty_section, render_mode};

/// Arguments for `blens insights`.
#[derive(Args, Debug)]
pub struct InsightsArgs {
    /// Issue export: a JSON array or one JSON object per line.
    #[arg(value_name = "ISSUES")]
    pub issues: PathBuf,

    /// Entries to keep per ranking (overrides `analytics.top_n`).
    #[arg(long, value_name = "N")]
    pub top: Option<usize>,

    /// Power-iteration cap (overrides `analytics.max_iterations`).
    #[arg(long, value_name = "N")]
    pub max_iterations: Option<usize>,

    /// Power-iteration L2 tolerance (overrides `analytics.tolerance`).
    #[arg(long, value_name = "EPS")]
    pub tolerance: Option<f64>,
}

/// Execute `blens insights`.
#[instrument(skip(args, project_root), fields(issues = %args.issues.display()))]
pub fn run_insights(
    args: &InsightsArgs,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<()> {
    let options = resolve_options(args, output, project_root)?;
    let issues = load_issues(&args.issues, output)?;

    let graph = IssueGraph::build(&issues);
    let insights = Insights::compute(&graph, &options);
    info!(
        issues = insights.total_issues,
        cycles = insights.cycles.len(),
        "insights ready"
    );

    render_mode(output, &insights, render_insights_text, render_insights_pretty)
}

/// Project/user config with command-line overrides applied and validated.
fn resolve_options(
    args: &InsightsArgs,
    output: OutputMode,
    project_root: &Path,
) -> anyhow::Result<InsightsOptions> {
    let mut config = match resolve_config(project_root) {
        Ok(config) => config.analytics,
        Err(err) => {
            let code = err
                .downcast_ref::<ConfigError>()
                .map_or(ErrorCode::InternalUnexpected, ConfigError::code);
            return Err(fail(output, code, format!("{err:#}")));
        }
    };

    if let Some(top) = args.top {
        config.top_n = top;
    }
    if let Some(max_iterations) = args.max_iterations {
        config.max_iterations = max_iterations;
    }
    if let Some(tolerance) = args.tolerance {
        config.tolerance = tolerance;
    }
    config
        .validate()
        .map_err(|err| fail(output, err.code(), err.to_string()))?;

    Ok(InsightsOptions::from(&config))
}

/// Every ranking with its display name, in report order.
fn rankings(insights: &Insights) -> [(&'static str, &[GraphMetricEntry]); 5] {
    [
        ("bottlenecks", insights.bottlenecks.as_slice()),
        ("keystones", insights.keystones.as_slice()),
        ("influencers", insights.influencers.as_slice()),
        ("hubs", insights.hubs.as_slice()),
        ("authorities", insights.authorities.as_slice()),
    ]
}

/// Compact rows: one header line, then `<ranking> <id> <score>` per entry.
pub fn render_insights_text(insights: &Insights, w: &mut dyn Write) -> io::Result<()> {
    writeln!(
        w,
        "issues={} density={:.4} cycles={} unresolved={}",
        insights.total_issues,
        insights.graph_density,
        insights.cycles.len(),
        insights.unresolved_references
    )?;
    for (name, entries) in rankings(insights) {
        for entry in entries {
            writeln!(w, "{name}  {}  {:.4}", entry.issue_id, entry.score)?;
        }
    }
    for cycle in &insights.cycles {
        writeln!(w, "cycle  {}  {}", cycle.cycle_id, cycle.issue_ids.join(" "))?;
    }
    Ok(())
}

pub fn render_insights_pretty(insights: &Insights, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Dependency insights")?;
    pretty_kv(w, "Issues", insights.total_issues.to_string())?;
    pretty_kv(w, "Density", format!("{:.4}", insights.graph_density))?;
    pretty_kv(w, "Cycles", insights.cycles.len().to_string())?;
    if insights.unresolved_references > 0 {
        pretty_kv(w, "Unresolved", insights.unresolved_references.to_string())?;
    }
    if !insights.status_counts.is_empty() {
        let counts: Vec<String> = insights
            .status_counts
            .iter()
            .map(|(status, n)| format!("{status}={n}"))
            .collect();
        pretty_kv(w, "Statuses", counts.join(", "))?;
    }

    for (name, entries) in rankings(insights) {
        if entries.is_empty() {
            continue;
        }
        writeln!(w)?;
        pretty_section(w, &capitalize(name))?;
        for (rank, entry) in entries.iter().enumerate() {
            writeln!(
                w,
                "{:>3}. {:<14} {:>9.4}  {}",
                rank + 1,
                entry.issue_id,
                entry.score,
                entry.title
            )?;
        }
    }

    if !insights.cycles.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Cycles")?;
        for cycle in &insights.cycles {
            writeln!(w, "  #{} ({}): {}", cycle.cycle_id, cycle.length, cycle.issue_ids.join(" → "))?;
        }
    }
    pretty_rule(w)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
