//! `blens normalize`: read an insights or diff record produced elsewhere
//! (canonical, PascalCase or camelCase) and re-emit it in canonical form.

use std::collections::HashMap;
use std::path::PathBuf;

use beadlens_graph::external::{AdapterError, enrich_titles, parse_diff, parse_insights};
use clap::{Args, ValueEnum};
use tracing::{info, instrument};

use crate::cmd::diff::{render_diff_pretty, render_diff_text};
use crate::cmd::insights::{render_insights_pretty, render_insights_text};
use crate::cmd::{fail, load_issues, read_input};
use crate::output::{OutputMode, render_mode};

/// Which kind of record the input file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RecordKind {
    Insights,
    Diff,
}

/// Arguments for `blens normalize`.
#[derive(Args, Debug)]
pub struct NormalizeArgs {
    /// Record kind.
    #[arg(value_enum, value_name = "KIND")]
    pub kind: RecordKind,

    /// JSON file holding the record.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Issue export used to fill in missing ranking titles.
    #[arg(long, value_name = "ISSUES")]
    pub issues: Option<PathBuf>,
}

/// Execute `blens normalize`.
#[instrument(skip(args), fields(kind = ?args.kind, file = %args.file.display()))]
pub fn run_normalize(args: &NormalizeArgs, output: OutputMode) -> anyhow::Result<()> {
    let text = read_input(&args.file, output)?;
    let reject = |err: AdapterError| {
        fail(
            output,
            err.code(),
            format!("{}: {err}", args.file.display()),
        )
    };

    match args.kind {
        RecordKind::Insights => {
            let mut insights = parse_insights(&text).map_err(reject)?;
            if let Some(path) = &args.issues {
                let titles: HashMap<String, String> = load_issues(path, output)?
                    .into_iter()
                    .map(|issue| (issue.id, issue.title))
                    .collect();
                enrich_titles(&mut insights, &titles);
            }
            info!(issues = insights.total_issues, "insights normalized");
            render_mode(output, &insights, render_insights_text, render_insights_pretty)
        }
        RecordKind::Diff => {
            let diff = parse_diff(&text).map_err(reject)?;
            info!(changes = diff.changes.len(), "diff normalized");
            render_mode(output, &diff, render_diff_text, render_diff_pretty)
        }
    }
}
