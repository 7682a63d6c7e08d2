//! `blens cycles`: list dependency cycles (strongly connected components).

use std::io::Write;
use std::path::PathBuf;

use beadlens_graph::IssueGraph;
use beadlens_graph::graph::{CycleInfo, find_cycles};
use clap::Args;
use serde::Serialize;
use tracing::instrument;

use crate::cmd::load_issues;
use crate::output::{OutputMode, render_mode};

/// Arguments for `blens cycles`.
#[derive(Args, Debug)]
pub struct CyclesArgs {
    /// Issue export (JSON array or JSONL).
    #[arg(value_name = "ISSUES")]
    pub issues: PathBuf,
}

#[derive(Debug, Serialize)]
struct CyclesOutput {
    cycles: Vec<CycleInfo>,
}

/// Execute `blens cycles`.
#[instrument(skip(args), fields(issues = %args.issues.display()))]
pub fn run_cycles(args: &CyclesArgs, output: OutputMode) -> anyhow::Result<()> {
    let issues = load_issues(&args.issues, output)?;
    let graph = IssueGraph::build(&issues);
    let payload = CyclesOutput {
        cycles: find_cycles(&graph),
    };

    render_mode(
        output,
        &payload,
        |report, w| {
            for cycle in &report.cycles {
                writeln!(w, "{}  {}", cycle.cycle_id, cycle.issue_ids.join(" "))?;
            }
            Ok(())
        },
        |report, w| render_cycles_human(report, &graph, w),
    )
}

fn render_cycles_human(
    payload: &CyclesOutput,
    graph: &IssueGraph,
    w: &mut dyn Write,
) -> std::io::Result<()> {
    if payload.cycles.is_empty() {
        writeln!(w, "No dependency cycles found.")?;
        return Ok(());
    }

    writeln!(w, "Dependency cycles ({})", payload.cycles.len())?;

    for cycle in &payload.cycles {
        writeln!(w, "\nCycle {}:", cycle.cycle_id)?;
        for issue_id in &cycle.issue_ids {
            match graph.title(issue_id) {
                "" => writeln!(w, "  - {issue_id}")?,
                title => writeln!(w, "  - {issue_id}: {title}")?,
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use beadlens_core::Issue;

    fn render(issues: &[Issue]) -> String {
        let graph = IssueGraph::build(issues);
        let payload = CyclesOutput {
            cycles: find_cycles(&graph),
        };
        let mut buf = Vec::new();
        render_cycles_human(&payload, &graph, &mut buf).expect("render");
        String::from_utf8_lossy(&buf).into_owned()
    }

    #[test]
    fn cycles_args_parse_path() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: CyclesArgs,
        }

        let parsed = Wrapper::parse_from(["test", "issues.json"]);
        assert_eq!(parsed.args.issues, PathBuf::from("issues.json"));
    }

    #[test]
    fn no_cycles_message() {
        let text = render(&[Issue::new("a", "A"), Issue::new("b", "B").depends_on("a")]);
        assert_eq!(text, "No dependency cycles found.\n");
    }

    #[test]
    fn cycle_members_show_titles() {
        let text = render(&[
            Issue::new("a", "Alpha").depends_on("b"),
            Issue::new("b", "").depends_on("a"),
        ]);
        assert!(text.starts_with("Dependency cycles (1)"));
        assert!(text.contains("  - a: Alpha"));
        assert!(text.contains("  - b\n"));
    }
}
