#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::Parser;
use clap::Subcommand;
use output::{OutputMode, resolve_output_mode};
use std::env;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "beadlens: dependency-graph insights for issue exports",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (pretty, text, json). Defaults to pretty on a TTY.
    #[arg(long, global = true, value_enum, value_name = "FORMAT")]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Directory holding `.beadlens/config.toml` (default: current directory).
    #[arg(long, global = true, value_name = "DIR")]
    project: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Analytics",
        about = "Rank issues by graph centrality",
        long_about = "Compute bottlenecks, keystones, influencers, hubs, authorities, cycles and density for an issue export.",
        after_help = "EXAMPLES:\n    # Full report for a JSONL export\n    blens insights issues.jsonl\n\n    # Keep the top 5 of each ranking\n    blens insights issues.jsonl --top 5\n\n    # Emit machine-readable output\n    blens insights issues.jsonl --json"
    )]
    Insights(cmd::insights::InsightsArgs),

    #[command(
        next_help_heading = "Analytics",
        about = "List dependency cycles",
        long_about = "List every blocks-dependency cycle (strongly connected component of two or more issues).",
        after_help = "EXAMPLES:\n    # Show cycles with titles\n    blens cycles issues.jsonl\n\n    # Emit machine-readable output\n    blens cycles issues.jsonl --format json"
    )]
    Cycles(cmd::cycles::CyclesArgs),

    #[command(
        next_help_heading = "History",
        about = "Compare two snapshots",
        long_about = "Classify each issue in CURRENT as new, closed, reopened or modified relative to OLD.",
        after_help = "EXAMPLES:\n    # What changed since last week\n    blens diff last-week.jsonl issues.jsonl\n\n    # Emit machine-readable output\n    blens diff last-week.jsonl issues.jsonl --json"
    )]
    Diff(cmd::diff::DiffArgs),

    #[command(
        next_help_heading = "Interop",
        about = "Re-emit an external record in canonical form",
        long_about = "Read an insights or diff record in canonical, PascalCase or camelCase form and print it canonically.",
        after_help = "EXAMPLES:\n    # Normalize a PascalCase insights record\n    blens normalize insights robot.json --json\n\n    # Fill missing titles from an issue export\n    blens normalize insights robot.json --issues issues.jsonl"
    )]
    Normalize(cmd::normalize::NormalizeArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("BEADLENS_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "beadlens=debug,info"
        } else {
            "beadlens=info,warn"
        })
    });

    let format = env::var("BEADLENS_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries command output; logs always go to stderr.
    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let project_root = match cli.project.clone() {
        Some(dir) => dir,
        None => env::current_dir()?,
    };
    let output = cli.output_mode();

    match cli.command {
        Commands::Insights(ref args) => cmd::insights::run_insights(args, output, &project_root),
        Commands::Cycles(ref args) => cmd::cycles::run_cycles(args, output),
        Commands::Diff(ref args) => cmd::diff::run_diff(args, output),
        Commands::Normalize(ref args) => cmd::normalize::run_normalize(args, output),
    }
}
