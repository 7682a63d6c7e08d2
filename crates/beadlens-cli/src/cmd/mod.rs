//! Subcommand handlers and the shared snapshot loader.

pub mod cycles;
pub mod diff;
pub mod insights;
pub mod normalize;

use std::fs;
use std::path::Path;

use beadlens_core::Issue;
use beadlens_core::error::ErrorCode;
use beadlens_core::model::parse_issue_text;
use tracing::{debug, warn};

use crate::output::{CliError, OutputMode, render_error};

/// Report `message` under `code` on stderr and turn it into the command error.
pub fn fail(output: OutputMode, code: ErrorCode, message: impl Into<String>) -> anyhow::Error {
    let message = message.into();
    if let Err(render_err) = render_error(output, &CliError::from_code(code, message.clone())) {
        warn!(error = %render_err, "failed to render error");
    }
    anyhow::anyhow!("{code}: {message}")
}

/// Read a file, reporting unreadable paths as [`ErrorCode::InputReadFailed`].
pub fn read_input(path: &Path, output: OutputMode) -> anyhow::Result<String> {
    fs::read_to_string(path).map_err(|err| {
        fail(
            output,
            ErrorCode::InputReadFailed,
            format!("cannot read {}: {err}", path.display()),
        )
    })
}

/// Load an issue export (JSON array or JSONL) from disk.
///
/// Records without an id are skipped with a warning; a file that is not
/// JSON at all is an [`ErrorCode::InputParseFailed`] error.
pub fn load_issues(path: &Path, output: OutputMode) -> anyhow::Result<Vec<Issue>> {
    let text = read_input(path, output)?;
    let parsed = parse_issue_text(&text).map_err(|err| {
        fail(
            output,
            ErrorCode::InputParseFailed,
            format!("cannot parse {}: {err:#}", path.display()),
        )
    })?;

    if parsed.skipped > 0 {
        warn!(
            path = %path.display(),
            skipped = parsed.skipped,
            "skipped issue records without an id"
        );
    }
    debug!(path = %path.display(), issues = parsed.issues.len(), "loaded snapshot");
    Ok(parsed.issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_jsonl_and_skips_idless_records() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, r#"{{"id": "bd-1", "title": "One"}}"#).expect("write");
        writeln!(file, r#"{{"title": "no id"}}"#).expect("write");
        writeln!(file, r#"{{"id": "bd-2", "title": "Two", "status": "closed"}}"#).expect("write");

        let issues = load_issues(file.path(), OutputMode::Json).expect("load");
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[1].id, "bd-2");
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = load_issues(&dir.path().join("nope.jsonl"), OutputMode::Json)
            .expect_err("missing file");
        assert!(err.to_string().starts_with("E2101"));
    }

    #[test]
    fn garbage_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "this is not json").expect("write");

        let err = load_issues(file.path(), OutputMode::Json).expect_err("garbage");
        assert!(err.to_string().starts_with("E2102"));
    }
}
