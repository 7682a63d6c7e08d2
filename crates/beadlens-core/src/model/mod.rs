//! Issue data model consumed by the analytics engine.

pub mod issue;
pub mod record;

pub use issue::{DependencyEdge, DependencyKind, Issue, IssueType, Priority, Status};
pub use record::{ParsedIssues, parse_issue_record, parse_issue_records, parse_issue_text};
