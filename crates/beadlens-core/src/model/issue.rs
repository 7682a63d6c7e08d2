use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::{fmt, str::FromStr};

use crate::error::ParseEnumError;

/// The six lifecycle states an issue can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Open,
    InProgress,
    Blocked,
    Deferred,
    Closed,
    Pinned,
}

impl Default for Status {
    fn default() -> Self {
        Self::Open
    }
}

impl Status {
    /// All statuses in display order.
    pub const ALL: [Self; 6] = [
        Self::Open,
        Self::InProgress,
        Self::Blocked,
        Self::Deferred,
        Self::Closed,
        Self::Pinned,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Blocked => "blocked",
            Self::Deferred => "deferred",
            Self::Closed => "closed",
            Self::Pinned => "pinned",
        }
    }

    /// Active statuses are the ones a snapshot diff treats as "not closed":
    /// `open`, `in_progress` and `blocked`.
    ///
    /// `deferred` and `pinned` are neither active nor closed, so transitions
    /// through them show up as plain field modifications.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Open | Self::InProgress | Self::Blocked)
    }

    #[must_use]
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "in_progress" | "in-progress" | "inprogress" => Ok(Self::InProgress),
            "blocked" => Ok(Self::Blocked),
            "deferred" => Ok(Self::Deferred),
            "closed" => Ok(Self::Closed),
            "pinned" => Ok(Self::Pinned),
            _ => Err(ParseEnumError {
                expected: "status",
                got: s.to_string(),
            }),
        }
    }
}

/// Issue category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueType {
    Bug,
    Feature,
    Task,
    Epic,
    Chore,
}

impl Default for IssueType {
    fn default() -> Self {
        Self::Task
    }
}

impl IssueType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bug => "bug",
            Self::Feature => "feature",
            Self::Task => "task",
            Self::Epic => "epic",
            Self::Chore => "chore",
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bug" => Ok(Self::Bug),
            "feature" => Ok(Self::Feature),
            "task" => Ok(Self::Task),
            "epic" => Ok(Self::Epic),
            "chore" => Ok(Self::Chore),
            _ => Err(ParseEnumError {
                expected: "issue type",
                got: s.to_string(),
            }),
        }
    }
}

/// Ordinal priority, 0 (most urgent) through 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct Priority(u8);

impl Priority {
    pub const MOST_URGENT: Self = Self(0);
    pub const LEAST_URGENT: Self = Self(4);

    /// Build a priority, clamping anything above 4 down to 4.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        if value > Self::LEAST_URGENT.0 {
            Self::LEAST_URGENT
        } else {
            Self(value)
        }
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self(2)
    }
}

impl From<u8> for Priority {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        priority.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// How two issues are related.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DependencyKind {
    /// `issue_id` cannot proceed until `depends_on_id` is resolved.
    Blocks,
    /// `issue_id` is a child of the epic `depends_on_id`.
    ParentChild,
}

impl DependencyKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Blocks => "blocks",
            Self::ParentChild => "parent-child",
        }
    }
}

impl FromStr for DependencyKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blocks" | "blocked_by" | "blocked-by" => Ok(Self::Blocks),
            "parent-child" | "parent_child" | "parent" => Ok(Self::ParentChild),
            _ => Err(ParseEnumError {
                expected: "dependency kind",
                got: s.to_string(),
            }),
        }
    }
}

/// One denormalized dependency record attached to its owning issue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub issue_id: String,
    pub depends_on_id: String,
    pub kind: DependencyKind,
}

impl DependencyEdge {
    #[must_use]
    pub fn blocks(issue_id: impl Into<String>, depends_on_id: impl Into<String>) -> Self {
        Self {
            issue_id: issue_id.into(),
            depends_on_id: depends_on_id.into(),
            kind: DependencyKind::Blocks,
        }
    }

    #[must_use]
    pub fn parent_child(child_id: impl Into<String>, epic_id: impl Into<String>) -> Self {
        Self {
            issue_id: child_id.into(),
            depends_on_id: epic_id.into(),
            kind: DependencyKind::ParentChild,
        }
    }
}

/// A single issue as supplied by the external store.
///
/// Immutable input to the analytics engine. Missing optional fields take
/// their defaults during deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Issue {
    pub id: String,
    pub title: String,
    pub status: Status,
    pub priority: Priority,
    pub issue_type: IssueType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub labels: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<DependencyEdge>,
}

impl Default for Issue {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            status: Status::Open,
            priority: Priority::default(),
            issue_type: IssueType::Task,
            owner: None,
            labels: BTreeSet::new(),
            created_at: None,
            updated_at: None,
            closed_at: None,
            dependencies: Vec::new(),
        }
    }
}

impl Issue {
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub const fn with_type(mut self, issue_type: IssueType) -> Self {
        self.issue_type = issue_type;
        self
    }

    #[must_use]
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.insert(label.into());
        self
    }

    #[must_use]
    pub const fn with_updated_at(mut self, at: DateTime<Utc>) -> Self {
        self.updated_at = Some(at);
        self
    }

    /// Record that this issue cannot proceed until `blocker` is resolved.
    #[must_use]
    pub fn depends_on(mut self, blocker: impl Into<String>) -> Self {
        let edge = DependencyEdge::blocks(self.id.clone(), blocker);
        self.dependencies.push(edge);
        self
    }

    /// Record that this issue belongs to the epic `epic`.
    #[must_use]
    pub fn child_of(mut self, epic: impl Into<String>) -> Self {
        let edge = DependencyEdge::parent_child(self.id.clone(), epic);
        self.dependencies.push(edge);
        self
    }
}
