//! Graph construction from issue snapshots.
//!
//! # Overview
//!
//! [`IssueGraph::build`] makes one pass over the issues and their
//! denormalized dependency records and produces the adjacency structures
//! every analytics component reads:
//!
//! - `blocked_by(id)`: the issues `id` waits on.
//! - `blocks(id)`: the transpose, the issues waiting on `id`.
//! - `parent_of(child)`: the epic forest.
//! - a title lookup for display enrichment.
//!
//! ## Edge Direction
//!
//! A record `(issue_id=B, depends_on_id=A, kind=blocks)` means B cannot
//! proceed until A is resolved, so A **blocks** B. The petgraph view stores
//! this as the edge `A → B` (blocker → blocked).
//!
//! ## Unresolved References
//!
//! Edges naming an id that is not in the snapshot stay in the adjacency
//! sets but never enter the petgraph view, so traversal and centrality
//! treat them as terminal. [`IssueGraph::unresolved_references`] lists them.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeMap, BTreeSet, HashMap};

use beadlens_core::{DependencyKind, Issue, Status};
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::{debug, instrument};

// ---------------------------------------------------------------------------
// IssueGraph
// ---------------------------------------------------------------------------

/// Directed dependency graph over one issue snapshot.
#[derive(Debug, Clone)]
pub struct IssueGraph {
    /// Traversal view: known issues only, edge `A → B` means "A blocks B".
    pub graph: DiGraph<String, ()>,
    /// Mapping from issue id to petgraph `NodeIndex`.
    pub node_map: HashMap<String, NodeIndex>,
    blocked_by: BTreeMap<String, BTreeSet<String>>,
    blocks: BTreeMap<String, BTreeSet<String>>,
    parent_of: BTreeMap<String, String>,
    titles: HashMap<String, String>,
    statuses: BTreeMap<Status, usize>,
    /// BLAKE3 content hash of nodes and edges, for external cache keys.
    pub content_hash: String,
}

impl IssueGraph {
    /// Build the graph from an ordered issue sequence.
    ///
    /// Nodes are added in input order. Issues with an empty id are skipped;
    /// a repeated id keeps its first node and title. Self-loops are
    /// ignored and duplicate edges collapse. For duplicated `parent-child`
    /// records the last one wins.
    #[must_use]
    #[instrument(skip(issues), fields(issues = issues.len()))]
    pub fn build(issues: &[Issue]) -> Self {
        let mut graph = DiGraph::<String, ()>::with_capacity(issues.len(), issues.len());
        let mut node_map: HashMap<String, NodeIndex> = HashMap::with_capacity(issues.len());
        let mut titles = HashMap::with_capacity(issues.len());
        let mut statuses: BTreeMap<Status, usize> = BTreeMap::new();

        for issue in issues.iter().filter(|issue| !issue.id.is_empty()) {
            if node_map.contains_key(&issue.id) {
                debug!(issue = %issue.id, "duplicate issue id, keeping first");
                continue;
            }
            let idx = graph.add_node(issue.id.clone());
            node_map.insert(issue.id.clone(), idx);
            titles.insert(issue.id.clone(), issue.title.clone());
            *statuses.entry(issue.status).or_default() += 1;
        }

        let mut blocked_by: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut blocks: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut parent_of: BTreeMap<String, String> = BTreeMap::new();

        let edges = issues
            .iter()
            .filter(|issue| !issue.id.is_empty())
            .flat_map(|issue| issue.dependencies.iter());

        for dep in edges {
            if dep.issue_id == dep.depends_on_id || dep.depends_on_id.is_empty() {
                continue;
            }
            match dep.kind {
                DependencyKind::ParentChild => {
                    parent_of.insert(dep.issue_id.clone(), dep.depends_on_id.clone());
                }
                DependencyKind::Blocks => {
                    blocked_by
                        .entry(dep.issue_id.clone())
                        .or_default()
                        .insert(dep.depends_on_id.clone());
                    blocks
                        .entry(dep.depends_on_id.clone())
                        .or_default()
                        .insert(dep.issue_id.clone());
                }
            }
        }

        // Traversal view: only edges whose endpoints are both known.
        for (blocker, blocked_set) in &blocks {
            let Some(&from) = node_map.get(blocker) else {
                continue;
            };
            for blocked in blocked_set {
                if let Some(&to) = node_map.get(blocked) {
                    graph.add_edge(from, to, ());
                }
            }
        }

        let content_hash = compute_content_hash(&graph, &blocks, &parent_of);

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            epics = parent_of.len(),
            "built issue graph"
        );

        Self {
            graph,
            node_map,
            blocked_by,
            blocks,
            parent_of,
            titles,
            statuses,
            content_hash,
        }
    }

    /// Number of known issues (nodes).
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of distinct `(blocker, blocked)` pairs between known issues.
    #[must_use]
    pub fn blocks_edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Look up the `NodeIndex` for an issue id.
    #[must_use]
    pub fn node_index(&self, issue_id: &str) -> Option<NodeIndex> {
        self.node_map.get(issue_id).copied()
    }

    /// Return the issue id label for a node.
    #[must_use]
    pub fn issue_id(&self, idx: NodeIndex) -> Option<&str> {
        self.graph.node_weight(idx).map(String::as_str)
    }

    /// Whether `issue_id` is part of the snapshot.
    #[must_use]
    pub fn contains(&self, issue_id: &str) -> bool {
        self.node_map.contains_key(issue_id)
    }

    /// Issues that `issue_id` waits on, including unresolved ids.
    #[must_use]
    pub fn blocked_by(&self, issue_id: &str) -> Option<&BTreeSet<String>> {
        self.blocked_by.get(issue_id)
    }

    /// Issues waiting on `issue_id`, including unresolved ids.
    #[must_use]
    pub fn blocks(&self, issue_id: &str) -> Option<&BTreeSet<String>> {
        self.blocks.get(issue_id)
    }

    /// The epic containing `child_id`, if any.
    #[must_use]
    pub fn parent_of(&self, child_id: &str) -> Option<&str> {
        self.parent_of.get(child_id).map(String::as_str)
    }

    /// Direct children of `epic_id`, sorted by id.
    #[must_use]
    pub fn children_of(&self, epic_id: &str) -> Vec<&str> {
        self.parent_of
            .iter()
            .filter(|(_, parent)| parent.as_str() == epic_id)
            .map(|(child, _)| child.as_str())
            .collect()
    }

    /// Display title for `issue_id`; empty for unknown ids.
    #[must_use]
    pub fn title(&self, issue_id: &str) -> &str {
        self.titles.get(issue_id).map_or("", String::as_str)
    }

    /// Per-status issue counts over the known node set.
    #[must_use]
    pub const fn status_counts(&self) -> &BTreeMap<Status, usize> {
        &self.statuses
    }

    /// `(issue_id, missing_id)` pairs for blocks edges that name an issue
    /// outside the snapshot, sorted.
    #[must_use]
    pub fn unresolved_references(&self) -> Vec<(&str, &str)> {
        self.blocked_by
            .iter()
            .flat_map(|(issue, deps)| deps.iter().map(move |dep| (issue, dep)))
            .filter(|(issue, dep)| !self.contains(issue) || !self.contains(dep))
            .map(|(issue, dep)| (issue.as_str(), dep.as_str()))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// BLAKE3 over sorted node ids, blocks pairs and parent links.
fn compute_content_hash(
    graph: &DiGraph<String, ()>,
    blocks: &BTreeMap<String, BTreeSet<String>>,
    parent_of: &BTreeMap<String, String>,
) -> String {
    let mut nodes: Vec<&str> = graph.node_weights().map(String::as_str).collect();
    nodes.sort_unstable();

    let mut hasher = blake3::Hasher::new();
    for node in nodes {
        hasher.update(b"n\x00");
        hasher.update(node.as_bytes());
        hasher.update(b"\x00");
    }
    for (blocker, blocked_set) in blocks {
        for blocked in blocked_set {
            hasher.update(b"b\x00");
            hasher.update(blocker.as_bytes());
            hasher.update(b"\x00");
            hasher.update(blocked.as_bytes());
            hasher.update(b"\x00");
        }
    }
    for (child, parent) in parent_of {
        hasher.update(b"p\x00");
        hasher.update(child.as_bytes());
        hasher.update(b"\x00");
        hasher.update(parent.as_bytes());
        hasher.update(b"\x00");
    }
    format!("blake3:{}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
