//! Keystone ranking: transitive downstream reach.
//!
//! An issue's keystone score is the number of other issues reachable from it
//! along blocking edges, i.e. how many issues transitively become
//! unblockable once it is resolved.
//!
//! The blocking graph may contain cycles, so reachability is a visited-set
//! traversal (petgraph's iterative [`Dfs`] with a fixed bitset) rather than a
//! DAG sweep. A member of a cycle reaches every other member plus everything
//! downstream, and each traversal visits at most V nodes. Overall cost is
//! O(V·(V+E)), fine for a few thousand issues.
//!
//! Scores are raw counts; callers normalize for display if they want to.

use petgraph::visit::Dfs;
use tracing::{debug, instrument};

use crate::graph::build::IssueGraph;
use crate::metrics::{GraphMetricEntry, rank};

/// Rank every issue by the size of its downstream reachable set.
#[must_use]
#[instrument(skip(ig), fields(nodes = ig.node_count()))]
pub fn keystones(ig: &IssueGraph) -> Vec<GraphMetricEntry> {
    let counts = reach_counts(ig);
    debug!(
        max_reach = counts.iter().copied().fold(0.0_f64, f64::max),
        "keystone reach computed"
    );
    rank(ig, &counts)
}

/// Downstream reach per node index, as `f64` for ranking.
#[allow(clippy::cast_precision_loss)]
fn reach_counts(ig: &IssueGraph) -> Vec<f64> {
    let g = &ig.graph;
    let mut counts = vec![0.0; g.node_count()];
    let mut dfs = Dfs::empty(g);

    for start in g.node_indices() {
        dfs.reset(g);
        dfs.move_to(start);
        let mut reached = 0_usize;
        while let Some(node) = dfs.next(g) {
            if node != start {
                reached += 1;
            }
        }
        counts[start.index()] = reached as f64;
    }

    counts
}

/// Ids of every issue downstream of `issue_id`, sorted.
///
/// Empty for unknown ids and for issues that block nothing.
#[must_use]
pub fn reachable_from(ig: &IssueGraph, issue_id: &str) -> Vec<String> {
    let Some(start) = ig.node_index(issue_id) else {
        return Vec::new();
    };

    let g = &ig.graph;
    let mut dfs = Dfs::new(g, start);
    let mut reached: Vec<String> = Vec::new();
    while let Some(node) = dfs.next(g) {
        if node == start {
            continue;
        }
        if let Some(id) = ig.issue_id(node) {
            reached.push(id.to_string());
        }
    }
    reached.sort_unstable();
    reached
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::score_of;
    use beadlens_core::Issue;

    /// A blocks B blocks C blocks D.
    fn chain() -> IssueGraph {
        IssueGraph::build(&[
            Issue::new("A", "A"),
            Issue::new("B", "B").depends_on("A"),
            Issue::new("C", "C").depends_on("B"),
            Issue::new("D", "D").depends_on("C"),
        ])
    }

    #[test]
    fn linear_chain_counts_downstream() {
        let ranking = keystones(&chain());

        assert_eq!(score_of(&ranking, "A"), Some(3.0));
        assert_eq!(score_of(&ranking, "B"), Some(2.0));
        assert_eq!(score_of(&ranking, "C"), Some(1.0));
        assert_eq!(score_of(&ranking, "D"), Some(0.0));
        assert_eq!(ranking[0].issue_id, "A");
    }

    #[test]
    fn cycle_members_reach_each_other_and_downstream() {
        // A ⇄ B, B blocks C
        let ig = IssueGraph::build(&[
            Issue::new("A", "A").depends_on("B"),
            Issue::new("B", "B").depends_on("A"),
            Issue::new("C", "C").depends_on("B"),
        ]);
        let ranking = keystones(&ig);

        assert_eq!(score_of(&ranking, "A"), Some(2.0));
        assert_eq!(score_of(&ranking, "B"), Some(2.0));
        assert_eq!(score_of(&ranking, "C"), Some(0.0));
    }

    #[test]
    fn ties_break_by_id() {
        let ig = IssueGraph::build(&[
            Issue::new("z", "Z"),
            Issue::new("a", "A"),
            Issue::new("m", "M").depends_on("z").depends_on("a"),
        ]);
        let ids: Vec<String> = keystones(&ig).into_iter().map(|e| e.issue_id).collect();
        assert_eq!(ids, vec!["a", "z", "m"]);
    }

    #[test]
    fn titles_are_copied_for_display() {
        let ig = IssueGraph::build(&[Issue::new("A", "Fix login"), Issue::new("B", "").depends_on("A")]);
        let ranking = keystones(&ig);
        assert_eq!(ranking[0].title, "Fix login");
    }

    #[test]
    fn empty_graph_has_empty_ranking() {
        assert!(keystones(&IssueGraph::build(&[])).is_empty());
    }

    #[test]
    fn reachable_set_is_sorted_and_excludes_start() {
        assert_eq!(reachable_from(&chain(), "B"), vec!["C", "D"]);
        assert!(reachable_from(&chain(), "D").is_empty());
        assert!(reachable_from(&chain(), "nope").is_empty());
    }
}
