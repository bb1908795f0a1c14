//! Goal/task forest with leaf ordering chains.
//!
//! Every operation takes the full node collection and returns a new one;
//! the input is never modified, and on any error nothing is returned but
//! the error.
//!
//! # Ordering chain
//!
//! Within one root tree the leaves form a single linked list through
//! `dependency` (each leaf names its predecessor). For every node `A` the
//! leaves below `A` occupy one contiguous run of that list. Mutations keep
//! this true; it is re-verified before results are returned.
//!
//! # Cost
//!
//! Mutating calls rebuild the arena and verify the whole forest twice,
//! once on input and once on output, so each call is O(n * d) for n nodes
//! of depth at most d. This is sized for personal planning forests of a
//! few thousand nodes; bulk edits should batch into fewer calls.
//!
//! # Usage
//!
//! ```
//! use u_planner::graph::{self, DropEdge};
//! use u_planner::models::GoalTask;
//!
//! let nodes = vec![GoalTask::new("goal").with_title("Ship v1")];
//! let (nodes, first) = graph::add_leaf(&nodes, "goal", "Design", 60).unwrap();
//! let (nodes, second) = graph::add_leaf(&nodes, "goal", "Build", 120).unwrap();
//! let nodes = graph::move_subtree(&nodes, &second, &first, DropEdge::Before).unwrap();
//!
//! let order = graph::ordered_bottom_layer(&nodes, "goal").unwrap();
//! assert_eq!(order[0].id, second);
//! ```

mod arena;
mod ops;

pub use arena::{NodeKey, TaskArena};
pub use ops::DropEdge;

use tracing::debug;
use uuid::Uuid;

use crate::error::{PlanError, PlanResult};
use crate::models::GoalTask;

/// Builds an arena and checks the chain invariants before a mutation.
fn load_verified(nodes: &[GoalTask]) -> PlanResult<TaskArena> {
    let arena = TaskArena::from_tasks(nodes)?;
    arena.verify()?;
    Ok(arena)
}

/// Verifies a mutated arena and writes it out.
fn finish(arena: &TaskArena) -> PlanResult<Vec<GoalTask>> {
    arena.verify()?;
    Ok(arena.to_tasks())
}

fn export_all(arena: &TaskArena, keys: &[NodeKey]) -> Vec<GoalTask> {
    keys.iter().map(|&k| arena.export(k)).collect()
}

/// Direct children of `id`.
pub fn subtasks_of(nodes: &[GoalTask], id: &str) -> PlanResult<Vec<GoalTask>> {
    let arena = TaskArena::from_tasks(nodes)?;
    let key = arena.key(id)?;
    Ok(export_all(&arena, arena.children(key)))
}

/// Leaf descendants of `id`, unordered. A leaf is its own bottom layer.
pub fn bottom_layer(nodes: &[GoalTask], id: &str) -> PlanResult<Vec<GoalTask>> {
    let arena = TaskArena::from_tasks(nodes)?;
    let key = arena.key(id)?;
    Ok(export_all(&arena, &arena.leaves_under(key)))
}

/// Orders `leaves` along their dependency chain.
///
/// # Errors
/// `GraphInconsistency` when the leaves do not form exactly one chain
/// (several heads, a cycle, or a gap). Treat this as data corruption.
/// `NotFound` when a leaf is missing from `nodes`.
pub fn sort_by_dependency(nodes: &[GoalTask], leaves: &[GoalTask]) -> PlanResult<Vec<GoalTask>> {
    let arena = TaskArena::from_tasks(nodes)?;
    let keys = leaves
        .iter()
        .map(|leaf| arena.key(&leaf.id))
        .collect::<PlanResult<Vec<_>>>()?;
    let order = arena.sort_chain(&keys)?;
    Ok(export_all(&arena, &order))
}

/// `bottom_layer` followed by `sort_by_dependency`.
pub fn ordered_bottom_layer(nodes: &[GoalTask], id: &str) -> PlanResult<Vec<GoalTask>> {
    let arena = TaskArena::from_tasks(nodes)?;
    let key = arena.key(id)?;
    let order = arena.ordered_leaves(key)?;
    Ok(export_all(&arena, &order))
}

/// Forest root above (or equal to) `id`.
pub fn root_ancestor(nodes: &[GoalTask], id: &str) -> PlanResult<GoalTask> {
    let arena = TaskArena::from_tasks(nodes)?;
    let root = arena.root_of(arena.key(id)?);
    Ok(arena.export(root))
}

/// Sum of leaf durations below `id` (its own duration if it is a leaf).
pub fn effective_duration(nodes: &[GoalTask], id: &str) -> PlanResult<i64> {
    let arena = TaskArena::from_tasks(nodes)?;
    let key = arena.key(id)?;
    Ok(arena
        .leaves_under(key)
        .into_iter()
        .fold(0i64, |acc, k| acc.saturating_add(arena.task(k).duration_minutes)))
}

/// Leaves that may be packed: ready and not yet completed.
///
/// Roots are visited in input order and each root's leaves in chain order,
/// so a stable ranking keeps chain order among equal scores.
pub fn eligible_leaves(nodes: &[GoalTask]) -> PlanResult<Vec<GoalTask>> {
    let arena = TaskArena::from_tasks(nodes)?;
    let mut out = Vec::new();
    for root in arena.keys().filter(|&k| arena.parent(k).is_none()) {
        out.extend(
            arena
                .ordered_leaves(root)?
                .into_iter()
                .map(|k| arena.export(k))
                .filter(|t| t.is_ready && !t.is_completed()),
        );
    }
    Ok(out)
}

/// Creates a leaf under `parent_id` at the end of the parent's chain run.
///
/// The leaf gets a fresh UUID, inherits the parent's priority, and starts
/// not ready. Returns the new collection and the new leaf's id.
pub fn add_leaf(
    nodes: &[GoalTask],
    parent_id: &str,
    title: &str,
    duration_minutes: i64,
) -> PlanResult<(Vec<GoalTask>, String)> {
    let priority = nodes
        .iter()
        .find(|t| t.id == parent_id)
        .map(|t| t.priority)
        .ok_or_else(|| PlanError::not_found(parent_id))?;
    let leaf = GoalTask::new(Uuid::new_v4().to_string())
        .with_title(title)
        .with_duration(duration_minutes)
        .with_priority(priority);
    let id = leaf.id.clone();
    Ok((insert_leaf(nodes, parent_id, leaf)?, id))
}

/// Like [`add_leaf`], for a leaf the caller has already built.
///
/// `leaf.parent_id` and `leaf.dependency` are overwritten.
pub fn insert_leaf(nodes: &[GoalTask], parent_id: &str, leaf: GoalTask) -> PlanResult<Vec<GoalTask>> {
    let mut arena = load_verified(nodes)?;
    let parent = arena.key(parent_id)?;
    let leaf_id = leaf.id.clone();
    arena.add_leaf(parent, leaf)?;
    debug!(leaf = %leaf_id, parent = %parent_id, "added leaf");
    finish(&arena)
}

/// Removes `id` and its descendants, repairing the chain around them.
///
/// `parent_id` must name the node's current parent (`None` for a root).
pub fn delete_subtree(
    nodes: &[GoalTask],
    id: &str,
    parent_id: Option<&str>,
) -> PlanResult<Vec<GoalTask>> {
    let mut arena = load_verified(nodes)?;
    let key = arena.key(id)?;
    let expected = parent_id.map(|p| arena.key(p)).transpose()?;
    if arena.parent(key) != expected {
        return Err(PlanError::inconsistency(format!(
            "'{}' is not the parent of '{id}'",
            parent_id.unwrap_or("<root>")
        )));
    }
    let removed = arena.delete_subtree(key)?;
    debug!(root = %id, removed = removed.len(), "deleted subtree");
    finish(&arena)
}

/// Moves the subtree rooted at `moved_id` next to `target_id`'s subtree.
pub fn move_subtree(
    nodes: &[GoalTask],
    moved_id: &str,
    target_id: &str,
    edge: DropEdge,
) -> PlanResult<Vec<GoalTask>> {
    let mut arena = load_verified(nodes)?;
    let moved = arena.key(moved_id)?;
    let target = arena.key(target_id)?;
    arena.move_subtree(moved, target, edge)?;
    debug!(moved = %moved_id, target = %target_id, ?edge, "moved subtree");
    finish(&arena)
}

#[cfg(test)]
mod op_tests {
    use super::*;
    use rstest::rstest;

    fn find<'a>(nodes: &'a [GoalTask], id: &str) -> &'a GoalTask {
        nodes.iter().find(|t| t.id == id).unwrap()
    }

    fn order(nodes: &[GoalTask], id: &str) -> Vec<String> {
        ordered_bottom_layer(nodes, id)
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect()
    }

    /// g ─┬─ p ─── x      chain: a → x → b
    ///    ├─ a
    ///    └─ b
    fn sole_child_forest() -> Vec<GoalTask> {
        vec![
            GoalTask::new("g"),
            GoalTask::new("a").with_parent("g"),
            GoalTask::new("p").with_parent("g"),
            GoalTask::new("x").with_parent("p").with_dependency("a"),
            GoalTask::new("b").with_parent("g").with_dependency("x"),
        ]
    }

    #[test]
    fn test_delete_sole_child_with_both_neighbours() {
        let nodes = delete_subtree(&sole_child_forest(), "x", Some("p")).unwrap();
        assert_eq!(find(&nodes, "b").dependency.as_deref(), Some("p"));
        assert_eq!(find(&nodes, "p").dependency.as_deref(), Some("a"));
        assert!(!nodes.iter().any(|t| t.id == "x"));
    }

    /// Rows of the repair table: which neighbours exist and whether the
    /// deleted leaf has a sibling, against the expected `dependency` of the
    /// successor and the parent afterwards.
    #[rstest]
    // pred, succ, siblings
    #[case(true, true, true, Some("pre"), None)]
    #[case(true, true, false, Some("p"), Some("pre"))]
    #[case(true, false, false, None, Some("pre"))]
    #[case(false, true, true, None, None)]
    #[case(false, true, false, Some("p"), None)]
    #[case(false, false, false, None, None)]
    fn test_delete_repair_table(
        #[case] pred: bool,
        #[case] succ: bool,
        #[case] sibling: bool,
        #[case] succ_dep: Option<&str>,
        #[case] parent_dep: Option<&str>,
    ) {
        // g ─┬─ pre?
        //    ├─ p ─┬─ x
        //    │     └─ sib?
        //    └─ post?
        let mut nodes = vec![GoalTask::new("g"), GoalTask::new("p").with_parent("g")];
        let mut last: Option<&str> = None;
        if pred {
            nodes.push(GoalTask::new("pre").with_parent("g"));
            last = Some("pre");
        }
        let mut x = GoalTask::new("x").with_parent("p");
        x.dependency = last.map(str::to_string);
        nodes.push(x);
        last = Some("x");
        if sibling {
            nodes.push(GoalTask::new("sib").with_parent("p").with_dependency("x"));
            last = Some("sib");
        }
        if succ {
            let mut post = GoalTask::new("post").with_parent("g");
            post.dependency = last.map(str::to_string);
            nodes.push(post);
        }

        let out = delete_subtree(&nodes, "x", Some("p")).unwrap();

        if succ {
            let expected = if sibling { Some("sib") } else { succ_dep };
            assert_eq!(find(&out, "post").dependency.as_deref(), expected);
        }
        if sibling {
            assert_eq!(find(&out, "sib").dependency.as_deref(), succ_dep.filter(|_| pred));
            assert_eq!(find(&out, "p").dependency, None);
        } else {
            assert_eq!(find(&out, "p").dependency.as_deref(), parent_dep);
        }
        assert!(!out.iter().any(|t| t.dependency.as_deref() == Some("x")));
    }

    #[test]
    fn test_delete_only_child_of_root() {
        let nodes = vec![GoalTask::new("r"), GoalTask::new("x").with_parent("r")];
        let out = delete_subtree(&nodes, "x", Some("r")).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].dependency, None);
    }

    #[test]
    fn test_delete_wrong_parent() {
        let nodes = sole_child_forest();
        assert!(matches!(
            delete_subtree(&nodes, "x", Some("g")),
            Err(PlanError::GraphInconsistency { .. })
        ));
        assert!(matches!(
            delete_subtree(&nodes, "x", Some("nope")),
            Err(PlanError::NotFound { .. })
        ));
        assert!(matches!(
            delete_subtree(&nodes, "nope", Some("g")),
            Err(PlanError::NotFound { .. })
        ));
    }

    #[test]
    fn test_mutations_on_planner_sized_forest() {
        let mut nodes = vec![GoalTask::new("g")];
        for i in 0..2000 {
            let mut leaf = GoalTask::new(format!("l{i}")).with_parent("g").with_duration(1);
            if i > 0 {
                leaf = leaf.with_dependency(format!("l{}", i - 1));
            }
            nodes.push(leaf);
        }

        let (nodes, id) = add_leaf(&nodes, "g", "tail", 5).unwrap();
        let nodes = move_subtree(&nodes, &id, "l0", DropEdge::Before).unwrap();
        let nodes = delete_subtree(&nodes, "l1000", Some("g")).unwrap();

        let ids = order(&nodes, "g");
        assert_eq!(ids.len(), 2000);
        assert_eq!(ids[0], id);
        assert_eq!(ids[1], "l0");
        assert!(!ids.iter().any(|i| i == "l1000"));
        assert_eq!(effective_duration(&nodes, "g").unwrap(), 1999 + 5);
    }

    #[test]
    fn test_effective_duration_saturates() {
        let nodes = vec![
            GoalTask::new("g"),
            GoalTask::new("a").with_parent("g").with_duration(i64::MAX),
            GoalTask::new("b")
                .with_parent("g")
                .with_dependency("a")
                .with_duration(i64::MAX),
        ];
        assert_eq!(effective_duration(&nodes, "g").unwrap(), i64::MAX);
    }

    #[test]
    fn test_corrupt_input_returns_error() {
        let nodes = vec![
            GoalTask::new("r"),
            GoalTask::new("x").with_parent("r"),
            GoalTask::new("y").with_parent("r"),
        ];
        assert!(matches!(
            add_leaf(&nodes, "r", "z", 10),
            Err(PlanError::GraphInconsistency { .. })
        ));
        assert!(matches!(
            move_subtree(&nodes, "x", "y", DropEdge::After),
            Err(PlanError::GraphInconsistency { .. })
        ));
    }

    #[test]
    fn test_add_leaf_chains_after_tail() {
        let nodes = vec![GoalTask::new("g").with_priority(6)];
        let (nodes, first) = add_leaf(&nodes, "g", "one", 30).unwrap();
        assert_eq!(find(&nodes, &first).dependency, None);
        assert_eq!(find(&nodes, &first).priority, 6);

        let (nodes, second) = add_leaf(&nodes, "g", "two", 45).unwrap();
        let leaf = find(&nodes, &second);
        assert_eq!(leaf.dependency.as_deref(), Some(first.as_str()));
        assert_eq!(leaf.parent_id.as_deref(), Some("g"));
        assert_eq!(leaf.duration_minutes, 45);
        assert!(!leaf.is_ready);
        assert_eq!(effective_duration(&nodes, "g").unwrap(), 75);
    }

    #[test]
    fn test_add_leaf_unknown_parent() {
        assert!(matches!(
            add_leaf(&[], "ghost", "t", 5),
            Err(PlanError::NotFound { .. })
        ));
    }

    #[test]
    fn test_insert_leaf_duplicate_id() {
        let nodes = vec![GoalTask::new("g"), GoalTask::new("a").with_parent("g")];
        assert!(insert_leaf(&nodes, "g", GoalTask::new("a")).is_err());
    }

    #[test]
    fn test_queries() {
        let nodes = sole_child_forest();
        let mut kids: Vec<String> = subtasks_of(&nodes, "g").unwrap().into_iter().map(|t| t.id).collect();
        kids.sort();
        assert_eq!(kids, vec!["a", "b", "p"]);

        assert_eq!(bottom_layer(&nodes, "p").unwrap().len(), 1);
        assert_eq!(bottom_layer(&nodes, "g").unwrap().len(), 3);
        assert_eq!(bottom_layer(&nodes, "a").unwrap()[0].id, "a");
        assert_eq!(root_ancestor(&nodes, "x").unwrap().id, "g");
        assert_eq!(root_ancestor(&nodes, "g").unwrap().id, "g");
        assert!(matches!(
            subtasks_of(&nodes, "missing"),
            Err(PlanError::NotFound { .. })
        ));
    }

    #[test]
    fn test_sort_by_dependency() {
        let nodes = sole_child_forest();
        let leaves = bottom_layer(&nodes, "g").unwrap();
        let sorted = sort_by_dependency(&nodes, &leaves).unwrap();
        let ids: Vec<&str> = sorted.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "x", "b"]);

        // Idempotent
        let again = sort_by_dependency(&nodes, &sorted).unwrap();
        assert_eq!(again, sorted);
    }

    #[test]
    fn test_sort_by_dependency_two_heads() {
        let nodes = sole_child_forest();
        let leaves: Vec<GoalTask> = ["a", "b"].iter().map(|id| find(&nodes, id).clone()).collect();
        // b's predecessor x is outside the set, so both a and b are heads
        assert!(matches!(
            sort_by_dependency(&nodes, &leaves),
            Err(PlanError::GraphInconsistency { .. })
        ));
    }

    #[test]
    fn test_move_round_trip() {
        let nodes = sole_child_forest();
        let moved = move_subtree(&nodes, "a", "b", DropEdge::After).unwrap();
        assert_eq!(order(&moved, "g"), vec!["x", "b", "a"]);
        let back = move_subtree(&moved, "a", "p", DropEdge::Before).unwrap();
        assert_eq!(order(&back, "g"), order(&nodes, "g"));
    }

    #[test]
    fn test_move_is_all_or_nothing() {
        let nodes = sole_child_forest();
        let before = nodes.clone();
        assert!(move_subtree(&nodes, "p", "x", DropEdge::After).is_err());
        assert_eq!(nodes, before);
    }

    #[test]
    fn test_eligible_leaves() {
        let now = chrono::Utc::now();
        let nodes = vec![
            GoalTask::new("g").ready(),
            GoalTask::new("a").with_parent("g").ready(),
            GoalTask::new("b").with_parent("g").with_dependency("a"),
            GoalTask::new("c")
                .with_parent("g")
                .with_dependency("b")
                .ready()
                .with_completed(now, now),
        ];
        let ids: Vec<String> = eligible_leaves(&nodes).unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["a"]);
    }

    #[test]
    fn test_eligible_leaves_follow_chain() {
        let nodes = vec![
            GoalTask::new("g"),
            GoalTask::new("z").with_parent("g").with_dependency("y").ready(),
            GoalTask::new("x").with_parent("g").ready(),
            GoalTask::new("y").with_parent("g").with_dependency("x").ready(),
            GoalTask::new("solo").ready(),
        ];
        let ids: Vec<String> = eligible_leaves(&nodes).unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["x", "y", "z", "solo"]);
    }
}
