//! Chain-preserving mutations on a [`TaskArena`].
//!
//! Each mutation rewires the chain so that every ancestor's bottom layer is
//! still one contiguous run afterwards. The free functions in the parent
//! module run these on a private copy and verify before handing results
//! back.

use serde::{Deserialize, Serialize};

use super::{NodeKey, TaskArena};
use crate::error::{PlanError, PlanResult};
use crate::models::GoalTask;

/// Which side of the target a moved subtree lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropEdge {
    /// Immediately before the target's subtree.
    Before,
    /// Immediately after the target's subtree.
    After,
}

impl TaskArena {
    /// Adds `leaf` under `parent`, at the end of the parent's chain run.
    ///
    /// If `parent` was itself a leaf, the new leaf takes its place in the
    /// chain, since `parent` stops being a leaf.
    pub fn add_leaf(&mut self, parent: NodeKey, leaf: GoalTask) -> PlanResult<NodeKey> {
        let tail = if self.is_leaf(parent) {
            None
        } else {
            Some(self.span(parent)?.1)
        };

        let key = self.push(leaf)?;
        self.attach(key, Some(parent));
        match tail {
            Some(tail) => self.insert_after(tail, key, key),
            None => self.replace_range(key, parent, parent),
        }
        Ok(key)
    }

    /// Removes the subtree rooted at `key` and repairs the chain.
    ///
    /// | siblings remain | repair |
    /// |---|---|
    /// | yes | predecessor and successor of the removed run are joined |
    /// | no, parent is not a root | the parent becomes a leaf and takes the run's place |
    /// | no, parent is a root | nothing links outside the run |
    ///
    /// Returns the removed nodes.
    pub fn delete_subtree(&mut self, key: NodeKey) -> PlanResult<Vec<GoalTask>> {
        let (head, tail) = self.span(key)?;
        self.cut_out(key, head, tail);

        let removed = self
            .subtree(key)
            .into_iter()
            .map(|k| self.task(k).clone())
            .collect();
        self.remove_subtree(key);
        Ok(removed)
    }

    /// Moves the subtree rooted at `moved` next to `target`, under
    /// `target`'s parent.
    ///
    /// Moving a node relative to itself is a no-op. Moving relative to a
    /// forest root makes `moved` a new root.
    pub fn move_subtree(&mut self, moved: NodeKey, target: NodeKey, edge: DropEdge) -> PlanResult<()> {
        if moved == target {
            return Ok(());
        }
        if self.is_ancestor_or_self(moved, target) {
            return Err(PlanError::InvalidMove {
                moved: self.id(moved).to_string(),
                target: self.id(target).to_string(),
            });
        }

        let (head, tail) = self.span(moved)?;
        self.cut_out(moved, head, tail);

        let new_parent = self.parent(target);
        self.attach(moved, new_parent);
        if new_parent.is_none() {
            return Ok(());
        }

        let (target_head, target_tail) = self.span(target)?;
        match edge {
            DropEdge::Before => self.insert_before(target_head, head, tail),
            DropEdge::After => self.insert_after(target_tail, head, tail),
        }
        Ok(())
    }

    /// Unlinks the run `head..=tail` of `key`'s subtree from its old place,
    /// promoting the parent into the chain when `key` is its only child.
    fn cut_out(&mut self, key: NodeKey, head: NodeKey, tail: NodeKey) {
        let Some(parent) = self.parent(key) else {
            return;
        };
        let siblings_remain = self.children(parent).len() > 1;
        if siblings_remain || self.parent(parent).is_none() {
            self.unlink_range(head, tail);
        } else {
            self.replace_range(parent, head, tail);
        }
    }
}
