//! Index-addressed arena holding the goal/task forest.
//!
//! Two relations live side by side on every slot:
//! - the tree relation (`parent` / `children`), and
//! - the ordering chain (`chain_prev` / `chain_next`) over leaves.
//!
//! The chain is stored doubly linked so that "two predecessors" or
//! "two successors" cannot be represented; `chain_violations` checks the
//! remaining invariants in one pass.

use std::collections::{HashMap, HashSet};

use crate::error::{PlanError, PlanResult};
use crate::models::GoalTask;

/// Stable key of a node inside one [`TaskArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(usize);

impl NodeKey {
    /// Slot index.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Slot {
    task: GoalTask,
    live: bool,
    parent: Option<NodeKey>,
    children: Vec<NodeKey>,
    chain_prev: Option<NodeKey>,
    chain_next: Option<NodeKey>,
}

/// Arena of goal/task nodes.
///
/// Built from a plain collection with [`TaskArena::from_tasks`] and turned
/// back into one with [`TaskArena::to_tasks`]. Removed nodes leave a dead
/// slot behind so keys stay valid for the arena's lifetime.
#[derive(Debug, Clone, Default)]
pub struct TaskArena {
    slots: Vec<Slot>,
    index: HashMap<String, NodeKey>,
}

impl TaskArena {
    /// Builds an arena, resolving `parent_id` and `dependency` references.
    ///
    /// # Errors
    /// `GraphInconsistency` for duplicate ids, dangling references, parent
    /// cycles, or two leaves naming the same predecessor.
    pub fn from_tasks(tasks: &[GoalTask]) -> PlanResult<Self> {
        let mut arena = Self {
            slots: Vec::with_capacity(tasks.len()),
            index: HashMap::with_capacity(tasks.len()),
        };

        for task in tasks {
            let key = NodeKey(arena.slots.len());
            if arena.index.insert(task.id.clone(), key).is_some() {
                return Err(PlanError::inconsistency(format!("duplicate id '{}'", task.id)));
            }
            arena.slots.push(Slot {
                task: task.clone(),
                live: true,
                parent: None,
                children: Vec::new(),
                chain_prev: None,
                chain_next: None,
            });
        }

        for (i, task) in tasks.iter().enumerate() {
            if let Some(parent_id) = &task.parent_id {
                let parent = *arena.index.get(parent_id).ok_or_else(|| {
                    PlanError::inconsistency(format!(
                        "parent '{parent_id}' of '{}' does not exist",
                        task.id
                    ))
                })?;
                arena.slots[i].parent = Some(parent);
                arena.slots[parent.0].children.push(NodeKey(i));
            }
        }

        for i in 0..arena.slots.len() {
            let mut steps = 0;
            let mut cur = arena.slots[i].parent;
            while let Some(p) = cur {
                steps += 1;
                if p.0 == i || steps > arena.slots.len() {
                    return Err(PlanError::inconsistency(format!(
                        "'{}' is its own ancestor",
                        arena.slots[i].task.id
                    )));
                }
                cur = arena.slots[p.0].parent;
            }
        }

        for (i, task) in tasks.iter().enumerate() {
            let Some(dep_id) = &task.dependency else {
                continue;
            };
            let prev = *arena.index.get(dep_id).ok_or_else(|| {
                PlanError::inconsistency(format!(
                    "dependency '{dep_id}' of '{}' does not exist",
                    task.id
                ))
            })?;
            if prev.0 == i {
                return Err(PlanError::inconsistency(format!(
                    "'{}' depends on itself",
                    task.id
                )));
            }
            if let Some(other) = arena.slots[prev.0].chain_next {
                return Err(PlanError::inconsistency(format!(
                    "'{}' and '{}' both follow '{dep_id}'",
                    arena.slots[other.0].task.id, task.id
                )));
            }
            arena.slots[i].chain_prev = Some(prev);
            arena.slots[prev.0].chain_next = Some(NodeKey(i));
        }

        Ok(arena)
    }

    /// Writes the arena back out, in original insertion order followed by
    /// nodes added since. `parent_id` and `dependency` reflect the arena's
    /// relations.
    pub fn to_tasks(&self) -> Vec<GoalTask> {
        self.keys().map(|k| self.export(k)).collect()
    }

    /// Copy of one node with `parent_id` and `dependency` taken from the
    /// arena's relations.
    pub fn export(&self, key: NodeKey) -> GoalTask {
        let slot = &self.slots[key.0];
        let mut task = slot.task.clone();
        task.parent_id = slot.parent.map(|p| self.slots[p.0].task.id.clone());
        task.dependency = slot.chain_prev.map(|p| self.slots[p.0].task.id.clone());
        task
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the arena holds no live nodes.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Live keys in slot order.
    pub fn keys(&self) -> impl Iterator<Item = NodeKey> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.live)
            .map(|(i, _)| NodeKey(i))
    }

    /// Resolves an id.
    ///
    /// # Errors
    /// `NotFound` if no live node has this id.
    pub fn key(&self, id: &str) -> PlanResult<NodeKey> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| PlanError::not_found(id))
    }

    /// Whether a live node has this id.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// The stored task. Its `parent_id`/`dependency` may be stale; use
    /// [`parent`](Self::parent) and [`chain_prev`](Self::chain_prev).
    #[inline]
    pub fn task(&self, key: NodeKey) -> &GoalTask {
        &self.slots[key.0].task
    }

    /// Node id.
    #[inline]
    pub fn id(&self, key: NodeKey) -> &str {
        &self.slots[key.0].task.id
    }

    /// Parent key.
    #[inline]
    pub fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        self.slots[key.0].parent
    }

    /// Direct children.
    #[inline]
    pub fn children(&self, key: NodeKey) -> &[NodeKey] {
        &self.slots[key.0].children
    }

    /// Chain predecessor.
    #[inline]
    pub fn chain_prev(&self, key: NodeKey) -> Option<NodeKey> {
        self.slots[key.0].chain_prev
    }

    /// Chain successor.
    #[inline]
    pub fn chain_next(&self, key: NodeKey) -> Option<NodeKey> {
        self.slots[key.0].chain_next
    }

    /// Whether the node has no children.
    #[inline]
    pub fn is_leaf(&self, key: NodeKey) -> bool {
        self.slots[key.0].children.is_empty()
    }

    /// Forest root above (or equal to) `key`.
    pub fn root_of(&self, key: NodeKey) -> NodeKey {
        let mut cur = key;
        while let Some(p) = self.parent(cur) {
            cur = p;
        }
        cur
    }

    /// Whether `ancestor` is `key` or lies above it.
    pub fn is_ancestor_or_self(&self, ancestor: NodeKey, key: NodeKey) -> bool {
        let mut cur = Some(key);
        while let Some(k) = cur {
            if k == ancestor {
                return true;
            }
            cur = self.parent(k);
        }
        false
    }

    /// Every node of the subtree rooted at `key`, preorder.
    pub fn subtree(&self, key: NodeKey) -> Vec<NodeKey> {
        let mut out = Vec::new();
        let mut stack = vec![key];
        while let Some(k) = stack.pop() {
            out.push(k);
            stack.extend(self.children(k).iter().rev());
        }
        out
    }

    /// Leaf descendants of `key`, unordered. A leaf is its own bottom layer.
    pub fn leaves_under(&self, key: NodeKey) -> Vec<NodeKey> {
        self.subtree(key)
            .into_iter()
            .filter(|&k| self.is_leaf(k))
            .collect()
    }

    /// Orders a set of leaves along the chain.
    ///
    /// Starts from the single member whose predecessor lies outside the set
    /// and follows successors while they stay inside it.
    ///
    /// # Errors
    /// `GraphInconsistency` if there is no head, more than one head, or the
    /// walk does not cover the set (cycle or gap).
    pub fn sort_chain(&self, leaves: &[NodeKey]) -> PlanResult<Vec<NodeKey>> {
        if leaves.is_empty() {
            return Ok(Vec::new());
        }
        let members: HashSet<NodeKey> = leaves.iter().copied().collect();
        let heads: Vec<NodeKey> = leaves
            .iter()
            .copied()
            .filter(|&k| !self.chain_prev(k).is_some_and(|p| members.contains(&p)))
            .collect();

        let head = match heads.as_slice() {
            [single] => *single,
            [] => {
                return Err(PlanError::inconsistency(format!(
                    "chain through '{}' has no head (cycle)",
                    self.id(leaves[0])
                )))
            }
            _ => {
                let ids: Vec<&str> = heads.iter().map(|&k| self.id(k)).collect();
                return Err(PlanError::inconsistency(format!(
                    "chain has {} heads: {}",
                    ids.len(),
                    ids.join(", ")
                )));
            }
        };

        let mut order = Vec::with_capacity(members.len());
        let mut seen = HashSet::with_capacity(members.len());
        let mut cur = Some(head);
        while let Some(k) = cur.filter(|k| members.contains(k)) {
            if !seen.insert(k) {
                return Err(PlanError::inconsistency(format!(
                    "chain cycle at '{}'",
                    self.id(k)
                )));
            }
            order.push(k);
            cur = self.chain_next(k);
        }

        if order.len() != members.len() {
            return Err(PlanError::inconsistency(format!(
                "chain from '{}' reaches {} of {} leaves",
                self.id(head),
                order.len(),
                members.len()
            )));
        }
        Ok(order)
    }

    /// Leaves of `key` in chain order.
    pub fn ordered_leaves(&self, key: NodeKey) -> PlanResult<Vec<NodeKey>> {
        self.sort_chain(&self.leaves_under(key))
    }

    /// Head and tail of the chain run covering `key`'s bottom layer.
    pub fn span(&self, key: NodeKey) -> PlanResult<(NodeKey, NodeKey)> {
        let order = self.ordered_leaves(key)?;
        match (order.first(), order.last()) {
            (Some(&head), Some(&tail)) => Ok((head, tail)),
            _ => Err(PlanError::inconsistency(format!(
                "'{}' has an empty bottom layer",
                self.id(key)
            ))),
        }
    }

    /// Lists every chain invariant violation.
    ///
    /// Checks link symmetry, that only leaves are linked, that links stay
    /// within one root tree, and that every node's bottom layer is one
    /// contiguous run of its tree's chain.
    pub fn chain_violations(&self) -> Vec<String> {
        let mut out = Vec::new();

        for key in self.keys() {
            let slot = &self.slots[key.0];
            if let Some(p) = slot.chain_prev {
                if !self.slots[p.0].live {
                    out.push(format!("'{}' follows a removed node", self.id(key)));
                } else if self.slots[p.0].chain_next != Some(key) {
                    out.push(format!("'{}' -> '{}' is one-sided", self.id(p), self.id(key)));
                }
                if self.root_of(p) != self.root_of(key) {
                    out.push(format!(
                        "'{}' follows '{}' from another tree",
                        self.id(key),
                        self.id(p)
                    ));
                }
            }
            if let Some(n) = slot.chain_next {
                if !self.slots[n.0].live || self.slots[n.0].chain_prev != Some(key) {
                    out.push(format!("'{}' has a dangling successor", self.id(key)));
                }
            }
            if !self.is_leaf(key) && (slot.chain_prev.is_some() || slot.chain_next.is_some()) {
                out.push(format!("non-leaf '{}' is linked into a chain", self.id(key)));
            }
        }

        for key in self.keys() {
            if self.is_leaf(key) && self.parent(key).is_some() {
                continue;
            }
            if let Err(err) = self.ordered_leaves(key) {
                out.push(format!("bottom layer of '{}': {err}", self.id(key)));
            }
        }

        out
    }

    /// Fails on the first chain invariant violation.
    pub fn verify(&self) -> PlanResult<()> {
        match self.chain_violations().into_iter().next() {
            Some(detail) => Err(PlanError::inconsistency(detail)),
            None => Ok(()),
        }
    }

    // ---------------------------------------------------------------
    // Mutation primitives. Callers keep the invariants; `verify` checks.
    // ---------------------------------------------------------------

    /// Adds a detached node and returns its key.
    pub(crate) fn push(&mut self, task: GoalTask) -> PlanResult<NodeKey> {
        if self.index.contains_key(&task.id) {
            return Err(PlanError::inconsistency(format!("duplicate id '{}'", task.id)));
        }
        let key = NodeKey(self.slots.len());
        self.index.insert(task.id.clone(), key);
        self.slots.push(Slot {
            task,
            live: true,
            parent: None,
            children: Vec::new(),
            chain_prev: None,
            chain_next: None,
        });
        Ok(key)
    }

    /// Removes `key` from its parent's child list.
    pub(crate) fn detach(&mut self, key: NodeKey) {
        if let Some(p) = self.slots[key.0].parent.take() {
            self.slots[p.0].children.retain(|&c| c != key);
        }
    }

    /// Makes `key` a child of `parent` (or a root).
    pub(crate) fn attach(&mut self, key: NodeKey, parent: Option<NodeKey>) {
        self.detach(key);
        self.slots[key.0].parent = parent;
        if let Some(p) = parent {
            self.slots[p.0].children.push(key);
        }
    }

    /// Kills every slot of the subtree rooted at `key`.
    pub(crate) fn remove_subtree(&mut self, key: NodeKey) {
        self.detach(key);
        for k in self.subtree(key) {
            let slot = &mut self.slots[k.0];
            slot.live = false;
            slot.chain_prev = None;
            slot.chain_next = None;
            self.index.remove(&slot.task.id);
        }
    }

    /// Points `node` at `prev`, keeping both link directions symmetric.
    fn set_prev(&mut self, node: NodeKey, prev: Option<NodeKey>) {
        if let Some(old) = self.slots[node.0].chain_prev {
            if self.slots[old.0].chain_next == Some(node) {
                self.slots[old.0].chain_next = None;
            }
        }
        if let Some(p) = prev {
            if let Some(displaced) = self.slots[p.0].chain_next {
                if displaced != node {
                    self.slots[displaced.0].chain_prev = None;
                }
            }
            self.slots[p.0].chain_next = Some(node);
        }
        self.slots[node.0].chain_prev = prev;
    }

    /// Cuts the run `head..=tail` out and joins its neighbours.
    pub(crate) fn unlink_range(&mut self, head: NodeKey, tail: NodeKey) {
        let pred = self.chain_prev(head);
        let succ = self.chain_next(tail);
        self.set_prev(head, None);
        if let Some(s) = succ {
            self.set_prev(s, pred);
        }
    }

    /// Cuts the run `head..=tail` out and puts `node` in its place.
    pub(crate) fn replace_range(&mut self, node: NodeKey, head: NodeKey, tail: NodeKey) {
        let pred = self.chain_prev(head);
        let succ = self.chain_next(tail);
        self.set_prev(head, None);
        if let Some(s) = succ {
            self.set_prev(s, None);
        }
        self.set_prev(node, pred);
        if let Some(s) = succ {
            self.set_prev(s, Some(node));
        }
    }

    /// Splices the detached run `head..=tail` right after `anchor`.
    pub(crate) fn insert_after(&mut self, anchor: NodeKey, head: NodeKey, tail: NodeKey) {
        let succ = self.chain_next(anchor);
        if let Some(s) = succ {
            self.set_prev(s, None);
        }
        self.set_prev(head, Some(anchor));
        if let Some(s) = succ {
            self.set_prev(s, Some(tail));
        }
    }

    /// Splices the detached run `head..=tail` right before `anchor`.
    pub(crate) fn insert_before(&mut self, anchor: NodeKey, head: NodeKey, tail: NodeKey) {
        let pred = self.chain_prev(anchor);
        self.set_prev(anchor, None);
        self.set_prev(head, pred);
        self.set_prev(anchor, Some(tail));
    }
}
