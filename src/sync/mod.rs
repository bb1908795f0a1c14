//! Snapshot reconciliation for external persistence.
//!
//! Diffs a previously acknowledged snapshot against the current one and
//! produces per-collection `create`/`update`/`destroy` sets keyed by id.
//! The reconciler never talks to storage; hosts hand the diff to a
//! [`PersistenceSink`] through a [`SyncQueue`].
//!
//! | Present before | Present now | Equal | Result |
//! |---|---|---|---|
//! | no | yes | - | create |
//! | yes | yes | no | update |
//! | yes | yes | yes | nothing |
//! | yes | no | - | destroy |

mod queue;

pub use queue::{PersistenceSink, SyncError, SyncQueue};

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::models::{EventTemplate, GoalTask, ScheduledEvent, Snapshot};

/// An entity identified by a string id.
pub trait Keyed {
    /// The id.
    fn key(&self) -> &str;
}

impl Keyed for GoalTask {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for EventTemplate {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for ScheduledEvent {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Changes to one collection. The three sets are disjoint by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeSet<T> {
    /// Records present only now.
    pub create: Vec<T>,
    /// Records present in both with different fields (new values).
    pub update: Vec<T>,
    /// Ids present only before.
    pub destroy: Vec<String>,
}

impl<T> Default for ChangeSet<T> {
    fn default() -> Self {
        Self {
            create: Vec::new(),
            update: Vec::new(),
            destroy: Vec::new(),
        }
    }
}

impl<T> ChangeSet<T> {
    /// Whether nothing changed.
    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.update.is_empty() && self.destroy.is_empty()
    }

    /// Total number of operations.
    pub fn len(&self) -> usize {
        self.create.len() + self.update.len() + self.destroy.len()
    }
}

impl<T: Keyed + Clone> ChangeSet<T> {
    /// Applies the changes to `base`: destroyed ids removed, updated records
    /// replaced in place, created records appended.
    pub fn apply_to(&self, base: &[T]) -> Vec<T> {
        let destroyed: HashSet<&str> = self.destroy.iter().map(String::as_str).collect();
        let updated: HashMap<&str, &T> = self.update.iter().map(|t| (t.key(), t)).collect();

        base.iter()
            .filter(|t| !destroyed.contains(t.key()))
            .map(|t| updated.get(t.key()).map_or_else(|| t.clone(), |&u| u.clone()))
            .chain(self.create.iter().cloned())
            .collect()
    }
}

/// Diffs one collection.
///
/// `create` and `update` follow `after`'s order, `destroy` follows
/// `before`'s order.
pub fn diff_collection<T: Keyed + Clone + PartialEq>(before: &[T], after: &[T]) -> ChangeSet<T> {
    let previous: HashMap<&str, &T> = before.iter().map(|t| (t.key(), t)).collect();
    let current: HashSet<&str> = after.iter().map(Keyed::key).collect();

    let mut changes = ChangeSet::default();
    for item in after {
        match previous.get(item.key()) {
            None => changes.create.push(item.clone()),
            Some(&old) if old != item => changes.update.push(item.clone()),
            Some(_) => {}
        }
    }
    changes.destroy = before
        .iter()
        .filter(|t| !current.contains(t.key()))
        .map(|t| t.key().to_string())
        .collect();
    changes
}

/// Changes across all three collections of a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDiff {
    /// Goal/task changes.
    pub goals: ChangeSet<GoalTask>,
    /// Calendar changes.
    pub calendar: ChangeSet<ScheduledEvent>,
    /// Template changes.
    pub template: ChangeSet<EventTemplate>,
}

impl SnapshotDiff {
    /// Whether nothing changed.
    pub fn is_empty(&self) -> bool {
        self.goals.is_empty() && self.calendar.is_empty() && self.template.is_empty()
    }

    /// Total number of operations.
    pub fn len(&self) -> usize {
        self.goals.len() + self.calendar.len() + self.template.len()
    }

    /// Applies the diff to `base`.
    pub fn apply_to(&self, base: &Snapshot) -> Snapshot {
        Snapshot {
            goals: self.goals.apply_to(&base.goals),
            calendar: self.calendar.apply_to(&base.calendar),
            template: self.template.apply_to(&base.template),
        }
    }
}

/// Diffs two snapshots.
pub fn diff_snapshots(before: &Snapshot, after: &Snapshot) -> SnapshotDiff {
    SnapshotDiff {
        goals: diff_collection(&before.goals, &after.goals),
        calendar: diff_collection(&before.calendar, &after.calendar),
        template: diff_collection(&before.template, &after.template),
    }
}
