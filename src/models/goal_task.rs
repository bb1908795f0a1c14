//! Goal/task node model.
//!
//! A `GoalTask` is one node in a forest of goals, plans, and tasks. Only
//! leaves (nodes without children) carry a duration that is scheduled
//! directly; leaves are also the only nodes that take part in the
//! ordering chain expressed through `dependency`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Advisory classification of a node. No algorithm branches on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    /// A concrete piece of work.
    #[default]
    Task,
    /// A group of tasks.
    Plan,
    /// A long-term objective.
    Goal,
}

/// Execution record of a leaf that has already been done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    /// When work started.
    pub start_time: DateTime<Utc>,
    /// When work finished.
    pub end_time: DateTime<Utc>,
}

/// A node of the goal/task forest.
///
/// # Chain
/// `dependency` names the leaf that occupies the position immediately
/// before this one in its ordering context. Every ancestor's leaves form a
/// single contiguous run of that chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalTask {
    /// Unique identifier.
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// Parent node. `None` for forest roots.
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Advisory kind.
    #[serde(default)]
    pub kind: TaskKind,
    /// Manual gate a leaf must pass before it is schedulable.
    #[serde(default)]
    pub is_ready: bool,
    /// Duration in minutes (leaves only).
    #[serde(default)]
    pub duration_minutes: i64,
    /// Latest completion time.
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    /// Earliest start time.
    #[serde(default)]
    pub starts: Option<DateTime<Utc>>,
    /// Immediate chain predecessor.
    #[serde(default)]
    pub dependency: Option<String>,
    /// Set once the leaf has been executed.
    #[serde(default)]
    pub completed: Option<Completion>,
    /// Importance, 0 (lowest) to 10 (highest).
    #[serde(default)]
    pub priority: u8,
}

impl GoalTask {
    /// Highest accepted priority.
    pub const MAX_PRIORITY: u8 = 10;

    /// Creates a root task with the given ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            parent_id: None,
            kind: TaskKind::Task,
            is_ready: false,
            duration_minutes: 0,
            deadline: None,
            starts: None,
            dependency: None,
            completed: None,
            priority: 0,
        }
    }

    /// Sets the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the parent.
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Sets the kind.
    pub fn with_kind(mut self, kind: TaskKind) -> Self {
        self.kind = kind;
        self
    }

    /// Marks the task as ready for scheduling.
    pub fn ready(mut self) -> Self {
        self.is_ready = true;
        self
    }

    /// Sets the duration in minutes.
    pub fn with_duration(mut self, minutes: i64) -> Self {
        self.duration_minutes = minutes;
        self
    }

    /// Sets the deadline.
    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Sets the earliest start.
    pub fn with_starts(mut self, starts: DateTime<Utc>) -> Self {
        self.starts = Some(starts);
        self
    }

    /// Sets the chain predecessor.
    pub fn with_dependency(mut self, dependency: impl Into<String>) -> Self {
        self.dependency = Some(dependency.into());
        self
    }

    /// Marks the task as completed.
    pub fn with_completed(mut self, start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        self.completed = Some(Completion {
            start_time,
            end_time,
        });
        self
    }

    /// Sets the priority.
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    /// Whether the task has been executed.
    #[inline]
    pub fn is_completed(&self) -> bool {
        self.completed.is_some()
    }

    /// Whether the task is a forest root.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}
