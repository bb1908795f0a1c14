//! Concrete calendar entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::TimeWindow;

/// Where a calendar entry came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EventOrigin {
    /// Materialized from a weekly template block.
    #[serde(rename_all = "camelCase")]
    Template {
        /// Source template id.
        template_id: String,
    },
    /// A goal/task leaf packed into free time.
    #[serde(rename_all = "camelCase")]
    Task {
        /// Source leaf id.
        task_id: String,
    },
    /// Entered by the user directly.
    #[default]
    Manual,
}

/// A concrete calendar entry with absolute start and end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledEvent {
    /// Unique identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Start (inclusive).
    pub start: DateTime<Utc>,
    /// End (exclusive).
    pub end: DateTime<Utc>,
    /// iCalendar-style recurrence rule, if any.
    #[serde(default)]
    pub recurrence: Option<String>,
    /// Extra display properties for the host UI.
    #[serde(default)]
    pub extended_props: HashMap<String, String>,
    /// Source of the entry.
    #[serde(default)]
    pub origin: EventOrigin,
    /// Placed or resized by hand; kept verbatim by regeneration.
    #[serde(default)]
    pub locked: bool,
}

impl ScheduledEvent {
    /// Creates a manual event.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            start,
            end,
            recurrence: None,
            extended_props: HashMap::new(),
            origin: EventOrigin::Manual,
            locked: false,
        }
    }

    /// Sets the origin.
    pub fn with_origin(mut self, origin: EventOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// Sets the recurrence rule.
    pub fn with_recurrence(mut self, rule: impl Into<String>) -> Self {
        self.recurrence = Some(rule.into());
        self
    }

    /// Adds an extended display property.
    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extended_props.insert(key.into(), value.into());
        self
    }

    /// Marks the event as hand-placed.
    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    /// The occupied interval.
    #[inline]
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start, self.end)
    }

    /// Length in minutes.
    #[inline]
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// The leaf this event was packed from, if any.
    pub fn task_id(&self) -> Option<&str> {
        match &self.origin {
            EventOrigin::Task { task_id } => Some(task_id),
            _ => None,
        }
    }
}
