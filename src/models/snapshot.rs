//! The three collections a host application holds.

use serde::{Deserialize, Serialize};

use super::{EventTemplate, GoalTask, ScheduledEvent};

/// Goals/tasks, calendar, and weekly template at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Goal/task forest.
    #[serde(default)]
    pub goals: Vec<GoalTask>,
    /// Concrete calendar.
    #[serde(default)]
    pub calendar: Vec<ScheduledEvent>,
    /// Weekly template.
    #[serde(default)]
    pub template: Vec<EventTemplate>,
}

impl Snapshot {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the goal/task forest.
    pub fn with_goals(mut self, goals: Vec<GoalTask>) -> Self {
        self.goals = goals;
        self
    }

    /// Replaces the calendar.
    pub fn with_calendar(mut self, calendar: Vec<ScheduledEvent>) -> Self {
        self.calendar = calendar;
        self
    }

    /// Replaces the template.
    pub fn with_template(mut self, template: Vec<EventTemplate>) -> Self {
        self.template = template;
        self
    }
}
