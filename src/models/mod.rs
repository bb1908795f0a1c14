//! Planning domain models.
//!
//! Plain data collections exchanged with the host application: the
//! goal/task forest, the weekly template, and the concrete calendar.
//!
//! # Domain Mappings
//!
//! | u-planner | Meaning |
//! |-----------|---------|
//! | GoalTask | Goal, plan, or task node; leaves are schedulable work |
//! | EventTemplate | Recurring weekly commitment (sleep, meals) |
//! | ScheduledEvent | Concrete calendar entry |
//! | Availability | Free/busy view used while packing |

mod calendar;
mod event;
mod goal_task;
mod snapshot;
mod template;

pub use calendar::{Availability, TimeWindow};
pub use event::{EventOrigin, ScheduledEvent};
pub use goal_task::{Completion, GoalTask, TaskKind};
pub use snapshot::Snapshot;
pub use template::{total_template_minutes, EventTemplate, WeekTime, MINUTES_PER_WEEK};
