//! Urgency scoring and ranking of schedulable leaves.
//!
//! Turns the ready, uncompleted leaves of the forest into the sequence the
//! calendar generator packs, most urgent first.
//!
//! # Usage
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use u_planner::models::GoalTask;
//! use u_planner::priority::PriorityScheduler;
//!
//! let now = Utc.with_ymd_and_hms(2026, 10, 12, 7, 0, 0).unwrap();
//! let leaves = vec![
//!     GoalTask::new("later").ready().with_duration(60).with_priority(5),
//!     GoalTask::new("soon")
//!         .ready()
//!         .with_duration(60)
//!         .with_priority(5)
//!         .with_deadline(now + chrono::Duration::hours(2)),
//! ];
//!
//! let ranking = PriorityScheduler::new().rank(&leaves, &[], now);
//! assert_eq!(ranking.leaves[0].task.id, "soon");
//! ```
//!
//! # Score Convention
//! **Higher score = more urgent.** Scores never exceed the leaf's priority.

mod context;
mod horizon;
mod ranking;
pub mod rules;

pub use context::ScoringContext;
pub use horizon::HorizonEstimate;
pub use ranking::{PriorityScheduler, RankedLeaf, Ranking};

use crate::models::GoalTask;
use std::fmt::Debug;

/// Score returned by an urgency rule.
pub type UrgencyScore = f64;

/// A rule that scores how urgently a leaf should be packed.
pub trait UrgencyRule: Send + Sync + Debug {
    /// Rule name.
    fn name(&self) -> &'static str;

    /// Scores a leaf. Higher = packed earlier.
    fn evaluate(&self, leaf: &GoalTask, context: &ScoringContext) -> UrgencyScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}

/// Logistic curve `1 / (1 + e^(-steepness * (x - midpoint)))`.
#[inline]
pub fn sigmoid(x: f64, steepness: f64, midpoint: f64) -> f64 {
    1.0 / (1.0 + (-steepness * (x - midpoint)).exp())
}
