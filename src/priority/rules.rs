//! Built-in urgency rules.
//!
//! | Rule | Score |
//! |---|---|
//! | [`DeadlineSigmoid`] | `priority * scaled_urgency` |
//! | [`PriorityOnly`] | `priority` |
//!
//! # Score Convention
//! Higher score = more urgent.

use super::{sigmoid, ScoringContext, UrgencyRule, UrgencyScore};
use crate::config::UrgencyParams;
use crate::models::GoalTask;

/// Inverted sigmoid over the deadline's position in the horizon.
///
/// Near 1 when the deadline is imminent or past, near 0 when it lies a
/// full horizon away.
pub fn urgency_multiplier(time_ratio: f64, params: &UrgencyParams) -> f64 {
    1.0 - sigmoid(time_ratio, params.steepness, params.midpoint)
}

/// Maps the multiplier into `[floor, 1]`.
pub fn scaled_urgency(time_ratio: f64, params: &UrgencyParams) -> f64 {
    params.floor + (1.0 - params.floor) * urgency_multiplier(time_ratio, params)
}

/// Priority weighted by deadline pressure.
///
/// Leaves without a deadline score `priority * floor`, the same as a
/// deadline infinitely far away.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeadlineSigmoid;

impl UrgencyRule for DeadlineSigmoid {
    fn name(&self) -> &'static str {
        "DEADLINE_SIGMOID"
    }

    fn evaluate(&self, leaf: &GoalTask, context: &ScoringContext) -> UrgencyScore {
        let priority = f64::from(leaf.priority);
        match leaf.deadline {
            Some(deadline) => {
                priority * scaled_urgency(context.time_ratio(deadline), &context.params)
            }
            None => priority * context.params.floor,
        }
    }

    fn description(&self) -> &'static str {
        "Priority scaled by sigmoid deadline urgency"
    }
}

/// Raw priority, deadlines ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriorityOnly;

impl UrgencyRule for PriorityOnly {
    fn name(&self) -> &'static str {
        "PRIORITY"
    }

    fn evaluate(&self, leaf: &GoalTask, _context: &ScoringContext) -> UrgencyScore {
        f64::from(leaf.priority)
    }
}
