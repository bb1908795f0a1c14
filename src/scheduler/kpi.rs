//! Plan quality metrics (KPIs).
//!
//! Computes indicators for one generation pass from its outcome and the
//! leaves it was asked to pack.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Packed Minutes | Sum of packed event durations |
//! | Deadline Misses | Packed leaves ending after their deadline, plus unscheduled leaves with a deadline |
//! | Total Tardiness | Sum of max(0, end - deadline) over packed leaves |
//! | Maximum Tardiness | Largest single delay |
//! | On-Time Rate | Fraction of packed leaves meeting their deadline |
//! | Utilization | Packed minutes / free minutes in the horizon |
//! | Makespan | Latest end of a packed event |

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::GenerationOutcome;
use crate::models::GoalTask;

/// Plan performance indicators.
///
/// Time values are in minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanKpi {
    /// Minutes packed in this pass.
    pub packed_minutes: i64,
    /// Leaves finishing late or not placed despite a deadline.
    pub deadline_misses: usize,
    /// Sum of tardiness across packed leaves.
    pub total_tardiness_minutes: i64,
    /// Maximum tardiness of any packed leaf.
    pub max_tardiness_minutes: i64,
    /// Fraction of packed leaves on time (0.0..1.0).
    pub on_time_rate: f64,
    /// Share of free horizon time used (0.0..1.0).
    pub utilization: f64,
    /// Latest end of a packed event.
    pub makespan: Option<DateTime<Utc>>,
    /// Leaves left unscheduled.
    pub unscheduled: usize,
}

impl PlanKpi {
    /// Computes KPIs from an outcome and its input leaves.
    ///
    /// # Arguments
    /// * `outcome` - The generation result.
    /// * `leaves` - The leaves that were packed (for deadlines).
    pub fn calculate(outcome: &GenerationOutcome, leaves: &[GoalTask]) -> Self {
        let by_id: HashMap<&str, &GoalTask> = leaves.iter().map(|l| (l.id.as_str(), l)).collect();

        let mut packed_minutes = 0;
        let mut total_tardiness = 0;
        let mut max_tardiness = 0;
        let mut on_time_count = 0usize;
        let mut counted = 0usize;
        let mut late = 0usize;
        let mut makespan: Option<DateTime<Utc>> = None;

        for event in outcome.packed() {
            counted += 1;
            packed_minutes += event.duration_minutes();
            makespan = Some(makespan.map_or(event.end, |m| m.max(event.end)));

            let deadline = event
                .task_id()
                .and_then(|id| by_id.get(id))
                .and_then(|leaf| leaf.deadline);
            match deadline {
                Some(deadline) if event.end > deadline => {
                    let tardiness = (event.end - deadline).num_minutes();
                    total_tardiness += tardiness;
                    max_tardiness = max_tardiness.max(tardiness);
                    late += 1;
                }
                // No deadline → considered on-time
                _ => on_time_count += 1,
            }
        }

        let unplaced_with_deadline = outcome
            .unscheduled
            .iter()
            .filter(|u| by_id.get(u.task_id.as_str()).is_some_and(|l| l.deadline.is_some()))
            .count();

        let on_time_rate = if counted == 0 {
            1.0
        } else {
            on_time_count as f64 / counted as f64
        };
        let utilization = if outcome.free_minutes <= 0 {
            0.0
        } else {
            (packed_minutes as f64 / outcome.free_minutes as f64).min(1.0)
        };

        Self {
            packed_minutes,
            deadline_misses: late + unplaced_with_deadline,
            total_tardiness_minutes: total_tardiness,
            max_tardiness_minutes: max_tardiness,
            on_time_rate,
            utilization,
            makespan,
            unscheduled: outcome.unscheduled.len(),
        }
    }

    /// Whether the plan meets the given quality thresholds.
    pub fn meets_thresholds(&self, max_tardiness_minutes: i64, max_misses: usize) -> bool {
        self.max_tardiness_minutes <= max_tardiness_minutes && self.deadline_misses <= max_misses
    }
}
