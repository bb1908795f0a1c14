//! Estimate of how much calendar time the eligible backlog needs.

use serde::{Deserialize, Serialize};

use crate::models::{total_template_minutes, EventTemplate, GoalTask, MINUTES_PER_WEEK};

/// Time span estimate for a backlog.
///
/// `weeks_needed = ceil(total_leaf_minutes / weekly_free_minutes)` and
/// `horizon_minutes = total_leaf_minutes + weeks_needed * total_template_minutes`.
/// When the template fills the whole week nothing can ever fit, so
/// `weeks_needed` is `None` and the horizon falls back to one week of
/// template time on top of the backlog. Sums saturate at `i64::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HorizonEstimate {
    /// Sum of eligible leaf durations.
    pub total_leaf_minutes: i64,
    /// Sum of template block durations.
    pub total_template_minutes: i64,
    /// Minutes per week not covered by the template.
    pub weekly_free_minutes: i64,
    /// Whole weeks of free time needed for the backlog.
    pub weeks_needed: Option<i64>,
    /// Normalizer for deadline distance.
    pub horizon_minutes: i64,
}

impl HorizonEstimate {
    /// Computes the estimate.
    pub fn compute(leaves: &[GoalTask], templates: &[EventTemplate]) -> Self {
        let total_leaf_minutes = leaves
            .iter()
            .fold(0i64, |acc, l| acc.saturating_add(l.duration_minutes.max(0)));
        let total_template = total_template_minutes(templates);
        let weekly_free_minutes = MINUTES_PER_WEEK.saturating_sub(total_template);

        let weeks_needed = (weekly_free_minutes > 0).then(|| {
            total_leaf_minutes / weekly_free_minutes
                + i64::from(total_leaf_minutes % weekly_free_minutes != 0)
        });
        let horizon_minutes = total_leaf_minutes
            .saturating_add(weeks_needed.unwrap_or(1).saturating_mul(total_template));

        Self {
            total_leaf_minutes,
            total_template_minutes: total_template,
            weekly_free_minutes,
            weeks_needed,
            horizon_minutes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WeekTime;
    use chrono::{NaiveTime, Weekday};

    fn block(minutes: i64) -> EventTemplate {
        EventTemplate::new("b", "Block", WeekTime::new(Weekday::Mon, NaiveTime::MIN), minutes)
    }

    fn leaf(minutes: i64) -> GoalTask {
        GoalTask::new("l").with_duration(minutes)
    }

    #[test]
    fn test_single_week() {
        let h = HorizonEstimate::compute(&[leaf(60), leaf(30)], &[block(360)]);
        assert_eq!(h.total_leaf_minutes, 90);
        assert_eq!(h.weekly_free_minutes, 10080 - 360);
        assert_eq!(h.weeks_needed, Some(1));
        assert_eq!(h.horizon_minutes, 90 + 360);
    }

    #[test]
    fn test_multiple_weeks() {
        // 5040 free per week, 12000 minutes of work → 3 weeks
        let h = HorizonEstimate::compute(&[leaf(12_000)], &[block(5040)]);
        assert_eq!(h.weeks_needed, Some(3));
        assert_eq!(h.horizon_minutes, 12_000 + 3 * 5040);
    }

    #[test]
    fn test_exact_multiple() {
        let h = HorizonEstimate::compute(&[leaf(10_080)], &[]);
        assert_eq!(h.weeks_needed, Some(1));
        assert_eq!(h.horizon_minutes, 10_080);
    }

    #[test]
    fn test_empty_backlog() {
        let h = HorizonEstimate::compute(&[], &[block(600)]);
        assert_eq!(h.weeks_needed, Some(0));
        assert_eq!(h.horizon_minutes, 0);
    }

    #[test]
    fn test_template_fills_week() {
        let h = HorizonEstimate::compute(&[leaf(60)], &[block(10_080)]);
        assert_eq!(h.weeks_needed, None);
        assert_eq!(h.horizon_minutes, 60 + 10_080);
    }

    #[test]
    fn test_huge_durations_saturate() {
        let leaves = [leaf(i64::MAX / 2), leaf(i64::MAX / 2), leaf(10)];
        let h = HorizonEstimate::compute(&leaves, &[block(600)]);
        assert_eq!(h.total_leaf_minutes, i64::MAX);
        assert_eq!(h.weekly_free_minutes, 10_080 - 600);
        assert_eq!(h.weeks_needed, Some(i64::MAX / (10_080 - 600) + 1));
        assert_eq!(h.horizon_minutes, i64::MAX);

        let h = HorizonEstimate::compute(&[leaf(60)], &[block(i64::MAX)]);
        assert_eq!(h.total_template_minutes, 10_080);
        assert_eq!(h.weeks_needed, None);
    }
}
