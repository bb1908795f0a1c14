//! Scoring context for urgency rule evaluation.

use chrono::{DateTime, Utc};

use crate::config::UrgencyParams;

/// State passed to urgency rules.
///
/// `horizon_minutes` normalizes deadline distance: a deadline one full
/// horizon away (or further) counts as not urgent at all.
#[derive(Debug, Clone)]
pub struct ScoringContext {
    /// Reference instant.
    pub now: DateTime<Utc>,
    /// Estimated span needed to fit all eligible work (minutes).
    pub horizon_minutes: i64,
    /// Urgency curve parameters.
    pub params: UrgencyParams,
}

impl ScoringContext {
    /// Creates a context at the given time with a zero horizon.
    pub fn at_time(now: DateTime<Utc>) -> Self {
        Self {
            now,
            horizon_minutes: 0,
            params: UrgencyParams::default(),
        }
    }

    /// Sets the horizon.
    pub fn with_horizon_minutes(mut self, minutes: i64) -> Self {
        self.horizon_minutes = minutes;
        self
    }

    /// Sets the urgency parameters.
    pub fn with_params(mut self, params: UrgencyParams) -> Self {
        self.params = params;
        self
    }

    /// Position of `deadline` within the horizon, clamped to `[0, 1]`.
    ///
    /// Overdue deadlines map to 0. With a zero horizon any future deadline
    /// maps to 1.
    pub fn time_ratio(&self, deadline: DateTime<Utc>) -> f64 {
        let minutes = (deadline - self.now).num_minutes().max(0);
        if self.horizon_minutes <= 0 {
            return if minutes > 0 { 1.0 } else { 0.0 };
        }
        (minutes as f64 / self.horizon_minutes as f64).clamp(0.0, 1.0)
    }
}
