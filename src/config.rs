//! Planner settings.
//!
//! Hosts typically deserialize these from their own settings store; every
//! field has a default so partial documents are accepted.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::{PlanError, PlanResult};

/// Largest accepted buffer between packed items (minutes).
pub const MAX_BUFFER_MINUTES: i64 = 120;

/// Largest accepted packing horizon (weeks).
pub const MAX_HORIZON_WEEKS: u32 = 104;

/// Parameters of the deadline urgency curve.
///
/// `urgency_multiplier = 1 - sigmoid(time_ratio)`, with
/// `sigmoid(x) = 1 / (1 + e^(-steepness * (x - midpoint)))`, then scaled into
/// `[floor, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrgencyParams {
    /// Sigmoid steepness.
    pub steepness: f64,
    /// Sigmoid midpoint on the time ratio axis.
    pub midpoint: f64,
    /// Minimum scale applied to priority (also used for leaves without deadline).
    pub floor: f64,
}

impl Default for UrgencyParams {
    fn default() -> Self {
        Self {
            steepness: 4.0,
            midpoint: 0.7,
            floor: 0.3,
        }
    }
}

/// Settings for ranking and calendar generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlannerConfig {
    /// Gap reserved after every packed item (0–120 minutes).
    pub buffer_minutes: i64,
    /// Hard cap on how many weeks a generation pass may scan.
    pub max_horizon_weeks: u32,
    /// First day of the planning week.
    pub week_start: Weekday,
    /// Urgency curve.
    pub urgency: UrgencyParams,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            buffer_minutes: 0,
            max_horizon_weeks: 12,
            week_start: Weekday::Mon,
            urgency: UrgencyParams::default(),
        }
    }
}

impl PlannerConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the buffer.
    pub fn with_buffer_minutes(mut self, minutes: i64) -> Self {
        self.buffer_minutes = minutes;
        self
    }

    /// Sets the horizon cap.
    pub fn with_max_horizon_weeks(mut self, weeks: u32) -> Self {
        self.max_horizon_weeks = weeks;
        self
    }

    /// Sets the first day of the week.
    pub fn with_week_start(mut self, weekday: Weekday) -> Self {
        self.week_start = weekday;
        self
    }

    /// Sets the urgency curve.
    pub fn with_urgency(mut self, urgency: UrgencyParams) -> Self {
        self.urgency = urgency;
        self
    }

    /// Checks every field against its accepted range.
    pub fn validate(&self) -> PlanResult<()> {
        if !(0..=MAX_BUFFER_MINUTES).contains(&self.buffer_minutes) {
            return Err(PlanError::InvalidConfig(format!(
                "buffer_minutes must be within 0..={MAX_BUFFER_MINUTES}, got {}",
                self.buffer_minutes
            )));
        }
        if !(1..=MAX_HORIZON_WEEKS).contains(&self.max_horizon_weeks) {
            return Err(PlanError::InvalidConfig(format!(
                "max_horizon_weeks must be within 1..={MAX_HORIZON_WEEKS}, got {}",
                self.max_horizon_weeks
            )));
        }
        let u = &self.urgency;
        if !u.steepness.is_finite() || u.steepness <= 0.0 {
            return Err(PlanError::InvalidConfig(format!(
                "urgency steepness must be positive, got {}",
                u.steepness
            )));
        }
        if !u.midpoint.is_finite() {
            return Err(PlanError::InvalidConfig("urgency midpoint must be finite".into()));
        }
        if !(0.0..=1.0).contains(&u.floor) {
            return Err(PlanError::InvalidConfig(format!(
                "urgency floor must be within 0..=1, got {}",
                u.floor
            )));
        }
        Ok(())
    }
}
