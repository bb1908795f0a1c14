//! One generation pass: rank the forest's eligible leaves, then pack them.
//!
//! # Usage
//!
//! ```
//! use chrono::{NaiveTime, TimeZone, Utc, Weekday};
//! use u_planner::models::{EventTemplate, GoalTask, Snapshot, WeekTime};
//! use u_planner::planner::Planner;
//!
//! let now = Utc.with_ymd_and_hms(2026, 10, 12, 7, 0, 0).unwrap();
//! let snapshot = Snapshot::new()
//!     .with_goals(vec![
//!         GoalTask::new("fit").with_title("Get fit"),
//!         GoalTask::new("run").with_parent("fit").ready().with_duration(45).with_priority(6),
//!     ])
//!     .with_template(vec![EventTemplate::new(
//!         "sleep",
//!         "Sleep",
//!         WeekTime::new(Weekday::Mon, NaiveTime::MIN),
//!         360,
//!     )]);
//!
//! let next = Planner::new().regenerate(&snapshot, now).unwrap();
//! assert!(next.calendar.iter().any(|e| e.id == "run"));
//! ```

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::PlannerConfig;
use crate::error::PlanResult;
use crate::graph;
use crate::models::Snapshot;
use crate::priority::{PriorityScheduler, Ranking, UrgencyRule};
use crate::scheduler::{CalendarGenerator, GenerationOutcome, GenerationRequest, PlanKpi};

/// Everything a generation pass produced.
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    /// Leaves in packing order with scores.
    pub ranking: Ranking,
    /// Generated calendar and overflow.
    pub generation: GenerationOutcome,
    /// Quality indicators.
    pub kpi: PlanKpi,
}

/// Composes ranking and calendar generation.
#[derive(Debug, Clone, Default)]
pub struct Planner {
    config: PlannerConfig,
    scheduler: PriorityScheduler,
}

impl Planner {
    /// Creates a planner with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration, including urgency parameters.
    pub fn with_config(mut self, config: PlannerConfig) -> Self {
        self.scheduler = self.scheduler.with_params(config.urgency);
        self.config = config;
        self
    }

    /// Replaces the urgency rule.
    pub fn with_rule<R: UrgencyRule + 'static>(mut self, rule: R) -> Self {
        self.scheduler = self.scheduler.with_rule(rule);
        self
    }

    /// Runs ranking and generation over `snapshot`.
    ///
    /// # Errors
    /// `InvalidConfig` for bad settings, `GraphInconsistency` when the
    /// forest is malformed.
    pub fn plan(&self, snapshot: &Snapshot, now: DateTime<Utc>) -> PlanResult<PlanOutcome> {
        self.config.validate()?;

        let leaves = graph::eligible_leaves(&snapshot.goals)?;
        let ranking = self.scheduler.rank(&leaves, &snapshot.template, now);
        let completed: HashSet<&str> = snapshot
            .goals
            .iter()
            .filter(|t| t.is_completed())
            .map(|t| t.id.as_str())
            .collect();

        let request = GenerationRequest::from_ranking(ranking.clone(), now)
            .with_templates(snapshot.template.clone())
            .with_calendar(snapshot.calendar.clone())
            .with_completed(completed);
        let generation = CalendarGenerator::new()
            .with_config(self.config.clone())
            .generate(&request)?;
        let kpi = PlanKpi::calculate(&generation, &request.leaves);

        debug!(
            eligible = leaves.len(),
            packed = generation.packed_ids.len(),
            misses = kpi.deadline_misses,
            "plan pass finished"
        );
        Ok(PlanOutcome {
            ranking,
            generation,
            kpi,
        })
    }

    /// Returns `snapshot` with its calendar replaced by a fresh generation.
    ///
    /// # Errors
    /// Same as [`Planner::plan`].
    pub fn regenerate(&self, snapshot: &Snapshot, now: DateTime<Utc>) -> PlanResult<Snapshot> {
        let outcome = self.plan(snapshot, now)?;
        Ok(Snapshot {
            calendar: outcome.generation.events,
            ..snapshot.clone()
        })
    }
}
