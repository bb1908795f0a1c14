//! Ordering eligible leaves by urgency.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::rules::DeadlineSigmoid;
use super::{HorizonEstimate, ScoringContext, UrgencyRule};
use crate::config::UrgencyParams;
use crate::models::{EventTemplate, GoalTask};

/// A leaf paired with its urgency score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedLeaf {
    /// The leaf, unchanged.
    pub task: GoalTask,
    /// Score under the active rule.
    pub urgency_score: f64,
}

/// Result of ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    /// Leaves, most urgent first.
    pub leaves: Vec<RankedLeaf>,
    /// Horizon used for scoring.
    pub horizon: HorizonEstimate,
}

/// Scores and sorts leaves.
///
/// Sorting is stable: equal scores keep their input order.
///
/// # Example
/// ```
/// use u_planner::priority::{rules, PriorityScheduler};
///
/// let scheduler = PriorityScheduler::new().with_rule(rules::PriorityOnly);
/// assert_eq!(scheduler.rule_name(), "PRIORITY");
/// ```
#[derive(Debug, Clone)]
pub struct PriorityScheduler {
    rule: Arc<dyn UrgencyRule>,
    params: UrgencyParams,
}

impl PriorityScheduler {
    /// Creates a scheduler using [`DeadlineSigmoid`] and default parameters.
    pub fn new() -> Self {
        Self {
            rule: Arc::new(DeadlineSigmoid),
            params: UrgencyParams::default(),
        }
    }

    /// Replaces the scoring rule.
    pub fn with_rule<R: UrgencyRule + 'static>(mut self, rule: R) -> Self {
        self.rule = Arc::new(rule);
        self
    }

    /// Sets the urgency curve parameters.
    pub fn with_params(mut self, params: UrgencyParams) -> Self {
        self.params = params;
        self
    }

    /// Active rule name.
    pub fn rule_name(&self) -> &'static str {
        self.rule.name()
    }

    /// Ranks `leaves` against the backlog horizon implied by `templates`.
    ///
    /// Leaves that are not ready or already completed are dropped.
    pub fn rank(&self, leaves: &[GoalTask], templates: &[EventTemplate], now: DateTime<Utc>) -> Ranking {
        let owned: Vec<GoalTask> = leaves
            .iter()
            .filter(|l| l.is_ready && !l.is_completed())
            .cloned()
            .collect();
        let horizon = HorizonEstimate::compute(&owned, templates);

        let context = ScoringContext::at_time(now)
            .with_horizon_minutes(horizon.horizon_minutes)
            .with_params(self.params);

        let mut ranked: Vec<RankedLeaf> = owned
            .into_iter()
            .map(|task| {
                let urgency_score = self.rule.evaluate(&task, &context);
                RankedLeaf { task, urgency_score }
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.urgency_score
                .partial_cmp(&a.urgency_score)
                .unwrap_or(Ordering::Equal)
        });

        debug!(
            rule = self.rule.name(),
            leaves = ranked.len(),
            horizon_minutes = horizon.horizon_minutes,
            "ranked leaves"
        );
        Ranking {
            leaves: ranked,
            horizon,
        }
    }
}

impl Default for PriorityScheduler {
    fn default() -> Self {
        Self::new()
    }
}
