//! Weekly calendar generation by greedy slot packing.
//!
//! # Algorithm
//!
//! 1. Materialize the template for the previous week through the end of
//!    the horizon; these windows are unavailable.
//! 2. Carry forward existing events that already started, are locked, or
//!    belong to a completed leaf. They are unavailable too.
//! 3. Walk the leaves in packing order. Each leaf goes into the first free
//!    gap of `duration + buffer` at or after the cursor, where the cursor is
//!    `max(now, end of previous placement + buffer)` and the leaf's `starts`
//!    bound.
//! 4. Leaves that do not fit before the horizon end are reported as
//!    [`UnscheduledOverflow`].
//! 5. Emit template occurrences from the target week through the last week
//!    that received a packed event. An occurrence overlapping a carried event
//!    is dropped, so template and carried events never overlap.
//!
//! # Cursor
//! The cursor only moves forward. A leaf whose `starts` lies past the
//! cursor moves it there, so every leaf packed after it also lands after
//! that `starts`, even when earlier free time exists. Packing order is
//! therefore preserved in time.
//!
//! # Horizon
//! `weeks_needed + 1` weeks from the start of the week containing `now`,
//! capped by `max_horizon_weeks`. When the template fills the week, the cap
//! is used directly.
//!
//! # Complexity
//! O(n * b) where n = leaves and b = blocked windows.

use std::collections::HashSet;

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::config::PlannerConfig;
use crate::error::PlanResult;
use crate::models::{Availability, EventOrigin, EventTemplate, GoalTask, ScheduledEvent, TimeWindow};
use crate::priority::{HorizonEstimate, Ranking};

/// Start (00:00 UTC) of the week containing `at`.
pub fn week_start_of(at: DateTime<Utc>, week_start: Weekday) -> DateTime<Utc> {
    let date = at.date_naive();
    let back = i64::from(date.weekday().days_since(week_start));
    (date - Duration::days(back)).and_time(NaiveTime::MIN).and_utc()
}

/// Input container for calendar generation.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Leaves in packing order, most urgent first.
    pub leaves: Vec<GoalTask>,
    /// Weekly template.
    pub templates: Vec<EventTemplate>,
    /// Current calendar.
    pub calendar: Vec<ScheduledEvent>,
    /// Ids of completed leaves whose events are kept.
    pub completed: HashSet<String>,
    /// Reference instant.
    pub now: DateTime<Utc>,
}

impl GenerationRequest {
    /// Creates a request with empty template and calendar.
    pub fn new(leaves: Vec<GoalTask>, now: DateTime<Utc>) -> Self {
        Self {
            leaves,
            templates: Vec::new(),
            calendar: Vec::new(),
            completed: HashSet::new(),
            now,
        }
    }

    /// Creates a request from a ranking, keeping its order.
    pub fn from_ranking(ranking: Ranking, now: DateTime<Utc>) -> Self {
        Self::new(ranking.leaves.into_iter().map(|r| r.task).collect(), now)
    }

    /// Sets the template.
    pub fn with_templates(mut self, templates: Vec<EventTemplate>) -> Self {
        self.templates = templates;
        self
    }

    /// Sets the current calendar.
    pub fn with_calendar(mut self, calendar: Vec<ScheduledEvent>) -> Self {
        self.calendar = calendar;
        self
    }

    /// Sets the completed leaf ids.
    pub fn with_completed<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.completed = ids.into_iter().map(Into::into).collect();
        self
    }
}

/// A leaf that did not fit within the horizon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnscheduledOverflow {
    /// Leaf id.
    pub task_id: String,
    /// Leaf title.
    pub title: String,
    /// Minutes that could not be placed.
    pub duration_minutes: i64,
    /// End of the searched horizon.
    pub searched_until: DateTime<Utc>,
}

/// Result of a generation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOutcome {
    /// Carried, template and packed events, sorted by start then id.
    pub events: Vec<ScheduledEvent>,
    /// Ids of events packed in this pass, in packing order.
    pub packed_ids: Vec<String>,
    /// Leaves left for a later pass.
    pub unscheduled: Vec<UnscheduledOverflow>,
    /// `[now, horizon end)`.
    pub horizon: TimeWindow,
    /// Free minutes in the horizon before packing.
    pub free_minutes: i64,
}

impl GenerationOutcome {
    /// Whether every leaf was placed.
    pub fn is_complete(&self) -> bool {
        self.unscheduled.is_empty()
    }

    /// Events packed in this pass.
    pub fn packed(&self) -> impl Iterator<Item = &ScheduledEvent> + '_ {
        let ids: HashSet<&str> = self.packed_ids.iter().map(String::as_str).collect();
        self.events.iter().filter(move |e| ids.contains(e.id.as_str()))
    }
}

/// Greedy weekly calendar generator.
///
/// # Example
///
/// ```
/// use chrono::{NaiveTime, TimeZone, Utc, Weekday};
/// use u_planner::models::{EventTemplate, GoalTask, WeekTime};
/// use u_planner::scheduler::{CalendarGenerator, GenerationRequest};
///
/// let now = Utc.with_ymd_and_hms(2026, 10, 12, 7, 0, 0).unwrap();
/// let sleep = EventTemplate::new("sleep", "Sleep", WeekTime::new(Weekday::Mon, NaiveTime::MIN), 360);
/// let leaf = GoalTask::new("t1").ready().with_duration(60).with_priority(5);
///
/// let request = GenerationRequest::new(vec![leaf], now).with_templates(vec![sleep]);
/// let outcome = CalendarGenerator::new().generate(&request).unwrap();
/// assert_eq!(outcome.events.len(), 2);
/// assert_eq!(outcome.packed_ids, vec!["t1".to_string()]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CalendarGenerator {
    config: PlannerConfig,
}

impl CalendarGenerator {
    /// Creates a generator with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    pub fn with_config(mut self, config: PlannerConfig) -> Self {
        self.config = config;
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Number of weeks a pass over `estimate` scans.
    pub fn weeks_to_scan(&self, estimate: &HorizonEstimate) -> i64 {
        let cap = i64::from(self.config.max_horizon_weeks);
        estimate
            .weeks_needed
            .map_or(cap, |w| w.saturating_add(1).clamp(1, cap))
    }

    /// Runs one generation pass.
    ///
    /// # Errors
    /// `InvalidConfig` if the configuration is out of range.
    pub fn generate(&self, request: &GenerationRequest) -> PlanResult<GenerationOutcome> {
        self.config.validate()?;

        let now = request.now;
        let week_start = self.config.week_start;
        let week0 = week_start_of(now, week_start);
        let estimate = HorizonEstimate::compute(&request.leaves, &request.templates);
        let weeks = self.weeks_to_scan(&estimate);
        let horizon_end = week0 + Duration::weeks(weeks);

        let mut availability = Availability::new();
        for week in -1..weeks {
            let at = week0 + Duration::weeks(week);
            for template in &request.templates {
                availability.block(template.window_in_week(at, week_start));
            }
        }

        let carried: Vec<ScheduledEvent> = request
            .calendar
            .iter()
            .filter(|e| {
                e.start < now
                    || e.locked
                    || e.task_id().is_some_and(|id| request.completed.contains(id))
            })
            .cloned()
            .collect();
        for event in &carried {
            availability.block(event.window());
        }
        let owned: HashSet<&str> = carried.iter().filter_map(ScheduledEvent::task_id).collect();
        let free_minutes = availability.free_time_in_range(now, horizon_end).num_minutes();

        let buffer = Duration::minutes(self.config.buffer_minutes);
        let mut cursor = now;
        let mut packed: Vec<ScheduledEvent> = Vec::new();
        let mut unscheduled = Vec::new();

        for leaf in &request.leaves {
            if owned.contains(leaf.id.as_str()) || leaf.duration_minutes <= 0 {
                continue;
            }
            let from = leaf.starts.map_or(cursor, |s| s.max(cursor));
            // Durations beyond the chrono range cannot fit any horizon
            let placement = Duration::try_minutes(leaf.duration_minutes).and_then(|duration| {
                let span = duration.checked_add(&buffer)?;
                let start = availability.find_gap(from, span, horizon_end)?;
                Some((start, duration, span))
            });

            match placement {
                Some((start, duration, span)) => {
                    let reserved = TimeWindow::new(start, start + span);
                    trace!(task = %leaf.id, %start, minutes = leaf.duration_minutes, "placed leaf");
                    availability.block(reserved);
                    cursor = reserved.end;
                    packed.push(
                        ScheduledEvent::new(leaf.id.clone(), leaf.title.clone(), start, start + duration)
                            .with_origin(EventOrigin::Task {
                                task_id: leaf.id.clone(),
                            }),
                    );
                }
                None => {
                    warn!(task = %leaf.id, until = %horizon_end, "leaf does not fit in horizon");
                    unscheduled.push(UnscheduledOverflow {
                        task_id: leaf.id.clone(),
                        title: leaf.title.clone(),
                        duration_minutes: leaf.duration_minutes,
                        searched_until: horizon_end,
                    });
                }
            }
        }

        let last_week = packed
            .iter()
            .map(|e| (e.start - week0).num_weeks())
            .max()
            .unwrap_or(0);
        let carried_ids: HashSet<&str> = carried.iter().map(|e| e.id.as_str()).collect();
        let mut template_events = Vec::new();
        for week in 0..=last_week {
            let at = week0 + Duration::weeks(week);
            for template in &request.templates {
                let event = template.materialize(at, week_start);
                if carried_ids.contains(event.id.as_str()) {
                    continue;
                }
                // A carried event keeps its slot over an overlapping occurrence
                if let Some(kept) = carried.iter().find(|c| c.window().overlaps(&event.window())) {
                    debug!(
                        template = %template.id,
                        carried = %kept.id,
                        "skipped overlapped template occurrence"
                    );
                    continue;
                }
                template_events.push(event);
            }
        }

        let packed_ids: Vec<String> = packed.iter().map(|e| e.id.clone()).collect();
        let mut events = carried;
        events.extend(template_events);
        events.extend(packed);
        events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));

        debug!(
            weeks,
            packed = packed_ids.len(),
            unscheduled = unscheduled.len(),
            events = events.len(),
            "generated calendar"
        );

        Ok(GenerationOutcome {
            events,
            packed_ids,
            unscheduled,
            horizon: TimeWindow::new(now, horizon_end),
            free_minutes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlanError;
    use crate::models::WeekTime;
    use chrono::TimeZone;

    fn at(day: u32, h: u32, m: u32) -> DateTime<Utc> {
        // 2026-10-12 is a Monday
        Utc.with_ymd_and_hms(2026, 10, day, h, m, 0).unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn mon(time: NaiveTime) -> WeekTime {
        WeekTime::new(Weekday::Mon, time)
    }

    fn sleep() -> EventTemplate {
        EventTemplate::new("sleep", "Sleep", mon(hm(0, 0)), 360)
    }

    fn leaf(id: &str, minutes: i64) -> GoalTask {
        GoalTask::new(id)
            .with_title(id.to_uppercase())
            .ready()
            .with_duration(minutes)
            .with_priority(5)
    }

    fn packed_windows(outcome: &GenerationOutcome) -> Vec<(String, DateTime<Utc>, DateTime<Utc>)> {
        outcome
            .packed()
            .map(|e| (e.id.clone(), e.start, e.end))
            .collect()
    }

    fn assert_no_overlap(events: &[ScheduledEvent]) {
        for (i, a) in events.iter().enumerate() {
            for b in &events[i + 1..] {
                assert!(
                    !a.window().overlaps(&b.window()),
                    "{} overlaps {}",
                    a.id,
                    b.id
                );
            }
        }
    }

    #[test]
    fn test_week_start_of() {
        assert_eq!(week_start_of(at(14, 15, 30), Weekday::Mon), at(12, 0, 0));
        assert_eq!(week_start_of(at(12, 0, 0), Weekday::Mon), at(12, 0, 0));
        assert_eq!(week_start_of(at(14, 15, 30), Weekday::Sun), at(11, 0, 0));
        assert_eq!(week_start_of(at(11, 23, 59), Weekday::Mon), at(5, 0, 0));
    }

    #[test]
    fn test_single_leaf_after_sleep() {
        let request = GenerationRequest::new(vec![leaf("t1", 60)], at(12, 7, 0))
            .with_templates(vec![sleep()]);
        let outcome = CalendarGenerator::new().generate(&request).unwrap();

        assert_eq!(outcome.events.len(), 2);
        assert_eq!(outcome.events[0].id, "sleep@2026-10-12");
        assert_eq!(outcome.events[0].start, at(12, 0, 0));
        assert_eq!(outcome.events[0].end, at(12, 6, 0));

        let packed = &outcome.events[1];
        assert_eq!(packed.id, "t1");
        assert_eq!(packed.title, "T1");
        assert_eq!(packed.start, at(12, 7, 0));
        assert_eq!(packed.end, at(12, 8, 0));
        assert_eq!(packed.task_id(), Some("t1"));
        assert!(outcome.is_complete());
    }

    #[test]
    fn test_sequential_packing_with_buffer() {
        let request = GenerationRequest::new(vec![leaf("a", 30), leaf("b", 45)], at(12, 9, 0));
        let generator =
            CalendarGenerator::new().with_config(PlannerConfig::new().with_buffer_minutes(15));
        let outcome = generator.generate(&request).unwrap();

        assert_eq!(
            packed_windows(&outcome),
            vec![
                ("a".to_string(), at(12, 9, 0), at(12, 9, 30)),
                ("b".to_string(), at(12, 9, 45), at(12, 10, 30)),
            ]
        );
    }

    #[test]
    fn test_skips_gap_too_small_for_buffer() {
        // Free 07:00-08:00, then a meeting 08:00-09:00
        let meeting = ScheduledEvent::new("m", "Meeting", at(12, 8, 0), at(12, 9, 0)).locked();
        let request = GenerationRequest::new(vec![leaf("a", 60)], at(12, 7, 0))
            .with_calendar(vec![meeting]);
        let generator =
            CalendarGenerator::new().with_config(PlannerConfig::new().with_buffer_minutes(10));
        let outcome = generator.generate(&request).unwrap();

        assert_eq!(
            packed_windows(&outcome),
            vec![("a".to_string(), at(12, 9, 0), at(12, 10, 0))]
        );
        assert!(outcome.events.iter().any(|e| e.id == "m"));
    }

    #[test]
    fn test_template_events_never_overlap_packed() {
        let templates = vec![
            EventTemplate::new("sleep", "Sleep", mon(hm(22, 0)), 540),
            EventTemplate::new("lunch", "Lunch", mon(hm(12, 0)), 60),
        ];
        let leaves: Vec<GoalTask> = (0..12).map(|i| leaf(&format!("l{i}"), 95)).collect();
        let request = GenerationRequest::new(leaves, at(12, 8, 0)).with_templates(templates);
        let outcome = CalendarGenerator::new().generate(&request).unwrap();

        assert!(outcome.is_complete());
        assert_no_overlap(&outcome.events);
        let starts: Vec<DateTime<Utc>> = outcome.events.iter().map(|e| e.start).collect();
        let mut sorted = starts.clone();
        sorted.sort();
        assert_eq!(starts, sorted);
    }

    #[test]
    fn test_previous_week_block_spills_into_target_week() {
        // Sunday 22:00 + 9h covers Monday 00:00-07:00
        let sleep = EventTemplate::new(
            "sleep",
            "Sleep",
            WeekTime::new(Weekday::Sun, hm(22, 0)),
            540,
        );
        let request =
            GenerationRequest::new(vec![leaf("a", 60)], at(12, 0, 0)).with_templates(vec![sleep]);
        let outcome = CalendarGenerator::new().generate(&request).unwrap();
        assert_eq!(
            packed_windows(&outcome),
            vec![("a".to_string(), at(12, 7, 0), at(12, 8, 0))]
        );
    }

    #[test]
    fn test_past_and_completed_events_carried() {
        let past = ScheduledEvent::new("old", "Old", at(12, 5, 0), at(12, 6, 0))
            .with_origin(EventOrigin::Task {
                task_id: "x".into(),
            });
        let done = ScheduledEvent::new("d", "Done", at(12, 10, 0), at(12, 11, 0))
            .with_origin(EventOrigin::Task {
                task_id: "d".into(),
            });
        let stale = ScheduledEvent::new("s", "Stale", at(12, 9, 0), at(12, 10, 0))
            .with_origin(EventOrigin::Task {
                task_id: "s".into(),
            });
        let request = GenerationRequest::new(vec![leaf("a", 150)], at(12, 8, 0))
            .with_calendar(vec![past, done, stale])
            .with_completed(["d"]);
        let outcome = CalendarGenerator::new().generate(&request).unwrap();

        let ids: Vec<&str> = outcome.events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["old", "d", "a"]);
        assert_eq!(
            packed_windows(&outcome),
            vec![("a".to_string(), at(12, 11, 0), at(12, 13, 30))]
        );
        assert_no_overlap(&outcome.events);
    }

    #[test]
    fn test_carried_event_suppresses_overlapping_template_occurrence() {
        let focus = EventTemplate::new("focus", "Focus", mon(hm(8, 0)), 120);
        let meeting = ScheduledEvent::new("m", "Meeting", at(12, 9, 0), at(12, 11, 0)).locked();
        let request = GenerationRequest::new(vec![leaf("a", 60)], at(12, 7, 0))
            .with_templates(vec![focus])
            .with_calendar(vec![meeting]);
        let outcome = CalendarGenerator::new().generate(&request).unwrap();

        let ids: Vec<&str> = outcome.events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "m"]);
        assert_eq!(
            packed_windows(&outcome),
            vec![("a".to_string(), at(12, 7, 0), at(12, 8, 0))]
        );
        assert_no_overlap(&outcome.events);
    }

    #[test]
    fn test_overlap_check_spans_later_weeks() {
        // Locked event in week 1 overlaps that week's occurrence only
        let busy = EventTemplate::new("busy", "Busy", mon(hm(10, 0)), 10_080 - 600);
        let trip = ScheduledEvent::new("trip", "Trip", at(20, 9, 0), at(20, 12, 0)).locked();
        let request = GenerationRequest::new(vec![leaf("a", 600), leaf("b", 60)], at(12, 0, 0))
            .with_templates(vec![busy])
            .with_calendar(vec![trip]);
        let outcome = CalendarGenerator::new().generate(&request).unwrap();

        assert!(outcome.is_complete());
        assert_eq!(
            packed_windows(&outcome),
            vec![
                ("a".to_string(), at(12, 0, 0), at(12, 10, 0)),
                ("b".to_string(), at(19, 0, 0), at(19, 1, 0)),
            ]
        );
        let template_ids: Vec<&str> = outcome
            .events
            .iter()
            .filter(|e| matches!(e.origin, EventOrigin::Template { .. }))
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(template_ids, vec!["busy@2026-10-12"]);
        assert_no_overlap(&outcome.events);
    }

    #[test]
    fn test_leaf_with_carried_event_not_repacked() {
        let running = ScheduledEvent::new("a", "A", at(12, 7, 30), at(12, 8, 30))
            .with_origin(EventOrigin::Task {
                task_id: "a".into(),
            });
        let request = GenerationRequest::new(vec![leaf("a", 60), leaf("b", 30)], at(12, 8, 0))
            .with_calendar(vec![running]);
        let outcome = CalendarGenerator::new().generate(&request).unwrap();
        assert_eq!(outcome.packed_ids, vec!["b".to_string()]);
        assert_eq!(outcome.events.len(), 2);
        assert_eq!(outcome.events[1].start, at(12, 8, 30));
    }

    #[test]
    fn test_carried_template_event_not_duplicated() {
        let earlier = sleep().materialize(at(12, 0, 0), Weekday::Mon);
        let request = GenerationRequest::new(vec![leaf("a", 60)], at(12, 7, 0))
            .with_templates(vec![sleep()])
            .with_calendar(vec![earlier]);
        let outcome = CalendarGenerator::new().generate(&request).unwrap();
        assert_eq!(
            outcome
                .events
                .iter()
                .filter(|e| e.id == "sleep@2026-10-12")
                .count(),
            1
        );
    }

    #[test]
    fn test_starts_is_earliest_bound() {
        let later = leaf("a", 60).with_starts(at(13, 9, 0));
        let request = GenerationRequest::new(vec![later, leaf("b", 30)], at(12, 8, 0));
        let outcome = CalendarGenerator::new().generate(&request).unwrap();
        assert_eq!(
            packed_windows(&outcome),
            vec![
                ("a".to_string(), at(13, 9, 0), at(13, 10, 0)),
                ("b".to_string(), at(13, 10, 0), at(13, 10, 30)),
            ]
        );
    }

    #[test]
    fn test_later_starts_delays_following_leaves() {
        // Monday morning stays free; c and d still follow a in time
        let later = leaf("a", 60).with_starts(at(14, 9, 0));
        let request = GenerationRequest::new(
            vec![leaf("b", 30), later, leaf("c", 30), leaf("d", 30)],
            at(12, 8, 0),
        );
        let generator =
            CalendarGenerator::new().with_config(PlannerConfig::new().with_buffer_minutes(5));
        let outcome = generator.generate(&request).unwrap();
        assert_eq!(
            packed_windows(&outcome),
            vec![
                ("b".to_string(), at(12, 8, 0), at(12, 8, 30)),
                ("a".to_string(), at(14, 9, 0), at(14, 10, 0)),
                ("c".to_string(), at(14, 10, 5), at(14, 10, 35)),
                ("d".to_string(), at(14, 10, 40), at(14, 11, 10)),
            ]
        );
    }

    #[test]
    fn test_huge_durations_reported_as_overflow() {
        let request = GenerationRequest::new(
            vec![
                leaf("big", 1_000_000_000_000),
                leaf("max", i64::MAX / 2),
                leaf("ok", 30),
            ],
            at(12, 9, 0),
        );
        let outcome = CalendarGenerator::new().generate(&request).unwrap();

        assert_eq!(outcome.packed_ids, vec!["ok".to_string()]);
        let overflow: Vec<(&str, i64)> = outcome
            .unscheduled
            .iter()
            .map(|u| (u.task_id.as_str(), u.duration_minutes))
            .collect();
        assert_eq!(overflow, vec![("big", 1_000_000_000_000), ("max", i64::MAX / 2)]);
        assert_eq!(outcome.horizon.end, at(12, 0, 0) + Duration::weeks(12));
    }

    #[test]
    fn test_huge_backlog_with_nearly_full_template() {
        // One free minute per week makes the raw week count i64::MAX
        let busy = EventTemplate::new("busy", "Busy", mon(hm(0, 1)), 10_080 - 1);
        let request = GenerationRequest::new(
            vec![leaf("a", i64::MAX / 2), leaf("b", i64::MAX / 2), leaf("c", 10)],
            at(12, 0, 0),
        )
        .with_templates(vec![busy]);
        let generator =
            CalendarGenerator::new().with_config(PlannerConfig::new().with_max_horizon_weeks(2));
        let outcome = generator.generate(&request).unwrap();

        assert!(outcome.packed_ids.is_empty());
        assert_eq!(outcome.unscheduled.len(), 3);
        assert_eq!(outcome.horizon.end, at(26, 0, 0));
    }

    #[test]
    fn test_overflow_reported() {
        // Template leaves one free hour per week
        let busy = EventTemplate::new("busy", "Busy", mon(hm(1, 0)), 10_080 - 60);
        let request = GenerationRequest::new(vec![leaf("a", 30), leaf("b", 90)], at(12, 0, 0))
            .with_templates(vec![busy]);
        let generator =
            CalendarGenerator::new().with_config(PlannerConfig::new().with_max_horizon_weeks(2));
        let outcome = generator.generate(&request).unwrap();

        assert_eq!(outcome.packed_ids, vec!["a".to_string()]);
        assert_eq!(outcome.unscheduled.len(), 1);
        assert_eq!(outcome.unscheduled[0].task_id, "b");
        assert_eq!(outcome.unscheduled[0].searched_until, at(26, 0, 0));
        assert!(!outcome.is_complete());
    }

    #[test]
    fn test_template_fills_week_uses_cap() {
        let full = EventTemplate::new("full", "Full", mon(hm(0, 0)), 10_080);
        let request =
            GenerationRequest::new(vec![leaf("a", 30)], at(12, 9, 0)).with_templates(vec![full]);
        let generator =
            CalendarGenerator::new().with_config(PlannerConfig::new().with_max_horizon_weeks(3));
        let outcome = generator.generate(&request).unwrap();

        assert_eq!(outcome.horizon.end, at(12, 0, 0) + Duration::weeks(3));
        assert_eq!(outcome.unscheduled.len(), 1);
        assert_eq!(outcome.free_minutes, 0);
        // Only the target week is materialized when nothing was packed
        assert_eq!(outcome.events.len(), 1);
    }

    #[test]
    fn test_templates_emitted_through_last_packed_week() {
        // 10 free hours per week (Mon 00:00-10:00)
        let busy = EventTemplate::new("busy", "Busy", mon(hm(10, 0)), 10_080 - 600);
        let leaves = vec![leaf("a", 600), leaf("b", 600)];
        let request = GenerationRequest::new(leaves, at(12, 0, 0)).with_templates(vec![busy]);
        let outcome = CalendarGenerator::new().generate(&request).unwrap();

        assert!(outcome.is_complete());
        assert_eq!(
            packed_windows(&outcome),
            vec![
                ("a".to_string(), at(12, 0, 0), at(12, 10, 0)),
                ("b".to_string(), at(19, 0, 0), at(19, 10, 0)),
            ]
        );
        let template_ids: Vec<&str> = outcome
            .events
            .iter()
            .filter(|e| matches!(e.origin, EventOrigin::Template { .. }))
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(template_ids, vec!["busy@2026-10-12", "busy@2026-10-19"]);
        assert_no_overlap(&outcome.events);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let generator =
            CalendarGenerator::new().with_config(PlannerConfig::new().with_buffer_minutes(500));
        let request = GenerationRequest::new(vec![], at(12, 0, 0));
        assert!(matches!(
            generator.generate(&request),
            Err(PlanError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_empty_request() {
        let outcome = CalendarGenerator::new()
            .generate(&GenerationRequest::new(vec![], at(12, 9, 0)))
            .unwrap();
        assert!(outcome.events.is_empty());
        assert!(outcome.is_complete());
        assert_eq!(outcome.horizon.end, at(19, 0, 0));
    }
}
