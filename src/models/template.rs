//! Recurring weekly template blocks.
//!
//! A template block is a fixed weekly commitment (sleep, meals, commute)
//! that is never available for packing. It is anchored to a weekday and a
//! time of day and is materialized into concrete events per week.

use chrono::{DateTime, Duration, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use super::{EventOrigin, ScheduledEvent, TimeWindow};

/// Minutes in one week.
pub const MINUTES_PER_WEEK: i64 = 7 * 24 * 60;

/// A weekday plus a time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekTime {
    /// Day of the week.
    pub weekday: Weekday,
    /// Time of day (UTC).
    pub time: NaiveTime,
}

impl WeekTime {
    /// Creates a week time.
    pub fn new(weekday: Weekday, time: NaiveTime) -> Self {
        Self { weekday, time }
    }

    /// Minutes from the start of a week beginning on `week_start`.
    pub fn offset_minutes(&self, week_start: Weekday) -> i64 {
        let days = i64::from(self.weekday.days_since(week_start));
        let since_midnight = self.time.signed_duration_since(NaiveTime::MIN);
        days * 24 * 60 + since_midnight.num_minutes()
    }
}

/// A recurring weekly block of unavailable time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTemplate {
    /// Unique identifier.
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// Weekly anchor.
    pub start: WeekTime,
    /// Length in minutes.
    pub duration_minutes: i64,
}

impl EventTemplate {
    /// Creates a template block.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        start: WeekTime,
        duration_minutes: i64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            start,
            duration_minutes,
        }
    }

    /// Concrete interval of this block for the week starting at `week_start_at`.
    ///
    /// `week_start_at` must fall on `week_start`; blocks running past the end
    /// of the week simply extend into the next one.
    pub fn window_in_week(&self, week_start_at: DateTime<Utc>, week_start: Weekday) -> TimeWindow {
        let start = week_start_at + Duration::minutes(self.start.offset_minutes(week_start));
        TimeWindow::new(start, start + Duration::minutes(self.weekly_minutes()))
    }

    /// Duration clamped to `0..=MINUTES_PER_WEEK`.
    pub fn weekly_minutes(&self) -> i64 {
        self.duration_minutes.clamp(0, MINUTES_PER_WEEK)
    }

    /// Materializes the block as a calendar event for one week.
    pub fn materialize(&self, week_start_at: DateTime<Utc>, week_start: Weekday) -> ScheduledEvent {
        let window = self.window_in_week(week_start_at, week_start);
        ScheduledEvent::new(
            format!("{}@{}", self.id, window.start.date_naive()),
            self.title.clone(),
            window.start,
            window.end,
        )
        .with_origin(EventOrigin::Template {
            template_id: self.id.clone(),
        })
        .with_recurrence(format!("FREQ=WEEKLY;BYDAY={}", byday(self.start.weekday)))
    }
}

fn byday(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

/// Total template minutes per week.
pub fn total_template_minutes(templates: &[EventTemplate]) -> i64 {
    templates
        .iter()
        .fold(0i64, |acc, t| acc.saturating_add(t.weekly_minutes()))
}
