//! Time windows and free-time bookkeeping.
//!
//! # Time Model
//! All instants are UTC. Windows are half-open: `[start, end)`.
//!
//! # Availability
//! Time is free unless it falls inside a blocked window. Blocked windows
//! are kept sorted and merged, so gap search is a single forward scan.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A time interval [start, end).
///
/// Half-open interval: includes start, excludes end.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeWindow {
    /// Interval start (inclusive).
    pub start: DateTime<Utc>,
    /// Interval end (exclusive).
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a new time window.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Length of this window.
    #[inline]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Length in whole minutes.
    #[inline]
    pub fn duration_minutes(&self) -> i64 {
        self.duration().num_minutes()
    }

    /// Whether an instant falls within this window.
    #[inline]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at < self.end
    }

    /// Whether two windows overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether the window is empty or inverted.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Free/busy tracker over blocked windows.
#[derive(Debug, Clone, Default)]
pub struct Availability {
    blocked: Vec<TimeWindow>,
}

impl Availability {
    /// Creates a tracker with nothing blocked.
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks a window. Empty windows are ignored.
    pub fn block(&mut self, window: TimeWindow) {
        if window.is_empty() {
            return;
        }
        let pos = self.blocked.partition_point(|w| w.start <= window.start);
        self.blocked.insert(pos, window);
        self.merge();
    }

    /// Adds a blocked window (builder form).
    pub fn with_blocked(mut self, window: TimeWindow) -> Self {
        self.block(window);
        self
    }

    fn merge(&mut self) {
        let mut merged: Vec<TimeWindow> = Vec::with_capacity(self.blocked.len());
        for w in self.blocked.drain(..) {
            match merged.last_mut() {
                Some(last) if w.start <= last.end => {
                    if w.end > last.end {
                        last.end = w.end;
                    }
                }
                _ => merged.push(w),
            }
        }
        self.blocked = merged;
    }

    /// Blocked windows, sorted and merged.
    pub fn blocked(&self) -> &[TimeWindow] {
        &self.blocked
    }

    /// Whether an instant is free.
    pub fn is_free(&self, at: DateTime<Utc>) -> bool {
        !self.blocked.iter().any(|w| w.contains(at))
    }

    /// Whether a whole window is free.
    pub fn is_window_free(&self, window: &TimeWindow) -> bool {
        !self.blocked.iter().any(|w| w.overlaps(window))
    }

    /// Earliest free instant at or after `from`.
    pub fn next_free_time(&self, from: DateTime<Utc>) -> DateTime<Utc> {
        let mut at = from;
        for w in &self.blocked {
            if w.contains(at) {
                at = w.end;
            }
        }
        at
    }

    /// Finds the earliest start `s >= from` such that `[s, s + length)` is
    /// free and ends no later than `until`.
    ///
    /// Returns `None` if no such gap exists before `until`, including when
    /// `length` runs past the representable time range.
    pub fn find_gap(
        &self,
        from: DateTime<Utc>,
        length: Duration,
        until: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        let mut candidate = from;
        let mut end = candidate.checked_add_signed(length)?;
        for w in &self.blocked {
            if w.end <= candidate {
                continue;
            }
            if w.start >= end {
                break;
            }
            candidate = w.end;
            end = candidate.checked_add_signed(length)?;
            if end > until {
                return None;
            }
        }
        (end <= until).then_some(candidate)
    }

    /// Total free time within `[start, end)`.
    pub fn free_time_in_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Duration {
        if end <= start {
            return Duration::zero();
        }
        let range = TimeWindow::new(start, end);
        let blocked = self
            .blocked
            .iter()
            .filter_map(|w| overlap_duration(&range, w))
            .fold(Duration::zero(), |acc, d| acc + d);
        range.duration() - blocked
    }
}

/// Overlap length between two windows.
fn overlap_duration(a: &TimeWindow, b: &TimeWindow) -> Option<Duration> {
    let start = a.start.max(b.start);
    let end = a.end.min(b.end);
    if end > start {
        Some(end - start)
    } else {
        None
    }
}
