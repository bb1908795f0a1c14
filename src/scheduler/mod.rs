//! Calendar generation and plan KPI evaluation.
//!
//! Packs ranked leaves into the free time left by the weekly template and
//! existing calendar, and scores the result.
//!
//! # Algorithm
//!
//! `CalendarGenerator` uses a greedy, urgency-ordered, earliest-gap
//! heuristic over a bounded horizon. It is not optimal, but it is
//! deterministic and fast.
//!
//! # KPI
//!
//! `PlanKpi` computes packed minutes, deadline misses, tardiness, on-time
//! rate, free-time utilization, and makespan.

mod generator;
mod kpi;

pub use generator::{
    week_start_of, CalendarGenerator, GenerationOutcome, GenerationRequest, UnscheduledOverflow,
};
pub use kpi::PlanKpi;
