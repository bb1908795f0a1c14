//! Personal time-planning core.
//!
//! Maintains a goal/task forest whose leaves form ordered dependency
//! chains, ranks the schedulable leaves by deadline urgency, packs them into
//! the free time left by a weekly template, and diffs snapshots for
//! external persistence.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `GoalTask`, `EventTemplate`, `ScheduledEvent`,
//!   `TimeWindow`, `Availability`, `Snapshot`
//! - **`graph`**: Forest and chain operations (add, delete, move, sort)
//! - **`validation`**: Input integrity checks (duplicate IDs, parent cycles, chain shape)
//! - **`priority`**: Horizon estimate and urgency ranking
//! - **`scheduler`**: Weekly calendar generation and plan KPIs
//! - **`sync`**: Create/update/destroy diffs and ordered persistence
//! - **`planner`**: One-call generation pass over a snapshot
//!
//! # Data Flow
//!
//! ```text
//! graph (mutate) → priority (rank) → scheduler (pack) → sync (persist)
//! ```
//!
//! Every stage is a pure function over snapshots; the host owns state.

pub mod config;
pub mod error;
pub mod graph;
pub mod models;
pub mod planner;
pub mod priority;
pub mod scheduler;
pub mod sync;
pub mod validation;

pub use config::PlannerConfig;
pub use error::{PlanError, PlanResult};
pub use planner::Planner;
