//! Input validation for planning snapshots.
//!
//! Checks structural integrity of the goal/task forest, the weekly
//! template, and the calendar before ranking or packing. Unlike the graph
//! operations, which stop at the first problem, this pass collects every
//! issue it finds. Detects:
//! - Duplicate IDs
//! - Dangling parent and dependency references
//! - Parent cycles
//! - Out-of-range priorities and negative durations
//! - Ordering chain violations (forks, cycles, non-contiguous subtrees)
//! - Inverted calendar events and non-positive template durations

use std::collections::{HashMap, HashSet};

use crate::graph::TaskArena;
use crate::models::{EventTemplate, GoalTask, ScheduledEvent, Snapshot, MINUTES_PER_WEEK};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A node names a parent that doesn't exist.
    InvalidParent,
    /// A node names a dependency that doesn't exist.
    InvalidDependency,
    /// The parent relation contains a cycle.
    CyclicParent,
    /// The ordering chain is broken.
    BrokenChain,
    /// A numeric field is out of range.
    OutOfRange,
    /// An event ends before it starts.
    InvertedEvent,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the goal/task forest.
///
/// Checks:
/// 1. No duplicate IDs
/// 2. All parent and dependency references resolve
/// 3. No parent cycles
/// 4. Priorities within 0..=10, durations non-negative
/// 5. Chain invariants (only when 1–3 pass)
pub fn validate_forest(tasks: &[GoalTask]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut ids = HashSet::new();
    for task in tasks {
        if !ids.insert(task.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate task ID: {}", task.id),
            ));
        }
        if task.priority > GoalTask::MAX_PRIORITY {
            errors.push(ValidationError::new(
                ValidationErrorKind::OutOfRange,
                format!("Task '{}' has priority {} (max 10)", task.id, task.priority),
            ));
        }
        if task.duration_minutes < 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::OutOfRange,
                format!("Task '{}' has negative duration", task.id),
            ));
        }
    }

    for task in tasks {
        if let Some(parent) = &task.parent_id {
            if !ids.contains(parent.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidParent,
                    format!("Task '{}' references unknown parent '{}'", task.id, parent),
                ));
            }
        }
        if let Some(dep) = &task.dependency {
            if !ids.contains(dep.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidDependency,
                    format!("Task '{}' references unknown dependency '{}'", task.id, dep),
                ));
            }
        }
    }

    if let Some(cycle_err) = detect_parent_cycles(tasks) {
        errors.push(cycle_err);
    }

    if errors.is_empty() {
        match TaskArena::from_tasks(tasks) {
            Ok(arena) => errors.extend(
                arena
                    .chain_violations()
                    .into_iter()
                    .map(|v| ValidationError::new(ValidationErrorKind::BrokenChain, v)),
            ),
            Err(err) => errors.push(ValidationError::new(
                ValidationErrorKind::BrokenChain,
                err.to_string(),
            )),
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates template blocks: unique IDs, durations within one week.
pub fn validate_template(templates: &[EventTemplate]) -> ValidationResult {
    let mut errors = Vec::new();
    let mut ids = HashSet::new();
    for t in templates {
        if !ids.insert(t.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate template ID: {}", t.id),
            ));
        }
        if t.duration_minutes <= 0 || t.duration_minutes > MINUTES_PER_WEEK {
            errors.push(ValidationError::new(
                ValidationErrorKind::OutOfRange,
                format!(
                    "Template '{}' has duration {} minutes",
                    t.id, t.duration_minutes
                ),
            ));
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates calendar events: unique IDs, `end >= start`.
pub fn validate_calendar(events: &[ScheduledEvent]) -> ValidationResult {
    let mut errors = Vec::new();
    let mut ids = HashSet::new();
    for e in events {
        if !ids.insert(e.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate event ID: {}", e.id),
            ));
        }
        if e.end < e.start {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvertedEvent,
                format!("Event '{}' ends before it starts", e.id),
            ));
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Runs every check over a snapshot.
pub fn validate_snapshot(snapshot: &Snapshot) -> ValidationResult {
    let mut errors = Vec::new();
    for result in [
        validate_forest(&snapshot.goals),
        validate_template(&snapshot.template),
        validate_calendar(&snapshot.calendar),
    ] {
        if let Err(mut e) = result {
            errors.append(&mut e);
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Detects cycles in the parent relation.
///
/// Each node walks upward; a walk that returns to a node already on the
/// current path is a cycle.
fn detect_parent_cycles(tasks: &[GoalTask]) -> Option<ValidationError> {
    let parent_of: HashMap<&str, &str> = tasks
        .iter()
        .filter_map(|t| t.parent_id.as_deref().map(|p| (t.id.as_str(), p)))
        .collect();

    let mut cleared: HashSet<&str> = HashSet::new();
    for task in tasks {
        let mut path = HashSet::new();
        let mut cur = Some(task.id.as_str());
        while let Some(node) = cur {
            if cleared.contains(node) {
                break;
            }
            if !path.insert(node) {
                return Some(ValidationError::new(
                    ValidationErrorKind::CyclicParent,
                    format!("Parent cycle detected involving task '{node}'"),
                ));
            }
            cur = parent_of.get(node).copied();
        }
        cleared.extend(path);
    }
    None
}
