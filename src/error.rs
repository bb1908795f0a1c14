//! Crate-wide error type.

use thiserror::Error;

/// Errors returned by graph mutations, ranking, and calendar generation.
///
/// Graph operations are all-or-nothing: whenever one of these is returned
/// the caller's collection is left exactly as it was supplied.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlanError {
    /// The parent relation or a dependency chain violates the forest/chain
    /// invariants. Signals earlier corruption; never repaired silently.
    #[error("graph inconsistency: {detail}")]
    GraphInconsistency {
        /// What was found.
        detail: String,
    },

    /// A referenced id is absent from the supplied collection.
    #[error("no node with id '{id}'")]
    NotFound {
        /// The missing id.
        id: String,
    },

    /// The move target lies inside the subtree being moved.
    #[error("cannot move '{moved}' relative to '{target}', which is inside the moved subtree")]
    InvalidMove {
        /// Root of the subtree being moved.
        moved: String,
        /// Requested anchor.
        target: String,
    },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PlanError {
    pub(crate) fn inconsistency(detail: impl Into<String>) -> Self {
        Self::GraphInconsistency {
            detail: detail.into(),
        }
    }

    pub(crate) fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }
}

/// Result alias used throughout the crate.
pub type PlanResult<T> = Result<T, PlanError>;
