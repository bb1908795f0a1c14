//! Ordered delivery of snapshot diffs to a persistence sink.

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use super::{diff_snapshots, SnapshotDiff};
use crate::models::Snapshot;

/// Host-side persistence contract.
pub trait PersistenceSink {
    /// Error reported when a diff is rejected.
    type Error: StdError + Send + Sync + 'static;

    /// Persists one diff. Either all of it is applied or none.
    ///
    /// # Errors
    ///
    /// Returns the sink's error when the diff cannot be persisted.
    fn apply(&mut self, diff: &SnapshotDiff) -> Result<(), Self::Error>;
}

/// Errors returned by [`SyncQueue::flush`].
#[derive(Debug, Clone, Error)]
pub enum SyncError {
    /// The sink rejected a diff. Pending snapshots were dropped.
    #[error("persistence rejected diff ({discarded} snapshot(s) discarded): {cause}")]
    Rejected {
        /// The sink's error.
        cause: Arc<dyn StdError + Send + Sync>,
        /// Last snapshot the sink acknowledged; the host should roll back to it.
        rollback: Box<Snapshot>,
        /// Number of snapshots dropped, including the rejected one.
        discarded: usize,
    },
}

/// Queue of snapshots awaiting persistence.
///
/// Snapshots are diffed against the last acknowledged one and applied in
/// submission order, one at a time.
#[derive(Debug, Clone, Default)]
pub struct SyncQueue {
    acknowledged: Snapshot,
    pending: VecDeque<Snapshot>,
}

impl SyncQueue {
    /// Creates a queue whose sink already holds `acknowledged`.
    pub fn new(acknowledged: Snapshot) -> Self {
        Self {
            acknowledged,
            pending: VecDeque::new(),
        }
    }

    /// Queues a snapshot.
    pub fn submit(&mut self, snapshot: Snapshot) {
        self.pending.push_back(snapshot);
    }

    /// Number of queued snapshots.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Last snapshot the sink accepted.
    pub fn acknowledged(&self) -> &Snapshot {
        &self.acknowledged
    }

    /// Drops every queued snapshot except the newest. Returns how many were
    /// dropped.
    pub fn coalesce(&mut self) -> usize {
        let dropped = self.pending.len().saturating_sub(1);
        if dropped > 0 {
            self.pending.drain(..dropped);
            debug!(dropped, "coalesced pending snapshots");
        }
        dropped
    }

    /// Delivers queued snapshots in order. Returns the number of diffs the
    /// sink applied; snapshots identical to the acknowledged one are
    /// acknowledged without calling the sink.
    ///
    /// # Errors
    ///
    /// [`SyncError::Rejected`] when the sink fails. The queue is cleared and
    /// the acknowledged snapshot is left unchanged.
    pub fn flush<S: PersistenceSink>(&mut self, sink: &mut S) -> Result<usize, SyncError> {
        let mut applied = 0;
        while let Some(next) = self.pending.pop_front() {
            let diff = diff_snapshots(&self.acknowledged, &next);
            if diff.is_empty() {
                self.acknowledged = next;
                continue;
            }
            match sink.apply(&diff) {
                Ok(()) => {
                    debug!(changes = diff.len(), "sink acknowledged diff");
                    self.acknowledged = next;
                    applied += 1;
                }
                Err(err) => {
                    let discarded = self.pending.len() + 1;
                    self.pending.clear();
                    warn!(error = %err, discarded, "sink rejected diff, rolling back");
                    return Err(SyncError::Rejected {
                        cause: Arc::new(err),
                        rollback: Box::new(self.acknowledged.clone()),
                        discarded,
                    });
                }
            }
        }
        Ok(applied)
    }
}
