//! Atomic unit of work behind every track transition.
//!
//! A guarded write reads the current status of one `(task, track)` key,
//! hands it to a planning closure, and, if the closure returns a plan,
//! writes the new status and appends the audit record before anyone else can
//! touch that key. Either both writes become visible or neither does.

use super::{AuditLog, StatusStoreResult, TrackStateStore};
use crate::status::domain::{AuditRecord, PendingAuditRecord, TaskId, Track, TrackStatus};
use async_trait::async_trait;

/// The two writes a committed transition performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedTransition {
    /// Status to store for the key.
    pub status: TrackStatus,
    /// Audit entry to append for the key.
    pub record: PendingAuditRecord,
}

/// Result of a guarded write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardedWrite {
    /// Both writes committed.
    Committed {
        /// Status now stored for the key.
        status: TrackStatus,
        /// Audit record appended for the key.
        record: AuditRecord,
    },
    /// The planning closure declined; nothing was written.
    Declined {
        /// Status found at the time of the read.
        actual: TrackStatus,
    },
}

/// Store that can read, compare, and write a track as one serialized unit.
#[async_trait]
pub trait TransitionStore: TrackStateStore + AuditLog {
    /// Runs `plan` against the current status of `(task_id, track)` and
    /// commits its result atomically.
    ///
    /// No other guarded write on the same key may commit between the read
    /// and the writes. The planner must be pure; it may run while a lock or
    /// transaction is held.
    ///
    /// # Errors
    ///
    /// Returns [`StatusStoreError::TaskNotFound`](super::StatusStoreError::TaskNotFound)
    /// or [`StatusStoreError::TrackNotFound`](super::StatusStoreError::TrackNotFound)
    /// when the key does not exist, and
    /// [`StatusStoreError::Persistence`](super::StatusStoreError::Persistence)
    /// on storage faults, in which case nothing was written.
    async fn apply_guarded<F>(
        &self,
        task_id: TaskId,
        track: Track,
        plan: F,
    ) -> StatusStoreResult<GuardedWrite>
    where
        F: FnOnce(&TrackStatus) -> Option<PlannedTransition> + Send + 'static;
}
