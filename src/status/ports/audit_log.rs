//! Append-only audit log port.

use super::StatusStoreResult;
use crate::status::domain::{AuditRecord, SealedAuditRecord, TaskId, Track};
use async_trait::async_trait;

/// Append-only audit record persistence contract.
///
/// The log exposes no update or delete operation.
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Appends one sealed record and returns it with its assigned id.
    ///
    /// The record must already be linked to the current chain head; see
    /// [`AuditLog::chain_head`]. Outside of adapters, records are appended
    /// by [`TransitionStore::apply_guarded`](super::TransitionStore::apply_guarded).
    ///
    /// # Errors
    ///
    /// Returns [`StatusStoreError::Persistence`](super::StatusStoreError::Persistence)
    /// on storage-layer faults.
    async fn append(&self, record: SealedAuditRecord) -> StatusStoreResult<AuditRecord>;

    /// Returns the newest record on `(task_id, track)`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StatusStoreError::Persistence`](super::StatusStoreError::Persistence)
    /// on storage-layer faults.
    async fn chain_head(
        &self,
        task_id: TaskId,
        track: Track,
    ) -> StatusStoreResult<Option<AuditRecord>>;

    /// Lists the records of a task, optionally restricted to one track.
    ///
    /// Records are ordered newest first by `changed_at`; equal timestamps
    /// are ordered by ascending id. Unknown tasks yield an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`StatusStoreError::Persistence`](super::StatusStoreError::Persistence)
    /// on storage-layer faults.
    async fn list_by_task(
        &self,
        task_id: TaskId,
        track: Option<Track>,
    ) -> StatusStoreResult<Vec<AuditRecord>>;
}
