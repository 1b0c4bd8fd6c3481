//! Read-only projection over the audit log.

use crate::status::{
    domain::{
        AuditChainError, AuditRecord, ChainReport, ParseTrackError, TaskId, Track, verify_chain,
    },
    ports::{AuditLog, StatusStoreError, TrackStateStore},
};
use std::sync::Arc;
use thiserror::Error;

/// Selects the audit records to return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    task_id: TaskId,
    track: Option<String>,
    limit: Option<usize>,
}

impl HistoryQuery {
    /// Selects every track of a task.
    #[must_use]
    pub const fn for_task(task_id: TaskId) -> Self {
        Self {
            task_id,
            track: None,
            limit: None,
        }
    }

    /// Restricts the query to one track.
    #[must_use]
    pub fn with_track(mut self, track: impl Into<String>) -> Self {
        self.track = Some(track.into());
        self
    }

    /// Keeps only the newest `limit` records.
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Ordered audit trail: newest first, equal timestamps by insertion order.
///
/// The sequence is finite and can be walked any number of times.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    records: Vec<AuditRecord>,
}

impl History {
    fn from_records(mut records: Vec<AuditRecord>, limit: Option<usize>) -> Self {
        records.sort_by(AuditRecord::history_order);
        if let Some(max) = limit {
            records.truncate(max);
        }
        Self { records }
    }

    /// Iterates the records in history order.
    pub fn iter(&self) -> std::slice::Iter<'_, AuditRecord> {
        self.records.iter()
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` when no transition has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the newest record.
    #[must_use]
    pub fn latest(&self) -> Option<&AuditRecord> {
        self.records.first()
    }

    /// Consumes the history, returning the records in history order.
    #[must_use]
    pub fn into_vec(self) -> Vec<AuditRecord> {
        self.records
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a AuditRecord;
    type IntoIter = std::slice::Iter<'a, AuditRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for History {
    type Item = AuditRecord;
    type IntoIter = std::vec::IntoIter<AuditRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

/// Errors returned by the history reader.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// The track name is not a known track.
    #[error(transparent)]
    InvalidTrack(#[from] ParseTrackError),

    /// The stored chain failed verification.
    #[error(transparent)]
    Chain(#[from] AuditChainError),

    /// Storage operation failed.
    #[error(transparent)]
    Storage(#[from] StatusStoreError),
}

/// Result type for history reader operations.
pub type HistoryResult<T> = Result<T, HistoryError>;

/// Read-only access to the transition history of tasks.
#[derive(Clone)]
pub struct HistoryReader<L>
where
    L: AuditLog,
{
    log: Arc<L>,
}

impl<L> HistoryReader<L>
where
    L: AuditLog,
{
    /// Creates a history reader over an audit log.
    #[must_use]
    pub const fn new(log: Arc<L>) -> Self {
        Self { log }
    }

    /// Returns the audit trail selected by `query`.
    ///
    /// Tasks with no recorded transitions, including unknown tasks, yield an
    /// empty history.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::InvalidTrack`] for an unknown track name, or
    /// [`HistoryError::Storage`] on storage faults.
    pub async fn history(&self, query: HistoryQuery) -> HistoryResult<History> {
        let HistoryQuery {
            task_id,
            track: raw_track,
            limit,
        } = query;
        let track = raw_track
            .as_deref()
            .map(Track::try_from)
            .transpose()?;

        let records = self.log.list_by_task(task_id, track).await?;
        Ok(History::from_records(records, limit))
    }

    /// Replays and checks the digest chain of one track.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Chain`] describing the first inconsistency,
    /// or [`HistoryError::Storage`] on storage faults.
    pub async fn verify(&self, task_id: TaskId, track: Track) -> HistoryResult<ChainReport> {
        let records = self.log.list_by_task(task_id, Some(track)).await?;
        let report = verify_chain(&records)?;
        tracing::debug!(
            task_id = %task_id,
            track = %track,
            records = report.records,
            "verified audit chain"
        );
        Ok(report)
    }
}

impl<L> HistoryReader<L>
where
    L: AuditLog + TrackStateStore,
{
    /// Verifies one track's chain and checks it ends in the stored state.
    ///
    /// This catches truncation at the head of the chain, which
    /// [`HistoryReader::verify`] alone cannot see.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Chain`] for any chain inconsistency, including
    /// [`AuditChainError::StateMismatch`], or [`HistoryError::Storage`] when
    /// the track cannot be read.
    pub async fn verify_current(
        &self,
        task_id: TaskId,
        track: Track,
    ) -> HistoryResult<ChainReport> {
        let report = self.verify(task_id, track).await?;
        let current = self.log.read(task_id, track).await?;
        if let Err(err) = report.confirm_current(&current) {
            tracing::warn!(
                task_id = %task_id,
                track = %track,
                error = %err,
                "audit chain disagrees with stored track state"
            );
            return Err(err.into());
        }
        Ok(report)
    }
}
