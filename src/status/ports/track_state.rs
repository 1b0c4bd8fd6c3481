//! Store port for the current state of each task's review tracks.

use crate::status::domain::{TaskId, TaskStatus, Track, TrackStatus};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for status store operations.
pub type StatusStoreResult<T> = Result<T, StatusStoreError>;

/// Current track state persistence contract.
#[async_trait]
pub trait TrackStateStore: Send + Sync {
    /// Stores a freshly seeded task status.
    ///
    /// # Errors
    ///
    /// Returns [`StatusStoreError::DuplicateTask`] when the task already has
    /// a status record.
    async fn initialize(&self, status: &TaskStatus) -> StatusStoreResult<()>;

    /// Reads the current status of one track.
    ///
    /// # Errors
    ///
    /// Returns [`StatusStoreError::TaskNotFound`] when the task has no status
    /// record or [`StatusStoreError::TrackNotFound`] when the track is absent.
    async fn read(&self, task_id: TaskId, track: Track) -> StatusStoreResult<TrackStatus>;

    /// Reads the status of every track of a task.
    ///
    /// # Errors
    ///
    /// Returns [`StatusStoreError::TaskNotFound`] when the task has no status
    /// record.
    async fn read_all(&self, task_id: TaskId) -> StatusStoreResult<TaskStatus>;

    /// Unconditionally overwrites one track's status.
    ///
    /// This bypasses the compare-and-swap guard and writes no audit record.
    /// Outside of adapters and fixtures, state changes must go through
    /// [`TransitionStore::apply_guarded`](super::TransitionStore::apply_guarded).
    ///
    /// # Errors
    ///
    /// Returns [`StatusStoreError::TaskNotFound`] or
    /// [`StatusStoreError::TrackNotFound`] when the target does not exist.
    async fn write(
        &self,
        task_id: TaskId,
        track: Track,
        status: &TrackStatus,
    ) -> StatusStoreResult<()>;
}

/// Errors returned by status store implementations.
#[derive(Debug, Clone, Error)]
pub enum StatusStoreError {
    /// The task has no status record.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The task exists but the track has no status row.
    #[error("track {track} not found for task {task_id}")]
    TrackNotFound {
        /// Task that was looked up.
        task_id: TaskId,
        /// Missing track.
        track: Track,
    },

    /// The task already has a status record.
    #[error("duplicate task status: {0}")]
    DuplicateTask(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl StatusStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
