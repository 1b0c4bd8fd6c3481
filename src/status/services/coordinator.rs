//! Transition coordinator: validated, audited, compare-and-swap track changes.
//!
//! A transition names the state the caller believes the track is in. The
//! coordinator validates the request, then asks the store to compare that
//! expectation with the stored state and, only on a match, write the new
//! state and append the audit record as one unit. A mismatch is reported as
//! [`TransitionError::Conflict`] with the actual state so the caller can
//! re-read and decide whether to retry; the coordinator never retries.

use crate::status::{
    domain::{
        Actor, AuditRecord, ParseTrackError, ParseTrackStateError, PendingAuditRecord, Remark,
        StatusDomainError, TaskId, TaskStatus, Track, TrackState, TrackStatus,
    },
    ports::{GuardedWrite, PlannedTransition, StatusStoreError, TransitionStore},
    services::StatusServiceConfig,
};
use chrono::SubsecRound;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Request to move one track of a task from an expected state to a new one.
///
/// Fields are raw strings; parsing and validation happen in
/// [`TransitionCoordinator::transition`] so that bad input surfaces as a
/// validation error rather than a panic at the call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRequest {
    task_id: TaskId,
    track: String,
    expected_state: String,
    new_state: String,
    remark: String,
    actor: String,
}

impl TransitionRequest {
    /// Creates a transition request.
    #[must_use]
    pub fn new(
        task_id: TaskId,
        track: impl Into<String>,
        expected_state: impl Into<String>,
        new_state: impl Into<String>,
        remark: impl Into<String>,
        actor: impl Into<String>,
    ) -> Self {
        Self {
            task_id,
            track: track.into(),
            expected_state: expected_state.into(),
            new_state: new_state.into(),
            remark: remark.into(),
            actor: actor.into(),
        }
    }

    /// Returns the target task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }
}

/// A request that passed validation.
struct ValidatedTransition {
    task_id: TaskId,
    track: Track,
    expected: TrackState,
    target: TrackState,
    remark: Remark,
    actor: Actor,
}

/// Result of a committed transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionOutcome {
    task_id: TaskId,
    track: Track,
    status: TrackStatus,
    record: AuditRecord,
}

impl TransitionOutcome {
    /// Returns the task that changed.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the track that changed.
    #[must_use]
    pub const fn track(&self) -> Track {
        self.track
    }

    /// Returns the track's new status.
    #[must_use]
    pub const fn status(&self) -> &TrackStatus {
        &self.status
    }

    /// Returns the audit record appended for the change.
    #[must_use]
    pub const fn record(&self) -> &AuditRecord {
        &self.record
    }
}

/// Failure categories callers are expected to branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionErrorKind {
    /// The task or track does not exist. Not retryable.
    NotFound,
    /// The input was rejected. The caller must correct it.
    Validation,
    /// The expected state was stale. Re-read, then decide whether to retry.
    Conflict,
    /// Transient storage fault. Nothing was applied; the caller may retry.
    StorageFailure,
}

/// Service-level errors for track status operations.
#[derive(Debug, Error)]
pub enum TransitionError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] StatusDomainError),

    /// The track name is not a known track.
    #[error(transparent)]
    InvalidTrack(#[from] ParseTrackError),

    /// A state name is not a known track state.
    #[error(transparent)]
    InvalidState(#[from] ParseTrackStateError),

    /// The task has no status record.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The task has no status row for the track.
    #[error("track {track} not found for task {task_id}")]
    TrackNotFound {
        /// Task that was addressed.
        task_id: TaskId,
        /// Missing track.
        track: Track,
    },

    /// Track states were already seeded for the task.
    #[error("track states already initialized for task {0}")]
    AlreadyInitialized(TaskId),

    /// The caller's expected state does not match the stored state.
    #[error("task {task_id} track {track} is '{actual}', caller expected '{expected}'")]
    Conflict {
        /// Task that was addressed.
        task_id: TaskId,
        /// Track that was addressed.
        track: Track,
        /// State the caller assumed.
        expected: TrackState,
        /// Status actually stored at commit time.
        actual: TrackStatus,
    },

    /// Storage operation failed.
    #[error(transparent)]
    Storage(StatusStoreError),
}

impl TransitionError {
    /// Classifies the error into the caller-facing taxonomy.
    #[must_use]
    pub const fn kind(&self) -> TransitionErrorKind {
        match self {
            Self::TaskNotFound(_) | Self::TrackNotFound { .. } => TransitionErrorKind::NotFound,
            Self::Domain(_)
            | Self::InvalidTrack(_)
            | Self::InvalidState(_)
            | Self::AlreadyInitialized(_) => TransitionErrorKind::Validation,
            Self::Conflict { .. } => TransitionErrorKind::Conflict,
            Self::Storage(_) => TransitionErrorKind::StorageFailure,
        }
    }

    /// Returns `true` when resubmitting the same request may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.kind(), TransitionErrorKind::StorageFailure)
    }

    /// Returns the stored status attached to a conflict.
    #[must_use]
    pub const fn actual_status(&self) -> Option<&TrackStatus> {
        match self {
            Self::Conflict { actual, .. } => Some(actual),
            _ => None,
        }
    }
}

impl From<StatusStoreError> for TransitionError {
    fn from(err: StatusStoreError) -> Self {
        match err {
            StatusStoreError::TaskNotFound(task_id) => Self::TaskNotFound(task_id),
            StatusStoreError::TrackNotFound { task_id, track } => {
                Self::TrackNotFound { task_id, track }
            }
            StatusStoreError::DuplicateTask(task_id) => Self::AlreadyInitialized(task_id),
            StatusStoreError::Persistence(_) => Self::Storage(err),
        }
    }
}

/// Result type for transition coordinator operations.
pub type TransitionResult<T> = Result<T, TransitionError>;

/// Coordinates seeding, reading, and transitioning review tracks.
#[derive(Clone)]
pub struct TransitionCoordinator<S, C>
where
    S: TransitionStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
    config: StatusServiceConfig,
}

impl<S, C> TransitionCoordinator<S, C>
where
    S: TransitionStore,
    C: Clock + Send + Sync,
{
    /// Creates a coordinator with the default configuration.
    #[must_use]
    pub fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self::with_config(store, clock, StatusServiceConfig::default())
    }

    /// Creates a coordinator with an explicit configuration.
    #[must_use]
    pub const fn with_config(store: Arc<S>, clock: Arc<C>, config: StatusServiceConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Seeds every track of a newly created task to `todo`.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::AlreadyInitialized`] when the task was
    /// seeded before, or [`TransitionError::Storage`] on storage faults.
    pub async fn initialize_track_states(&self, task_id: TaskId) -> TransitionResult<TaskStatus> {
        let status = TaskStatus::seeded(task_id, self.now());
        self.store.initialize(&status).await?;
        tracing::debug!(task_id = %task_id, "initialized track states");
        Ok(status)
    }

    /// Returns the current status of every track of a task.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::TaskNotFound`] when the task has no status
    /// record, or [`TransitionError::Storage`] on storage faults.
    pub async fn current_status(&self, task_id: TaskId) -> TransitionResult<TaskStatus> {
        Ok(self.store.read_all(task_id).await?)
    }

    /// Applies a transition if the track is still in the expected state.
    ///
    /// On success the new status and its audit record are both committed.
    /// On any error neither is.
    ///
    /// # Errors
    ///
    /// Returns an error whose [`TransitionError::kind`] is
    /// [`TransitionErrorKind::Validation`] for bad input,
    /// [`TransitionErrorKind::NotFound`] for an unknown task or track,
    /// [`TransitionErrorKind::Conflict`] for a stale expectation, and
    /// [`TransitionErrorKind::StorageFailure`] for storage faults.
    pub async fn transition(
        &self,
        request: TransitionRequest,
    ) -> TransitionResult<TransitionOutcome> {
        let ValidatedTransition {
            task_id,
            track,
            expected,
            target,
            remark,
            actor,
        } = self.validate(request)?;
        let now = self.now();

        tracing::debug!(
            task_id = %task_id,
            track = %track,
            actor = %actor,
            expected = %expected,
            target = %target,
            "attempting track transition"
        );

        let planned = PlannedTransition {
            status: TrackStatus::changed(target, remark.clone(), now),
            record: PendingAuditRecord::new(
                task_id,
                track,
                expected,
                target,
                remark,
                actor.clone(),
                now,
            ),
        };
        let applied = self
            .store
            .apply_guarded(task_id, track, move |current| {
                plan_transition(current, expected, planned)
            })
            .await;

        match applied {
            Ok(GuardedWrite::Committed { status, record }) => {
                tracing::info!(
                    task_id = %task_id,
                    track = %track,
                    actor = %actor,
                    audit_id = %record.id(),
                    from = %expected,
                    to = %target,
                    "track transition committed"
                );
                Ok(TransitionOutcome {
                    task_id,
                    track,
                    status,
                    record,
                })
            }
            Ok(GuardedWrite::Declined { actual }) => {
                tracing::info!(
                    task_id = %task_id,
                    track = %track,
                    actor = %actor,
                    expected = %expected,
                    actual = %actual,
                    "track transition rejected on stale state"
                );
                Err(TransitionError::Conflict {
                    task_id,
                    track,
                    expected,
                    actual,
                })
            }
            Err(err) => {
                tracing::warn!(
                    task_id = %task_id,
                    track = %track,
                    actor = %actor,
                    error = %err,
                    "track transition failed in storage"
                );
                Err(err.into())
            }
        }
    }

    fn validate(&self, request: TransitionRequest) -> TransitionResult<ValidatedTransition> {
        let TransitionRequest {
            task_id,
            track: raw_track,
            expected_state,
            new_state,
            remark: raw_remark,
            actor: raw_actor,
        } = request;

        let track = Track::try_from(raw_track.as_str())?;
        let expected = TrackState::try_from(expected_state.as_str())?;
        let target = TrackState::try_from(new_state.as_str())?;
        if expected == target {
            return Err(StatusDomainError::UnchangedState(target).into());
        }

        let remark = Remark::new(raw_remark)?;
        self.config.check_remark(&remark)?;
        let actor = Actor::new(raw_actor)?;
        self.config.check_actor(&actor)?;

        Ok(ValidatedTransition {
            task_id,
            track,
            expected,
            target,
            remark,
            actor,
        })
    }

    /// Current time at the microsecond precision storage keeps.
    fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.utc().trunc_subsecs(6)
    }
}

/// Compare step of the compare-and-swap: commit only on a matching state.
fn plan_transition(
    current: &TrackStatus,
    expected: TrackState,
    planned: PlannedTransition,
) -> Option<PlannedTransition> {
    (current.state() == expected).then_some(planned)
}
