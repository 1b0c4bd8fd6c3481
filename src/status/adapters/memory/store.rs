//! In-memory status store for tests and single-process deployments.
//!
//! One `RwLock` guards both the track states and the audit log, so a guarded
//! write holds exclusive access from its read until both writes land.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::status::{
    domain::{AuditRecord, AuditRecordId, SealedAuditRecord, TaskId, TaskStatus, Track, TrackStatus},
    ports::{
        AuditLog, GuardedWrite, PlannedTransition, StatusStoreError, StatusStoreResult,
        TrackStateStore, TransitionStore,
    },
};

/// Thread-safe in-memory implementation of every status port.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStatusStore {
    state: Arc<RwLock<InMemoryStatusState>>,
}

#[derive(Debug, Default)]
struct InMemoryStatusState {
    tasks: HashMap<TaskId, TaskStatus>,
    audit: Vec<AuditRecord>,
    heads: HashMap<(TaskId, Track), AuditRecord>,
    last_audit_id: u64,
    fail_next_commit: bool,
}

impl InMemoryStatusState {
    fn track_status(&self, task_id: TaskId, track: Track) -> StatusStoreResult<&TrackStatus> {
        self.tasks
            .get(&task_id)
            .ok_or(StatusStoreError::TaskNotFound(task_id))?
            .track(track)
            .ok_or(StatusStoreError::TrackNotFound { task_id, track })
    }

    fn replace_track(
        &mut self,
        task_id: TaskId,
        track: Track,
        status: TrackStatus,
    ) -> StatusStoreResult<()> {
        let task = self
            .tasks
            .get_mut(&task_id)
            .ok_or(StatusStoreError::TaskNotFound(task_id))?;
        if task.track(track).is_none() {
            return Err(StatusStoreError::TrackNotFound { task_id, track });
        }
        task.replace(track, status);
        Ok(())
    }

    fn chain_head(&self, task_id: TaskId, track: Track) -> Option<&AuditRecord> {
        self.heads.get(&(task_id, track))
    }

    fn append(&mut self, sealed: SealedAuditRecord) -> AuditRecord {
        self.last_audit_id += 1;
        let record = sealed.into_record(AuditRecordId::new(self.last_audit_id));
        self.heads
            .insert((record.task_id(), record.track()), record.clone());
        self.audit.push(record.clone());
        record
    }
}

impl InMemoryStatusStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next guarded write fail after it has planned and sealed
    /// its writes but before either is applied.
    ///
    /// Used to exercise storage-failure handling.
    ///
    /// # Errors
    ///
    /// Returns [`StatusStoreError::Persistence`] if the lock is poisoned.
    pub fn fail_next_commit(&self) -> StatusStoreResult<()> {
        self.write_state()?.fail_next_commit = true;
        Ok(())
    }

    fn read_state(&self) -> StatusStoreResult<RwLockReadGuard<'_, InMemoryStatusState>> {
        self.state
            .read()
            .map_err(|err| StatusStoreError::persistence(std::io::Error::other(err.to_string())))
    }

    fn write_state(&self) -> StatusStoreResult<RwLockWriteGuard<'_, InMemoryStatusState>> {
        self.state
            .write()
            .map_err(|err| StatusStoreError::persistence(std::io::Error::other(err.to_string())))
    }
}

#[async_trait]
impl TrackStateStore for InMemoryStatusStore {
    async fn initialize(&self, status: &TaskStatus) -> StatusStoreResult<()> {
        let mut state = self.write_state()?;
        if state.tasks.contains_key(&status.task_id()) {
            return Err(StatusStoreError::DuplicateTask(status.task_id()));
        }
        state.tasks.insert(status.task_id(), status.clone());
        Ok(())
    }

    async fn read(&self, task_id: TaskId, track: Track) -> StatusStoreResult<TrackStatus> {
        let state = self.read_state()?;
        state.track_status(task_id, track).cloned()
    }

    async fn read_all(&self, task_id: TaskId) -> StatusStoreResult<TaskStatus> {
        let state = self.read_state()?;
        state
            .tasks
            .get(&task_id)
            .cloned()
            .ok_or(StatusStoreError::TaskNotFound(task_id))
    }

    async fn write(
        &self,
        task_id: TaskId,
        track: Track,
        status: &TrackStatus,
    ) -> StatusStoreResult<()> {
        let mut state = self.write_state()?;
        state.replace_track(task_id, track, status.clone())
    }
}

#[async_trait]
impl AuditLog for InMemoryStatusStore {
    async fn append(&self, record: SealedAuditRecord) -> StatusStoreResult<AuditRecord> {
        let mut state = self.write_state()?;
        Ok(state.append(record))
    }

    async fn chain_head(
        &self,
        task_id: TaskId,
        track: Track,
    ) -> StatusStoreResult<Option<AuditRecord>> {
        let state = self.read_state()?;
        Ok(state.chain_head(task_id, track).cloned())
    }

    async fn list_by_task(
        &self,
        task_id: TaskId,
        track: Option<Track>,
    ) -> StatusStoreResult<Vec<AuditRecord>> {
        let state = self.read_state()?;
        let mut records: Vec<AuditRecord> = state
            .audit
            .iter()
            .filter(|record| record.task_id() == task_id)
            .filter(|record| track.is_none_or(|wanted| record.track() == wanted))
            .cloned()
            .collect();
        records.sort_by(AuditRecord::history_order);
        Ok(records)
    }
}

#[async_trait]
impl TransitionStore for InMemoryStatusStore {
    async fn apply_guarded<F>(
        &self,
        task_id: TaskId,
        track: Track,
        plan: F,
    ) -> StatusStoreResult<GuardedWrite>
    where
        F: FnOnce(&TrackStatus) -> Option<PlannedTransition> + Send + 'static,
    {
        let mut state = self.write_state()?;
        let current = state.track_status(task_id, track)?.clone();
        let Some(PlannedTransition { status, record }) = plan(&current) else {
            return Ok(GuardedWrite::Declined { actual: current });
        };

        let previous_digest = state
            .chain_head(task_id, track)
            .map(|head| head.digest().clone());
        let sealed = record
            .seal(previous_digest)
            .map_err(StatusStoreError::persistence)?;
        if std::mem::take(&mut state.fail_next_commit) {
            return Err(StatusStoreError::persistence(std::io::Error::other(
                "injected commit failure",
            )));
        }

        state.replace_track(task_id, track, status.clone())?;
        let appended = state.append(sealed);
        Ok(GuardedWrite::Committed {
            status,
            record: appended,
        })
    }
}
