//! `PostgreSQL` store implementation for review-track status and audit.

use super::{
    models::{AuditRecordRow, NewAuditRecordRow, NewTrackStateRow, TrackStateRow},
    schema::{task_track_states, track_audit_records},
};
use crate::status::{
    domain::{
        Actor, AuditDigest, AuditRecord, AuditRecordId, PendingAuditRecord, Remark,
        SealedAuditRecord, TaskId, TaskStatus, Track, TrackState, TrackStatus,
    },
    ports::{
        AuditLog, GuardedWrite, PlannedTransition, StatusStoreError, StatusStoreResult,
        TrackStateStore, TransitionStore,
    },
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by status adapters.
pub type StatusPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed implementation of every status port.
///
/// Guarded writes run in one transaction that locks the `(task, track)` row
/// with `SELECT ... FOR UPDATE`, so concurrent writers on the same key are
/// serialized while other keys proceed independently.
#[derive(Debug, Clone)]
pub struct PostgresStatusStore {
    pool: StatusPgPool,
}

impl PostgresStatusStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: StatusPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> StatusStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> StatusStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(StatusStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(StatusStoreError::persistence)?
    }
}

impl From<DieselError> for StatusStoreError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl TrackStateStore for PostgresStatusStore {
    async fn initialize(&self, status: &TaskStatus) -> StatusStoreResult<()> {
        let task_id = status.task_id();
        let rows: Vec<NewTrackStateRow> = status
            .iter()
            .map(|(track, track_status)| to_new_state_row(task_id, track, track_status))
            .collect();

        self.run_blocking(move |connection| {
            diesel::insert_into(task_track_states::table)
                .values(&rows)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        StatusStoreError::DuplicateTask(task_id)
                    }
                    _ => StatusStoreError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn read(&self, task_id: TaskId, track: Track) -> StatusStoreResult<TrackStatus> {
        self.run_blocking(move |connection| {
            let Some(row) = find_track_row(connection, task_id, track)? else {
                return Err(missing_track(connection, task_id, track));
            };
            row_to_track_status(task_id, row).map(|(_, status)| status)
        })
        .await
    }

    async fn read_all(&self, task_id: TaskId) -> StatusStoreResult<TaskStatus> {
        self.run_blocking(move |connection| {
            let rows = task_track_states::table
                .filter(task_track_states::task_id.eq(task_id.into_inner()))
                .select(TrackStateRow::as_select())
                .load::<TrackStateRow>(connection)
                .map_err(StatusStoreError::persistence)?;
            if rows.is_empty() {
                return Err(StatusStoreError::TaskNotFound(task_id));
            }
            let tracks = rows
                .into_iter()
                .map(|row| row_to_track_status(task_id, row))
                .collect::<StatusStoreResult<Vec<_>>>()?;
            Ok(TaskStatus::from_persisted(task_id, tracks))
        })
        .await
    }

    async fn write(
        &self,
        task_id: TaskId,
        track: Track,
        status: &TrackStatus,
    ) -> StatusStoreResult<()> {
        let new_status = status.clone();
        self.run_blocking(move |connection| {
            let updated = update_track_row(connection, task_id, track, &new_status)?;
            if updated == 0 {
                return Err(missing_track(connection, task_id, track));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl AuditLog for PostgresStatusStore {
    async fn append(&self, record: SealedAuditRecord) -> StatusStoreResult<AuditRecord> {
        self.run_blocking(move |connection| {
            let id = insert_audit_row(connection, &record)?;
            Ok(record.into_record(id))
        })
        .await
    }

    async fn chain_head(
        &self,
        task_id: TaskId,
        track: Track,
    ) -> StatusStoreResult<Option<AuditRecord>> {
        self.run_blocking(move |connection| {
            find_chain_head(connection, task_id, track)?
                .map(row_to_audit_record)
                .transpose()
        })
        .await
    }

    async fn list_by_task(
        &self,
        task_id: TaskId,
        track: Option<Track>,
    ) -> StatusStoreResult<Vec<AuditRecord>> {
        self.run_blocking(move |connection| {
            let mut query = track_audit_records::table
                .filter(track_audit_records::task_id.eq(task_id.into_inner()))
                .select(AuditRecordRow::as_select())
                .into_boxed();
            if let Some(wanted) = track {
                query = query.filter(track_audit_records::track.eq(wanted.as_str()));
            }
            let rows = query
                .order((
                    track_audit_records::changed_at.desc(),
                    track_audit_records::id.asc(),
                ))
                .load::<AuditRecordRow>(connection)
                .map_err(StatusStoreError::persistence)?;
            rows.into_iter().map(row_to_audit_record).collect()
        })
        .await
    }
}

#[async_trait]
impl TransitionStore for PostgresStatusStore {
    async fn apply_guarded<F>(
        &self,
        task_id: TaskId,
        track: Track,
        plan: F,
    ) -> StatusStoreResult<GuardedWrite>
    where
        F: FnOnce(&TrackStatus) -> Option<PlannedTransition> + Send + 'static,
    {
        self.run_blocking(move |connection| {
            connection.transaction::<_, StatusStoreError, _>(|tx| {
                let Some(row) = lock_track_row(tx, task_id, track)? else {
                    return Err(missing_track(tx, task_id, track));
                };
                let (_, current) = row_to_track_status(task_id, row)?;
                let Some(PlannedTransition { status, record }) = plan(&current) else {
                    return Ok(GuardedWrite::Declined { actual: current });
                };

                let previous_digest = find_chain_head(tx, task_id, track)?
                    .map(|head| AuditDigest::from_persisted(head.digest));
                let sealed = record
                    .seal(previous_digest)
                    .map_err(StatusStoreError::persistence)?;
                update_track_row(tx, task_id, track, &status)?;
                let id = insert_audit_row(tx, &sealed)?;

                Ok(GuardedWrite::Committed {
                    status,
                    record: sealed.into_record(id),
                })
            })
        })
        .await
    }
}

fn find_track_row(
    connection: &mut PgConnection,
    task_id: TaskId,
    track: Track,
) -> StatusStoreResult<Option<TrackStateRow>> {
    task_track_states::table
        .filter(task_track_states::task_id.eq(task_id.into_inner()))
        .filter(task_track_states::track.eq(track.as_str()))
        .select(TrackStateRow::as_select())
        .first::<TrackStateRow>(connection)
        .optional()
        .map_err(StatusStoreError::persistence)
}

fn lock_track_row(
    connection: &mut PgConnection,
    task_id: TaskId,
    track: Track,
) -> StatusStoreResult<Option<TrackStateRow>> {
    task_track_states::table
        .filter(task_track_states::task_id.eq(task_id.into_inner()))
        .filter(task_track_states::track.eq(track.as_str()))
        .select(TrackStateRow::as_select())
        .for_update()
        .first::<TrackStateRow>(connection)
        .optional()
        .map_err(StatusStoreError::persistence)
}

/// Distinguishes an unknown task from a known task missing one track row.
fn missing_track(connection: &mut PgConnection, task_id: TaskId, track: Track) -> StatusStoreError {
    let task_exists = diesel::select(diesel::dsl::exists(
        task_track_states::table.filter(task_track_states::task_id.eq(task_id.into_inner())),
    ))
    .get_result::<bool>(connection);

    match task_exists {
        Ok(true) => StatusStoreError::TrackNotFound { task_id, track },
        Ok(false) => StatusStoreError::TaskNotFound(task_id),
        Err(err) => StatusStoreError::persistence(err),
    }
}

fn update_track_row(
    connection: &mut PgConnection,
    task_id: TaskId,
    track: Track,
    status: &TrackStatus,
) -> StatusStoreResult<usize> {
    diesel::update(
        task_track_states::table
            .filter(task_track_states::task_id.eq(task_id.into_inner()))
            .filter(task_track_states::track.eq(track.as_str())),
    )
    .set((
        task_track_states::state.eq(status.state().as_str()),
        task_track_states::remark.eq(status.remark().map(|remark| remark.as_str().to_owned())),
        task_track_states::changed_at.eq(status.changed_at()),
    ))
    .execute(connection)
    .map_err(StatusStoreError::persistence)
}

fn find_chain_head(
    connection: &mut PgConnection,
    task_id: TaskId,
    track: Track,
) -> StatusStoreResult<Option<AuditRecordRow>> {
    track_audit_records::table
        .filter(track_audit_records::task_id.eq(task_id.into_inner()))
        .filter(track_audit_records::track.eq(track.as_str()))
        .order(track_audit_records::id.desc())
        .select(AuditRecordRow::as_select())
        .first::<AuditRecordRow>(connection)
        .optional()
        .map_err(StatusStoreError::persistence)
}

fn insert_audit_row(
    connection: &mut PgConnection,
    sealed: &SealedAuditRecord,
) -> StatusStoreResult<AuditRecordId> {
    let raw_id = diesel::insert_into(track_audit_records::table)
        .values(&to_new_audit_row(sealed))
        .returning(track_audit_records::id)
        .get_result::<i64>(connection)
        .map_err(StatusStoreError::persistence)?;
    let id = u64::try_from(raw_id).map_err(StatusStoreError::persistence)?;
    Ok(AuditRecordId::new(id))
}

fn to_new_state_row(task_id: TaskId, track: Track, status: &TrackStatus) -> NewTrackStateRow {
    NewTrackStateRow {
        task_id: task_id.into_inner(),
        track: track.as_str().to_owned(),
        state: status.state().as_str().to_owned(),
        remark: status.remark().map(|remark| remark.as_str().to_owned()),
        changed_at: status.changed_at(),
    }
}

fn to_new_audit_row(sealed: &SealedAuditRecord) -> NewAuditRecordRow {
    let entry = sealed.pending();
    NewAuditRecordRow {
        task_id: entry.task_id().into_inner(),
        track: entry.track().as_str().to_owned(),
        old_state: entry.old_state().as_str().to_owned(),
        new_state: entry.new_state().as_str().to_owned(),
        remark: entry.remark().as_str().to_owned(),
        actor: entry.actor().as_str().to_owned(),
        changed_at: entry.changed_at(),
        digest: sealed.digest().as_str().to_owned(),
        previous_digest: sealed
            .previous_digest()
            .map(|digest| digest.as_str().to_owned()),
    }
}

fn row_to_track_status(
    task_id: TaskId,
    row: TrackStateRow,
) -> StatusStoreResult<(Track, TrackStatus)> {
    let TrackStateRow {
        task_id: persisted_task_id,
        track: persisted_track,
        state: persisted_state,
        remark: persisted_remark,
        changed_at,
    } = row;

    if persisted_task_id != task_id.into_inner() {
        return Err(StatusStoreError::persistence(std::io::Error::other(format!(
            "track row for task {persisted_task_id} returned for task {task_id}"
        ))));
    }

    let track =
        Track::try_from(persisted_track.as_str()).map_err(StatusStoreError::persistence)?;
    let state =
        TrackState::try_from(persisted_state.as_str()).map_err(StatusStoreError::persistence)?;
    let remark = persisted_remark
        .map(Remark::new)
        .transpose()
        .map_err(StatusStoreError::persistence)?;

    Ok((track, TrackStatus::from_persisted(state, remark, changed_at)))
}

fn row_to_audit_record(row: AuditRecordRow) -> StatusStoreResult<AuditRecord> {
    let AuditRecordRow {
        id: persisted_id,
        task_id,
        track: persisted_track,
        old_state: persisted_old_state,
        new_state: persisted_new_state,
        remark: persisted_remark,
        actor: persisted_actor,
        changed_at,
        digest,
        previous_digest,
    } = row;

    let id = u64::try_from(persisted_id).map_err(StatusStoreError::persistence)?;
    let track =
        Track::try_from(persisted_track.as_str()).map_err(StatusStoreError::persistence)?;
    let old_state = TrackState::try_from(persisted_old_state.as_str())
        .map_err(StatusStoreError::persistence)?;
    let new_state = TrackState::try_from(persisted_new_state.as_str())
        .map_err(StatusStoreError::persistence)?;
    let remark = Remark::new(persisted_remark).map_err(StatusStoreError::persistence)?;
    let actor = Actor::new(persisted_actor).map_err(StatusStoreError::persistence)?;

    let entry = PendingAuditRecord::new(
        TaskId::from_uuid(task_id),
        track,
        old_state,
        new_state,
        remark,
        actor,
        changed_at,
    );
    Ok(AuditRecord::from_persisted(
        AuditRecordId::new(id),
        entry,
        AuditDigest::from_persisted(digest),
        previous_digest.map(AuditDigest::from_persisted),
    ))
}
