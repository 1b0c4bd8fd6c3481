//! Diesel row models for review-track status persistence.

use super::schema::{task_track_states, track_audit_records};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for one track's current state.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_track_states)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TrackStateRow {
    /// Task identifier.
    pub task_id: uuid::Uuid,
    /// Track identifier.
    pub track: String,
    /// Current track state.
    pub state: String,
    /// Remark of the last committed transition.
    pub remark: Option<String>,
    /// Last write timestamp.
    pub changed_at: DateTime<Utc>,
}

/// Insert model for one track's seeded state.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_track_states)]
pub struct NewTrackStateRow {
    /// Task identifier.
    pub task_id: uuid::Uuid,
    /// Track identifier.
    pub track: String,
    /// Current track state.
    pub state: String,
    /// Remark of the last committed transition.
    pub remark: Option<String>,
    /// Last write timestamp.
    pub changed_at: DateTime<Utc>,
}

/// Query result row for audit records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = track_audit_records)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AuditRecordRow {
    /// Sequence-assigned record identifier.
    pub id: i64,
    /// Task identifier.
    pub task_id: uuid::Uuid,
    /// Track identifier.
    pub track: String,
    /// State before the transition.
    pub old_state: String,
    /// State after the transition.
    pub new_state: String,
    /// Justification for the transition.
    pub remark: String,
    /// Caller identity.
    pub actor: String,
    /// Transition timestamp.
    pub changed_at: DateTime<Utc>,
    /// Chained SHA-256 digest.
    pub digest: String,
    /// Digest of the preceding record on the same key.
    pub previous_digest: Option<String>,
}

/// Insert model for audit records; the id comes from the sequence.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = track_audit_records)]
pub struct NewAuditRecordRow {
    /// Task identifier.
    pub task_id: uuid::Uuid,
    /// Track identifier.
    pub track: String,
    /// State before the transition.
    pub old_state: String,
    /// State after the transition.
    pub new_state: String,
    /// Justification for the transition.
    pub remark: String,
    /// Caller identity.
    pub actor: String,
    /// Transition timestamp.
    pub changed_at: DateTime<Utc>,
    /// Chained SHA-256 digest.
    pub digest: String,
    /// Digest of the preceding record on the same key.
    pub previous_digest: Option<String>,
}
