//! Append-only audit records and their tamper-evident digest chain.
//!
//! Every record on a `(task, track)` key carries a SHA-256 digest over its
//! canonical JSON encoding plus the digest of the record before it. Editing
//! or removing a stored record therefore breaks every later link, which
//! [`verify_chain`] detects.

use super::{
    Actor, AuditChainError, AuditRecordId, Remark, TaskId, Track, TrackState, TrackStatus,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::cmp::Ordering;
use std::fmt;

/// Lowercase hexadecimal SHA-256 digest of an audit record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditDigest(String);

impl AuditDigest {
    /// Wraps a digest read back from storage.
    #[must_use]
    pub fn from_persisted(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the hexadecimal digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AuditDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Audit entry built by the coordinator before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAuditRecord {
    task_id: TaskId,
    track: Track,
    old_state: TrackState,
    new_state: TrackState,
    remark: Remark,
    actor: Actor,
    changed_at: DateTime<Utc>,
}

impl PendingAuditRecord {
    /// Describes one state change on `(task_id, track)`.
    #[must_use]
    pub const fn new(
        task_id: TaskId,
        track: Track,
        old_state: TrackState,
        new_state: TrackState,
        remark: Remark,
        actor: Actor,
        changed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            task_id,
            track,
            old_state,
            new_state,
            remark,
            actor,
            changed_at,
        }
    }

    /// Returns the task the change applies to.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the track the change applies to.
    #[must_use]
    pub const fn track(&self) -> Track {
        self.track
    }

    /// Returns the state before the change.
    #[must_use]
    pub const fn old_state(&self) -> TrackState {
        self.old_state
    }

    /// Returns the state after the change.
    #[must_use]
    pub const fn new_state(&self) -> TrackState {
        self.new_state
    }

    /// Returns the justification.
    #[must_use]
    pub const fn remark(&self) -> &Remark {
        &self.remark
    }

    /// Returns the caller identity.
    #[must_use]
    pub const fn actor(&self) -> &Actor {
        &self.actor
    }

    /// Returns when the change was made.
    #[must_use]
    pub const fn changed_at(&self) -> DateTime<Utc> {
        self.changed_at
    }

    /// Links this entry to the chain head and computes its digest.
    ///
    /// # Errors
    ///
    /// Returns [`AuditChainError::Encoding`] if the canonical encoding fails.
    pub fn seal(
        self,
        previous_digest: Option<AuditDigest>,
    ) -> Result<SealedAuditRecord, AuditChainError> {
        let digest = compute_digest(&self, previous_digest.as_ref())?;
        Ok(SealedAuditRecord {
            pending: self,
            digest,
            previous_digest,
        })
    }
}

/// Audit entry with its digest, awaiting a store-assigned id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedAuditRecord {
    pending: PendingAuditRecord,
    digest: AuditDigest,
    previous_digest: Option<AuditDigest>,
}

impl SealedAuditRecord {
    /// Returns the sealed entry.
    #[must_use]
    pub const fn pending(&self) -> &PendingAuditRecord {
        &self.pending
    }

    /// Returns the computed digest.
    #[must_use]
    pub const fn digest(&self) -> &AuditDigest {
        &self.digest
    }

    /// Returns the digest this entry links to.
    #[must_use]
    pub const fn previous_digest(&self) -> Option<&AuditDigest> {
        self.previous_digest.as_ref()
    }

    /// Finalizes the record with the id assigned at insertion.
    #[must_use]
    pub fn into_record(self, id: AuditRecordId) -> AuditRecord {
        let Self {
            pending,
            digest,
            previous_digest,
        } = self;
        AuditRecord {
            id,
            task_id: pending.task_id,
            track: pending.track,
            old_state: pending.old_state,
            new_state: pending.new_state,
            remark: pending.remark,
            actor: pending.actor,
            changed_at: pending.changed_at,
            digest,
            previous_digest,
        }
    }
}

/// Immutable record of one committed transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    id: AuditRecordId,
    task_id: TaskId,
    track: Track,
    old_state: TrackState,
    new_state: TrackState,
    remark: Remark,
    actor: Actor,
    changed_at: DateTime<Utc>,
    digest: AuditDigest,
    previous_digest: Option<AuditDigest>,
}

impl AuditRecord {
    /// Reconstructs a record from persisted storage.
    ///
    /// The digest is taken as stored; use [`verify_chain`] to check it.
    #[must_use]
    pub fn from_persisted(
        id: AuditRecordId,
        pending: PendingAuditRecord,
        digest: AuditDigest,
        previous_digest: Option<AuditDigest>,
    ) -> Self {
        SealedAuditRecord {
            pending,
            digest,
            previous_digest,
        }
        .into_record(id)
    }

    /// Returns the record identifier.
    #[must_use]
    pub const fn id(&self) -> AuditRecordId {
        self.id
    }

    /// Returns the task the change applied to.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the track the change applied to.
    #[must_use]
    pub const fn track(&self) -> Track {
        self.track
    }

    /// Returns the state before the change.
    #[must_use]
    pub const fn old_state(&self) -> TrackState {
        self.old_state
    }

    /// Returns the state after the change.
    #[must_use]
    pub const fn new_state(&self) -> TrackState {
        self.new_state
    }

    /// Returns the justification.
    #[must_use]
    pub const fn remark(&self) -> &Remark {
        &self.remark
    }

    /// Returns the caller identity.
    #[must_use]
    pub const fn actor(&self) -> &Actor {
        &self.actor
    }

    /// Returns when the change was made.
    #[must_use]
    pub const fn changed_at(&self) -> DateTime<Utc> {
        self.changed_at
    }

    /// Returns the stored digest.
    #[must_use]
    pub const fn digest(&self) -> &AuditDigest {
        &self.digest
    }

    /// Returns the digest of the preceding record on the same key.
    #[must_use]
    pub const fn previous_digest(&self) -> Option<&AuditDigest> {
        self.previous_digest.as_ref()
    }

    /// History order: newest `changed_at` first, ties by ascending id.
    #[must_use]
    pub fn history_order(&self, other: &Self) -> Ordering {
        other
            .changed_at
            .cmp(&self.changed_at)
            .then_with(|| self.id.cmp(&other.id))
    }

    fn as_pending(&self) -> PendingAuditRecord {
        PendingAuditRecord::new(
            self.task_id,
            self.track,
            self.old_state,
            self.new_state,
            self.remark.clone(),
            self.actor.clone(),
            self.changed_at,
        )
    }
}

#[derive(Serialize)]
struct CanonicalEntry<'a> {
    task_id: TaskId,
    track: Track,
    old_state: TrackState,
    new_state: TrackState,
    remark: &'a Remark,
    actor: &'a Actor,
    changed_at: DateTime<Utc>,
    previous_digest: Option<&'a AuditDigest>,
}

fn compute_digest(
    entry: &PendingAuditRecord,
    previous_digest: Option<&AuditDigest>,
) -> Result<AuditDigest, AuditChainError> {
    let canonical = CanonicalEntry {
        task_id: entry.task_id,
        track: entry.track,
        old_state: entry.old_state,
        new_state: entry.new_state,
        remark: &entry.remark,
        actor: &entry.actor,
        changed_at: entry.changed_at,
        previous_digest,
    };
    let encoded = serde_json::to_vec(&canonical)
        .map_err(|err| AuditChainError::Encoding(err.to_string()))?;
    Ok(AuditDigest(format!("{:x}", Sha256::digest(&encoded))))
}

/// Summary of a verified `(task, track)` chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainReport {
    /// Number of records replayed.
    pub records: usize,
    /// State reached after replaying every record.
    pub final_state: TrackState,
    /// Digest of the newest record, if any.
    pub head: Option<AuditDigest>,
}

impl ChainReport {
    /// Checks that the replayed chain ends in the track's stored state.
    ///
    /// Every committed transition changes the state, so a chain missing its
    /// newest records ends somewhere other than the current state.
    ///
    /// # Errors
    ///
    /// Returns [`AuditChainError::StateMismatch`] when the states differ.
    pub fn confirm_current(&self, current: &TrackStatus) -> Result<(), AuditChainError> {
        if self.final_state != current.state() {
            return Err(AuditChainError::StateMismatch {
                recorded: self.final_state,
                current: current.state(),
            });
        }
        Ok(())
    }
}

/// Replays the records of one `(task, track)` key in insertion order.
///
/// The walk must start at `todo`, each record must continue from the state
/// its predecessor produced, and every digest and link must match.
///
/// # Errors
///
/// Returns the first [`AuditChainError`] encountered.
pub fn verify_chain(records: &[AuditRecord]) -> Result<ChainReport, AuditChainError> {
    let mut ordered: Vec<&AuditRecord> = records.iter().collect();
    ordered.sort_by_key(|record| record.id);

    let key = ordered.first().map(|record| (record.task_id, record.track));
    let mut expected_state = TrackState::Todo;
    let mut head: Option<AuditDigest> = None;

    for record in ordered {
        if key != Some((record.task_id, record.track)) {
            return Err(AuditChainError::MixedChain(record.id));
        }
        if record.previous_digest.as_ref() != head.as_ref() {
            return Err(AuditChainError::BrokenLink(record.id));
        }
        let recomputed = compute_digest(&record.as_pending(), head.as_ref())?;
        if recomputed != record.digest {
            return Err(AuditChainError::DigestMismatch(record.id));
        }
        if record.old_state != expected_state {
            return Err(AuditChainError::Discontinuity {
                id: record.id,
                expected: expected_state,
                found: record.old_state,
            });
        }
        expected_state = record.new_state;
        head = Some(recomputed);
    }

    Ok(ChainReport {
        records: records.len(),
        final_state: expected_state,
        head,
    })
}
