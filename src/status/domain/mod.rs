//! Domain model for review-track status and audit records.
//!
//! Tracks are keys into a per-task map rather than parallel named fields,
//! so every rule here applies uniformly to whichever tracks exist.

mod audit;
mod error;
mod ids;
mod provenance;
mod status;
mod track;

pub use audit::{
    AuditDigest, AuditRecord, ChainReport, PendingAuditRecord, SealedAuditRecord, verify_chain,
};
pub use error::{AuditChainError, ParseTrackError, ParseTrackStateError, StatusDomainError};
pub use ids::{AuditRecordId, TaskId};
pub use provenance::{Actor, Remark};
pub use status::{TaskStatus, TrackStatus};
pub use track::{Track, TrackState};
