//! Port contracts for review-track status persistence.
//!
//! Ports define infrastructure-agnostic interfaces used by status services.

pub mod audit_log;
pub mod track_state;
pub mod transition;

pub use audit_log::AuditLog;
pub use track_state::{StatusStoreError, StatusStoreResult, TrackStateStore};
pub use transition::{GuardedWrite, PlannedTransition, TransitionStore};
