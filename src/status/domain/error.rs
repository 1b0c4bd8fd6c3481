//! Error types for status domain validation and parsing.

use super::{AuditRecordId, TrackState};
use thiserror::Error;

/// Errors returned while constructing or validating domain status values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StatusDomainError {
    /// The remark is empty after trimming.
    #[error("remark must not be empty")]
    EmptyRemark,

    /// The remark exceeds the configured maximum length.
    #[error("remark is {actual} characters long, maximum is {max}")]
    RemarkTooLong {
        /// Configured limit in characters.
        max: usize,
        /// Length of the rejected remark in characters.
        actual: usize,
    },

    /// The actor identity is empty after trimming.
    #[error("actor must not be empty")]
    EmptyActor,

    /// The actor identity exceeds the configured maximum length.
    #[error("actor is {actual} characters long, maximum is {max}")]
    ActorTooLong {
        /// Configured limit in characters.
        max: usize,
        /// Length of the rejected actor in characters.
        actual: usize,
    },

    /// The requested state equals the expected current state.
    #[error("transition must change the state, both sides are '{0}'")]
    UnchangedState(TrackState),
}

/// Error returned while parsing track identifiers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown track: {0}")]
pub struct ParseTrackError(pub String);

/// Error returned while parsing track states.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown track state: {0}")]
pub struct ParseTrackStateError(pub String);

/// Inconsistencies detected while replaying an audit chain.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuditChainError {
    /// The stored digest does not match the recomputed digest.
    #[error("audit record {0} digest does not match its contents")]
    DigestMismatch(AuditRecordId),

    /// The record does not link to the digest of its predecessor.
    #[error("audit record {0} is not linked to its predecessor")]
    BrokenLink(AuditRecordId),

    /// The record's old state does not continue from the prior new state.
    #[error("audit record {id} starts from '{found}', expected '{expected}'")]
    Discontinuity {
        /// Offending record.
        id: AuditRecordId,
        /// State the chain had reached before this record.
        expected: TrackState,
        /// Old state recorded on this record.
        found: TrackState,
    },

    /// Records from more than one task or track were passed in.
    #[error("audit record {0} belongs to a different task or track")]
    MixedChain(AuditRecordId),

    /// The chain ends in a different state than the track currently holds.
    #[error("audit chain ends at '{recorded}' but the track is '{current}'")]
    StateMismatch {
        /// State reached by replaying the chain.
        recorded: TrackState,
        /// State currently stored for the track.
        current: TrackState,
    },

    /// The canonical encoding of a record could not be produced.
    #[error("audit record could not be encoded: {0}")]
    Encoding(String),
}
