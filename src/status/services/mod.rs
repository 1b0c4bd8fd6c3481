//! Application services for review-track transitions and history.

mod config;
mod coordinator;
mod history;

pub use config::StatusServiceConfig;
pub use coordinator::{
    TransitionCoordinator, TransitionError, TransitionErrorKind, TransitionOutcome,
    TransitionRequest, TransitionResult,
};
pub use history::{History, HistoryError, HistoryQuery, HistoryReader, HistoryResult};
