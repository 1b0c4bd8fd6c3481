//! Review-track status transitions and their audit trail.
//!
//! Each task carries one current state per review track. State changes go
//! through the [`services::TransitionCoordinator`], which applies the new
//! state and appends an audit record in a single unit of work, rejecting
//! callers whose expected state is stale. The [`services::HistoryReader`]
//! projects the append-only audit log back out. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
