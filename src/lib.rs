//! Tracklog: audited review-track status transitions.
//!
//! Work items ("tasks") are judged independently along several review
//! tracks (development, quality assurance, final sign-off). This crate owns
//! the part of that system with real invariants: changing a track's state
//! and appending an immutable audit record as one atomic unit, guarded by an
//! optimistic compare-and-swap on the caller's expected state.
//!
//! # Architecture
//!
//! Tracklog follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`)
//! - **Services**: The transition coordinator and history reader
//!
//! # Modules
//!
//! - [`status`]: Track state storage, audit log, transitions, and history

pub mod status;
