//! In-memory adapters for status ports.

mod store;

pub use store::InMemoryStatusStore;
