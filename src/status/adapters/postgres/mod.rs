//! `PostgreSQL` adapters for review-track status persistence.

mod config;
mod models;
mod repository;
mod schema;

pub use config::PostgresStoreConfig;
pub use repository::{PostgresStatusStore, StatusPgPool};
