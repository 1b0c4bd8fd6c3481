//! Adapter implementations for status ports.

pub mod memory;
pub mod postgres;
