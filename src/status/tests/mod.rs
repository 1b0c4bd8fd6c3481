//! Unit tests for the status module.
//!
//! Tests are organised by component, covering happy paths, error cases,
//! and edge cases for all public APIs.

mod support;
