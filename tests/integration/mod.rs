//! Integration tests for SQL Detective.
//!
//! Each test builds its case databases in a temporary directory, so no
//! external services are needed.

pub mod catalog_test;
pub mod common;
pub mod execution_test;
pub mod validation_test;
