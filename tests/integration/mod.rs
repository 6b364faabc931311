//! Integration tests for asset-migrate
//!
//! These drive whole runs through the public API, with the remote replaced
//! either by an in-process implementation or by a `wiremock` server.

pub mod client_tests;
pub mod config_tests;
pub mod migration_tests;
pub mod report_tests;
