//! Shared utilities: the fatal error family and logging setup

pub mod error;
pub mod logging;
