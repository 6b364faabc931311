//! Error Handling utilities
//!
//! Fatal errors abort the run; per-record errors are classified and rendered
//! into outcome records through [`ErrorReport`].

pub mod error;
pub mod utils;

// Re-export commonly used types and functions
pub use error::*;
pub use utils::{ErrorCategory, ErrorClassification, ErrorReport, ErrorUtils};
