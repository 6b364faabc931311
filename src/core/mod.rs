//! Core functionality for the migration runner
//!
//! Records flow from [`source`] through the [`batch`] engine, which builds a
//! [`payload`] for each (running the configured [`plugins`], including the
//! [`mapping`] engine), invokes the [`remote`] operation and appends one
//! outcome per record to the [`recorder`].

pub mod batch;
pub mod mapping;
pub mod migration;
pub mod payload;
pub mod plugins;
pub mod record;
pub mod recorder;
pub mod remote;
pub mod report;
pub mod schema;
pub mod source;
