//! Structured metadata mapping engine
//!
//! Resolves human-entered values to canonical field values according to the
//! remote field schema:
//! - `text` / `number`: trimmed value, unchanged
//! - `date`: normalized to `YYYY-MM-DD` (see [`date`] for the accepted grammar)
//! - `single-select` / `multi-select`: active options matched by identifier,
//!   then by label, case-insensitively

pub mod date;
mod error;
mod mapper;
mod resolve;


pub use error::{DateParseError, InvalidMappingError, MappingError, ValueProcessingError};
pub use mapper::{
    FieldMappingConfig, MappingTrace, STRUCTURED_METADATA, StructuredMetadataMapper,
    validate_mapping,
};
pub use resolve::{resolve_option, resolve_value};
