//! Outbound payloads and their construction

mod builder;
mod types;

pub use builder::{ConstructionError, LocatorColumns, PayloadBuilder};
pub use types::{AssetLocator, BuiltPayload, MetadataValue, Payload, PayloadOptions, PluginTrace, RESERVED_PARAMS};
