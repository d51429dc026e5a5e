//! Schema versioning for serialized reports and config files.

/// Version of the report and config JSON layout.
///
/// Bumped on any breaking change to field names or semantics.
pub const SCHEMA_VERSION: &str = "1.0.0";
