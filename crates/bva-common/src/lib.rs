//! Burst variance analysis common types and errors.
//!
//! This crate provides foundational types shared across the bva crates:
//! - Burst identity and photon stream labels
//! - The unified error type with stable codes
//! - Output format specifications
//! - Schema versioning

pub mod error;
pub mod output;
pub mod photon;
pub mod schema;

pub use error::{Error, ErrorCategory, Result, StructuredError};
pub use output::OutputFormat;
pub use photon::{BurstId, PhotonRecord, StreamLabel};
pub use schema::SCHEMA_VERSION;
