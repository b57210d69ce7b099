//! Common types and utilities for the OpenAPI to TOSCA converter
//!
//! This crate contains the error taxonomy, the profile model and the output
//! records shared by the parser, generator, and CLI components.

mod profile;
mod record;

pub use profile::{DependencyOutcome, Profile, ProfileSink, ProfileStatus};
pub use record::{Constraint, Description, PropertyRecord, TextStyle, TypeRecord};

use thiserror::Error;

/// Errors that can occur during conversion
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("OpenAPI version not specified")]
    MissingVersion,

    #[error("Unsupported OpenAPI version {0}")]
    UnsupportedVersion(String),

    #[error("Document has no Info Object")]
    MissingInfo,

    #[error("{0}: not a local reference")]
    UnsupportedReference(String),

    #[error("{0}: referenced schema not found")]
    UnresolvedReference(String),

    #[error("Invalid node type '{name}': {reason}")]
    InvalidNodeType { name: String, reason: String },

    #[error("Invalid data type '{name}': {reason}")]
    InvalidDataType { name: String, reason: String },

    #[error("{name}: unknown type '{schema_type}'")]
    UnknownSchemaType { name: String, schema_type: String },

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ConvertError {
    /// Errors that abort the whole conversion rather than one type
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ConvertError::Parse(_)
                | ConvertError::MissingVersion
                | ConvertError::UnsupportedVersion(_)
                | ConvertError::MissingInfo
                | ConvertError::Io(_)
                | ConvertError::Json(_)
                | ConvertError::Yaml(_)
        )
    }
}

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;
