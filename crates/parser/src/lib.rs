//! OpenAPI document conversion into TOSCA profiles
//!
//! This crate reads Swagger 2.0 and OpenAPI 3.x documents and turns their
//! schema definitions into TOSCA node types and data types, grouped into one
//! [`Profile`](oas2tosca_common::Profile) per schema namespace.
//!
//! ## Conversion Strategy
//!
//! Schema names such as `io.k8s.api.core.v1.Pod` are split into a namespace
//! (`io.k8s.api.core`), a version tag (`v1`) and a kind (`Pod`):
//! - every schema definition registers its namespace as a profile, and
//!   cross-namespace references become profile imports
//! - schemas posted to a path (creatable resources) become node types
//! - schemas referenced from node types, directly or transitively, become
//!   data types
//!
//! Nothing here writes files; persistence is left to a
//! [`ProfileSink`](oas2tosca_common::ProfileSink).

mod config;
mod converter;
mod dependencies;
mod document;
mod materializer;
pub mod openapi;
mod property_type;
mod reference;
mod renderer;
mod schema_name;
mod session;
mod text;

pub use config::ConverterConfig;
pub use converter::{Conversion, Converter};
pub use document::Document;
pub use materializer::{Outcome, TypeMaterializer};
pub use openapi::{CreatableResource, OpenApiVersion};
pub use property_type::PropertyType;
pub use reference::Resolved;
pub use renderer::TypeRenderer;
pub use schema_name::SchemaName;
pub use session::{Context, ConversionSession, SkipReason};

use oas2tosca_common::Result;
use std::path::Path;

/// Convert a JSON or YAML document file
///
/// # Arguments
/// * `path` - Swagger 2.0 or OpenAPI 3.x document
/// * `config` - Version policy and rendering options
///
/// # Returns
/// * `Conversion` - Finalized profiles, ready to be written to a sink
pub fn convert_file<P: AsRef<Path>>(path: P, config: ConverterConfig) -> Result<Conversion> {
    Converter::from_file(path, config)?.convert()
}
