//! Version-specific document access
//!
//! Swagger 2.0 and OpenAPI 3.x keep schemas and request bodies in different
//! places. Everything else in the conversion is version independent and goes
//! through [`OpenApiVersion`].
//!
//! ## Supported Versions
//! - **Swagger 2.0**: schemas under `definitions`, creatable resources from
//!   `body` parameters of POST operations
//! - **OpenAPI 3.x**: schemas under `components.schemas`, creatable resources
//!   from the `application/json` request body of POST operations

mod openapi3;
mod swagger2;

pub use openapi3::OpenApi3;
pub use swagger2::Swagger2;

use crate::document::Document;
use crate::reference::{self, Resolved};
use crate::schema_name::SchemaName;
use oas2tosca_common::{ConvertError, Result};
use serde_json::{Map, Value};

/// A POST request body schema found on a path
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CreatableResource<'a> {
    /// Path the operation is defined on, e.g. `/api/v1/namespaces/{namespace}/pods`
    pub path: &'a str,

    /// Request body schema (expected to be a `$ref`)
    pub schema: &'a Value,
}

/// Capabilities that differ between OpenAPI versions
pub trait OpenApiVersion {
    /// Human readable version label
    fn label(&self) -> &'static str;

    /// The schema definitions container
    fn schemas<'a>(&self, document: &'a Document) -> Option<&'a Map<String, Value>>;

    /// Request body schemas of every operation that creates a resource
    fn creatable_resources<'a>(&self, document: &'a Document) -> Vec<CreatableResource<'a>>;

    /// Resolve a document-local reference
    fn resolve<'a>(&self, document: &'a Document, pointer: &str) -> Result<Resolved<'a>> {
        reference::resolve(document.root(), pointer)
    }

    /// Decompose the name of a schema
    fn schema_name(&self, identifier: &str, schema: &Value) -> SchemaName {
        SchemaName::of(identifier, schema)
    }
}

/// Pick the capability for the document's version discriminator
pub fn select(document: &Document) -> Result<Box<dyn OpenApiVersion>> {
    let version = document.version()?;
    match version.chars().next() {
        Some('2') => Ok(Box::new(Swagger2)),
        Some('3') => Ok(Box::new(OpenApi3)),
        _ => Err(ConvertError::UnsupportedVersion(version.to_string())),
    }
}

/// The POST operation of a path item, if there is one
fn post_operation<'a>(path: &str, item: &'a Value) -> Option<&'a Value> {
    let post = item.get("post").filter(|post| post.is_object());
    if post.is_none() {
        tracing::debug!("'{}' does not have POST", path);
    }
    post
}
