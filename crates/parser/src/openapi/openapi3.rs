//! OpenAPI 3.x documents

use super::{post_operation, CreatableResource, OpenApiVersion};
use crate::document::Document;
use crate::reference;
use serde_json::{Map, Value};

/// Only JSON request bodies describe creatable resources
const JSON_MEDIA_TYPE: &str = "application/json";

/// OpenAPI 3.x: `components.schemas` and POST request bodies
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenApi3;

impl OpenApiVersion for OpenApi3 {
    fn label(&self) -> &'static str {
        "OpenAPI 3"
    }

    fn schemas<'a>(&self, document: &'a Document) -> Option<&'a Map<String, Value>> {
        document
            .lookup(&["components", "schemas"])
            .and_then(Value::as_object)
    }

    fn creatable_resources<'a>(&self, document: &'a Document) -> Vec<CreatableResource<'a>> {
        let Some(paths) = document.paths() else {
            tracing::error!("No Paths Object");
            return Vec::new();
        };

        let mut resources = Vec::new();
        for (path, item) in paths {
            let Some(post) = post_operation(path, item) else {
                continue;
            };
            let Some(body) = request_body(document, path, post) else {
                tracing::info!("{}: no request body", path);
                continue;
            };
            match body
                .get("content")
                .and_then(|content| content.get(JSON_MEDIA_TYPE))
                .and_then(|media| media.get("schema"))
            {
                Some(schema) => resources.push(CreatableResource { path, schema }),
                None => tracing::info!("{}: no JSON content", path),
            }
        }
        resources
    }
}

/// The request body of an operation, following a `$ref` into
/// `components.requestBodies`
fn request_body<'a>(document: &'a Document, path: &str, operation: &'a Value) -> Option<&'a Value> {
    let body = operation.get("requestBody")?;
    match body.get("$ref").and_then(Value::as_str) {
        Some(pointer) => match reference::resolve(document.root(), pointer) {
            Ok(resolved) => Some(resolved.schema),
            Err(e) => {
                tracing::warn!("{}: {}", path, e);
                None
            }
        },
        None => Some(body),
    }
}
