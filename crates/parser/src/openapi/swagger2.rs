//! Swagger 2.0 documents

use super::{post_operation, CreatableResource, OpenApiVersion};
use crate::document::Document;
use crate::reference;
use serde_json::{Map, Value};

/// Swagger 2.0: `definitions` and `in: body` parameters
#[derive(Debug, Clone, Copy, Default)]
pub struct Swagger2;

impl OpenApiVersion for Swagger2 {
    fn label(&self) -> &'static str {
        "Swagger 2.0"
    }

    fn schemas<'a>(&self, document: &'a Document) -> Option<&'a Map<String, Value>> {
        document.lookup(&["definitions"]).and_then(Value::as_object)
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

            // Path-level parameters apply to the POST as well
            let parameters = parameters_of(item).chain(parameters_of(post));
            for parameter in parameters {
                let parameter = resolve_parameter(document, path, parameter);
                if parameter.get("in").and_then(Value::as_str) != Some("body") {
                    continue;
                }
                match parameter.get("schema") {
                    Some(schema) => resources.push(CreatableResource { path, schema }),
                    None => tracing::error!("{}: body parameter without schema", path),
                }
            }
        }
        resources
    }
}

fn parameters_of(value: &Value) -> impl Iterator<Item = &Value> {
    value
        .get("parameters")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

/// Parameters may be references into the top-level `parameters` section
fn resolve_parameter<'a>(document: &'a Document, path: &str, parameter: &'a Value) -> &'a Value {
    match parameter.get("$ref").and_then(Value::as_str) {
        Some(pointer) => match reference::resolve(document.root(), pointer) {
            Ok(resolved) => resolved.schema,
            Err(e) => {
                tracing::warn!("{}: {}", path, e);
                parameter
            }
        },
        None => parameter,
    }
}
