//! Local `$ref` resolution
//!
//! Only document-local pointers (`#/...`) are supported. The last pointer
//! segment is the name of the resolved schema.

use oas2tosca_common::{ConvertError, Result};
use serde_json::Value;

/// A schema found by following a reference
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<'a> {
    pub name: String,
    pub schema: &'a Value,
}

/// Follow `pointer` from `root`.
///
/// Fails with `UnsupportedReference` for anything that is not rooted at the
/// document and with `UnresolvedReference` when a segment does not exist.
pub fn resolve<'a>(root: &'a Value, pointer: &str) -> Result<Resolved<'a>> {
    let path = pointer
        .strip_prefix("#/")
        .ok_or_else(|| ConvertError::UnsupportedReference(pointer.to_string()))?;

    let mut node = root;
    let mut name = String::new();
    for segment in path.split('/') {
        let key = unescape(segment);
        node = match node {
            Value::Object(map) => map.get(key.as_str()),
            Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
        .ok_or_else(|| ConvertError::UnresolvedReference(pointer.to_string()))?;
        name = key;
    }

    if name.is_empty() {
        return Err(ConvertError::UnresolvedReference(pointer.to_string()));
    }

    Ok(Resolved { name, schema: node })
}

/// Name a local pointer refers to, without resolving it
pub fn target_name(pointer: &str) -> Option<&str> {
    pointer
        .strip_prefix("#/")
        .and_then(|path| path.rsplit('/').next())
        .filter(|name| !name.is_empty())
}

fn unescape(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}
