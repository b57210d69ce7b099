//! OpenAPI document loading
//!
//! The document is kept as an order-preserving JSON tree so that schema and
//! property order in the output matches the input.

use oas2tosca_common::{ConvertError, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// A parsed OpenAPI/Swagger document
#[derive(Debug, Clone)]
pub struct Document {
    root: Value,
}

impl Document {
    /// Load a document from a JSON or YAML file.
    ///
    /// `.json` files are parsed as JSON and `.yaml`/`.yml` as YAML. Any other
    /// extension is tried as JSON first, then YAML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ConvertError::Parse(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("json") => Self::from_json(&content),
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            _ => Self::from_json(&content).or_else(|_| Self::from_yaml(&content)),
        }
    }

    /// Parse a document from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(json)
            .map_err(|e| ConvertError::Parse(format!("Failed to parse JSON document: {}", e)))?;
        Self::from_value(root)
    }

    /// Parse a document from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let root: Value = serde_yaml::from_str(yaml)
            .map_err(|e| ConvertError::Parse(format!("Failed to parse YAML document: {}", e)))?;
        Self::from_value(root)
    }

    /// Wrap an already parsed tree. The root must be a mapping.
    pub fn from_value(root: Value) -> Result<Self> {
        if !root.is_object() {
            return Err(ConvertError::Parse(
                "Document root is not a mapping".to_string(),
            ));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// The version discriminator: `swagger` for v2, `openapi` for v3
    pub fn version(&self) -> Result<&str> {
        self.root
            .get("swagger")
            .or_else(|| self.root.get("openapi"))
            .and_then(Value::as_str)
            .ok_or(ConvertError::MissingVersion)
    }

    /// The (required) Info Object
    pub fn info(&self) -> Result<&Value> {
        self.root
            .get("info")
            .filter(|info| info.is_object())
            .ok_or(ConvertError::MissingInfo)
    }

    /// The Paths Object, if present and non-empty
    pub fn paths(&self) -> Option<&Map<String, Value>> {
        self.root
            .get("paths")
            .and_then(Value::as_object)
            .filter(|paths| !paths.is_empty())
    }

    /// Walk a sequence of keys from the root
    pub fn lookup(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter()
            .try_fold(&self.root, |node, key| node.get(*key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_prefers_swagger_field() {
        let doc = Document::from_json(r#"{"swagger": "2.0", "info": {"title": "t"}}"#).unwrap();
        assert_eq!(doc.version().unwrap(), "2.0");

        let doc = Document::from_json(r#"{"openapi": "3.0.1", "info": {"title": "t"}}"#).unwrap();
        assert_eq!(doc.version().unwrap(), "3.0.1");
    }

    #[test]
    fn test_missing_version_and_info() {
        let doc = Document::from_json(r#"{"paths": {}}"#).unwrap();
        assert!(matches!(doc.version(), Err(ConvertError::MissingVersion)));
        assert!(matches!(doc.info(), Err(ConvertError::MissingInfo)));
        assert!(doc.paths().is_none());
    }

    #[test]
    fn test_yaml_preserves_key_order() {
        let yaml = r#"
swagger: "2.0"
info:
  title: ordered
definitions:
  zeta.v1.Z:
    type: object
  alpha.v1.A:
    type: object
"#;
        let doc = Document::from_yaml(yaml).unwrap();
        let names: Vec<&String> = doc
            .lookup(&["definitions"])
            .and_then(Value::as_object)
            .unwrap()
            .keys()
            .collect();
        assert_eq!(names, vec!["zeta.v1.Z", "alpha.v1.A"]);
    }

    #[test]
    fn test_non_mapping_root_is_rejected() {
        assert!(Document::from_json("[1, 2, 3]").is_err());
        assert!(Document::from_json("{not json").is_err());
    }
}
