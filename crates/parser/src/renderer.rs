//! TOSCA type rendering
//!
//! Converts JSON Schema keywords into [`TypeRecord`]s. Rendering is scoped to
//! the profile that owns the type so references into other profiles can be
//! qualified with the prefix they are imported under.
//!
//! Keywords the renderer does not translate are collected and reported once
//! the conversion is done; they never change the emitted record.

use crate::property_type::PropertyType;
use crate::reference;
use crate::schema_name::SchemaName;
use crate::session::Context;
use crate::text;
use indexmap::IndexMap;
use oas2tosca_common::{Constraint, ConvertError, Profile, PropertyRecord, Result, TypeRecord};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Kubernetes resource marker, copied into type metadata
pub const GROUP_VERSION_KIND: &str = "x-kubernetes-group-version-kind";

/// List extensions copied into list metadata
const LIST_METADATA: &[&str] = &["x-kubernetes-list-map-keys", "x-kubernetes-list-type"];

/// Property keywords the renderer translates (or deliberately ignores)
const HANDLED_KEYWORDS: &[&str] = &[
    "$ref",
    "additionalProperties",
    "default",
    "description",
    "enum",
    "format",
    "items",
    "maxLength",
    "minLength",
    "pattern",
    "type",
    "x-kubernetes-list-map-keys",
    "x-kubernetes-list-type",
];

/// Renders types into one profile
pub struct TypeRenderer<'c, 'a> {
    ctx: &'c Context<'a>,
    profile: &'c Profile,
    unhandled: BTreeSet<String>,
}

impl<'c, 'a> TypeRenderer<'c, 'a> {
    pub fn new(ctx: &'c Context<'a>, profile: &'c Profile) -> Self {
        Self {
            ctx,
            profile,
            unhandled: BTreeSet::new(),
        }
    }

    /// Keywords seen while rendering that have no translation
    pub fn finish(self) -> BTreeSet<String> {
        self.unhandled
    }

    /// Render a node type. Node types always derive from the root node type.
    pub fn node_type(&mut self, kind: &str, schema: &Value) -> TypeRecord {
        let mut record = TypeRecord::new(kind);
        record.description = self.description(schema);

        // Node type definitions do not support 'default' or 'enum'
        for keyword in ["default", "enum"] {
            if schema.get(keyword).is_some() {
                tracing::error!("{}: '{}' not supported", kind, keyword);
            }
        }

        record.derived_from = Some(self.ctx.config.root_node_type.clone());
        self.object_keywords(&mut record, schema);
        record
    }

    /// Render a data type, derived according to the schema's declared type
    pub fn data_type(&mut self, kind: &str, schema: &Value) -> Result<TypeRecord> {
        let mut record = TypeRecord::new(kind);
        record.description = self.description(schema);

        if schema.get("default").is_some() {
            tracing::error!("{}: 'default' not supported", kind);
        }

        match schema.get("type").and_then(Value::as_str) {
            Some("object") => {
                record.derived_from = Some(self.ctx.config.root_data_type.clone());
                self.object_keywords(&mut record, schema);
            }
            Some("string") => {
                record.derived_from = Some("string".to_string());
                record.constraints = string_constraints(kind, schema);
            }
            Some("array") => {
                record.derived_from = Some("list".to_string());
                record.entry_schema = self.entry_schema(kind, schema);
                record.metadata = list_metadata(schema);
            }
            Some("integer") => record.derived_from = Some("integer".to_string()),
            Some("number") => record.derived_from = Some("float".to_string()),
            Some("boolean") => record.derived_from = Some("boolean".to_string()),
            Some("null") => record.derived_from = Some("null".to_string()),
            Some(other) => {
                return Err(ConvertError::UnknownSchemaType {
                    name: kind.to_string(),
                    schema_type: other.to_string(),
                })
            }
            None => {
                // No 'any' in TOSCA
                tracing::debug!("{}: any type rendered as string", kind);
                record.derived_from = Some("string".to_string());
                record.any_type = true;
            }
        }

        Ok(record)
    }

    fn object_keywords(&mut self, record: &mut TypeRecord, schema: &Value) {
        // The marker is a list for some reason; the first entry is the resource
        if let Some(marker) = schema.get(GROUP_VERSION_KIND) {
            let marker = match marker {
                Value::Array(entries) => entries.first().cloned(),
                other => Some(other.clone()),
            };
            if let Some(marker) = marker {
                record.metadata.insert(GROUP_VERSION_KIND.to_string(), marker);
            }
        }

        let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
            return;
        };
        let required = required_names(schema);
        for (name, property) in properties {
            if let Some(rendered) = self.property(name, property, &required) {
                record.properties.push(rendered);
            }
        }
    }

    fn property(
        &mut self,
        name: &str,
        schema: &Value,
        required: &BTreeSet<&str>,
    ) -> Option<PropertyRecord> {
        if let Some(keywords) = schema.as_object() {
            self.note_unhandled(keywords);
        }

        let mut record = PropertyRecord::new(name, "string");
        record.description = self.description(schema);
        record.required = required.contains(name);
        record.default = schema.get("default").cloned();

        match PropertyType::classify(schema) {
            PropertyType::Primitive("object") => {
                // No better generic type for inline objects
                tracing::info!(
                    "{}: property of type 'object' rendered as {}",
                    name,
                    self.ctx.config.root_data_type
                );
                record.type_name = self.ctx.config.root_data_type.clone();
            }
            PropertyType::Primitive("string") => {
                record.constraints = string_constraints(name, schema);
            }
            PropertyType::Primitive("array") => {
                record.type_name = "list".to_string();
                record.entry_schema = self.entry_schema(name, schema);
                record.metadata = list_metadata(schema);
            }
            PropertyType::Primitive("integer") => record.type_name = "integer".to_string(),
            PropertyType::Primitive("number") => record.type_name = "float".to_string(),
            PropertyType::Primitive("boolean") => record.type_name = "boolean".to_string(),
            PropertyType::Primitive("null") => record.type_name = "null".to_string(),
            PropertyType::Primitive(other) => {
                tracing::error!("{}: unknown type '{}'", name, other);
                return None;
            }
            PropertyType::Reference(pointer) => {
                record.type_name = self.type_name(pointer);
            }
            PropertyType::ArrayOf(pointer) => {
                record.type_name = "list".to_string();
                record.entry_schema = Some(self.type_name(pointer));
                record.metadata = list_metadata(schema);
            }
            PropertyType::MapOf(pointer) => {
                record.type_name = "map".to_string();
                record.entry_schema = Some(self.type_name(pointer));
            }
            PropertyType::Absent => {
                tracing::debug!("{}: any type rendered as string", name);
                record.any_type = true;
            }
        }

        Some(record)
    }

    /// Entry schema of an array from its `items`
    fn entry_schema(&self, name: &str, schema: &Value) -> Option<String> {
        let items = schema.get("items");
        if let Some(pointer) = items.and_then(|i| i.get("$ref")).and_then(Value::as_str) {
            return Some(self.type_name(pointer));
        }
        if let Some(item_type) = items.and_then(|i| i.get("type")).and_then(Value::as_str) {
            return Some(self.tosca_type(item_type));
        }
        tracing::error!("{}: no entry schema found", name);
        None
    }

    /// Name of a referenced type as seen from this profile
    fn type_name(&self, pointer: &str) -> String {
        let target = match self.ctx.version.resolve(self.ctx.document, pointer) {
            Ok(resolved) => self.ctx.version.schema_name(&resolved.name, resolved.schema),
            Err(e) => {
                tracing::warn!("{}", e);
                match reference::target_name(pointer) {
                    Some(name) => SchemaName::parse(name),
                    None => return pointer.to_string(),
                }
            }
        };

        if target.has_namespace() && target.namespace != self.profile.name {
            let prefix = self
                .profile
                .import_prefix(&target.namespace)
                .unwrap_or(&target.prefix);
            if !prefix.is_empty() {
                return format!("{}:{}", prefix, target.kind);
            }
        }
        target.kind
    }

    fn tosca_type(&self, schema_type: &str) -> String {
        match schema_type {
            "array" => "list".to_string(),
            "object" => self.ctx.config.root_data_type.clone(),
            "number" => "float".to_string(),
            other => other.to_string(),
        }
    }

    fn description(&self, schema: &Value) -> Option<oas2tosca_common::Description> {
        schema
            .get("description")
            .and_then(Value::as_str)
            .map(|d| text::describe(d, self.ctx.config.wrap_width))
    }

    fn note_unhandled(&mut self, keywords: &Map<String, Value>) {
        for keyword in keywords.keys() {
            if !HANDLED_KEYWORDS.contains(&keyword.as_str()) {
                self.unhandled.insert(keyword.clone());
            }
        }
    }
}

fn required_names(schema: &Value) -> BTreeSet<&str> {
    schema
        .get("required")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .collect()
}

fn string_constraints(name: &str, schema: &Value) -> Vec<Constraint> {
    if let Some(format) = schema.get("format") {
        tracing::warn!("{}: format {} not supported for strings", name, format);
    }

    let mut constraints = Vec::new();
    if let Some(values) = schema.get("enum").and_then(Value::as_array) {
        constraints.push(Constraint::ValidValues(values.clone()));
    }
    if let Some(max) = schema.get("maxLength").and_then(Value::as_u64) {
        constraints.push(Constraint::MaxLength(max));
    }
    if let Some(min) = schema.get("minLength").and_then(Value::as_u64) {
        constraints.push(Constraint::MinLength(min));
    }
    if let Some(pattern) = schema.get("pattern").and_then(Value::as_str) {
        constraints.push(Constraint::Pattern(pattern.to_string()));
    }
    constraints
}

fn list_metadata(schema: &Value) -> IndexMap<String, Value> {
    LIST_METADATA
        .iter()
        .filter_map(|key| schema.get(*key).map(|value| (key.to_string(), value.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConverterConfig;
    use crate::document::Document;
    use crate::openapi::Swagger2;
    use oas2tosca_common::TextStyle;
    use serde_json::json;

    fn document() -> Document {
        Document::from_value(json!({
            "swagger": "2.0",
            "definitions": {
                "pkg.v1.Local": {"type": "object"},
                "pkg2.v1.Bar": {"type": "object"},
                "x.v1.Y": {"type": "object"}
            }
        }))
        .unwrap()
    }

    fn with_renderer<T>(f: impl FnOnce(&mut TypeRenderer<'_, '_>) -> T) -> (T, BTreeSet<String>) {
        let document = document();
        let config = ConverterConfig::default();
        let ctx = Context {
            document: &document,
            version: &Swagger2,
            config: &config,
        };
        let mut profile = Profile::new("pkg", "v1", "pkg");
        profile.add_dependency("pkg2", "pkg2");
        let mut renderer = TypeRenderer::new(&ctx, &profile);
        let result = f(&mut renderer);
        (result, renderer.finish())
    }

    #[test]
    fn test_node_type_properties() {
        let schema = json!({
            "type": "object",
            "description": "A foo",
            "required": ["bar"],
            "x-kubernetes-group-version-kind": [{"group": "", "kind": "Foo", "version": "v1"}],
            "properties": {
                "bar": {"$ref": "#/definitions/pkg2.v1.Bar"},
                "local": {"$ref": "#/definitions/pkg.v1.Local"},
                "replicas": {"type": "integer", "default": 1},
                "ratio": {"type": "number"}
            }
        });
        let (record, _) = with_renderer(|r| r.node_type("Foo", &schema));

        assert_eq!(record.derived_from.as_deref(), Some("tosca.nodes.Root"));
        assert_eq!(record.description.as_ref().unwrap().style, TextStyle::Plain);
        assert_eq!(record.metadata[GROUP_VERSION_KIND]["kind"], "Foo");

        let names: Vec<&str> = record.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["bar", "local", "replicas", "ratio"]);

        let bar = record.property("bar").unwrap();
        assert_eq!(bar.type_name, "pkg2:Bar");
        assert!(bar.required);

        let local = record.property("local").unwrap();
        assert_eq!(local.type_name, "Local");
        assert!(!local.required);

        let replicas = record.property("replicas").unwrap();
        assert_eq!(replicas.type_name, "integer");
        assert_eq!(replicas.default, Some(json!(1)));

        assert_eq!(record.property("ratio").unwrap().type_name, "float");
    }

    #[test]
    fn test_array_of_reference() {
        let schema = json!({
            "type": "object",
            "properties": {
                "ys": {"items": {"$ref": "#/definitions/x.v1.Y"}, "x-kubernetes-list-type": "atomic"},
                "names": {"type": "array", "items": {"type": "string"}},
                "labels": {"type": "object", "additionalProperties": {"$ref": "#/definitions/pkg2.v1.Bar"}}
            }
        });
        let (record, _) = with_renderer(|r| r.node_type("Foo", &schema));

        let ys = record.property("ys").unwrap();
        assert_eq!(ys.type_name, "list");
        assert_eq!(ys.entry_schema.as_deref(), Some("x:Y"));
        assert_eq!(ys.metadata["x-kubernetes-list-type"], "atomic");

        let names = record.property("names").unwrap();
        assert_eq!(names.type_name, "list");
        assert_eq!(names.entry_schema.as_deref(), Some("string"));

        let labels = record.property("labels").unwrap();
        assert_eq!(labels.type_name, "map");
        assert_eq!(labels.entry_schema.as_deref(), Some("pkg2:Bar"));
    }

    #[test]
    fn test_untyped_schema_falls_back_to_string() {
        let (record, _) = with_renderer(|r| r.data_type("Anything", &json!({"description": "x"})));
        let record = record.unwrap();
        assert_eq!(record.derived_from.as_deref(), Some("string"));
        assert!(record.any_type);

        let schema = json!({"type": "object", "properties": {"raw": {}}});
        let (record, _) = with_renderer(|r| r.data_type("Holder", &schema));
        let raw = record.unwrap().properties.remove(0);
        assert_eq!(raw.type_name, "string");
        assert!(raw.any_type);
    }

    #[test]
    fn test_string_constraints() {
        let schema = json!({
            "type": "string",
            "enum": ["Always", "Never"],
            "maxLength": 16,
            "minLength": 1,
            "pattern": "^[A-Z]"
        });
        let (record, _) = with_renderer(|r| r.data_type("Policy", &schema));
        assert_eq!(
            record.unwrap().constraints,
            vec![
                Constraint::ValidValues(vec![json!("Always"), json!("Never")]),
                Constraint::MaxLength(16),
                Constraint::MinLength(1),
                Constraint::Pattern("^[A-Z]".to_string()),
            ]
        );
    }

    #[test]
    fn test_data_type_derivation() {
        for (schema_type, derived) in [
            ("object", "tosca.datatypes.Root"),
            ("integer", "integer"),
            ("number", "float"),
            ("boolean", "boolean"),
            ("array", "list"),
        ] {
            let schema = json!({"type": schema_type, "items": {"type": "integer"}});
            let (record, _) = with_renderer(|r| r.data_type("T", &schema));
            assert_eq!(record.unwrap().derived_from.as_deref(), Some(derived));
        }

        let (record, _) = with_renderer(|r| r.data_type("T", &json!({"type": "file"})));
        assert!(matches!(
            record,
            Err(ConvertError::UnknownSchemaType { schema_type, .. }) if schema_type == "file"
        ));
    }

    #[test]
    fn test_unhandled_keywords_are_collected() {
        let schema = json!({
            "type": "object",
            "properties": {
                "port": {"type": "integer", "minimum": 1, "x-kubernetes-int-or-string": true},
                "name": {"type": "string", "readOnly": true}
            }
        });
        let (record, unhandled) = with_renderer(|r| r.node_type("Svc", &schema));
        assert_eq!(record.properties.len(), 2);
        let unhandled: Vec<&str> = unhandled.iter().map(String::as_str).collect();
        assert_eq!(unhandled, vec!["minimum", "readOnly", "x-kubernetes-int-or-string"]);
    }

    #[test]
    fn test_unresolved_reference_uses_pointer_name() {
        let schema = json!({"type": "object", "properties": {"other": {"$ref": "#/definitions/zz.v1.Gone"}}});
        let (record, _) = with_renderer(|r| r.node_type("Foo", &schema));
        assert_eq!(record.property("other").unwrap().type_name, "zz:Gone");
    }
}
