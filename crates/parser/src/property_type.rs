//! Property type classification
//!
//! A property schema names its type through one of several keywords. The
//! classifier looks at them once, in a fixed order, so the dependency pass,
//! the materializer and the renderer agree on what a property refers to.

use serde_json::Value;

/// What a property schema's type is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType<'a> {
    /// Declared JSON Schema type without a schema reference
    Primitive(&'a str),
    /// `$ref` to another schema
    Reference(&'a str),
    /// Array whose `items` reference another schema
    ArrayOf(&'a str),
    /// Map whose `additionalProperties` reference another schema
    MapOf(&'a str),
    /// No type and no reference
    Absent,
}

impl<'a> PropertyType<'a> {
    pub fn classify(property: &'a Value) -> Self {
        let declared = property.get("type").and_then(Value::as_str);
        let direct = ref_of(Some(property));
        let items = ref_of(property.get("items"));
        let values = ref_of(property.get("additionalProperties"));

        match (declared, direct, items, values) {
            (Some("array"), _, Some(entry), _) => PropertyType::ArrayOf(entry),
            (Some("object"), _, _, Some(entry)) => PropertyType::MapOf(entry),
            (Some(declared), _, _, _) => PropertyType::Primitive(declared),
            (None, Some(target), _, _) => PropertyType::Reference(target),
            (None, None, Some(entry), _) => PropertyType::ArrayOf(entry),
            (None, None, None, Some(entry)) => PropertyType::MapOf(entry),
            (None, None, None, None) => PropertyType::Absent,
        }
    }

    /// The schema pointer this property depends on, if any
    pub fn reference(&self) -> Option<&'a str> {
        match *self {
            PropertyType::Reference(target)
            | PropertyType::ArrayOf(target)
            | PropertyType::MapOf(target) => Some(target),
            PropertyType::Primitive(_) | PropertyType::Absent => None,
        }
    }
}

fn ref_of(schema: Option<&Value>) -> Option<&str> {
    schema
        .and_then(|s| s.get("$ref"))
        .and_then(Value::as_str)
}
