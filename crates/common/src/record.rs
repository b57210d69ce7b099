//! Output records emitted into a profile
//!
//! A record is the structured form of one TOSCA type definition. Records
//! carry no formatting decisions beyond the description style; turning
//! them into YAML is the sink's job.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A TOSCA node type or data type definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeRecord {
    /// Type name within its profile (the schema "kind")
    pub name: String,

    /// Parent type (`derived_from`)
    #[serde(default)]
    pub derived_from: Option<String>,

    /// Description text with its rendering style
    #[serde(default)]
    pub description: Option<Description>,

    /// Passthrough metadata (recognized extension keywords)
    #[serde(default)]
    pub metadata: IndexMap<String, Value>,

    /// Value constraints (string-derived data types)
    #[serde(default)]
    pub constraints: Vec<Constraint>,

    /// Entry schema (list-derived data types)
    #[serde(default)]
    pub entry_schema: Option<String>,

    /// Properties in schema order
    #[serde(default)]
    pub properties: Vec<PropertyRecord>,

    /// The source schema declared no type; rendered as `string`
    #[serde(default)]
    pub any_type: bool,
}

impl TypeRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            derived_from: None,
            description: None,
            metadata: IndexMap::new(),
            constraints: Vec::new(),
            entry_schema: None,
            properties: Vec::new(),
            any_type: false,
        }
    }

    /// Look up a property by name
    pub fn property(&self, name: &str) -> Option<&PropertyRecord> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// A property definition inside a type record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub name: String,

    #[serde(default)]
    pub description: Option<Description>,

    /// True iff the property is listed in the owning schema's `required`
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// TOSCA type name, qualified with a namespace prefix when imported
    #[serde(rename = "type")]
    pub type_name: String,

    #[serde(default)]
    pub entry_schema: Option<String>,

    #[serde(default)]
    pub constraints: Vec<Constraint>,

    #[serde(default)]
    pub metadata: IndexMap<String, Value>,

    /// No declared type and no reference; rendered as `string`
    #[serde(default)]
    pub any_type: bool,
}

impl PropertyRecord {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            required: false,
            default: None,
            type_name: type_name.into(),
            entry_schema: None,
            constraints: Vec::new(),
            metadata: IndexMap::new(),
            any_type: false,
        }
    }
}

/// TOSCA constraint clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    ValidValues(Vec<Value>),
    MaxLength(u64),
    MinLength(u64),
    Pattern(String),
}

/// How description text is laid out in YAML
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextStyle {
    /// `description: text`
    Plain,
    /// `description: >-` followed by the lines
    Folded,
    /// `description: |-` followed by the lines
    Literal,
}

/// Description text split into output lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    pub style: TextStyle,
    pub lines: Vec<String>,
}

impl Description {
    /// The text as it reads once the YAML is loaded again
    pub fn text(&self) -> String {
        match self.style {
            TextStyle::Literal => self.lines.join("\n"),
            TextStyle::Plain | TextStyle::Folded => self.lines.join(" "),
        }
    }
}
