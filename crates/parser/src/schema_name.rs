//! Schema name decomposition
//!
//! Schema names such as `io.k8s.api.core.v1.Pod` are split into a profile
//! namespace (`io.k8s.api.core`), a version tag (`v1`), a kind (`Pod`) and
//! the prefix other profiles import the namespace under (`core`).

use serde_json::Value;

/// Extension keyword that overrides the schema name for decomposition
pub const ROUTER_MODEL_KEY: &str = "x-swagger-router-model";

/// Components of a dotted schema identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SchemaName {
    pub namespace: String,
    pub version: String,
    pub kind: String,
    pub prefix: String,
}

impl SchemaName {
    /// Decompose `identifier`.
    ///
    /// - one segment: only a kind
    /// - two segments: `namespace.kind`, the namespace doubles as prefix
    /// - three or more: the second-to-last segment is a version tag if it
    ///   starts with `v1` or `v2`; the prefix is the segment before the
    ///   version (or before the kind when there is no version)
    pub fn parse(identifier: &str) -> Self {
        let segments: Vec<&str> = identifier.split('.').collect();
        let len = segments.len();

        if len < 2 {
            return Self {
                kind: identifier.to_string(),
                ..Self::default()
            };
        }

        if len == 2 {
            return Self {
                namespace: segments[0].to_string(),
                version: String::new(),
                kind: segments[1].to_string(),
                prefix: segments[0].to_string(),
            };
        }

        let candidate = segments[len - 2];
        let kind = segments[len - 1].to_string();
        if is_version_tag(candidate) {
            Self {
                namespace: segments[..len - 2].join("."),
                version: candidate.to_string(),
                kind,
                prefix: segments[len - 3].to_string(),
            }
        } else {
            Self {
                namespace: segments[..len - 1].join("."),
                version: String::new(),
                kind,
                prefix: candidate.to_string(),
            }
        }
    }

    /// Decompose the name of `schema`, honoring a router-model override
    pub fn of(identifier: &str, schema: &Value) -> Self {
        let model = schema
            .get(ROUTER_MODEL_KEY)
            .and_then(Value::as_str)
            .unwrap_or(identifier);
        Self::parse(model)
    }

    pub fn has_namespace(&self) -> bool {
        !self.namespace.is_empty()
    }

    /// True when no version tag is present or it equals `supported`
    pub fn is_supported(&self, supported: &str) -> bool {
        self.version.is_empty() || self.version == supported
    }

    /// `namespace.version.kind`, skipping empty components
    pub fn qualified_name(&self) -> String {
        [
            self.namespace.as_str(),
            self.version.as_str(),
            self.kind.as_str(),
        ]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(".")
    }
}

fn is_version_tag(segment: &str) -> bool {
    segment.starts_with("v1") || segment.starts_with("v2")
}
