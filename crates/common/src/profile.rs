//! TOSCA profiles
//!
//! A profile is one output namespace. It is created when the dependency
//! pass first sees a schema in its namespace, collects emitted type records
//! while types are materialized, and is finalized once every schema has
//! been processed.

use crate::record::TypeRecord;
use crate::{ConvertError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle of a profile within one conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileStatus {
    /// Created by the dependency pass
    Collected,
    /// Output target prepared, accepting records
    Initialized,
    /// Closed; no further records
    Finalized,
}

/// Result of registering a dependency edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyOutcome {
    /// First edge to this namespace
    Added,
    /// Same namespace with the same prefix
    Unchanged,
    /// Same namespace with a different prefix; the first one is kept
    Conflict { kept: String, rejected: String },
}

/// One output namespace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Namespace, e.g. `io.k8s.api.core`
    pub name: String,

    /// Version tag of the schema that created this profile (may be empty)
    pub version: String,

    /// Prefix other profiles use when importing this one
    pub prefix: String,

    /// Dependency namespace -> prefix it is imported under, in first-seen order
    pub dependencies: IndexMap<String, String>,

    pub node_types: Vec<TypeRecord>,

    pub data_types: Vec<TypeRecord>,

    /// Set once the first record has been emitted
    pub materialization_started: bool,

    pub status: ProfileStatus,
}

impl Profile {
    pub fn new(name: impl Into<String>, version: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            prefix: prefix.into(),
            dependencies: IndexMap::new(),
            node_types: Vec::new(),
            data_types: Vec::new(),
            materialization_started: false,
            status: ProfileStatus::Collected,
        }
    }

    /// Record that this profile imports `namespace` under `prefix`.
    ///
    /// A namespace can be registered any number of times, but always with
    /// the same prefix. A conflicting prefix is logged and the first one wins.
    pub fn add_dependency(&mut self, namespace: &str, prefix: &str) -> DependencyOutcome {
        match self.dependencies.get(namespace) {
            Some(existing) if existing == prefix => DependencyOutcome::Unchanged,
            Some(existing) => {
                tracing::error!(
                    profile = %self.name,
                    "{}: prefix {} conflicts with previously configured {}",
                    namespace,
                    prefix,
                    existing
                );
                DependencyOutcome::Conflict {
                    kept: existing.clone(),
                    rejected: prefix.to_string(),
                }
            }
            None => {
                self.dependencies
                    .insert(namespace.to_string(), prefix.to_string());
                DependencyOutcome::Added
            }
        }
    }

    /// Prefix under which `namespace` is imported, if it is a dependency
    pub fn import_prefix(&self, namespace: &str) -> Option<&str> {
        self.dependencies.get(namespace).map(String::as_str)
    }

    /// Prepare the profile for receiving records
    pub fn initialize(&mut self) {
        self.status = ProfileStatus::Initialized;
    }

    pub fn emit_node_type(&mut self, record: TypeRecord) -> Result<()> {
        self.ensure_open()?;
        self.materialization_started = true;
        self.node_types.push(record);
        Ok(())
    }

    pub fn emit_data_type(&mut self, record: TypeRecord) -> Result<()> {
        self.ensure_open()?;
        self.materialization_started = true;
        self.data_types.push(record);
        Ok(())
    }

    pub fn finalize(&mut self) {
        self.status = ProfileStatus::Finalized;
    }

    pub fn node_type(&self, name: &str) -> Option<&TypeRecord> {
        self.node_types.iter().find(|t| t.name == name)
    }

    pub fn data_type(&self, name: &str) -> Option<&TypeRecord> {
        self.data_types.iter().find(|t| t.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.node_types.is_empty() && self.data_types.is_empty()
    }

    fn ensure_open(&self) -> Result<()> {
        match self.status {
            ProfileStatus::Initialized => Ok(()),
            status => Err(ConvertError::Generation(format!(
                "profile {} is not accepting records ({:?})",
                self.name, status
            ))),
        }
    }
}

/// Destination for finalized profiles
///
/// `info` is the document's Info Object, passed through as profile metadata.
pub trait ProfileSink {
    fn write_profile(&mut self, profile: &Profile, info: &Value) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_prefix_wins() {
        let mut profile = Profile::new("io.k8s.api.apps", "v1", "apps");

        assert_eq!(
            profile.add_dependency("io.k8s.api.core", "core"),
            DependencyOutcome::Added
        );
        assert_eq!(
            profile.add_dependency("io.k8s.api.core", "core"),
            DependencyOutcome::Unchanged
        );
        assert_eq!(
            profile.add_dependency("io.k8s.api.core", "corev1"),
            DependencyOutcome::Conflict {
                kept: "core".to_string(),
                rejected: "corev1".to_string(),
            }
        );
        assert_eq!(profile.import_prefix("io.k8s.api.core"), Some("core"));
        assert_eq!(profile.dependencies.len(), 1);
    }

    #[test]
    fn test_emit_requires_initialized_profile() {
        let mut profile = Profile::new("pkg", "v1", "pkg");
        assert!(profile.emit_data_type(TypeRecord::new("Foo")).is_err());

        profile.initialize();
        profile.emit_data_type(TypeRecord::new("Foo")).unwrap();
        assert!(profile.materialization_started);
        assert!(profile.data_type("Foo").is_some());

        profile.finalize();
        assert!(profile.emit_node_type(TypeRecord::new("Bar")).is_err());
        assert_eq!(profile.status, ProfileStatus::Finalized);
    }
}
