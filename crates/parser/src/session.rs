//! Per-run conversion state
//!
//! Everything that changes while types are materialized lives in
//! [`ConversionSession`], which is passed explicitly to each component.
//! Read-only inputs are bundled in [`Context`].

use crate::config::ConverterConfig;
use crate::document::Document;
use crate::openapi::OpenApiVersion;
use indexmap::{IndexMap, IndexSet};
use oas2tosca_common::Profile;
use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// Read-only inputs shared by every component of a run
#[derive(Clone, Copy)]
pub struct Context<'a> {
    pub document: &'a Document,
    pub version: &'a dyn OpenApiVersion,
    pub config: &'a ConverterConfig,
}

/// Why a schema produced no record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Version tag other than the supported one
    UnsupportedVersion(String),
    /// Schema namespace has no profile
    NoProfile(String),
    /// Schema is not a valid node or data type
    Invalid(String),
    /// Deferred name is not in the schema container
    NotFound,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnsupportedVersion(version) => write!(f, "unsupported version {}", version),
            SkipReason::NoProfile(namespace) if namespace.is_empty() => write!(f, "no namespace"),
            SkipReason::NoProfile(namespace) => write!(f, "no profile for {}", namespace),
            SkipReason::Invalid(reason) => write!(f, "{}", reason),
            SkipReason::NotFound => write!(f, "definition not found"),
        }
    }
}

/// Mutable state of one conversion
#[derive(Debug, Default)]
pub struct ConversionSession {
    profiles: IndexMap<String, Profile>,
    node_types_seen: HashSet<String>,
    data_types_seen: HashSet<String>,
    deferred: IndexSet<String>,
    unhandled_keywords: BTreeSet<String>,
    skipped: IndexMap<String, SkipReason>,
}

impl ConversionSession {
    pub fn new(profiles: IndexMap<String, Profile>) -> Self {
        Self {
            profiles,
            ..Self::default()
        }
    }

    pub fn profile(&self, namespace: &str) -> Option<&Profile> {
        self.profiles.get(namespace)
    }

    pub fn profile_mut(&mut self, namespace: &str) -> Option<&mut Profile> {
        self.profiles.get_mut(namespace)
    }

    pub fn initialize_profiles(&mut self) {
        for profile in self.profiles.values_mut() {
            profile.initialize();
        }
    }

    pub fn finalize_profiles(&mut self) {
        for profile in self.profiles.values_mut() {
            profile.finalize();
        }
    }

    /// True once `name` has been claimed as a node type or a data type
    pub fn is_seen(&self, name: &str) -> bool {
        self.node_types_seen.contains(name) || self.data_types_seen.contains(name)
    }

    pub fn is_node_type(&self, name: &str) -> bool {
        self.node_types_seen.contains(name)
    }

    /// Claim `name` as a node type. Returns false if it was already claimed.
    pub fn mark_node_type(&mut self, name: &str) -> bool {
        !self.is_seen(name) && self.node_types_seen.insert(name.to_string())
    }

    /// Claim `name` as a data type. Returns false if it was already claimed.
    pub fn mark_data_type(&mut self, name: &str) -> bool {
        !self.is_seen(name) && self.data_types_seen.insert(name.to_string())
    }

    /// Postpone data type creation for `name` until node types are done
    pub fn defer(&mut self, name: impl Into<String>) {
        self.deferred.insert(name.into());
    }

    pub fn deferred(&self) -> &IndexSet<String> {
        &self.deferred
    }

    /// Hand out the deferred names, leaving the set empty
    pub fn take_deferred(&mut self) -> IndexSet<String> {
        std::mem::take(&mut self.deferred)
    }

    pub fn skip(&mut self, name: &str, reason: SkipReason) {
        self.skipped.insert(name.to_string(), reason);
    }

    pub fn note_unhandled<I>(&mut self, keywords: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.unhandled_keywords.extend(keywords);
    }

    pub fn into_parts(
        self,
    ) -> (
        IndexMap<String, Profile>,
        BTreeSet<String>,
        IndexMap<String, SkipReason>,
    ) {
        (self.profiles, self.unhandled_keywords, self.skipped)
    }
}
