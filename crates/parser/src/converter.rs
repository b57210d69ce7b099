//! Conversion orchestration

use crate::config::ConverterConfig;
use crate::dependencies;
use crate::document::Document;
use crate::materializer::{Outcome, TypeMaterializer};
use crate::openapi::{self, OpenApiVersion};
use crate::session::{Context, ConversionSession, SkipReason};
use indexmap::IndexMap;
use oas2tosca_common::{Profile, ProfileSink, ProfileStatus, Result};
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::Path;

/// OpenAPI to TOSCA converter
///
/// Holds one document and the version capability selected for it. A
/// converter runs one conversion; all mutable state lives in a
/// [`ConversionSession`] created by [`Converter::convert`].
pub struct Converter {
    document: Document,
    version: Box<dyn OpenApiVersion>,
    config: ConverterConfig,
}

impl Converter {
    /// Prepare a conversion of `document`
    ///
    /// Fails when the document has no version discriminator or names a
    /// version that is not supported.
    pub fn new(document: Document, config: ConverterConfig) -> Result<Self> {
        let version = openapi::select(&document)?;
        Ok(Self {
            document,
            version,
            config,
        })
    }

    /// Load a JSON or YAML document and prepare its conversion
    ///
    /// # Example
    /// ```rust,ignore
    /// let converter = Converter::from_file("k8s-swagger.json", ConverterConfig::default())?;
    /// let conversion = converter.convert()?;
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P, config: ConverterConfig) -> Result<Self> {
        Self::new(Document::from_file(path)?, config)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn version_label(&self) -> &'static str {
        self.version.label()
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Run the conversion
    ///
    /// Profiles are collected from the schema definitions, node types are
    /// materialized for every creatable resource, then deferred data types
    /// are drained. Only a missing `info` object aborts the run; every other
    /// problem skips the schema it concerns.
    pub fn convert(&self) -> Result<Conversion> {
        let label = self.document.version().unwrap_or_default();
        let span = tracing::info_span!("convert", openapi = %label);
        let _guard = span.enter();

        let ctx = Context {
            document: &self.document,
            version: self.version.as_ref(),
            config: &self.config,
        };

        let info = self.document.info()?.clone();
        tracing::info!("Converting {} document", self.version.label());

        let mut session = ConversionSession::new(dependencies::collect(&ctx));
        session.initialize_profiles();

        let materializer = TypeMaterializer::new(&ctx);
        let resources = self.version.creatable_resources(&self.document);
        tracing::info!("Found {} creatable resources", resources.len());

        let mut node_types = 0;
        for resource in &resources {
            if materializer.materialize_resource(&mut session, resource) == Outcome::Emitted {
                node_types += 1;
            }
        }
        let data_types = materializer.drain_deferred(&mut session);
        session.finalize_profiles();

        let (profiles, unhandled_keywords, skipped) = session.into_parts();
        if !unhandled_keywords.is_empty() {
            let keywords: Vec<&str> = unhandled_keywords.iter().map(String::as_str).collect();
            tracing::warn!("Unhandled keywords: {}", keywords.join(", "));
        }
        tracing::info!(
            "Created {} node types and {} data types in {} profiles",
            node_types,
            data_types,
            profiles.len()
        );

        Ok(Conversion {
            info,
            profiles,
            unhandled_keywords,
            skipped,
        })
    }
}

/// Result of one conversion
#[derive(Debug)]
pub struct Conversion {
    /// The document's `info` object
    pub info: Value,

    /// Profiles in first-seen order
    pub profiles: IndexMap<String, Profile>,

    /// Property keywords without a translation
    pub unhandled_keywords: BTreeSet<String>,

    /// Schema name -> why no record was emitted
    pub skipped: IndexMap<String, SkipReason>,
}

impl Conversion {
    pub fn profile(&self, namespace: &str) -> Option<&Profile> {
        self.profiles.get(namespace)
    }

    pub fn node_type_count(&self) -> usize {
        self.profiles.values().map(|p| p.node_types.len()).sum()
    }

    pub fn data_type_count(&self) -> usize {
        self.profiles.values().map(|p| p.data_types.len()).sum()
    }

    /// Hand every finalized profile to `sink`. Returns the number written.
    pub fn write_to(&self, sink: &mut dyn ProfileSink) -> Result<usize> {
        let mut written = 0;
        for profile in self.profiles.values() {
            if profile.status != ProfileStatus::Finalized {
                tracing::warn!("{}: profile not finalized, not written", profile.name);
                continue;
            }
            sink.write_profile(profile, &self.info)?;
            written += 1;
        }
        Ok(written)
    }
}
