//! TOSCA profile generation
//!
//! This crate writes converted profiles to disk. Every profile becomes a
//! directory named after its namespace (`io.k8s.api.core` ->
//! `io/k8s/api/core/`) holding:
//! - TOSCA.meta (CSAR metadata pointing at the entry definitions)
//! - profile.yaml (imports, node types and data types)

mod templates;

use oas2tosca_common::{ConvertError, Profile, ProfileSink, Result, TypeRecord};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tera::{Context, Tera};

/// Name written into generated files
pub const GENERATOR: &str = "oas2tosca";

/// Profile generator
///
/// Implements [`ProfileSink`] by rendering each profile with Tera templates
/// into its own directory below `output_dir`.
pub struct ProfileGenerator {
    tera: Tera,
    output_dir: PathBuf,
    source: Option<String>,
}

#[derive(Serialize)]
struct Import {
    file: String,
    prefix: String,
}

#[derive(Serialize)]
struct Section<'a> {
    key: &'static str,
    types: &'a [TypeRecord],
}

impl ProfileGenerator {
    /// Create a generator writing below `output_dir`
    pub fn new<P: Into<PathBuf>>(output_dir: P) -> Result<Self> {
        let tera = templates::load_templates()?;
        Ok(Self {
            tera,
            output_dir: output_dir.into(),
            source: None,
        })
    }

    /// Name the input document in the generated-by comment
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Directory a profile is written to.
    ///
    /// Every namespace segment must be a single plain path component, so the
    /// directory always stays below `output_dir`.
    pub fn profile_dir(&self, profile: &Profile) -> Result<PathBuf> {
        let mut dir = self.output_dir.clone();
        for segment in profile.name.split('.') {
            let mut components = Path::new(segment).components();
            match (components.next(), components.next()) {
                (Some(Component::Normal(part)), None)
                    if part == segment && !segment.contains('\\') =>
                {
                    dir.push(part)
                }
                _ => {
                    return Err(ConvertError::Generation(format!(
                        "namespace '{}' does not map to a directory below {}",
                        profile.name,
                        self.output_dir.display()
                    )))
                }
            }
        }
        Ok(dir)
    }

    /// Render profile.yaml for `profile`
    pub fn render_profile(&self, profile: &Profile, info: &Value) -> Result<String> {
        let mut context = self.create_context();
        context.insert("namespace", &profile.name);
        context.insert("metadata", info);

        let imports: Vec<Import> = profile
            .dependencies
            .iter()
            .map(|(namespace, prefix)| Import {
                file: import_path(&profile.name, namespace),
                prefix: prefix.clone(),
            })
            .collect();
        context.insert("imports", &imports);

        let sections: Vec<Section<'_>> = [
            ("node_types", profile.node_types.as_slice()),
            ("data_types", profile.data_types.as_slice()),
        ]
        .into_iter()
        .filter(|(_, types)| !types.is_empty())
        .map(|(key, types)| Section { key, types })
        .collect();
        context.insert("sections", &sections);

        self.tera
            .render("profile.yaml", &context)
            .map_err(|e| ConvertError::Generation(format!("Template error: {:?}", e)))
    }

    /// Render TOSCA.meta
    pub fn render_meta(&self) -> Result<String> {
        let context = self.create_context();
        self.tera
            .render("TOSCA.meta", &context)
            .map_err(|e| ConvertError::Generation(format!("Template error: {}", e)))
    }

    fn create_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("generator", GENERATOR);
        context.insert("generator_version", env!("CARGO_PKG_VERSION"));
        context.insert("source", &self.source);
        context
    }
}

impl ProfileSink for ProfileGenerator {
    fn write_profile(&mut self, profile: &Profile, info: &Value) -> Result<()> {
        let dir = self.profile_dir(profile)?;
        tracing::debug!("{}: create directory {}", profile.name, dir.display());
        fs::create_dir_all(&dir).map_err(|e| {
            ConvertError::Generation(format!("Failed to create {}: {}", dir.display(), e))
        })?;

        let meta = self.render_meta()?;
        fs::write(dir.join("TOSCA.meta"), meta).map_err(|e| {
            ConvertError::Generation(format!("Failed to write TOSCA.meta: {}", e))
        })?;

        let rendered = self.render_profile(profile, info)?;
        fs::write(dir.join("profile.yaml"), rendered).map_err(|e| {
            ConvertError::Generation(format!(
                "Failed to write profile.yaml for {}: {}",
                profile.name, e
            ))
        })?;

        tracing::info!(
            "Wrote {} ({} node types, {} data types)",
            profile.name,
            profile.node_types.len(),
            profile.data_types.len()
        );
        Ok(())
    }
}

/// Path of `to`'s profile.yaml relative to the directory of `from`
pub fn import_path(from: &str, to: &str) -> String {
    let from: Vec<&str> = from.split('.').collect();
    let to: Vec<&str> = to.split('.').collect();
    let common = from
        .iter()
        .zip(&to)
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments: Vec<&str> = vec![".."; from.len() - common];
    segments.extend(&to[common..]);
    segments.push("profile.yaml");
    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_path() {
        assert_eq!(import_path("pkg", "pkg2"), "../pkg2/profile.yaml");
        assert_eq!(
            import_path("io.k8s.api.core", "io.k8s.apimachinery.pkg.apis.meta"),
            "../../apimachinery/pkg/apis/meta/profile.yaml"
        );
        assert_eq!(import_path("a.b", "a"), "../profile.yaml");
        assert_eq!(import_path("a", "a.b"), "b/profile.yaml");
    }

    #[test]
    fn test_profile_dir() {
        let generator = ProfileGenerator::new("/out").unwrap();
        let profile = Profile::new("io.k8s.api.core", "v1", "core");
        assert_eq!(
            generator.profile_dir(&profile).unwrap(),
            PathBuf::from("/out/io/k8s/api/core")
        );
    }

    #[test]
    fn test_profile_dir_stays_below_output() {
        let generator = ProfileGenerator::new("/out").unwrap();
        for name in ["/etc/evil", "a..b", "a/b.c", "a.b\\c", ""] {
            let profile = Profile::new(name, "", "x");
            assert!(
                matches!(generator.profile_dir(&profile), Err(ConvertError::Generation(_))),
                "{:?}",
                name
            );
        }
    }

    #[test]
    fn test_render_meta() {
        let generator = ProfileGenerator::new("/out").unwrap();
        let meta = generator.render_meta().unwrap();
        let lines: Vec<&str> = meta.lines().collect();
        assert_eq!(
            lines,
            vec![
                "TOSCA-Meta-File-Version: 1.0",
                "CSAR-Version: 1.1",
                "Created-By: oas2tosca",
                "Entry-Definitions: profile.yaml",
            ]
        );
    }
}
