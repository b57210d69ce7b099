//! Profile discovery
//!
//! Every schema definition is assigned to the profile named by its
//! namespace. Properties that reference schemas in another namespace make
//! the owning profile depend on that namespace.

use crate::property_type::PropertyType;
use crate::schema_name::SchemaName;
use crate::session::Context;
use indexmap::IndexMap;
use oas2tosca_common::{ConvertError, Profile};
use serde_json::Value;

/// Build the namespace -> profile map for the document
pub fn collect(ctx: &Context<'_>) -> IndexMap<String, Profile> {
    let mut profiles = IndexMap::new();

    let Some(schemas) = ctx.version.schemas(ctx.document) else {
        tracing::debug!("No schema definitions");
        return profiles;
    };

    for (name, schema) in schemas {
        collect_from_schema(ctx, &mut profiles, name, schema);
    }

    tracing::debug!("Collected {} profiles", profiles.len());
    profiles
}

fn collect_from_schema(
    ctx: &Context<'_>,
    profiles: &mut IndexMap<String, Profile>,
    name: &str,
    schema: &Value,
) {
    let owner = ctx.version.schema_name(name, schema);
    if !owner.has_namespace() {
        return;
    }
    if !owner.is_supported(&ctx.config.supported_version) {
        tracing::debug!("Ignoring {}", name);
        return;
    }

    let profile = profiles
        .entry(owner.namespace.clone())
        .or_insert_with(|| Profile::new(&owner.namespace, &owner.version, &owner.prefix));

    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return;
    };

    for (property_name, property) in properties {
        let Some(pointer) = PropertyType::classify(property).reference() else {
            continue;
        };
        match referenced_name(ctx, pointer) {
            Ok(target) => {
                if target.has_namespace() && target.namespace != owner.namespace {
                    profile.add_dependency(&target.namespace, &target.prefix);
                }
            }
            Err(e) => tracing::warn!("{}.{}: {}", name, property_name, e),
        }
    }
}

fn referenced_name(ctx: &Context<'_>, pointer: &str) -> Result<SchemaName, ConvertError> {
    let resolved = ctx.version.resolve(ctx.document, pointer)?;
    Ok(ctx.version.schema_name(&resolved.name, resolved.schema))
}
