//! Type materialization
//!
//! Walks from creatable resources to node types, and from node type
//! properties to data types. Each schema name is assigned exactly one state
//! in the [`ConversionSession`]: node type, data type or skipped.
//!
//! Data types referenced by node types are deferred and drained after all
//! node types are known. Data types referenced by other data types are
//! materialized on the spot; the visited sets stop cycles.

use crate::openapi::CreatableResource;
use crate::property_type::PropertyType;
use crate::renderer::{TypeRenderer, GROUP_VERSION_KIND};
use crate::schema_name::SchemaName;
use crate::session::{Context, ConversionSession, SkipReason};
use oas2tosca_common::ConvertError;
use serde_json::Value;

/// What happened to one schema name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A record was added to the owning profile
    Emitted,
    /// The name already has a state; nothing changed
    AlreadySeen,
    /// The schema produced no record
    Skipped(SkipReason),
}

pub struct TypeMaterializer<'c, 'a> {
    ctx: &'c Context<'a>,
}

impl<'c, 'a> TypeMaterializer<'c, 'a> {
    pub fn new(ctx: &'c Context<'a>) -> Self {
        Self { ctx }
    }

    /// Materialize the node type a request body refers to
    pub fn materialize_resource(
        &self,
        session: &mut ConversionSession,
        resource: &CreatableResource<'_>,
    ) -> Outcome {
        let Some(pointer) = resource.schema.get("$ref").and_then(Value::as_str) else {
            tracing::warn!("{}: request body is not a reference", resource.path);
            return Outcome::Skipped(SkipReason::Invalid(
                "request body is not a reference".to_string(),
            ));
        };

        match self.ctx.version.resolve(self.ctx.document, pointer) {
            Ok(resolved) => self.materialize_node_type(session, &resolved.name, resolved.schema),
            Err(e) => {
                tracing::warn!("{}: {}", resource.path, e);
                Outcome::Skipped(reason_for(&e))
            }
        }
    }

    pub fn materialize_node_type(
        &self,
        session: &mut ConversionSession,
        name: &str,
        schema: &Value,
    ) -> Outcome {
        if !session.mark_node_type(name) {
            tracing::debug!("{}: already processed", name);
            return Outcome::AlreadySeen;
        }

        match schema.get("type").and_then(Value::as_str) {
            Some("object") => {}
            declared => {
                let e = ConvertError::InvalidNodeType {
                    name: name.to_string(),
                    reason: match declared {
                        Some(other) => format!("type '{}' is not 'object'", other),
                        None => "no type".to_string(),
                    },
                };
                tracing::error!("{}", e);
                return skip(session, name, SkipReason::Invalid(e.to_string()));
            }
        }

        let owner = match self.owner(session, name, schema) {
            Ok(owner) => owner,
            Err(reason) => return skip(session, name, reason),
        };

        if schema.get(GROUP_VERSION_KIND).is_none() {
            tracing::warn!("{}: no {}", name, GROUP_VERSION_KIND);
        }

        // Referenced schemas become data types once all node types are known
        for pointer in property_references(schema) {
            match self.ctx.version.resolve(self.ctx.document, pointer) {
                Ok(resolved) => session.defer(resolved.name),
                Err(e) => tracing::warn!("{}: {}", name, e),
            }
        }

        tracing::info!("Node type {}", name);
        let (record, unhandled) = match session.profile(&owner.namespace) {
            Some(profile) => {
                let mut renderer = TypeRenderer::new(self.ctx, profile);
                let record = renderer.node_type(&owner.kind, schema);
                (record, renderer.finish())
            }
            None => return skip(session, name, SkipReason::NoProfile(owner.namespace)),
        };
        session.note_unhandled(unhandled);
        self.emit(session, name, &owner, |profile| profile.emit_node_type(record))
    }

    pub fn materialize_data_type(
        &self,
        session: &mut ConversionSession,
        name: &str,
        schema: &Value,
    ) -> Outcome {
        if !session.mark_data_type(name) {
            if session.is_node_type(name) {
                tracing::info!("{}: already a node type", name);
            } else {
                tracing::debug!("{}: already processed", name);
            }
            return Outcome::AlreadySeen;
        }

        if schema.get("$ref").is_some() {
            let e = ConvertError::InvalidDataType {
                name: name.to_string(),
                reason: "bare reference".to_string(),
            };
            tracing::error!("{}", e);
            return skip(session, name, SkipReason::Invalid(e.to_string()));
        }

        let owner = match self.owner(session, name, schema) {
            Ok(owner) => owner,
            Err(reason) => return skip(session, name, reason),
        };

        if schema.get(GROUP_VERSION_KIND).is_some() {
            tracing::warn!("{}: data type has {}", name, GROUP_VERSION_KIND);
        }

        tracing::info!("Data type {}", name);
        let rendered = match session.profile(&owner.namespace) {
            Some(profile) => {
                let mut renderer = TypeRenderer::new(self.ctx, profile);
                let record = renderer.data_type(&owner.kind, schema);
                record.map(|record| (record, renderer.finish()))
            }
            None => return skip(session, name, SkipReason::NoProfile(owner.namespace)),
        };
        let outcome = match rendered {
            Ok((record, unhandled)) => {
                session.note_unhandled(unhandled);
                self.emit(session, name, &owner, |profile| profile.emit_data_type(record))
            }
            Err(e) => {
                tracing::error!("{}", e);
                return skip(session, name, SkipReason::Invalid(e.to_string()));
            }
        };
        if outcome != Outcome::Emitted {
            return outcome;
        }

        let entries = schema
            .get("items")
            .and_then(|items| items.get("$ref"))
            .and_then(Value::as_str);
        for pointer in property_references(schema).chain(entries) {
            match self.ctx.version.resolve(self.ctx.document, pointer) {
                Ok(resolved) => {
                    self.materialize_data_type(session, &resolved.name, resolved.schema);
                }
                Err(e) => tracing::warn!("{}: {}", name, e),
            }
        }

        outcome
    }

    /// Turn every deferred name into a data type, in the order deferred.
    /// Returns the number of records emitted.
    pub fn drain_deferred(&self, session: &mut ConversionSession) -> usize {
        let mut emitted = 0;
        loop {
            let deferred = session.take_deferred();
            if deferred.is_empty() {
                break;
            }
            tracing::debug!("Draining {} deferred schemas", deferred.len());

            for name in deferred {
                let schema = self
                    .ctx
                    .version
                    .schemas(self.ctx.document)
                    .and_then(|schemas| schemas.get(&name));
                let Some(schema) = schema else {
                    tracing::warn!("{}: definition not found", name);
                    skip(session, &name, SkipReason::NotFound);
                    continue;
                };
                if self.materialize_data_type(session, &name, schema) == Outcome::Emitted {
                    emitted += 1;
                }
            }
        }
        emitted
    }

    /// Parsed name of a schema that may be emitted into a profile
    fn owner(
        &self,
        session: &ConversionSession,
        name: &str,
        schema: &Value,
    ) -> Result<SchemaName, SkipReason> {
        let owner = self.ctx.version.schema_name(name, schema);
        if !owner.is_supported(&self.ctx.config.supported_version) {
            tracing::debug!("Ignoring {}", name);
            return Err(SkipReason::UnsupportedVersion(owner.version));
        }
        if !owner.has_namespace() || session.profile(&owner.namespace).is_none() {
            tracing::warn!("{}: no profile for '{}'", name, owner.namespace);
            return Err(SkipReason::NoProfile(owner.namespace));
        }
        Ok(owner)
    }

    fn emit<F>(
        &self,
        session: &mut ConversionSession,
        name: &str,
        owner: &SchemaName,
        emit: F,
    ) -> Outcome
    where
        F: FnOnce(&mut oas2tosca_common::Profile) -> oas2tosca_common::Result<()>,
    {
        let result = match session.profile_mut(&owner.namespace) {
            Some(profile) => emit(profile),
            None => return skip(session, name, SkipReason::NoProfile(owner.namespace.clone())),
        };
        match result {
            Ok(()) => Outcome::Emitted,
            Err(e) => {
                tracing::error!("{}: {}", name, e);
                skip(session, name, SkipReason::Invalid(e.to_string()))
            }
        }
    }
}

fn skip(session: &mut ConversionSession, name: &str, reason: SkipReason) -> Outcome {
    session.skip(name, reason.clone());
    Outcome::Skipped(reason)
}

fn reason_for(error: &ConvertError) -> SkipReason {
    match error {
        ConvertError::UnresolvedReference(_) => SkipReason::NotFound,
        other => SkipReason::Invalid(other.to_string()),
    }
}

/// References held by the schema's properties, in property order
fn property_references(schema: &Value) -> impl Iterator<Item = &str> {
    schema
        .get("properties")
        .and_then(Value::as_object)
        .into_iter()
        .flat_map(|properties| properties.values())
        .filter_map(|property| PropertyType::classify(property).reference())
}
