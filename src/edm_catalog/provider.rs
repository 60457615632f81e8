//! Metadata access for the protocol adapter
//!
//! The adapter resolves property types through the [`MetadataLookup`] trait
//! while rewriting filters, formatting operation parameters, and converting
//! response payloads. [`SchemaCatalog`] is the built-in implementation backed
//! by a schema definition loaded at startup; `fetch_entity_container` is
//! async so other implementations may load the container lazily from a
//! remote service document.

use async_trait::async_trait;

use super::errors::MetadataError;
use super::schema::{EdmSchema, PropertyMap, PropertySchema};

/// Read access to EDM metadata
#[async_trait]
pub trait MetadataLookup: Send + Sync {
    /// Resolve the property reached from the type behind `meta_path` by
    /// following `property_path`
    fn fetch_property(&self, meta_path: &str, property_path: &str) -> Option<PropertySchema>;

    /// Look up the property map of a qualified type name
    fn fetch_type(&self, qualified_name: &str) -> Option<PropertyMap>;

    /// Make the entity container available
    async fn fetch_entity_container(&self) -> Result<(), MetadataError>;
}

/// Metadata provider backed by a schema definition loaded at startup
#[derive(Debug, Clone)]
pub struct SchemaCatalog {
    schema: EdmSchema,
}

impl SchemaCatalog {
    pub fn new(schema: EdmSchema) -> Self {
        SchemaCatalog { schema }
    }

    pub fn schema(&self) -> &EdmSchema {
        &self.schema
    }
}

#[async_trait]
impl MetadataLookup for SchemaCatalog {
    fn fetch_property(&self, meta_path: &str, property_path: &str) -> Option<PropertySchema> {
        self.schema
            .resolve_property(meta_path, property_path)
            .cloned()
    }

    fn fetch_type(&self, qualified_name: &str) -> Option<PropertyMap> {
        self.schema
            .entity_type(qualified_name)
            .map(|entity_type| entity_type.properties.clone())
    }

    async fn fetch_entity_container(&self) -> Result<(), MetadataError> {
        // The container ships with the schema definition, nothing to load
        Ok(())
    }
}
