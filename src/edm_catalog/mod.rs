pub mod config;
pub mod errors;
pub mod provider;
pub mod schema;

// Re-export commonly used types
pub use config::EdmSchemaConfig;
pub use errors::MetadataError;
pub use provider::{MetadataLookup, SchemaCatalog};
pub use schema::{
    EdmSchema, EntityTypeSchema, FunctionImportSchema, NavigationSchema, ParameterSchema,
    PropertyMap, PropertySchema,
};
