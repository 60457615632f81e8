//! # EDM Metadata Error Types
//!
//! Error handling for schema resolution and schema-definition loading.
//!
//! ## Error Categories
//!
//! - **Resolution Errors**: a filter/select path that the loaded metadata
//!   cannot resolve
//! - **Container Errors**: the entity container (schema root) is not available
//! - **Configuration Errors**: file I/O and parsing issues while loading a
//!   schema definition
//!
//! Resolution failures are fatal to the conversion call that triggered them;
//! the translators never guess a type.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum MetadataError {
    #[error("Path `{path}` does not resolve to a property of `{meta_path}`")]
    UnresolvedPath { meta_path: String, path: String },
    #[error("Entity container is not available: {reason}")]
    ContainerUnavailable { reason: String },
    #[error("Failed to read schema definition: {error}")]
    ConfigReadError { error: String },
    #[error("Failed to parse schema definition: {error}")]
    ConfigParseError { error: String },
    #[error("Invalid schema definition: {message}")]
    InvalidConfig { message: String },
}

/// Helper methods for creating errors with context information
impl MetadataError {
    /// Create an UnresolvedPath error from the two path halves
    pub fn unresolved_path(meta_path: impl Into<String>, path: impl Into<String>) -> Self {
        MetadataError::UnresolvedPath {
            meta_path: meta_path.into(),
            path: path.into(),
        }
    }

    /// Create an InvalidConfig error with context information
    ///
    /// # Example
    /// ```ignore
    /// MetadataError::invalid_config_with_context(
    ///     "navigation `SO_2_BP` targets unknown type `BusinessPartner`",
    ///     "While building schema `sample_sales`"
    /// )
    /// ```
    pub fn invalid_config_with_context(
        message: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        let message = message.into();
        let ctx = context.into();
        MetadataError::InvalidConfig {
            message: format!("{}\n  Context: {}", message, ctx),
        }
    }

    /// Create a ContainerUnavailable error
    pub fn container_unavailable(reason: impl Into<String>) -> Self {
        MetadataError::ContainerUnavailable {
            reason: reason.into(),
        }
    }
}
