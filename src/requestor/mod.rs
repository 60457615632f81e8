//! Protocol-version capability for a request-issuing HTTP layer.
//!
//! [`ProtocolAdapter`] bundles everything version-specific about talking to
//! a legacy service: the fixed header sets, the readiness gate over the
//! entity container, the query-option and payload conversions, response
//! version checking, and function import parameter formatting. The HTTP
//! layer holds the adapter by reference and delegates, so the same request
//! code could serve another protocol version with a different adapter.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::edm_catalog::{FunctionImportSchema, MetadataError, MetadataLookup};
use crate::edm_codec::{format_property_as_literal, FormatError};
use crate::query_translator::{self, TranslateError};
use crate::response_converter::{ConvertError, ResponseConverter};

/// Headers no request may override.
pub const FINAL_HEADERS: &[(&str, &str)] = &[("Content-Type", "application/json;charset=UTF-8")];

/// Headers applied to every part of a batch request.
pub const BATCH_PART_HEADERS: &[(&str, &str)] = &[("Accept", "application/json")];

/// Default headers announcing the legacy protocol version to the service.
pub const DEFAULT_REQUEST_HEADERS: &[(&str, &str)] = &[
    ("Accept", "application/json"),
    ("MaxDataServiceVersion", "2.0"),
    ("DataServiceVersion", "2.0"),
    ("X-CSRF-Token", "Fetch"),
];

/// HeaderError reports a response announcing a protocol version this
/// adapter cannot interpret.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum HeaderError {
    #[error("Response to `{resource_path}` carries `OData-Version: {value}`, expected a `DataServiceVersion` header")]
    UnexpectedODataVersion { value: String, resource_path: String },

    #[error("Response to `{resource_path}` carries unsupported `DataServiceVersion: {value}`, expected 1.0 or 2.0")]
    UnsupportedDataServiceVersion { value: String, resource_path: String },
}

/// OperationError reports a function import invocation the legacy protocol
/// cannot express.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OperationError {
    #[error("Function import `{operation}` declares no parameter `{parameter}`")]
    UnknownParameter { operation: String, parameter: String },

    #[error("Parameter `{parameter}` of `{operation}` is collection-valued and cannot be passed as a query parameter")]
    CollectionParameter { operation: String, parameter: String },

    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Everything version-specific a request-issuing object needs.
#[async_trait]
pub trait ProtocolAdapter: Send + Sync {
    /// Headers no request may override.
    fn final_headers(&self) -> &'static [(&'static str, &'static str)];

    /// Headers for each part of a batch request.
    fn part_headers(&self) -> &'static [(&'static str, &'static str)];

    /// Default headers for every request.
    fn request_headers(&self) -> &'static [(&'static str, &'static str)];

    /// Resolves once the entity container has been fetched.
    ///
    /// The first successful call latches; later calls return immediately.
    /// A failed fetch is retried on the next call.
    async fn ready(&self) -> Result<(), MetadataError>;

    /// Convert a response body into the newer protocol's shape.
    fn convert_response(&self, body: Value) -> Result<Value, ConvertError>;

    /// Convert system query options into query parameters, one `emit` call
    /// per output parameter.
    fn convert_system_query_options(
        &self,
        resource_path: &str,
        options: &Map<String, Value>,
        emit: &mut dyn FnMut(&str, &str),
        drop_system_options: bool,
        sort_expand_select: bool,
    ) -> Result<(), TranslateError>;

    /// Validate the version header of a response to `resource_path`.
    fn check_version_header(
        &self,
        get_header: &dyn Fn(&str) -> Option<String>,
        resource_path: &str,
    ) -> Result<(), HeaderError>;

    /// Format a function import's actual parameters as query parameters.
    fn operation_query_parameters(
        &self,
        import: &FunctionImportSchema,
        parameters: &Map<String, Value>,
    ) -> Result<Vec<(String, String)>, OperationError>;

    /// Whether modifying batch parts may skip the change set.
    fn is_change_set_optional(&self) -> bool;

    /// Whether action invocations may skip the request body.
    fn is_action_body_optional(&self) -> bool;
}

/// Adapter for services speaking the older protocol version.
pub struct V2Adapter<M: MetadataLookup + ?Sized> {
    metadata: Arc<M>,
    response: ResponseConverter<M>,
    container_ready: OnceCell<()>,
}

impl<M: MetadataLookup + ?Sized> V2Adapter<M> {
    pub fn new(metadata: Arc<M>) -> Self {
        V2Adapter {
            response: ResponseConverter::new(Arc::clone(&metadata)),
            metadata,
            container_ready: OnceCell::new(),
        }
    }
}

#[async_trait]
impl<M: MetadataLookup + ?Sized> ProtocolAdapter for V2Adapter<M> {
    fn final_headers(&self) -> &'static [(&'static str, &'static str)] {
        FINAL_HEADERS
    }

    fn part_headers(&self) -> &'static [(&'static str, &'static str)] {
        BATCH_PART_HEADERS
    }

    fn request_headers(&self) -> &'static [(&'static str, &'static str)] {
        DEFAULT_REQUEST_HEADERS
    }

    async fn ready(&self) -> Result<(), MetadataError> {
        self.container_ready
            .get_or_try_init(|| self.metadata.fetch_entity_container())
            .await
            .map(|_| ())
    }

    fn convert_response(&self, body: Value) -> Result<Value, ConvertError> {
        self.response.convert_response(body)
    }

    fn convert_system_query_options(
        &self,
        resource_path: &str,
        options: &Map<String, Value>,
        emit: &mut dyn FnMut(&str, &str),
        drop_system_options: bool,
        sort_expand_select: bool,
    ) -> Result<(), TranslateError> {
        query_translator::convert_system_query_options(
            self.metadata.as_ref(),
            resource_path,
            options,
            emit,
            drop_system_options,
            sort_expand_select,
        )
    }

    fn check_version_header(
        &self,
        get_header: &dyn Fn(&str) -> Option<String>,
        resource_path: &str,
    ) -> Result<(), HeaderError> {
        if let Some(value) = get_header("OData-Version") {
            return Err(HeaderError::UnexpectedODataVersion {
                value,
                resource_path: resource_path.to_string(),
            });
        }
        let version = match get_header("DataServiceVersion") {
            Some(version) => version,
            None => return Ok(()),
        };
        // header parameters after ';' do not affect the version number
        let number = version.split(';').next().unwrap_or("").trim();
        if number == "1.0" || number == "2.0" {
            Ok(())
        } else {
            Err(HeaderError::UnsupportedDataServiceVersion {
                value: version,
                resource_path: resource_path.to_string(),
            })
        }
    }

    fn operation_query_parameters(
        &self,
        import: &FunctionImportSchema,
        parameters: &Map<String, Value>,
    ) -> Result<Vec<(String, String)>, OperationError> {
        let mut pairs = Vec::with_capacity(parameters.len());
        for (name, value) in parameters {
            let declared =
                import
                    .parameter(name)
                    .ok_or_else(|| OperationError::UnknownParameter {
                        operation: import.name.clone(),
                        parameter: name.clone(),
                    })?;
            if declared.collection {
                return Err(OperationError::CollectionParameter {
                    operation: import.name.clone(),
                    parameter: name.clone(),
                });
            }
            pairs.push((name.clone(), format_property_as_literal(value, &declared.property)?));
        }
        Ok(pairs)
    }

    fn is_change_set_optional(&self) -> bool {
        // modifying batch parts must ride in a change set
        false
    }

    fn is_action_body_optional(&self) -> bool {
        // action invocations must carry a body
        false
    }
}
