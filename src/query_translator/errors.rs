use thiserror::Error;

use crate::edm_catalog::MetadataError;
use crate::edm_codec::FormatError;

/// TranslateError enumerates the ways a V4 query option set can fail to
/// map onto the V2 surface.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TranslateError {
    #[error("Unsupported system query option `{0}`")]
    UnsupportedSystemOption(String),

    #[error("Unsupported option `{option}` inside $expand entry `{path}`")]
    UnsupportedExpandOption { path: String, option: String },

    #[error("$expand must be an object keyed by navigation property")]
    ExpandNotAnObject,

    #[error("Invalid value for `{option}`: {value}")]
    InvalidOptionValue { option: String, value: String },

    #[error("Cannot parse $filter: {0}")]
    FilterSyntax(String),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error(transparent)]
    Format(#[from] FormatError),
}

impl TranslateError {
    pub fn invalid_option_value(option: impl Into<String>, value: &serde_json::Value) -> Self {
        TranslateError::InvalidOptionValue {
            option: option.into(),
            value: value.to_string(),
        }
    }
}
