use thiserror::Error;

use crate::edm_codec::FormatError;

/// ConvertError enumerates the ways a legacy response body can fail to
/// convert into the newer protocol's JSON shape.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConvertError {
    #[error("Response body carries no `d` envelope object")]
    MissingEnvelope,

    #[error("Structured value carries no `__metadata.type`: {value}")]
    MissingTypeMetadata { value: String },

    #[error("Cannot convert property `{property}` of `{parent_type}`: {source}")]
    Property {
        property: String,
        parent_type: String,
        #[source]
        source: FormatError,
    },

    #[error("Property `{property}` of `{parent_type}` declares unknown type `{type_name}`, cannot convert {value}")]
    UnknownPropertyType {
        type_name: String,
        property: String,
        parent_type: String,
        value: String,
    },
}
