use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FormatError {
    #[error("Not a valid {type_name} value: `{value}`")]
    Malformed { type_name: String, value: String },
    #[error("Cannot convert `{value}` to a calendar date: it carries a time of day")]
    DateWithTime { value: String },
    #[error("Unsupported type `{type_name}`")]
    UnsupportedType { type_name: String },
}

impl FormatError {
    pub fn malformed(type_name: impl Into<String>, value: impl Into<String>) -> Self {
        FormatError::Malformed {
            type_name: type_name.into(),
            value: value.into(),
        }
    }
}
