//! URL literal formatting for the older protocol
//!
//! Query strings sent to the older protocol carry typed literals: strings in
//! single quotes with `''` escaping, timestamps in `datetime'...'` or
//! `datetimeoffset'...'` wrappers, times of day as `time'PT#H#M#S'`
//! durations. Values arrive here in the newer protocol's representation and
//! leave as older-protocol literal text.

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike};
use serde_json::Value;

use super::errors::FormatError;
use crate::edm_catalog::PropertySchema;

/// Escape a string value for use inside a single-quoted URL literal
///
/// The literal grammar knows exactly one escape: a quote is doubled.
fn escape_string(s: &str) -> String {
    s.replace('\'', "''")
}

// String content of a scalar; numbers and booleans keep their JSON spelling
fn scalar_content(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Format a scalar as a URL literal of the given type.
///
/// Strings are quoted and escaped; the numeric and boolean types keep their
/// content verbatim (their literal spelling agrees between both protocol
/// versions). Types with a dedicated literal wrapper are handled by
/// [`format_property_as_literal`], which also accepts `null`.
pub fn format_literal(value: &Value, type_name: &str) -> Result<String, FormatError> {
    match type_name {
        "Edm.String" => scalar_content(value)
            .map(|text| format!("'{}'", escape_string(&text)))
            .ok_or_else(|| FormatError::malformed(type_name, value.to_string())),
        "Edm.Boolean" | "Edm.Byte" | "Edm.Decimal" | "Edm.Double" | "Edm.Guid" | "Edm.Int16"
        | "Edm.Int32" | "Edm.Int64" | "Edm.SByte" | "Edm.Single" => scalar_content(value)
            .ok_or_else(|| FormatError::malformed(type_name, value.to_string())),
        _ => Err(FormatError::UnsupportedType {
            type_name: type_name.to_string(),
        }),
    }
}

/// Format a property value as a URL literal for the older protocol.
///
/// Dispatches on the property's older-protocol type name, so a property
/// declared with a legacy override type gets the legacy literal wrapper.
/// `null` always formats as the bare literal `null`. Temporal values are
/// round-tripped through a parser first; a value that does not parse is a
/// [`FormatError`] naming the property's neutral type.
pub fn format_property_as_literal(
    value: &Value,
    property: &PropertySchema,
) -> Result<String, FormatError> {
    if value.is_null() {
        return Ok("null".to_string());
    }

    let type_name = property.v2_type_name();
    match type_name {
        "Edm.Boolean" | "Edm.Byte" | "Edm.Decimal" | "Edm.Double" | "Edm.Guid" | "Edm.Int16"
        | "Edm.Int32" | "Edm.Int64" | "Edm.SByte" | "Edm.Single" | "Edm.String" => {
            format_literal(value, type_name)
        }
        "Edm.Date" => {
            let text = scalar_text(value, property)?;
            let date = NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .map_err(|_| FormatError::malformed(property.edm_type.as_str(), text))?;
            Ok(format!("datetime'{}T00:00:00'", date.format("%Y-%m-%d")))
        }
        "Edm.DateTime" => {
            // The legacy override type receives either a plain calendar date
            // or a full timestamp, depending on the neutral type it stands for
            let text = scalar_text(value, property)?;
            let formatted = if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
                format!("{}T00:00:00", date.format("%Y-%m-%d"))
            } else {
                let timestamp = DateTime::parse_from_rfc3339(text)
                    .map_err(|_| FormatError::malformed(property.edm_type.as_str(), text))?;
                timestamp.format("%Y-%m-%dT%H:%M:%S").to_string()
            };
            Ok(format!("datetime'{}'", formatted))
        }
        "Edm.DateTimeOffset" => {
            let text = scalar_text(value, property)?;
            let timestamp = DateTime::parse_from_rfc3339(text)
                .map_err(|_| FormatError::malformed(property.edm_type.as_str(), text))?;
            let mut formatted = timestamp.format("%Y-%m-%dT%H:%M:%S").to_string();
            if timestamp.timestamp_subsec_millis() != 0 {
                formatted.push_str(&format!(".{:03}", timestamp.timestamp_subsec_millis()));
            }
            if timestamp.offset().local_minus_utc() == 0 {
                formatted.push('Z');
            } else {
                formatted.push_str(&timestamp.format("%:z").to_string());
            }
            Ok(format!("datetimeoffset'{}'", formatted))
        }
        "Edm.Time" | "Edm.TimeOfDay" => {
            let text = scalar_text(value, property)?;
            let time = NaiveTime::parse_from_str(text, "%H:%M:%S%.f")
                .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
                .map_err(|_| FormatError::malformed(property.edm_type.as_str(), text))?;
            // Fractional seconds are carried over verbatim
            let fraction = text.find('.').map(|i| &text[i..]).unwrap_or("");
            Ok(format!(
                "time'PT{}H{}M{}{}S'",
                time.hour(),
                time.minute(),
                time.second(),
                fraction
            ))
        }
        _ => Err(FormatError::UnsupportedType {
            type_name: type_name.to_string(),
        }),
    }
}

fn scalar_text<'a>(value: &'a Value, property: &PropertySchema) -> Result<&'a str, FormatError> {
    value
        .as_str()
        .ok_or_else(|| FormatError::malformed(property.edm_type.as_str(), value.to_string()))
}
