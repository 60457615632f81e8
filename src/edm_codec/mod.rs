//! Primitive value conversion between the two protocol versions
//!
//! The older protocol transports several primitive types in JSON-safe string
//! encodings that the newer protocol does not use: timestamps ride in a
//! `/Date(ticks[±HHMM])/` wrapper, durations in `PT#H#M#.#S` form, doubles
//! and singles as strings, and binary data in the non-URL-safe base64
//! alphabet. This module decodes those wire forms into the newer protocol's
//! representations (`convert_*`) and re-encodes values as older-protocol URL
//! literals for query strings (`format_property_as_literal`).
//!
//! Every parse failure is an explicit [`FormatError`] naming the offending
//! value and the type that rejected it. There is no best-effort fallback.

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::DateTime;
use regex::{Captures, Regex};
use serde_json::Value;

pub mod errors;
mod literals;

pub use errors::FormatError;
pub use literals::{format_literal, format_property_as_literal};

const MILLIS_PER_DAY: i64 = 86_400_000;
const SECONDS_PER_DAY: u64 = 86_400;

/// Regex to match the legacy UTC timestamp wire form /Date(ticks)/
/// Captures: (1) signed milliseconds since the Unix epoch
static DATE_TICKS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/Date\((-?\d+)\)/$").unwrap());

/// Regex to match the legacy timestamp wire form /Date(ticks±HHMM)/
/// Captures: (1) signed milliseconds, (2) offset sign, (3) offset hours, (4) offset minutes
static DATE_OFFSET_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/Date\((-?\d+)(?:([-+])(\d{2})(\d{2}))?\)/$").unwrap());

/// Regex to match the legacy duration wire form PT#H#M#S
/// Captures: (1) hours, (2) minutes, (3) whole seconds, (4) fractional seconds with dot
static TIME_DURATION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i)PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)(\.\d+)?S)?$").unwrap());

/// How a declared property type converts between the two protocol versions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeFamily {
    /// JSON representation agrees between both versions
    Unconverted,
    /// Legacy string-encoded floating point, NaN/INF/-INF sentinels preserved
    FloatingPoint,
    Binary,
    Date,
    DateTimeOffset,
    TimeOfDay,
}

// Static type family table
lazy_static::lazy_static! {
    static ref TYPE_FAMILIES: HashMap<&'static str, TypeFamily> = {
        let mut m = HashMap::new();
        for pass_through in [
            "Edm.Boolean",
            "Edm.Byte",
            "Edm.Decimal",
            "Edm.Guid",
            "Edm.Int16",
            "Edm.Int32",
            "Edm.Int64",
            "Edm.SByte",
            "Edm.String",
        ] {
            m.insert(pass_through, TypeFamily::Unconverted);
        }
        m.insert("Edm.Double", TypeFamily::FloatingPoint);
        m.insert("Edm.Single", TypeFamily::FloatingPoint);
        m.insert("Edm.Binary", TypeFamily::Binary);
        m.insert("Edm.Date", TypeFamily::Date);
        m.insert("Edm.DateTimeOffset", TypeFamily::DateTimeOffset);
        m.insert("Edm.TimeOfDay", TypeFamily::TimeOfDay);
        m
    };
}

/// Look up the conversion family of a protocol-neutral type name
pub fn type_family(type_name: &str) -> Option<TypeFamily> {
    TYPE_FAMILIES.get(type_name).copied()
}

/// Translate legacy base64 into the URL-safe alphabet.
///
/// Padding is kept as is, the two alphabets only differ in `+`/`/`.
pub fn convert_binary(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect()
}

/// Convert a legacy `/Date(ticks)/` value into a calendar date.
///
/// The legacy wire type carries a full timestamp; a tick count that is not
/// an exact multiple of one day means the value holds a time of day that a
/// pure date type cannot represent, which is an error rather than a
/// truncation.
pub fn convert_date(value: &str) -> Result<String, FormatError> {
    let ticks: i64 = DATE_TICKS_PATTERN
        .captures(value)
        .and_then(|captures| captures[1].parse().ok())
        .ok_or_else(|| FormatError::malformed("Edm.DateTime", value))?;
    if ticks.rem_euclid(MILLIS_PER_DAY) != 0 {
        return Err(FormatError::DateWithTime {
            value: value.to_string(),
        });
    }
    let date = DateTime::from_timestamp_millis(ticks)
        .ok_or_else(|| FormatError::malformed("Edm.DateTime", value))?;
    Ok(date.format("%Y-%m-%d").to_string())
}

/// Convert a legacy `/Date(ticks±HHMM)/` value into a timestamp string.
///
/// A present, nonzero offset shifts the instant before formatting and is
/// reappended as `±HH:MM`; an absent or zero offset yields a `Z` suffix.
/// Milliseconds are always formatted with three digits.
pub fn convert_date_time_offset(value: &str) -> Result<String, FormatError> {
    let parse_error = |_| FormatError::malformed("Edm.DateTimeOffset", value);
    let captures = DATE_OFFSET_PATTERN
        .captures(value)
        .ok_or_else(|| FormatError::malformed("Edm.DateTimeOffset", value))?;
    let mut ticks: i64 = captures[1].parse().map_err(parse_error)?;

    let mut suffix = String::from("Z");
    if let Some(sign) = captures.get(2) {
        let hours: i64 = captures[3].parse().map_err(parse_error)?;
        let minutes: i64 = captures[4].parse().map_err(parse_error)?;
        let offset_minutes = hours * 60 + minutes;
        if offset_minutes != 0 {
            let shift = if sign.as_str() == "-" {
                -offset_minutes
            } else {
                offset_minutes
            };
            ticks = ticks
                .checked_add(shift * 60_000)
                .ok_or_else(|| FormatError::malformed("Edm.DateTimeOffset", value))?;
            suffix = format!("{}{}:{}", sign.as_str(), &captures[3], &captures[4]);
        }
    }

    let shifted = DateTime::from_timestamp_millis(ticks)
        .ok_or_else(|| FormatError::malformed("Edm.DateTimeOffset", value))?;
    Ok(format!(
        "{}.{:03}{}",
        shifted.format("%Y-%m-%dT%H:%M:%S"),
        shifted.timestamp_subsec_millis(),
        suffix
    ))
}

/// Convert a legacy `PT#H#M#S` duration into a time-of-day string.
///
/// All components are optional and default to zero; totals of a day or more
/// wrap around. A fractional-seconds suffix is reappended verbatim.
pub fn convert_time_of_day(value: &str) -> Result<String, FormatError> {
    let captures = TIME_DURATION_PATTERN
        .captures(value)
        .ok_or_else(|| FormatError::malformed("Edm.Time", value))?;
    let hours = duration_component(&captures, 1)
        .ok_or_else(|| FormatError::malformed("Edm.Time", value))?;
    let minutes = duration_component(&captures, 2)
        .ok_or_else(|| FormatError::malformed("Edm.Time", value))?;
    let seconds = duration_component(&captures, 3)
        .ok_or_else(|| FormatError::malformed("Edm.Time", value))?;

    let total =
        (u64::from(hours) * 3600 + u64::from(minutes) * 60 + u64::from(seconds)) % SECONDS_PER_DAY;
    let mut converted = format!("{:02}:{:02}:{:02}", total / 3600, total % 3600 / 60, total % 60);
    if let Some(fraction) = captures.get(4) {
        converted.push_str(fraction.as_str());
    }
    Ok(converted)
}

// Absent components default to zero; values beyond u32 are rejected, not wrapped
fn duration_component(captures: &Captures, index: usize) -> Option<u32> {
    match captures.get(index) {
        Some(component) => component.as_str().parse().ok(),
        None => Some(0),
    }
}

/// Convert a legacy string-encoded double or single into a JSON number.
///
/// The three sentinel strings `NaN`/`INF`/`-INF` pass through unchanged, as
/// do values that already arrived as numbers.
pub fn convert_double_single(value: &Value, type_name: &str) -> Result<Value, FormatError> {
    match value {
        Value::String(text) => match text.as_str() {
            "NaN" | "INF" | "-INF" => Ok(value.clone()),
            _ => text
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| FormatError::malformed(type_name, text)),
        },
        Value::Number(_) => Ok(value.clone()),
        _ => Err(FormatError::malformed(type_name, value.to_string())),
    }
}
