//! Unit tests for the primitive value codec
//!
//! Wire-form vectors for the legacy timestamp, duration, floating point,
//! and binary encodings, plus the URL literal formatter.

use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use base64::Engine;
use odata_bridge::edm_catalog::PropertySchema;
use odata_bridge::edm_codec::{
    convert_binary, convert_date, convert_date_time_offset, convert_double_single,
    convert_time_of_day, format_property_as_literal, FormatError,
};
use serde_json::{json, Value};
use test_case::test_case;

#[test_case("/Date(1395705600000)/", "2014-03-25T00:00:00.000Z" ; "midnight utc")]
#[test_case("/Date(1420529121547+0530)/", "2015-01-06T12:55:21.547+05:30" ; "positive offset")]
#[test_case("/Date(1420529121547-0800)/", "2015-01-05T23:25:21.547-08:00" ; "negative offset")]
#[test_case("/Date(1420529121547+0000)/", "2015-01-06T07:25:21.547Z" ; "zero offset is utc")]
#[test_case("/Date(0)/", "1970-01-01T00:00:00.000Z" ; "epoch")]
#[test_case("/Date(-1000)/", "1969-12-31T23:59:59.000Z" ; "before the epoch")]
fn test_timestamp_wire_forms(wire: &str, expected: &str) {
    assert_eq!(convert_date_time_offset(wire).unwrap(), expected);
}

#[test_case("/Date(1395705600000)/", "2014-03-25" ; "whole day")]
#[test_case("/Date(0)/", "1970-01-01" ; "epoch day")]
#[test_case("/Date(-86400000)/", "1969-12-31" ; "day before the epoch")]
fn test_date_wire_forms(wire: &str, expected: &str) {
    assert_eq!(convert_date(wire).unwrap(), expected);
}

#[test]
fn test_date_rejects_intraday_ticks() {
    for wire in ["/Date(1)/", "/Date(1395705600001)/", "/Date(-1)/"] {
        assert!(
            matches!(convert_date(wire), Err(FormatError::DateWithTime { .. })),
            "{} carries a time of day and must not truncate",
            wire
        );
    }
}

#[test_case("PT11H33M55S", "11:33:55" ; "all components")]
#[test_case("PT0S", "00:00:00" ; "zero")]
#[test_case("PT23H59M59.999S", "23:59:59.999" ; "fraction kept verbatim")]
#[test_case("PT36H", "12:00:00" ; "rolls over past midnight")]
fn test_duration_wire_forms(wire: &str, expected: &str) {
    assert_eq!(convert_time_of_day(wire).unwrap(), expected);
}

#[test]
fn test_codec_errors_name_value_and_type() {
    let error = convert_date_time_offset("not-a-date").unwrap_err();
    let message = error.to_string();
    assert!(message.contains("not-a-date"), "message was {}", message);
    assert!(message.contains("Edm.DateTimeOffset"), "message was {}", message);

    let error = convert_time_of_day("11:33:55").unwrap_err();
    assert!(error.to_string().contains("Edm.Time"));
}

#[test]
fn test_binary_swap_matches_url_safe_encoding() {
    // bytes chosen so the standard alphabet needs both '+' and '/'
    let samples: Vec<Vec<u8>> = vec![
        vec![0xfb, 0xef, 0xbe],
        vec![0xff, 0xfe, 0xfd, 0xfc],
        (0u8..=255).collect(),
    ];
    for bytes in samples {
        let legacy = STANDARD.encode(&bytes);
        let expected = URL_SAFE.encode(&bytes);
        assert_eq!(convert_binary(&legacy), expected);
    }
}

#[test]
fn test_binary_swap_is_invertible() {
    let legacy = "ab+cd/ef==";
    let restored: String = convert_binary(legacy)
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    assert_eq!(restored, legacy);
}

#[test_case(json!("840.25"), json!(840.25) ; "string encoded")]
#[test_case(json!(840.25), json!(840.25) ; "already numeric")]
#[test_case(json!("NaN"), json!("NaN") ; "nan sentinel")]
#[test_case(json!("INF"), json!("INF") ; "positive infinity sentinel")]
#[test_case(json!("-INF"), json!("-INF") ; "negative infinity sentinel")]
fn test_double_wire_forms(wire: Value, expected: Value) {
    assert_eq!(convert_double_single(&wire, "Edm.Double").unwrap(), expected);
}

#[test]
fn test_url_literals_follow_the_declared_type() {
    let cases = vec![
        (
            PropertySchema::new("Edm.String"),
            json!("O'Brien"),
            "'O''Brien'",
        ),
        (PropertySchema::new("Edm.Int32"), json!(42), "42"),
        (PropertySchema::new("Edm.Boolean"), json!(true), "true"),
        (PropertySchema::new("Edm.Guid"), json!("0050568d"), "0050568d"),
        (
            PropertySchema::new("Edm.Date"),
            json!("2015-05-27"),
            "datetime'2015-05-27T00:00:00'",
        ),
        (
            PropertySchema::new("Edm.DateTimeOffset"),
            json!("2015-01-06T07:25:21Z"),
            "datetimeoffset'2015-01-06T07:25:21Z'",
        ),
        (
            PropertySchema::with_v2_type("Edm.DateTimeOffset", "Edm.DateTime"),
            json!("2015-01-06T07:25:21Z"),
            "datetime'2015-01-06T07:25:21'",
        ),
        (
            PropertySchema::new("Edm.TimeOfDay"),
            json!("13:47:26"),
            "time'PT13H47M26S'",
        ),
        (PropertySchema::new("Edm.Int64"), Value::Null, "null"),
    ];
    for (property, value, expected) in cases {
        assert_eq!(
            format_property_as_literal(&value, &property).unwrap(),
            expected,
            "formatting {:?} as {}",
            value,
            property.v2_type_name()
        );
    }
}

#[test]
fn test_url_literal_rejects_impossible_values() {
    let date = PropertySchema::new("Edm.Date");
    assert!(format_property_as_literal(&json!("2015-05-32"), &date).is_err());

    let time = PropertySchema::new("Edm.TimeOfDay");
    assert!(format_property_as_literal(&json!("25:00:00"), &time).is_err());

    let unsupported = PropertySchema::new("Edm.GeographyPoint");
    assert!(matches!(
        format_property_as_literal(&json!("POINT(1 2)"), &unsupported),
        Err(FormatError::UnsupportedType { .. })
    ));
}
