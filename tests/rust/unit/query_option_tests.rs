//! Unit tests for system query option translation
//!
//! Covers the documented option rules end to end: renaming, expand
//! flattening, the shared select accumulator, the drop and sort flags,
//! and custom parameter passthrough.

use odata_bridge::edm_catalog::{EdmSchemaConfig, SchemaCatalog};
use odata_bridge::query_translator::{convert_system_query_options, TranslateError};
use serde_json::{json, Value};

const SCHEMA_YAML: &str = r#"
namespace: GWSAMPLE_BASIC
entity_types:
  - name: SalesOrder
    properties:
      SalesOrderID: { type: Edm.String }
      GrossAmount: { type: Edm.Decimal }
      CreatedAt: { type: Edm.DateTimeOffset }
      ChangedAt: { type: Edm.DateTimeOffset, v2_type: Edm.DateTime }
    navigations:
      SO_2_BP: { target: BusinessPartner }
      SO_2_ITEMS: { target: SalesOrderItem, collection: true }
  - name: BusinessPartner
    properties:
      CompanyName: { type: Edm.String }
  - name: SalesOrderItem
    properties:
      ItemPosition: { type: Edm.String }
      Quantity: { type: Edm.Int32 }
    navigations:
      ITEM_2_PRODUCT: { target: Product }
  - name: Product
    properties:
      Name: { type: Edm.String }
      Price: { type: Edm.Decimal }
entity_sets:
  SalesOrderList: SalesOrder
"#;

fn catalog() -> SchemaCatalog {
    let config = EdmSchemaConfig::from_yaml_str(SCHEMA_YAML).expect("schema YAML should parse");
    SchemaCatalog::new(config.into_schema().expect("schema should build"))
}

fn convert(
    options: Value,
    drop_system_options: bool,
    sort_expand_select: bool,
) -> Result<Vec<(String, String)>, TranslateError> {
    let metadata = catalog();
    let map = options.as_object().expect("options must be an object").clone();
    let mut pairs = Vec::new();
    convert_system_query_options(
        &metadata,
        "SalesOrderList",
        &map,
        &mut |name, value| pairs.push((name.to_string(), value.to_string())),
        drop_system_options,
        sort_expand_select,
    )?;
    Ok(pairs)
}

fn pair(name: &str, value: &str) -> (String, String) {
    (name.to_string(), value.to_string())
}

#[test]
fn test_documented_emission_example() {
    let pairs = convert(
        json!({
            "$count": true,
            "$select": ["SalesOrderID", "GrossAmount"],
            "$expand": { "SO_2_BP": { "$select": ["CompanyName"] } }
        }),
        false,
        false,
    )
    .unwrap();
    assert_eq!(
        pairs,
        vec![
            pair("$inlinecount", "allpages"),
            pair("$expand", "SO_2_BP"),
            pair("$select", "SalesOrderID,GrossAmount,SO_2_BP/CompanyName"),
        ]
    );
}

#[test]
fn test_deep_expand_flattens_to_absolute_paths() {
    let pairs = convert(
        json!({
            "$expand": {
                "SO_2_ITEMS": {
                    "$select": ["Quantity"],
                    "$expand": { "ITEM_2_PRODUCT": {} }
                }
            }
        }),
        false,
        false,
    )
    .unwrap();
    assert_eq!(
        pairs,
        vec![
            pair("$expand", "SO_2_ITEMS,SO_2_ITEMS/ITEM_2_PRODUCT"),
            pair(
                "$select",
                "SO_2_ITEMS/Quantity,SO_2_ITEMS/ITEM_2_PRODUCT/*,*"
            ),
        ]
    );
}

#[test]
fn test_filter_keeps_its_position_in_the_emission() {
    let pairs = convert(
        json!({
            "$filter": "ChangedAt gt 2015-01-06T07:25:21Z",
            "$count": false
        }),
        false,
        false,
    )
    .unwrap();
    assert_eq!(
        pairs,
        vec![
            pair("$filter", "ChangedAt gt datetime'2015-01-06T07:25:21'"),
            pair("$inlinecount", "none"),
        ]
    );
}

#[test]
fn test_unsupported_options_error_and_emit_nothing() {
    for option in ["$apply", "$search", "$skiptoken", "$compute"] {
        let result = convert(json!({ option: "x" }), false, false);
        assert_eq!(
            result,
            Err(TranslateError::UnsupportedSystemOption(option.to_string())),
            "option {}",
            option
        );
    }
}

#[test]
fn test_drop_flag_suppresses_all_system_options() {
    let pairs = convert(
        json!({
            "$count": true,
            "$select": ["SalesOrderID"],
            "$apply": "whatever",
            "sap-language": "EN"
        }),
        true,
        false,
    )
    .unwrap();
    assert_eq!(pairs, vec![pair("sap-language", "EN")]);
}

#[test]
fn test_nested_option_other_than_expand_select_is_rejected() {
    let result = convert(
        json!({ "$expand": { "SO_2_ITEMS": { "$orderby": "Quantity" } } }),
        false,
        false,
    );
    assert_eq!(
        result,
        Err(TranslateError::UnsupportedExpandOption {
            path: "SO_2_ITEMS".to_string(),
            option: "$orderby".to_string(),
        })
    );
}

#[test]
fn test_sort_flag_canonicalizes_path_lists() {
    let unsorted = convert(
        json!({ "$expand": { "SO_2_ITEMS": {}, "SO_2_BP": {} } }),
        false,
        false,
    )
    .unwrap();
    assert_eq!(
        unsorted,
        vec![
            pair("$expand", "SO_2_ITEMS,SO_2_BP"),
            pair("$select", "SO_2_ITEMS/*,SO_2_BP/*,*"),
        ]
    );

    let sorted = convert(
        json!({ "$expand": { "SO_2_ITEMS": {}, "SO_2_BP": {} } }),
        false,
        true,
    )
    .unwrap();
    assert_eq!(
        sorted,
        vec![
            pair("$expand", "SO_2_BP,SO_2_ITEMS"),
            pair("$select", "*,SO_2_BP/*,SO_2_ITEMS/*"),
        ]
    );
}

#[test]
fn test_select_string_form_and_deduplication() {
    let pairs = convert(
        json!({ "$select": "SalesOrderID, GrossAmount, SalesOrderID" }),
        false,
        false,
    )
    .unwrap();
    assert_eq!(pairs, vec![pair("$select", "SalesOrderID,GrossAmount")]);
}

#[test]
fn test_orderby_and_custom_parameters_pass_through() {
    let pairs = convert(
        json!({
            "$orderby": "GrossAmount desc",
            "sap-client": "100",
            "page": 2
        }),
        false,
        false,
    )
    .unwrap();
    assert_eq!(
        pairs,
        vec![
            pair("$orderby", "GrossAmount desc"),
            pair("sap-client", "100"),
            pair("page", "2"),
        ]
    );
}
