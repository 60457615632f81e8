//! Unit tests for response body conversion
//!
//! Replays a realistic legacy service payload through the converter and
//! checks the full converted document, plus ordering and envelope rules
//! the conversion must uphold.

use std::sync::Arc;

use odata_bridge::edm_catalog::{EdmSchemaConfig, SchemaCatalog};
use odata_bridge::response_converter::{ConvertError, ResponseConverter};
use serde_json::json;

const SCHEMA_YAML: &str = r#"
namespace: GWSAMPLE_BASIC
entity_types:
  - name: SalesOrder
    properties:
      SalesOrderID: { type: Edm.String }
      CustomerName: { type: Edm.String }
      CurrencyCode: { type: Edm.String }
      GrossAmount: { type: Edm.Decimal }
      NetAmount: { type: Edm.Decimal }
      TaxAmount: { type: Edm.Decimal }
      LifecycleStatus: { type: Edm.String }
      CreatedAt: { type: Edm.DateTimeOffset }
      ChangedAt: { type: Edm.DateTimeOffset }
    navigations:
      SO_2_BP: { target: BusinessPartner }
      SO_2_ITEMS: { target: SalesOrderLineItem, collection: true }
  - name: SalesOrderLineItem
    properties:
      ItemPosition: { type: Edm.String }
      Quantity: { type: Edm.Decimal }
      DeliveryDate: { type: Edm.DateTimeOffset }
  - name: BusinessPartner
    properties:
      CompanyName: { type: Edm.String }
entity_sets:
  SalesOrderList: SalesOrder
"#;

fn converter() -> ResponseConverter<SchemaCatalog> {
    let config = EdmSchemaConfig::from_yaml_str(SCHEMA_YAML).expect("schema YAML should parse");
    let catalog = SchemaCatalog::new(config.into_schema().expect("schema should build"));
    ResponseConverter::new(Arc::new(catalog))
}

#[test]
fn test_realistic_entity_payload_is_fully_converted() {
    let body = json!({
        "d": {
            "__metadata": {
                "id": "https://host/sap/opu/odata/iwbep/GWSAMPLE_BASIC/SalesOrderList('0500000001')",
                "uri": "https://host/sap/opu/odata/iwbep/GWSAMPLE_BASIC/SalesOrderList('0500000001')",
                "type": "GWSAMPLE_BASIC.SalesOrder"
            },
            "SalesOrderID": "0500000001",
            "CustomerName": "SAP",
            "CurrencyCode": "EUR",
            "GrossAmount": "14245.56",
            "NetAmount": "11971.06",
            "TaxAmount": "2274.50",
            "LifecycleStatus": "N",
            "CreatedAt": "/Date(1420529121547)/",
            "ChangedAt": "/Date(1420529121547+0000)/",
            "SO_2_BP": {
                "__deferred": {
                    "uri": "https://host/sap/opu/odata/iwbep/GWSAMPLE_BASIC/SalesOrderList('0500000001')/SO_2_BP"
                }
            },
            "SO_2_ITEMS": {
                "results": [
                    {
                        "__metadata": { "type": "GWSAMPLE_BASIC.SalesOrderLineItem" },
                        "ItemPosition": "0000000010",
                        "Quantity": "2",
                        "DeliveryDate": "/Date(1421290800000)/"
                    },
                    {
                        "__metadata": { "type": "GWSAMPLE_BASIC.SalesOrderLineItem" },
                        "ItemPosition": "0000000020",
                        "Quantity": "1",
                        "DeliveryDate": null
                    }
                ]
            }
        }
    });

    let converted = converter().convert_response(body).unwrap();
    assert_eq!(
        converted,
        json!({
            "SalesOrderID": "0500000001",
            "CustomerName": "SAP",
            "CurrencyCode": "EUR",
            "GrossAmount": "14245.56",
            "NetAmount": "11971.06",
            "TaxAmount": "2274.50",
            "LifecycleStatus": "N",
            "CreatedAt": "2015-01-06T07:25:21.547Z",
            "ChangedAt": "2015-01-06T07:25:21.547Z",
            "SO_2_ITEMS": [
                {
                    "ItemPosition": "0000000010",
                    "Quantity": "2",
                    "DeliveryDate": "2015-01-15T03:00:00.000Z"
                },
                {
                    "ItemPosition": "0000000020",
                    "Quantity": "1",
                    "DeliveryDate": null
                }
            ]
        })
    );
}

#[test]
fn test_property_order_is_preserved() {
    let body = json!({
        "d": {
            "CustomerName": "SAP",
            "__metadata": { "type": "GWSAMPLE_BASIC.SalesOrder" },
            "SalesOrderID": "0500000001",
            "CurrencyCode": "EUR"
        }
    });
    let converted = converter().convert_response(body).unwrap();
    let keys: Vec<&String> = converted
        .as_object()
        .expect("entity should stay an object")
        .keys()
        .collect();
    assert_eq!(keys, vec!["CustomerName", "SalesOrderID", "CurrencyCode"]);
}

#[test]
fn test_collection_envelope_keeps_only_value_and_annotations() {
    let body = json!({
        "d": {
            "results": [
                {
                    "__metadata": { "type": "GWSAMPLE_BASIC.SalesOrder" },
                    "SalesOrderID": "0500000001"
                }
            ],
            "__count": "1295",
            "__next": "SalesOrderList?$skiptoken='0500000020'",
            "__delta": "SalesOrderList?!deltatoken='ABC'"
        }
    });
    let converted = converter().convert_response(body).unwrap();
    assert_eq!(
        converted,
        json!({
            "value": [{ "SalesOrderID": "0500000001" }],
            "@odata.count": "1295",
            "@odata.nextLink": "SalesOrderList?$skiptoken='0500000020'"
        })
    );
}

#[test]
fn test_empty_collection_still_gains_the_value_wrapper() {
    let body = json!({ "d": { "results": [] } });
    let converted = converter().convert_response(body).unwrap();
    assert_eq!(converted, json!({ "value": [] }));
}

#[test]
fn test_entity_with_results_property_is_not_mistaken_for_a_collection() {
    // an entity whose declared property happens to be named "results"
    // still carries __metadata and must convert as a single entity
    let body = json!({
        "d": {
            "__metadata": { "type": "GWSAMPLE_BASIC.Unknown" },
            "results": ["a", "b"]
        }
    });
    let converted = converter().convert_response(body).unwrap();
    assert_eq!(converted, json!({ "results": ["a", "b"] }));
}

#[test]
fn test_primitive_collection_elements_pass_through() {
    let body = json!({
        "d": {
            "__metadata": { "type": "GWSAMPLE_BASIC.Unknown" },
            "Tags": ["urgent", "export"]
        }
    });
    let converted = converter().convert_response(body).unwrap();
    assert_eq!(converted, json!({ "Tags": ["urgent", "export"] }));
}

#[test]
fn test_envelope_is_required() {
    let result = converter().convert_response(json!({ "value": [] }));
    assert_eq!(result, Err(ConvertError::MissingEnvelope));
}

#[test]
fn test_untyped_collection_element_aborts_the_conversion() {
    let body = json!({
        "d": {
            "results": [
                { "__metadata": { "type": "GWSAMPLE_BASIC.SalesOrder" }, "SalesOrderID": "1" },
                { "SalesOrderID": "2" }
            ]
        }
    });
    assert!(matches!(
        converter().convert_response(body),
        Err(ConvertError::MissingTypeMetadata { .. })
    ));
}
