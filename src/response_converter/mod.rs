//! Conversion of `d`-enveloped legacy response bodies into the newer
//! protocol's JSON shape.
//!
//! Collections lose their `results` wrapper and reappear under `value`
//! with the paging annotations renamed; entities lose their `__metadata`
//! envelope, deferred navigations are dropped, and primitive values are
//! decoded per the property types resolved through the metadata lookup.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::{Map, Value};

use crate::edm_catalog::{MetadataLookup, PropertyMap, PropertySchema};
use crate::edm_codec::{self, FormatError, TypeFamily};

pub mod errors;

pub use errors::ConvertError;

const ENVELOPE_KEY: &str = "d";
const METADATA_KEY: &str = "__metadata";
const RESULTS_KEY: &str = "results";
const DEFERRED_KEY: &str = "__deferred";
const LEGACY_COUNT_KEY: &str = "__count";
const LEGACY_NEXT_KEY: &str = "__next";
const COUNT_ANNOTATION: &str = "@odata.count";
const NEXT_LINK_ANNOTATION: &str = "@odata.nextLink";

/// Converts legacy response bodies using property types resolved through a
/// [`MetadataLookup`].
///
/// The property map of each qualified type is resolved once and cached for
/// the lifetime of the converter. Re-resolving a name always yields the same
/// map, so concurrent duplicate population is harmless.
pub struct ResponseConverter<M: MetadataLookup + ?Sized> {
    metadata: Arc<M>,
    types_by_name: RwLock<HashMap<String, Arc<PropertyMap>>>,
}

impl<M: MetadataLookup + ?Sized> ResponseConverter<M> {
    pub fn new(metadata: Arc<M>) -> Self {
        ResponseConverter {
            metadata,
            types_by_name: RwLock::new(HashMap::new()),
        }
    }

    /// Convert a parsed legacy response body.
    ///
    /// A collection payload becomes `{value: [...]}` with `__count` and
    /// `__next` carried over as `@odata.count` and `@odata.nextLink`; a
    /// single entity becomes the bare converted object. A body without the
    /// `d` envelope is rejected.
    pub fn convert_response(&self, body: Value) -> Result<Value, ConvertError> {
        let mut envelope = match body {
            Value::Object(map) => map,
            _ => return Err(ConvertError::MissingEnvelope),
        };
        let payload = match envelope.remove(ENVELOPE_KEY) {
            Some(Value::Object(map)) => map,
            _ => return Err(ConvertError::MissingEnvelope),
        };

        let is_collection = matches!(payload.get(RESULTS_KEY), Some(Value::Array(_)))
            && !payload.contains_key(METADATA_KEY);
        if !is_collection {
            return self.convert_structured(Value::Object(payload));
        }

        let mut elements = Vec::new();
        let mut count = None;
        let mut next = None;
        for (key, value) in payload {
            if key == RESULTS_KEY {
                if let Value::Array(items) = value {
                    elements = items;
                }
            } else if key == LEGACY_COUNT_KEY {
                count = Some(value);
            } else if key == LEGACY_NEXT_KEY {
                next = Some(value);
            }
        }

        let values = elements
            .into_iter()
            .map(|element| self.convert_structured(element))
            .collect::<Result<Vec<_>, _>>()?;

        let mut converted = Map::new();
        converted.insert("value".to_string(), Value::Array(values));
        if let Some(count) = count {
            converted.insert(COUNT_ANNOTATION.to_string(), count);
        }
        if let Some(next) = next {
            converted.insert(NEXT_LINK_ANNOTATION.to_string(), next);
        }
        Ok(Value::Object(converted))
    }

    /// Depth-first conversion of one structured value.
    ///
    /// A `results` wrapper without metadata is a nested collection and
    /// becomes a bare array. Anything else must name its qualified type in
    /// `__metadata.type`; an untyped structured value aborts the whole
    /// conversion since its property values cannot be interpreted.
    fn convert_structured(&self, value: Value) -> Result<Value, ConvertError> {
        let mut object = match value {
            Value::Object(map) => map,
            other => {
                return Err(ConvertError::MissingTypeMetadata {
                    value: other.to_string(),
                })
            }
        };

        if !object.contains_key(METADATA_KEY) {
            match object.remove(RESULTS_KEY) {
                Some(Value::Array(elements)) => {
                    let converted = elements
                        .into_iter()
                        .map(|element| self.convert_structured(element))
                        .collect::<Result<Vec<_>, _>>()?;
                    return Ok(Value::Array(converted));
                }
                Some(other) => {
                    object.insert(RESULTS_KEY.to_string(), other);
                }
                None => {}
            }
            return Err(ConvertError::MissingTypeMetadata {
                value: Value::Object(object).to_string(),
            });
        }

        let type_name = match object
            .get(METADATA_KEY)
            .and_then(|meta| meta.get("type"))
            .and_then(Value::as_str)
        {
            Some(name) => name.to_string(),
            None => {
                return Err(ConvertError::MissingTypeMetadata {
                    value: Value::Object(object).to_string(),
                })
            }
        };

        let properties = self.type_properties(&type_name);
        let mut converted = Map::new();
        for (name, value) in object {
            if name == METADATA_KEY {
                continue;
            }
            match value {
                Value::Null => {
                    converted.insert(name, Value::Null);
                }
                Value::Object(map) => {
                    // unexpanded navigations surface as deferred markers
                    // and have no representation in the newer protocol
                    if map.contains_key(DEFERRED_KEY) {
                        continue;
                    }
                    let nested = self.convert_structured(Value::Object(map))?;
                    converted.insert(name, nested);
                }
                Value::Array(items) => {
                    let nested = items
                        .into_iter()
                        .map(|item| match item {
                            Value::Object(_) => self.convert_structured(item),
                            other => Ok(other),
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    converted.insert(name, Value::Array(nested));
                }
                primitive => {
                    let output =
                        convert_primitive(primitive, properties.get(&name), &type_name, &name)?;
                    converted.insert(name, output);
                }
            }
        }
        Ok(Value::Object(converted))
    }

    /// Property map of a qualified type, resolved once and cached.
    ///
    /// Unknown type names cache an empty map so every property of such a
    /// type passes through unchanged instead of failing the conversion.
    fn type_properties(&self, type_name: &str) -> Arc<PropertyMap> {
        let cache = self.types_by_name.read().unwrap_or_else(|e| e.into_inner());
        if let Some(properties) = cache.get(type_name) {
            return Arc::clone(properties);
        }
        drop(cache);

        let resolved = match self.metadata.fetch_type(type_name) {
            Some(properties) => Arc::new(properties),
            None => {
                log::warn!(
                    "No metadata for type {}, passing its properties through",
                    type_name
                );
                Arc::new(PropertyMap::new())
            }
        };
        let mut cache = self.types_by_name.write().unwrap_or_else(|e| e.into_inner());
        Arc::clone(cache.entry(type_name.to_string()).or_insert(resolved))
    }
}

fn convert_primitive(
    value: Value,
    property: Option<&PropertySchema>,
    parent_type: &str,
    name: &str,
) -> Result<Value, ConvertError> {
    let property = match property {
        Some(property) => property,
        None => {
            // open types carry undeclared properties, those pass through
            log::debug!(
                "No declared type for {}.{}, value passes through",
                parent_type,
                name
            );
            return Ok(value);
        }
    };

    let family = match edm_codec::type_family(&property.edm_type) {
        Some(family) => family,
        None => {
            return Err(ConvertError::UnknownPropertyType {
                type_name: property.edm_type.clone(),
                property: name.to_string(),
                parent_type: parent_type.to_string(),
                value: value.to_string(),
            })
        }
    };

    let result = match family {
        TypeFamily::Unconverted => return Ok(value),
        TypeFamily::FloatingPoint => edm_codec::convert_double_single(&value, &property.edm_type),
        TypeFamily::Binary => wire_text(&value, &property.edm_type)
            .map(|text| Value::String(edm_codec::convert_binary(text))),
        TypeFamily::Date => wire_text(&value, &property.edm_type)
            .and_then(edm_codec::convert_date)
            .map(Value::String),
        TypeFamily::DateTimeOffset => wire_text(&value, &property.edm_type)
            .and_then(edm_codec::convert_date_time_offset)
            .map(Value::String),
        TypeFamily::TimeOfDay => wire_text(&value, &property.edm_type)
            .and_then(edm_codec::convert_time_of_day)
            .map(Value::String),
    };
    result.map_err(|source| ConvertError::Property {
        property: name.to_string(),
        parent_type: parent_type.to_string(),
        source,
    })
}

fn wire_text<'a>(value: &'a Value, type_name: &str) -> Result<&'a str, FormatError> {
    value
        .as_str()
        .ok_or_else(|| FormatError::malformed(type_name, value.to_string()))
}
