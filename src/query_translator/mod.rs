//! Translation of V4 system query options into the flat V2 parameter list.
//!
//! The entry point walks the option map in its own order and hands each
//! output parameter to an `emit` callback, so callers decide whether the
//! pairs end up in a URL, a batch part, or a test fixture.

use serde_json::{Map, Value};

use crate::edm_catalog::MetadataLookup;

pub mod errors;
pub mod expand;
pub mod filter;

pub use errors::TranslateError;
pub use expand::{flatten_expand, FlattenedExpand};
pub use filter::convert_filter;

/// Convert a map of V4 system query options into V2 query parameters.
///
/// Emission order follows the input map, with one exception: `$select` is
/// always emitted last because nested `$expand` entries may still contribute
/// select paths. With `drop_system_options` every `$`-prefixed option is
/// silently omitted (write requests carry no query semantics); custom
/// parameters still pass through. With `sort_expand_select` the `$expand`
/// and `$select` path lists are sorted before joining, which canonicalizes
/// URLs for caching and comparison.
pub fn convert_system_query_options<M>(
    metadata: &M,
    resource_path: &str,
    options: &Map<String, Value>,
    emit: &mut dyn FnMut(&str, &str),
    drop_system_options: bool,
    sort_expand_select: bool,
) -> Result<(), TranslateError>
where
    M: MetadataLookup + ?Sized,
{
    let mut selects: Vec<String> = Vec::new();

    for (name, value) in options {
        if drop_system_options && name.starts_with('$') {
            log::debug!("Dropping system query option {} for a write request", name);
            continue;
        }
        match name.as_str() {
            "$count" => emit("$inlinecount", inlinecount_value(value)?),
            "$expand" => {
                let flattened = flatten_expand(value, "")?;
                merge_paths(&mut selects, flattened.select_paths);
                let mut paths = flattened.expand_paths;
                if sort_expand_select {
                    paths.sort();
                }
                emit("$expand", &paths.join(","));
            }
            "$orderby" => {
                let text = value
                    .as_str()
                    .ok_or_else(|| TranslateError::invalid_option_value(name, value))?;
                emit("$orderby", text);
            }
            "$select" => merge_paths(&mut selects, select_paths_from_value(name, value)?),
            "$filter" => {
                let text = value
                    .as_str()
                    .ok_or_else(|| TranslateError::invalid_option_value(name, value))?;
                let converted = convert_filter(metadata, resource_path, text)?;
                emit("$filter", &converted);
            }
            other if other.starts_with('$') => {
                return Err(TranslateError::UnsupportedSystemOption(other.to_string()));
            }
            custom => emit(custom, &custom_parameter_value(custom, value)?),
        }
    }

    if !selects.is_empty() {
        // nested expands forced a $select; keep the entity itself visible
        if !options.contains_key("$select") {
            selects.push("*".to_string());
        }
        if sort_expand_select {
            selects.sort();
        }
        emit("$select", &selects.join(","));
    }

    Ok(())
}

fn inlinecount_value(value: &Value) -> Result<&'static str, TranslateError> {
    let all_pages = match value {
        Value::Bool(flag) => *flag,
        Value::String(text) if text == "true" => true,
        Value::String(text) if text == "false" => false,
        _ => return Err(TranslateError::invalid_option_value("$count", value)),
    };
    Ok(if all_pages { "allpages" } else { "none" })
}

/// Accept `$select` given either as an array of path strings or as one
/// comma-separated string.
pub(crate) fn select_paths_from_value(
    option: &str,
    value: &Value,
) -> Result<Vec<String>, TranslateError> {
    match value {
        Value::String(text) => Ok(text
            .split(',')
            .map(|path| path.trim().to_string())
            .filter(|path| !path.is_empty())
            .collect()),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(|path| path.trim().to_string())
                    .ok_or_else(|| TranslateError::invalid_option_value(option, value))
            })
            .collect(),
        _ => Err(TranslateError::invalid_option_value(option, value)),
    }
}

fn merge_paths(accumulator: &mut Vec<String>, paths: impl IntoIterator<Item = String>) {
    for path in paths {
        if !accumulator.contains(&path) {
            accumulator.push(path);
        }
    }
}

fn custom_parameter_value(name: &str, value: &Value) -> Result<String, TranslateError> {
    match value {
        Value::String(text) => Ok(text.clone()),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        _ => Err(TranslateError::invalid_option_value(name, value)),
    }
}
