use serde_json::Value;

use crate::query_translator::errors::TranslateError;
use crate::query_translator::select_paths_from_value;

/// Result of flattening a structured V4 `$expand` tree into the flat
/// path lists the V2 surface understands.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct FlattenedExpand {
    /// Navigation paths for the V2 `$expand` parameter, outer before inner.
    pub expand_paths: Vec<String>,
    /// Property paths to merge into the V2 `$select` parameter. An expand
    /// entry without a nested `$select` contributes `<path>/*`.
    pub select_paths: Vec<String>,
}

/// Flatten a V4 `$expand` value into absolute navigation and select paths.
///
/// `prefix` is the navigation path of the enclosing entry, empty at the top
/// level. Nested `$expand` recurses; nested `$select` paths are re-anchored
/// at the absolute entry path; any other nested option is rejected.
pub fn flatten_expand(value: &Value, prefix: &str) -> Result<FlattenedExpand, TranslateError> {
    let entries = value.as_object().ok_or(TranslateError::ExpandNotAnObject)?;
    let mut flattened = FlattenedExpand::default();

    for (name, entry) in entries {
        let absolute = join_path(prefix, name);
        flattened.expand_paths.push(absolute.clone());

        let mut has_select = false;
        if let Some(options) = entry.as_object() {
            for (option, option_value) in options {
                match option.as_str() {
                    "$expand" => {
                        let nested = flatten_expand(option_value, &absolute)?;
                        flattened.expand_paths.extend(nested.expand_paths);
                        flattened.select_paths.extend(nested.select_paths);
                    }
                    "$select" => {
                        has_select = true;
                        for path in select_paths_from_value(option, option_value)? {
                            flattened.select_paths.push(join_path(&absolute, &path));
                        }
                    }
                    other => {
                        return Err(TranslateError::UnsupportedExpandOption {
                            path: absolute,
                            option: other.to_string(),
                        });
                    }
                }
            }
        }

        // entries that select nothing explicitly expose every property
        if !has_select {
            flattened.select_paths.push(format!("{}/*", absolute));
        }
    }

    Ok(flattened)
}

fn join_path(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{}/{}", prefix, segment)
    }
}
