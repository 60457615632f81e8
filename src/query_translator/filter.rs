use serde_json::Value;

use crate::edm_catalog::{MetadataError, MetadataLookup};
use crate::edm_codec::format_property_as_literal;
use crate::filter_parser::{parse_filter, unescape_string_literal};
use crate::query_translator::errors::TranslateError;

/// Rewrite a V4 `$filter` relation so its literal conforms to the V2 URL
/// grammar of the addressed property.
///
/// The property type is resolved against `meta_path`. String comparisons
/// already carry valid V2 literals and are returned exactly as given;
/// everything else is re-rendered as `path op literal` with the literal
/// formatted for the property's V2 type.
pub fn convert_filter<M>(
    metadata: &M,
    meta_path: &str,
    filter: &str,
) -> Result<String, TranslateError>
where
    M: MetadataLookup + ?Sized,
{
    let expression =
        parse_filter(filter).map_err(|e| TranslateError::FilterSyntax(e.to_string()))?;

    let property = metadata
        .fetch_property(meta_path, expression.path)
        .ok_or_else(|| MetadataError::unresolved_path(meta_path, expression.path))?;

    if property.edm_type == "Edm.String" {
        return Ok(filter.to_string());
    }

    let value = decode_literal_token(expression.literal)?;
    let literal = format_property_as_literal(&value, &property)?;
    Ok(format!(
        "{} {} {}",
        expression.path,
        expression.operator.as_str(),
        literal
    ))
}

/// Turn a literal token back into the JSON value the formatter expects.
/// Quoted tokens lose their quotes and `''` escapes; bare tokens keep
/// their spelling and let the property type decide how to render them.
fn decode_literal_token(token: &str) -> Result<Value, TranslateError> {
    if token == "null" {
        return Ok(Value::Null);
    }
    if token.starts_with('\'') {
        return unescape_string_literal(token).map(Value::String).ok_or_else(|| {
            TranslateError::FilterSyntax(format!("malformed string literal `{}`", token))
        });
    }
    Ok(Value::String(token.to_string()))
}
