use ast::{CompareOperator, FilterExpression};
use common::ws;
use errors::FilterParsingError;
use nom::branch::alt;
use nom::bytes::complete::{tag, take_while, take_while1};
use nom::character::complete::char;
use nom::combinator::{map, recognize, value};
use nom::multi::separated_list1;
use nom::sequence::pair;
use nom::{IResult, Parser};

pub mod ast;
mod common;
pub mod errors;

/// Parse a filter string into its single binary relation.
///
/// The supported grammar is exactly one `path op literal` relation;
/// boolean-combined filters must be decomposed by the caller before
/// invocation, anything beyond the relation is rejected as trailing input.
pub fn parse_filter(input: &str) -> Result<FilterExpression<'_>, FilterParsingError<'_>> {
    match filter_expression(input) {
        Ok((remainder, expression)) => {
            if !remainder.trim().is_empty() {
                return Err(FilterParsingError {
                    errors: vec![(remainder, "unexpected tokens after the relation")],
                });
            }
            Ok(expression)
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(e),
        Err(nom::Err::Incomplete(_)) => Err(FilterParsingError {
            errors: vec![(input, "incomplete filter")],
        }),
    }
}

/// Inner text of a quoted literal token with `''` escapes resolved.
/// Returns `None` when the token is not a well-formed quoted literal.
pub fn unescape_string_literal(token: &str) -> Option<String> {
    let inner = token.strip_prefix('\'')?.strip_suffix('\'')?;
    Some(inner.replace("''", "'"))
}

fn filter_expression(input: &str) -> IResult<&str, FilterExpression<'_>, FilterParsingError<'_>> {
    map(
        (ws(property_path), comparison_operator, ws(literal_token)),
        |(path, operator, literal)| FilterExpression {
            path,
            operator,
            literal,
        },
    )
    .parse(input)
}

// one or more identifier segments joined by '/', e.g. "GrossAmount" or
// "SO_2_BP/CompanyName"
fn property_path(input: &str) -> IResult<&str, &str, FilterParsingError<'_>> {
    recognize(separated_list1(char('/'), identifier)).parse(input)
}

fn identifier(input: &str) -> IResult<&str, &str, FilterParsingError<'_>> {
    recognize(pair(
        take_while1(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))
    .parse(input)
}

fn comparison_operator(input: &str) -> IResult<&str, CompareOperator, FilterParsingError<'_>> {
    alt((
        value(CompareOperator::Equal, tag("eq")),
        value(CompareOperator::NotEqual, tag("ne")),
        value(CompareOperator::GreaterOrEqual, tag("ge")),
        value(CompareOperator::GreaterThan, tag("gt")),
        value(CompareOperator::LessOrEqual, tag("le")),
        value(CompareOperator::LessThan, tag("lt")),
    ))
    .parse(input)
}

fn literal_token(input: &str) -> IResult<&str, &str, FilterParsingError<'_>> {
    alt((quoted_literal, bare_literal)).parse(input)
}

// Single-quoted string with '' escapes; returns the token including quotes.
// Scans bytes: the quote is ASCII, so multi-byte characters pass through.
fn quoted_literal(input: &str) -> IResult<&str, &str, FilterParsingError<'_>> {
    let bytes = input.as_bytes();
    if bytes.first() != Some(&b'\'') {
        return Err(nom::Err::Error(FilterParsingError {
            errors: vec![(input, "expected a quoted literal")],
        }));
    }
    let mut index = 1;
    while index < bytes.len() {
        if bytes[index] == b'\'' {
            if bytes.get(index + 1) == Some(&b'\'') {
                // escaped quote
                index += 2;
                continue;
            }
            return Ok((&input[index + 1..], &input[..index + 1]));
        }
        index += 1;
    }
    Err(nom::Err::Error(FilterParsingError {
        errors: vec![(input, "unterminated string literal")],
    }))
}

// Unquoted literals: numbers, booleans, null, dates, times, guids
fn bare_literal(input: &str) -> IResult<&str, &str, FilterParsingError<'_>> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | ':' | '+' | '-'))
        .parse(input)
}
