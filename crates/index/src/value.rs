//! Tagged decoding of CLIXML scalar elements

use filever_errors::IndexError;
use filever_types::IndexValue;
use roxmltree::Node;

use crate::text::unescape;

/// Decode a scalar element into an [`IndexValue`], choosing the variant by tag.
///
/// `S` is a string, `B` a boolean, `I64`/`I32` integers and `Nil` null. Any
/// other tag keeps its text content as a string.
pub(crate) fn decode_element(node: Node<'_, '_>, key: &str) -> Result<IndexValue, IndexError> {
    let text = node.text().unwrap_or("");
    match node.tag_name().name() {
        "Nil" => Ok(IndexValue::Nil),
        "B" => parse_bool(text, key),
        "I64" => parse_int::<i64>(text, key),
        "I32" => parse_int::<i32>(text, key),
        _ => Ok(IndexValue::Str(unescape(text))),
    }
}

fn parse_bool(text: &str, key: &str) -> Result<IndexValue, IndexError> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(IndexValue::Bool(true)),
        "false" | "0" => Ok(IndexValue::Bool(false)),
        _ => Err(IndexError::EntryDecode {
            key: key.to_string(),
            message: format!("invalid boolean {text:?}"),
        }),
    }
}

fn parse_int<T>(text: &str, key: &str) -> Result<IndexValue, IndexError>
where
    T: std::str::FromStr + Into<i64>,
    T::Err: std::fmt::Display,
{
    text.trim()
        .parse::<T>()
        .map(|n| IndexValue::Int(n.into()))
        .map_err(|e| IndexError::EntryDecode {
            key: key.to_string(),
            message: format!("invalid integer {text:?}: {e}"),
        })
}

fn decode_error(key: &str, expected: &str, value: &IndexValue) -> IndexError {
    IndexError::EntryDecode {
        key: key.to_string(),
        message: format!("expected {expected}, got {value:?}"),
    }
}

/// `ok`: native boolean, or text in true/false/1/0/yes/no (any case).
pub(crate) fn to_bool(key: &str, value: &IndexValue) -> Result<bool, IndexError> {
    match value {
        IndexValue::Bool(b) => Ok(*b),
        IndexValue::Nil | IndexValue::Int(0) => Ok(false),
        IndexValue::Int(1) => Ok(true),
        IndexValue::Str(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(decode_error(key, "a boolean", value)),
        },
        IndexValue::Int(_) => Err(decode_error(key, "a boolean", value)),
    }
}

/// `length`: native integer or decimal text; never negative.
pub(crate) fn to_length(key: &str, value: &IndexValue) -> Result<u64, IndexError> {
    let n = match value {
        IndexValue::Int(n) => *n,
        IndexValue::Nil => 0,
        IndexValue::Str(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| decode_error(key, "an integer", value))?,
        IndexValue::Bool(_) => return Err(decode_error(key, "an integer", value)),
    };
    u64::try_from(n).map_err(|_| decode_error(key, "a non-negative length", value))
}

/// `path` and `hash`: strings; null reads as empty.
pub(crate) fn to_text(key: &str, value: &IndexValue) -> Result<String, IndexError> {
    match value {
        IndexValue::Str(s) => Ok(s.clone()),
        IndexValue::Nil => Ok(String::new()),
        _ => Err(decode_error(key, "a string", value)),
    }
}

/// `error`: null means no error.
pub(crate) fn to_error(key: &str, value: &IndexValue) -> Result<Option<String>, IndexError> {
    match value {
        IndexValue::Nil => Ok(None),
        IndexValue::Str(s) => Ok(Some(s.clone())),
        _ => Err(decode_error(key, "a string or null", value)),
    }
}
