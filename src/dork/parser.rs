//! Extracts dork queries from free-form model output.
//!
//! The grammar runs in fixed steps, each with its own failure:
//! locate a fenced block, drop its language tag, parse strict JSON,
//! require an array, then map elements to queries.

use serde_json::Value;

use crate::core::types::DorkQuery;

const FENCE: &str = "```";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("fenced output contains no block with a JSON array")]
    NoArray,
    #[error("invalid JSON: {0}")]
    InvalidJson(String),
    #[error("expected a JSON array, got {0}")]
    NotAnArray(String),
    #[error("array contains no usable query")]
    NoValidQueries,
}

pub fn parse_queries(response: &str) -> Result<Vec<DorkQuery>, ParseError> {
    let (body, fenced) = locate_block(response.trim())?;
    let body = if fenced { strip_language_tag(body) } else { body };
    let value: Value =
        serde_json::from_str(body).map_err(|e| ParseError::InvalidJson(e.to_string()))?;
    let items = match value {
        Value::Array(items) => items,
        other => return Err(ParseError::NotAnArray(kind_of(&other).to_string())),
    };

    let queries: Vec<DorkQuery> = items.iter().filter_map(extract_query).collect();
    if queries.is_empty() {
        return Err(ParseError::NoValidQueries);
    }
    Ok(queries)
}

/// Picks the first fenced segment that looks like it holds an array.
/// Unfenced text is returned whole; the flag tells which case applied.
fn locate_block(text: &str) -> Result<(&str, bool), ParseError> {
    if !text.contains(FENCE) {
        return Ok((text, false));
    }
    text.split(FENCE)
        .find(|block| block.contains('[') && block.contains(']'))
        .map(|block| (block.trim(), true))
        .ok_or(ParseError::NoArray)
}

fn strip_language_tag(block: &str) -> &str {
    let first_line_end = block.find('\n').unwrap_or(block.len());
    let tag = block[..first_line_end].trim();
    let is_tag = !tag.is_empty()
        && tag
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '+');
    if is_tag {
        return block[first_line_end..].trim_start();
    }
    // Same-line tag, e.g. "json[ ... ]".
    match block.get(..4) {
        Some(prefix) if prefix.eq_ignore_ascii_case("json") => block[4..].trim_start(),
        _ => block,
    }
}

fn extract_query(item: &Value) -> Option<DorkQuery> {
    let raw = match item {
        Value::Object(map) => map.get("query")?.as_str()?,
        Value::String(s) => s.as_str(),
        _ => return None,
    };
    let cleaned = strip_wrapping_quotes(raw.trim());
    if cleaned.contains("site:") {
        Some(DorkQuery::new(cleaned))
    } else {
        None
    }
}

/// Removes quote pairs enclosing the whole string; inner and one-sided quotes stay.
fn strip_wrapping_quotes(mut text: &str) -> &str {
    loop {
        let inner = ['"', '\'']
            .into_iter()
            .find_map(|q| text.strip_prefix(q).and_then(|rest| rest.strip_suffix(q)));
        match inner {
            Some(rest) => text = rest.trim(),
            None => return text,
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
