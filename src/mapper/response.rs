//! Parsing and validation of mapping responses.
//!
//! A response must be a JSON object with exactly the `form_fields` and
//! `semantic_fields` members, each an object of scalar values. Anything
//! else rejects the whole batch.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

/// Why a batch response was rejected.
#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    /// The text is not JSON of the expected shape
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A mapping value is an object or array
    #[error("value for '{key}' in {member} is not a scalar")]
    NonScalar {
        /// `form_fields` or `semantic_fields`
        member: &'static str,
        /// Offending key
        key: String,
    },
}

/// A validated batch response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResponse {
    /// field_name -> value
    pub form_fields: IndexMap<String, String>,
    /// human description -> value
    pub semantic_fields: IndexMap<String, String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBatchResponse {
    form_fields: IndexMap<String, Value>,
    semantic_fields: IndexMap<String, Value>,
}

impl BatchResponse {
    /// Parse a raw collaborator response.
    ///
    /// The text is trimmed, one enclosing code fence is removed, and at most
    /// one layer of matching `'` or `"` quotes is stripped before parsing.
    pub fn parse(raw: &str) -> Result<Self, ResponseError> {
        let cleaned = strip_enclosing_quotes(strip_code_fence(raw.trim()));
        let parsed: RawBatchResponse = serde_json::from_str(cleaned)?;
        Ok(Self {
            form_fields: scalars(parsed.form_fields, "form_fields")?,
            semantic_fields: scalars(parsed.semantic_fields, "semantic_fields")?,
        })
    }
}

/// Convert values to strings: strings as-is, numbers and booleans rendered,
/// nulls dropped.
fn scalars(
    map: IndexMap<String, Value>,
    member: &'static str,
) -> Result<IndexMap<String, String>, ResponseError> {
    let mut out = IndexMap::with_capacity(map.len());
    for (key, value) in map {
        match value {
            Value::String(s) => {
                out.insert(key, s);
            },
            Value::Number(n) => {
                out.insert(key, n.to_string());
            },
            Value::Bool(b) => {
                out.insert(key, b.to_string());
            },
            Value::Null => {},
            Value::Array(_) | Value::Object(_) => {
                return Err(ResponseError::NonScalar { member, key });
            },
        }
    }
    Ok(out)
}

/// Remove one layer of matching enclosing quote characters.
///
/// ```
/// use taxform_oxide::mapper::strip_enclosing_quotes;
///
/// assert_eq!(strip_enclosing_quotes("'{}'"), "{}");
/// assert_eq!(strip_enclosing_quotes("\"'{}'\""), "'{}'");
/// assert_eq!(strip_enclosing_quotes("'{}\""), "'{}\"");
/// ```
pub fn strip_enclosing_quotes(text: &str) -> &str {
    for quote in ['\'', '"'] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return &text[1..text.len() - 1];
        }
    }
    text
}

/// Remove a surrounding Markdown code fence (```` ``` ```` or ```` ```json ````).
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return text;
    };
    match body.find('\n') {
        Some(newline) if body[..newline].chars().all(|c| c.is_ascii_alphanumeric()) => {
            body[newline + 1..].trim()
        },
        _ => body.trim(),
    }
}
