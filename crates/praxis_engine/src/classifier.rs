//! Format classification: decide whether a response is already structured.
//!
//! A string counts as structured only when the whole input parses as a
//! single JSON document — a string that merely *contains* one routes to
//! fragment extraction instead.

use serde_json::Value;

/// A raw LLM response: a structured payload handed over by the caller, or
/// free text that may need extraction.
#[derive(Debug, Clone)]
pub enum LlmResponse {
    Structured(Value),
    Text(String),
}

impl From<Value> for LlmResponse {
    fn from(value: Value) -> Self {
        LlmResponse::Structured(value)
    }
}

impl From<String> for LlmResponse {
    fn from(text: String) -> Self {
        LlmResponse::Text(text)
    }
}

impl From<&str> for LlmResponse {
    fn from(text: &str) -> Self {
        LlmResponse::Text(text.to_string())
    }
}

/// Parse a string that is, in full, one JSON object or array. Scalars and
/// partial matches yield `None` and route to extraction.
pub fn parse_document(text: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(value @ Value::Object(_)) | Ok(value @ Value::Array(_)) => Some(value),
        _ => None,
    }
}

/// Never errors: absence of structure is a valid `false`, not a failure.
pub fn is_structured(response: &LlmResponse) -> bool {
    match response {
        LlmResponse::Structured(_) => true,
        LlmResponse::Text(text) => parse_document(text).is_some(),
    }
}
