//! Directive classification: decode a structured payload into tool steps.
//!
//! Purely structural — the catalogue is never consulted here, so parsing
//! and schema validation stay independently testable.

use praxis_core::{Directive, IntegrationError, StepDef};
use serde_json::Value;

const KEY_NO_TOOLS: &str = "NO_TOOLS_SELECTED";
const KEY_SELECTED_TOOLS: &str = "SELECTED_TOOLS";
const KEY_SELECTED_TOOL: &str = "SELECTED_TOOL";

/// Classify a structured payload into a `Directive`.
///
/// Priority order: a truthy `NO_TOOLS_SELECTED` marker wins over any other
/// keys; then `SELECTED_TOOLS` bound to a sequence; then `SELECTED_TOOL`
/// with its sibling `parameters` mapping. Anything else is a format error.
pub fn parse_directive(payload: &Value) -> Result<Directive, IntegrationError> {
    let map = payload
        .as_object()
        .ok_or_else(|| IntegrationError::InvalidFormat("payload is not a JSON object".into()))?;

    if let Some(marker) = map.get(KEY_NO_TOOLS) {
        if is_truthy(marker) {
            tracing::debug!("Decoded NO_TOOLS_SELECTED");
            return Ok(Directive::NoToolsSelected);
        }
    }

    if let Some(value) = map.get(KEY_SELECTED_TOOLS) {
        let items = value.as_array().ok_or_else(|| {
            IntegrationError::InvalidFormat(format!("{KEY_SELECTED_TOOLS} must be a sequence"))
        })?;
        if items.is_empty() {
            return Err(IntegrationError::InvalidFormat(format!(
                "{KEY_SELECTED_TOOLS} is empty"
            )));
        }
        let steps = items.iter().map(decode_step).collect::<Result<Vec<_>, _>>()?;
        tracing::debug!("Decoded SELECTED_TOOLS with {} steps", steps.len());
        return Ok(Directive::SelectedTools(steps));
    }

    if let Some(value) = map.get(KEY_SELECTED_TOOL) {
        let tool_name = value
            .as_str()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                IntegrationError::InvalidFormat(format!("{KEY_SELECTED_TOOL} must be a tool name"))
            })?;
        let parameters = map
            .get("parameters")
            .and_then(|v| v.as_object())
            .cloned()
            .unwrap_or_default();
        tracing::debug!("Decoded SELECTED_TOOL: {}", tool_name);
        return Ok(Directive::SelectedTool(StepDef::new(tool_name, parameters)));
    }

    Err(IntegrationError::InvalidFormat(
        "no recognized directive key".into(),
    ))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Null => false,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty() && !s.eq_ignore_ascii_case("false"),
        _ => true,
    }
}

/// Decode one element of a SELECTED_TOOLS sequence. Field names are
/// normalised the way models actually emit them: `tool_name` or `tool`,
/// `parameters` or `arguments`.
fn decode_step(value: &Value) -> Result<StepDef, IntegrationError> {
    let obj = value
        .as_object()
        .ok_or_else(|| IntegrationError::InvalidFormat("step is not a JSON object".into()))?;

    let tool_name = obj
        .get("tool_name")
        .or_else(|| obj.get("tool"))
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| IntegrationError::InvalidFormat("step is missing tool_name".into()))?;

    let step_name = obj
        .get("step_name")
        .and_then(|v| v.as_str())
        .map(String::from);

    let parameters = obj
        .get("parameters")
        .or_else(|| obj.get("arguments"))
        .and_then(|v| v.as_object())
        .cloned()
        .unwrap_or_default();

    Ok(StepDef {
        step_name,
        tool_name: tool_name.to_string(),
        parameters,
    })
}
