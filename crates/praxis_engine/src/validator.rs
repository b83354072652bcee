//! Schema validation: check parsed steps against the declared catalogue.
//!
//! All-or-nothing per directive: one invalid step fails the whole thing,
//! since partial execution of a multi-step chain is unsafe without
//! transactional semantics. `ValidatedStep` can only be constructed here,
//! so the executor never sees an unvalidated `StepDef`.

use praxis_core::{Directive, IntegrationError, ParamType, SchemaViolation, StepDef, ToolCatalogue};
use serde_json::Value;

/// A step proven to satisfy the catalogue. The private field keeps
/// construction inside this module.
#[derive(Debug, Clone)]
pub struct ValidatedStep {
    step: StepDef,
}

impl ValidatedStep {
    pub fn step(&self) -> &StepDef {
        &self.step
    }
}

/// Validate every step of a directive against the catalogue, preserving
/// step order. `NoToolsSelected` validates to an empty sequence.
pub fn validate_directive(
    directive: &Directive,
    catalogue: &ToolCatalogue,
) -> Result<Vec<ValidatedStep>, IntegrationError> {
    let steps: &[StepDef] = match directive {
        Directive::SelectedTools(steps) => steps,
        Directive::SelectedTool(step) => std::slice::from_ref(step),
        Directive::NoToolsSelected => return Ok(Vec::new()),
    };
    steps
        .iter()
        .map(|step| validate_step(step, catalogue))
        .collect()
}

fn validate_step(
    step: &StepDef,
    catalogue: &ToolCatalogue,
) -> Result<ValidatedStep, IntegrationError> {
    let specs = catalogue.get(&step.tool_name).ok_or_else(|| {
        IntegrationError::SchemaValidation(SchemaViolation::UnknownTool {
            tool: step.tool_name.clone(),
        })
    })?;

    for spec in specs {
        match step.parameters.get(&spec.name) {
            None => {
                if spec.required {
                    return Err(IntegrationError::SchemaValidation(
                        SchemaViolation::MissingParameter {
                            step: step.label().to_string(),
                            parameter: spec.name.clone(),
                        },
                    ));
                }
            }
            Some(value) => {
                if !type_matches(spec.param_type, value) {
                    return Err(IntegrationError::SchemaValidation(
                        SchemaViolation::TypeMismatch {
                            step: step.label().to_string(),
                            parameter: spec.name.clone(),
                            expected: spec.param_type.name().to_string(),
                            actual: json_type_name(value).to_string(),
                        },
                    ));
                }
            }
        }
    }

    // Undeclared parameters pass through untouched: the adapter receives the
    // full mapping, not just the recognized keys.
    Ok(ValidatedStep { step: step.clone() })
}

fn type_matches(expected: ParamType, value: &Value) -> bool {
    match expected {
        ParamType::Str => value.is_string(),
        ParamType::Int => value.is_i64() || value.is_u64(),
        ParamType::Bool => value.is_boolean(),
        // Integers are acceptable where a float is declared.
        ParamType::Float => value.is_number(),
        ParamType::List => value.is_array(),
        ParamType::Object => value.is_object(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
