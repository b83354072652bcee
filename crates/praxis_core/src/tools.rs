//! Tool abstraction types — shared between the integration engine and adapters.
//!
//! The engine consumes an in-memory `ToolCatalogue` per invocation and drives
//! `ToolAdapter` implementations through the registry. Adapters own their side
//! effects and their timeout discipline; the engine only sequences them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

// ============================================================================
// Catalogue
// ============================================================================

/// Type tag for a declared tool parameter.
///
/// Aliases cover the JSON-schema spellings models tend to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    #[serde(alias = "string")]
    Str,
    #[serde(alias = "integer")]
    Int,
    #[serde(alias = "boolean")]
    Bool,
    #[serde(alias = "number")]
    Float,
    #[serde(alias = "array")]
    List,
    Object,
}

impl ParamType {
    /// Stable lowercase name used in validation error messages.
    pub fn name(&self) -> &'static str {
        match self {
            ParamType::Str => "str",
            ParamType::Int => "int",
            ParamType::Bool => "bool",
            ParamType::Float => "float",
            ParamType::List => "list",
            ParamType::Object => "object",
        }
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One declared parameter of a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    pub required: bool,
}

impl ParameterSpec {
    pub fn required(name: &str, param_type: ParamType) -> Self {
        Self { name: name.to_string(), param_type, required: true }
    }

    pub fn optional(name: &str, param_type: ParamType) -> Self {
        Self { name: name.to_string(), param_type, required: false }
    }
}

/// Caller-supplied schema of available tools: tool name → ordered parameter
/// specs. Immutable for the duration of one pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolCatalogue {
    tools: std::collections::HashMap<String, Vec<ParameterSpec>>,
}

impl ToolCatalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a tool and its parameter specs. Replaces any prior declaration.
    pub fn declare(&mut self, tool_name: &str, params: Vec<ParameterSpec>) -> &mut Self {
        self.tools.insert(tool_name.to_string(), params);
        self
    }

    pub fn get(&self, tool_name: &str) -> Option<&[ParameterSpec]> {
        self.tools.get(tool_name).map(|v| v.as_slice())
    }

    pub fn contains(&self, tool_name: &str) -> bool {
        self.tools.contains_key(tool_name)
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }
}

impl From<std::collections::HashMap<String, Vec<ParameterSpec>>> for ToolCatalogue {
    fn from(tools: std::collections::HashMap<String, Vec<ParameterSpec>>) -> Self {
        Self { tools }
    }
}

// ============================================================================
// Directives
// ============================================================================

/// One tool invocation request, as decoded from the model's response.
/// Not yet checked against the catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDef {
    /// Optional label for multi-stage chains.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_name: Option<String>,
    pub tool_name: String,
    #[serde(default)]
    pub parameters: serde_json::Map<String, Value>,
}

impl StepDef {
    pub fn new(tool_name: &str, parameters: serde_json::Map<String, Value>) -> Self {
        Self { step_name: None, tool_name: tool_name.to_string(), parameters }
    }

    /// Label used in validation/execution error messages: the step name when
    /// present, otherwise the tool name.
    pub fn label(&self) -> &str {
        self.step_name.as_deref().unwrap_or(&self.tool_name)
    }
}

/// The classified intent of an LLM response. Exactly one case per parse;
/// an absent directive key is a parse failure, not `NoToolsSelected`.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// Multi-step invocation, in response order.
    SelectedTools(Vec<StepDef>),
    /// Single invocation.
    SelectedTool(StepDef),
    /// Explicit signal that no tool call is warranted.
    NoToolsSelected,
}

// ============================================================================
// Adapters
// ============================================================================

/// Classification of adapter failures, reported by the adapter itself.
/// The engine treats both as fatal; the kind is diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    /// Timeout, connection reset — a fresh run might succeed.
    Transient,
    /// Bad binding, unsupported input — a fresh run won't help.
    Permanent,
}

/// Structured result from one adapter invocation.
#[derive(Debug, Clone, Serialize)]
pub struct ToolOutcome {
    pub content: String,
    pub is_error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ToolErrorKind>,
}

impl ToolOutcome {
    pub fn ok(content: String) -> Self {
        Self { content, is_error: false, error_kind: None }
    }

    pub fn transient_error(msg: String) -> Self {
        Self { content: msg, is_error: true, error_kind: Some(ToolErrorKind::Transient) }
    }

    pub fn permanent_error(msg: String) -> Self {
        Self { content: msg, is_error: true, error_kind: Some(ToolErrorKind::Permanent) }
    }
}

/// Capability contract for registered tools.
#[async_trait::async_trait]
pub trait ToolAdapter: Send + Sync {
    /// Unique name used for dispatch (must match the catalogue key).
    fn name(&self) -> &str;

    /// Human-readable description for logging.
    fn description(&self) -> &str;

    /// The adapter's own declared parameter specs, used when assembling a
    /// catalogue from the registry.
    fn parameters(&self) -> Vec<ParameterSpec>;

    /// Execute with the full parameter mapping from the validated step.
    /// Undeclared parameters are passed through untouched.
    async fn run(&self, parameters: &serde_json::Map<String, Value>) -> ToolOutcome;
}

// ============================================================================
// Results
// ============================================================================

/// Per-step outcome, in the order of the originating step sequence.
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_name: Option<String>,
    pub tool_name: String,
    pub outcome: ToolOutcome,
}

/// Aggregate result of one successful `advance` run.
#[derive(Debug, Clone, Serialize)]
pub struct IntegrationReport {
    pub success: bool,
    pub run_id: Uuid,
    pub results: Vec<StepOutcome>,
}

impl IntegrationReport {
    pub fn completed(run_id: Uuid, results: Vec<StepOutcome>) -> Self {
        Self { success: true, run_id, results }
    }
}
