//! Error taxonomy for the integration pipeline.
//!
//! Three kinds are locally recoverable via the retry handler
//! (`InvalidFormat`, `ChainOfThought`, `SchemaValidation`). Everything else
//! is fatal and propagates immediately: re-prompting the model cannot fix
//! a broken tool binding.

use thiserror::Error;

/// Why the chain-of-thought gate rejected a response. A reasoning field that
/// is present but too thin is distinct from a missing field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CotFailure {
    #[error("reasoning field is missing")]
    Missing,
    #[error("reasoning too thin: {words} words, minimum is {min_words}")]
    Insufficient { words: usize, min_words: usize },
}

/// A single schema violation, naming the offending tool, step and parameter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaViolation {
    #[error("unknown tool '{tool}'")]
    UnknownTool { tool: String },
    #[error("step '{step}' is missing required parameter '{parameter}'")]
    MissingParameter { step: String, parameter: String },
    #[error("step '{step}' parameter '{parameter}': expected {expected}, got {actual}")]
    TypeMismatch {
        step: String,
        parameter: String,
        expected: String,
        actual: String,
    },
}

#[derive(Debug, Clone, Error)]
pub enum IntegrationError {
    /// No parseable directive found, in either the structured or the
    /// extracted-text path.
    #[error("invalid response format: {0}")]
    InvalidFormat(String),

    /// The reasoning-quality gate rejected the response.
    #[error("chain-of-thought check failed: {0}")]
    ChainOfThought(CotFailure),

    /// The directive does not satisfy the declared tool catalogue.
    #[error("schema validation failed: {0}")]
    SchemaValidation(SchemaViolation),

    /// Registry resolution miss, or a factory that failed to instantiate.
    #[error("tool '{0}' is not registered")]
    ToolNotFound(String),

    /// A registered adapter's run failed. Always fatal.
    #[error("tool '{tool}' execution failed: {message}")]
    AdapterExecution { tool: String, message: String },

    /// The re-prompting transport itself failed. Always fatal.
    #[error("reprompt transport failed: {0}")]
    Reprompt(String),

    /// Terminal: the bounded retry loop was exhausted.
    #[error("retry limit of {max_attempts} attempts exceeded; last error: {last}")]
    RetryLimitExceeded {
        max_attempts: u32,
        last: Box<IntegrationError>,
    },
}

impl IntegrationError {
    /// Whether this error is eligible for the bounded re-prompt loop.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            IntegrationError::InvalidFormat(_)
                | IntegrationError::ChainOfThought(_)
                | IntegrationError::SchemaValidation(_)
        )
    }

    /// Stable kind tag for logging and caller-side matching.
    pub fn kind(&self) -> &'static str {
        match self {
            IntegrationError::InvalidFormat(_) => "invalid_format",
            IntegrationError::ChainOfThought(_) => "chain_of_thought",
            IntegrationError::SchemaValidation(_) => "schema_validation",
            IntegrationError::ToolNotFound(_) => "tool_not_found",
            IntegrationError::AdapterExecution { .. } => "adapter_execution",
            IntegrationError::Reprompt(_) => "reprompt",
            IntegrationError::RetryLimitExceeded { .. } => "retry_limit_exceeded",
        }
    }
}
