//! Bounded retry protocol for recoverable pipeline failures.
//!
//! Only format, chain-of-thought, and schema failures are retryable;
//! adapter and registry failures propagate immediately without consuming
//! an attempt. The corrective prompt always extends the previous input, so
//! every retry re-enters classification with strictly new text — the loop
//! makes progress or terminates at the attempt bound.

use crate::classifier::LlmResponse;
use praxis_core::IntegrationError;

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of pipeline attempts (including the first).
    pub max_attempts: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

impl From<&praxis_core::config::RetrySettings> for RetryConfig {
    fn from(settings: &praxis_core::config::RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
        }
    }
}

/// Attempt bookkeeping for one orchestrator call. Plain data, reset by
/// constructing a fresh handler per call.
pub struct RetryHandler {
    config: RetryConfig,
    attempt: u32,
    last_error: Option<IntegrationError>,
}

impl RetryHandler {
    pub fn new(config: RetryConfig) -> Self {
        Self {
            config,
            attempt: 0,
            last_error: None,
        }
    }

    /// Record the start of a pipeline attempt. Returns the 1-based attempt
    /// number, or `None` once the bound is exhausted.
    pub fn begin_attempt(&mut self) -> Option<u32> {
        if self.attempt >= self.config.max_attempts {
            return None;
        }
        self.attempt += 1;
        Some(self.attempt)
    }

    pub fn attempts(&self) -> u32 {
        self.attempt
    }

    /// Whether a failed attempt may be followed by another: the error must
    /// be of a retryable kind and attempts must remain.
    pub fn should_retry(&self, error: &IntegrationError) -> bool {
        error.is_retryable() && self.attempt < self.config.max_attempts
    }

    pub fn record_failure(&mut self, error: IntegrationError) {
        tracing::warn!(
            "Attempt {}/{} failed ({}): {}",
            self.attempt,
            self.config.max_attempts,
            error.kind(),
            error
        );
        self.last_error = Some(error);
    }

    /// Append the corrective hint to the previous response so the next
    /// attempt classifies a strictly new input. A structured previous
    /// response is templated into text around its serialization.
    pub fn build_retry_prompt(&self, previous: &LlmResponse, hint: &str) -> String {
        match previous {
            LlmResponse::Text(text) => format!("{text}\n\n{hint}"),
            LlmResponse::Structured(value) => {
                let serialized =
                    serde_json::to_string(value).unwrap_or_else(|_| value.to_string());
                format!("The previous reply was:\n{serialized}\n\n{hint}")
            }
        }
    }

    /// The terminal error for an exhausted loop, carrying the last observed
    /// failure for diagnostics.
    pub fn limit_error(&self) -> IntegrationError {
        let last = self
            .last_error
            .clone()
            .unwrap_or_else(|| IntegrationError::InvalidFormat("no attempts recorded".into()));
        IntegrationError::RetryLimitExceeded {
            max_attempts: self.config.max_attempts,
            last: Box::new(last),
        }
    }
}

/// Corrective hint matched to the failure, appended to the re-prompt.
pub fn corrective_hint(error: &IntegrationError) -> String {
    match error {
        IntegrationError::InvalidFormat(msg) => format!(
            "Your previous reply could not be interpreted ({msg}). Respond with a single JSON \
             object using SELECTED_TOOLS, SELECTED_TOOL, or NO_TOOLS_SELECTED."
        ),
        IntegrationError::ChainOfThought(failure) => format!(
            "Your previous reply was rejected: {failure}. Add a chain_of_thought field explaining \
             why the selected tools apply."
        ),
        IntegrationError::SchemaValidation(violation) => format!(
            "Your previous tool selection was invalid: {violation}. Correct the tool call to \
             match the declared schema."
        ),
        _ => "Please try again.".to_string(),
    }
}
