//! Chain-of-thought gate: reject under-justified directives before they
//! reach validation or execution.
//!
//! A reasoning field that is present must be substantive — merely non-empty
//! is not enough. Whether *absence* fails is the caller's policy.

use praxis_core::{CotFailure, IntegrationError};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static RE_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\p{L}\p{N}]+").unwrap());

/// Keys a model may use for its justification.
const REASONING_KEYS: &[&str] = &["chain_of_thought", "reasoning"];

/// Substantiveness policy. The threshold is configuration, not a constant.
#[derive(Debug, Clone)]
pub struct CotPolicy {
    /// When true, a missing reasoning field fails the gate.
    pub required: bool,
    /// Minimum word count for a present reasoning field to pass.
    pub min_words: usize,
}

impl Default for CotPolicy {
    fn default() -> Self {
        Self {
            required: false,
            min_words: 5,
        }
    }
}

impl From<&praxis_core::config::CotSettings> for CotPolicy {
    fn from(settings: &praxis_core::config::CotSettings) -> Self {
        Self {
            required: settings.required,
            min_words: settings.min_words,
        }
    }
}

fn word_count(text: &str) -> usize {
    RE_WORD.find_iter(text).count()
}

/// Verify the payload's reasoning against the policy.
///
/// Missing field: `Ok` unless the policy requires it. Present field: must
/// meet the word threshold regardless of the `required` flag — a present
/// but thin justification is a distinct failure.
pub fn verify_chain_of_thought(payload: &Value, policy: &CotPolicy) -> Result<(), IntegrationError> {
    let field = payload
        .as_object()
        .and_then(|map| REASONING_KEYS.iter().find_map(|key| map.get(*key)));

    match field {
        None => {
            if policy.required {
                Err(IntegrationError::ChainOfThought(CotFailure::Missing))
            } else {
                Ok(())
            }
        }
        Some(value) => {
            // A non-string reasoning value carries no prose to judge.
            let words = value.as_str().map(word_count).unwrap_or(0);
            if words < policy.min_words {
                tracing::debug!("Reasoning rejected: {} words < {}", words, policy.min_words);
                Err(IntegrationError::ChainOfThought(CotFailure::Insufficient {
                    words,
                    min_words: policy.min_words,
                }))
            } else {
                Ok(())
            }
        }
    }
}
