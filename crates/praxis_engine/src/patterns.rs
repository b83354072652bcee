//! Pattern-directed extraction: hunt named text blocks out of free-form
//! model output.
//!
//! For callers whose "tools" are text shapes rather than JSON directives —
//! e.g. a numeric grid the model writes inline — each spec names a regex,
//! and the first match per pattern is returned. A pattern with no match
//! fails the whole extraction, naming the pattern.

use praxis_core::IntegrationError;
use regex::Regex;
use std::collections::HashMap;

/// One named extraction pattern.
#[derive(Debug, Clone)]
pub struct PatternSpec {
    pub name: String,
    pub pattern: Regex,
    /// Capture group to return; 0 is the whole match.
    pub capture_group: usize,
}

impl PatternSpec {
    pub fn new(name: &str, pattern: Regex) -> Self {
        Self {
            name: name.to_string(),
            pattern,
            capture_group: 0,
        }
    }

    pub fn with_capture_group(mut self, group: usize) -> Self {
        self.capture_group = group;
        self
    }
}

/// Extract the first match for every spec, keyed by spec name.
pub fn extract_patterns(
    specs: &[PatternSpec],
    text: &str,
) -> Result<HashMap<String, String>, IntegrationError> {
    let mut out = HashMap::with_capacity(specs.len());
    for spec in specs {
        let captured = spec
            .pattern
            .captures(text)
            .and_then(|caps| caps.get(spec.capture_group))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| {
                IntegrationError::InvalidFormat(format!("no match for pattern '{}'", spec.name))
            })?;
        tracing::debug!("Pattern '{}' matched {} bytes", spec.name, captured.len());
        out.insert(spec.name.clone(), captured);
    }
    Ok(out)
}
