//! The integrator: end-to-end advance over one LLM response.
//!
//! Classifying → (Extracting, text only) → Parsing → VerifyingCoT →
//! Validating → Executing. Recoverable failures re-enter classification
//! through the bounded retry handler with a strictly new input; execution
//! failures never loop back — they terminate the run.

use crate::classifier::{self, LlmResponse};
use crate::cot::{verify_chain_of_thought, CotPolicy};
use crate::directive::parse_directive;
use crate::executor::execute_steps;
use crate::fragment::extract_fragment;
use crate::registry::ToolRegistry;
use crate::reprompt::Reprompt;
use crate::retry::{corrective_hint, RetryConfig, RetryHandler};
use crate::validator::{validate_directive, ValidatedStep};
use praxis_core::{Directive, IntegrationError, IntegrationReport, PraxisConfig, ToolCatalogue};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Behavioral flags for one `advance` call, gating which directive shapes
/// are acceptable. Defaults are permissive except `json_validation`.
#[derive(Debug, Clone)]
pub struct AdvanceOptions {
    /// Require the response to already be structured, bypassing extraction.
    pub json_validation: bool,
    /// Permit `NO_TOOLS_SELECTED` as a valid outcome.
    pub no_tools_selected: bool,
    /// Permit `SELECTED_TOOLS` with more than one step.
    pub multi_stage_tools_select: bool,
    /// External deadline checked between attempts, never mid-step.
    pub deadline: Option<Instant>,
}

impl Default for AdvanceOptions {
    fn default() -> Self {
        Self {
            json_validation: false,
            no_tools_selected: true,
            multi_stage_tools_select: true,
            deadline: None,
        }
    }
}

enum Attempt {
    Steps(Vec<ValidatedStep>),
    NoTools,
}

pub struct Integrator {
    registry: Arc<RwLock<ToolRegistry>>,
    retry: RetryConfig,
    cot: CotPolicy,
    reprompt: Option<Arc<dyn Reprompt>>,
}

impl Integrator {
    pub fn new(registry: Arc<RwLock<ToolRegistry>>) -> Self {
        Self {
            registry,
            retry: RetryConfig::default(),
            cot: CotPolicy::default(),
            reprompt: None,
        }
    }

    pub fn from_config(registry: Arc<RwLock<ToolRegistry>>, config: &PraxisConfig) -> Self {
        Self {
            registry,
            retry: RetryConfig::from(&config.retry),
            cot: CotPolicy::from(&config.chain_of_thought),
            reprompt: None,
        }
    }

    pub fn set_retry_config(&mut self, config: RetryConfig) {
        self.retry = config;
    }

    pub fn set_cot_policy(&mut self, policy: CotPolicy) {
        self.cot = policy;
    }

    /// Plug in the re-prompting transport. Without one, retries re-enter
    /// the pipeline with the built corrective prompt itself.
    pub fn set_reprompt(&mut self, source: Arc<dyn Reprompt>) {
        self.reprompt = Some(source);
    }

    pub fn registry(&self) -> &Arc<RwLock<ToolRegistry>> {
        &self.registry
    }

    /// Drive one response through the pipeline to an aggregate report.
    ///
    /// Success always carries the `{success: true, results}` shape, with
    /// empty results for `NO_TOOLS_SELECTED`. Retryable-exhausted runs fail
    /// with `RetryLimitExceeded`; fatal errors propagate as-is.
    pub async fn advance(
        &self,
        catalogue: &ToolCatalogue,
        response: impl Into<LlmResponse>,
        options: &AdvanceOptions,
    ) -> Result<IntegrationReport, IntegrationError> {
        let run_id = Uuid::new_v4();
        let mut response: LlmResponse = response.into();
        let mut handler = RetryHandler::new(self.retry.clone());

        let steps = loop {
            let attempt = match handler.begin_attempt() {
                Some(n) => n,
                None => return Err(handler.limit_error()),
            };
            tracing::debug!(%run_id, attempt, "Pipeline attempt");

            match self.attempt_once(catalogue, &response, options) {
                Ok(Attempt::Steps(steps)) => break steps,
                Ok(Attempt::NoTools) => {
                    tracing::debug!(%run_id, "NO_TOOLS_SELECTED, returning empty results");
                    return Ok(IntegrationReport::completed(run_id, Vec::new()));
                }
                Err(error) if !error.is_retryable() => return Err(error),
                Err(error) => {
                    if !handler.should_retry(&error) {
                        handler.record_failure(error);
                        return Err(handler.limit_error());
                    }
                    if let Some(deadline) = options.deadline {
                        if Instant::now() >= deadline {
                            tracing::warn!(%run_id, "Deadline reached, aborting retry loop");
                            handler.record_failure(error);
                            return Err(handler.limit_error());
                        }
                    }
                    let hint = corrective_hint(&error);
                    handler.record_failure(error);
                    let prompt = handler.build_retry_prompt(&response, &hint);
                    response = match &self.reprompt {
                        Some(source) => LlmResponse::Text(
                            source
                                .reprompt(&prompt)
                                .await
                                .map_err(|e| IntegrationError::Reprompt(e.to_string()))?,
                        ),
                        None => LlmResponse::Text(prompt),
                    };
                }
            }
        };

        // Executing failures never loop back — they terminate the run.
        let registry = self.registry.read().await;
        let results = execute_steps(&registry, &steps).await?;
        tracing::debug!(%run_id, steps = results.len(), "Run complete");
        Ok(IntegrationReport::completed(run_id, results))
    }

    /// One pass of Classifying → Extracting → Parsing → VerifyingCoT →
    /// Validating. Never executes anything.
    fn attempt_once(
        &self,
        catalogue: &ToolCatalogue,
        response: &LlmResponse,
        options: &AdvanceOptions,
    ) -> Result<Attempt, IntegrationError> {
        let payload = match response {
            LlmResponse::Structured(value) => value.clone(),
            LlmResponse::Text(text) => match classifier::parse_document(text) {
                Some(value) => value,
                None if options.json_validation => {
                    return Err(IntegrationError::InvalidFormat(
                        "response is not a structured JSON document".into(),
                    ))
                }
                None => extract_fragment(text).ok_or_else(|| {
                    IntegrationError::InvalidFormat(
                        "no complete JSON fragment found in text".into(),
                    )
                })?,
            },
        };

        let directive = parse_directive(&payload)?;

        // The quality gate sits before schema validation: a well-formed but
        // under-justified directive must never reach execution.
        verify_chain_of_thought(&payload, &self.cot)?;

        match &directive {
            Directive::NoToolsSelected => {
                return if options.no_tools_selected {
                    Ok(Attempt::NoTools)
                } else {
                    Err(IntegrationError::InvalidFormat(
                        "NO_TOOLS_SELECTED is not permitted for this call".into(),
                    ))
                };
            }
            Directive::SelectedTools(steps)
                if steps.len() > 1 && !options.multi_stage_tools_select =>
            {
                return Err(IntegrationError::InvalidFormat(
                    "multi-step SELECTED_TOOLS is not permitted for this call".into(),
                ));
            }
            _ => {}
        }

        let steps = validate_directive(&directive, catalogue)?;
        Ok(Attempt::Steps(steps))
    }
}
