//! Step execution: run validated steps against the registry, in order.
//!
//! Every adapter is resolved before any step runs — a chain with a missing
//! link must not start. Steps then execute strictly in sequence; the first
//! erroring outcome halts the batch. Execution is at-most-once per step:
//! there is no rollback and no re-run.

use crate::registry::ToolRegistry;
use crate::validator::ValidatedStep;
use praxis_core::{IntegrationError, StepOutcome, ToolAdapter};
use std::sync::Arc;

pub async fn execute_steps(
    registry: &ToolRegistry,
    steps: &[ValidatedStep],
) -> Result<Vec<StepOutcome>, IntegrationError> {
    let mut resolved: Vec<(&ValidatedStep, Arc<dyn ToolAdapter>)> =
        Vec::with_capacity(steps.len());
    for step in steps {
        let adapter = registry.resolve(&step.step().tool_name)?;
        resolved.push((step, adapter));
    }

    let mut results = Vec::with_capacity(steps.len());
    for (step, adapter) in resolved {
        let def = step.step();
        tracing::debug!("Executing step '{}' via tool '{}'", def.label(), def.tool_name);

        let outcome = adapter.run(&def.parameters).await;
        if outcome.is_error {
            // Adapter failures (including adapter-side timeouts) are fatal
            // for the batch; remaining steps never start.
            return Err(IntegrationError::AdapterExecution {
                tool: def.tool_name.clone(),
                message: outcome.content,
            });
        }
        results.push(StepOutcome {
            step_name: def.step_name.clone(),
            tool_name: def.tool_name.clone(),
            outcome,
        });
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::validate_directive;
    use praxis_core::{Directive, ParameterSpec, StepDef, ToolCatalogue, ToolOutcome};
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Records invocation order into a shared log; fails when told to.
    struct RecordingAdapter {
        tool_name: String,
        fail: bool,
        calls: Arc<AtomicUsize>,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait::async_trait]
    impl ToolAdapter for RecordingAdapter {
        fn name(&self) -> &str {
            &self.tool_name
        }
        fn description(&self) -> &str {
            "test adapter"
        }
        fn parameters(&self) -> Vec<ParameterSpec> {
            vec![]
        }
        async fn run(&self, _parameters: &serde_json::Map<String, Value>) -> ToolOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.log.lock().unwrap().push(self.tool_name.clone());
            if self.fail {
                ToolOutcome::permanent_error(format!("{} blew up", self.tool_name))
            } else {
                ToolOutcome::ok(format!("{} done", self.tool_name))
            }
        }
    }

    struct Fixture {
        registry: ToolRegistry,
        log: Arc<Mutex<Vec<String>>>,
        calls: std::collections::HashMap<String, Arc<AtomicUsize>>,
    }

    impl Fixture {
        fn new(tools: &[(&str, bool)]) -> Self {
            let log = Arc::new(Mutex::new(Vec::new()));
            let mut registry = ToolRegistry::new();
            let mut calls = std::collections::HashMap::new();
            for (name, fail) in tools {
                let counter = Arc::new(AtomicUsize::new(0));
                calls.insert(name.to_string(), counter.clone());
                registry.register(Arc::new(RecordingAdapter {
                    tool_name: name.to_string(),
                    fail: *fail,
                    calls: counter,
                    log: log.clone(),
                }));
            }
            Self { registry, log, calls }
        }

        fn steps(&self, names: &[&str]) -> Vec<ValidatedStep> {
            let mut catalogue = ToolCatalogue::new();
            for name in names {
                catalogue.declare(name, vec![]);
            }
            let directive = Directive::SelectedTools(
                names
                    .iter()
                    .map(|n| StepDef::new(n, serde_json::Map::new()))
                    .collect(),
            );
            validate_directive(&directive, &catalogue).unwrap()
        }
    }

    #[tokio::test]
    async fn test_outcomes_preserve_step_order() {
        let fixture = Fixture::new(&[("tool1", false), ("tool2", false)]);
        let steps = fixture.steps(&["tool2", "tool1"]);

        let results = execute_steps(&fixture.registry, &steps).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].tool_name, "tool2");
        assert_eq!(results[1].tool_name, "tool1");
        assert_eq!(*fixture.log.lock().unwrap(), vec!["tool2", "tool1"]);
    }

    #[tokio::test]
    async fn test_missing_link_fails_before_anything_runs() {
        let fixture = Fixture::new(&[("tool1", false)]);
        // tool2 is validated against a catalogue but never registered.
        let steps = fixture.steps(&["tool1", "tool2"]);

        let err = execute_steps(&fixture.registry, &steps).await.unwrap_err();
        assert!(matches!(err, IntegrationError::ToolNotFound(name) if name == "tool2"));
        // Pre-resolution means tool1 was never invoked.
        assert_eq!(fixture.calls["tool1"].load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_first_failure_halts_remaining_steps() {
        let fixture = Fixture::new(&[("tool1", false), ("tool2", true), ("tool3", false)]);
        let steps = fixture.steps(&["tool1", "tool2", "tool3"]);

        let err = execute_steps(&fixture.registry, &steps).await.unwrap_err();
        match err {
            IntegrationError::AdapterExecution { tool, message } => {
                assert_eq!(tool, "tool2");
                assert!(message.contains("blew up"));
            }
            other => panic!("Expected AdapterExecution, got {:?}", other),
        }
        // At-most-once: tool1 ran once, tool3 never started.
        assert_eq!(fixture.calls["tool1"].load(Ordering::SeqCst), 1);
        assert_eq!(fixture.calls["tool2"].load(Ordering::SeqCst), 1);
        assert_eq!(fixture.calls["tool3"].load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_step_sequence() {
        let fixture = Fixture::new(&[]);
        let results = execute_steps(&fixture.registry, &[]).await.unwrap();
        assert!(results.is_empty());
    }
}
