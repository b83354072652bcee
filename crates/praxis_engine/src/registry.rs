//! Tool registry: name → adapter bindings, with lazy factory instantiation.
//!
//! An entry is either a pre-built `Instance` or a `Factory` invoked on
//! resolution, dispatched by an explicit match. Registration overwrites are
//! logged and non-fatal. A factory that fails to instantiate surfaces as a
//! resolution failure and leaves every other binding intact.

use praxis_core::{IntegrationError, ToolAdapter, ToolCatalogue};
use std::collections::HashMap;
use std::sync::Arc;

/// Constructor for lazily-instantiated adapters.
pub type AdapterFactory = Box<dyn Fn() -> anyhow::Result<Arc<dyn ToolAdapter>> + Send + Sync>;

enum RegistryEntry {
    Instance(Arc<dyn ToolAdapter>),
    Factory(AdapterFactory),
}

#[derive(Default)]
pub struct ToolRegistry {
    entries: HashMap<String, RegistryEntry>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pre-built adapter under its own name. Overwrites any
    /// existing binding with the same name.
    pub fn register(&mut self, adapter: Arc<dyn ToolAdapter>) {
        let name = adapter.name().to_string();
        if self
            .entries
            .insert(name.clone(), RegistryEntry::Instance(adapter))
            .is_some()
        {
            tracing::warn!("Tool '{}' was already registered, overwriting", name);
        } else {
            tracing::debug!("Registered tool: {}", name);
        }
    }

    /// Register a factory, instantiated anew on each resolution.
    pub fn register_factory(&mut self, name: &str, factory: AdapterFactory) {
        if self
            .entries
            .insert(name.to_string(), RegistryEntry::Factory(factory))
            .is_some()
        {
            tracing::warn!("Tool '{}' was already registered, overwriting", name);
        } else {
            tracing::debug!("Registered tool factory: {}", name);
        }
    }

    /// Remove a binding. Returns whether anything was removed.
    pub fn unregister(&mut self, name: &str) -> bool {
        let removed = self.entries.remove(name).is_some();
        if removed {
            tracing::debug!("Unregistered tool: {}", name);
        }
        removed
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Resolve a name to a runnable adapter. Factories construct a fresh
    /// adapter per resolution; a factory error is a resolution failure, not
    /// a registry corruption.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn ToolAdapter>, IntegrationError> {
        match self.entries.get(name) {
            None => Err(IntegrationError::ToolNotFound(name.to_string())),
            Some(RegistryEntry::Instance(adapter)) => Ok(adapter.clone()),
            Some(RegistryEntry::Factory(factory)) => factory().map_err(|e| {
                tracing::error!("Factory for tool '{}' failed to instantiate: {}", name, e);
                IntegrationError::ToolNotFound(name.to_string())
            }),
        }
    }

    /// Names of all registered tools, sorted for deterministic output.
    pub fn registered_tools(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    /// Assemble a catalogue from the registered adapters' declared specs.
    /// Best-effort for factories: one that fails to instantiate is skipped
    /// with a warning rather than poisoning the whole catalogue.
    pub fn catalogue(&self) -> ToolCatalogue {
        let mut catalogue = ToolCatalogue::new();
        for (name, entry) in &self.entries {
            match entry {
                RegistryEntry::Instance(adapter) => {
                    catalogue.declare(name, adapter.parameters());
                }
                RegistryEntry::Factory(factory) => match factory() {
                    Ok(adapter) => {
                        catalogue.declare(name, adapter.parameters());
                    }
                    Err(e) => {
                        tracing::warn!("Skipping tool '{}' in catalogue: {}", name, e);
                    }
                },
            }
        }
        catalogue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use praxis_core::{ParamType, ParameterSpec, ToolOutcome};
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct EchoAdapter {
        tool_name: String,
    }

    #[async_trait::async_trait]
    impl ToolAdapter for EchoAdapter {
        fn name(&self) -> &str {
            &self.tool_name
        }
        fn description(&self) -> &str {
            "echoes its parameters"
        }
        fn parameters(&self) -> Vec<ParameterSpec> {
            vec![ParameterSpec::required("text", ParamType::Str)]
        }
        async fn run(&self, parameters: &serde_json::Map<String, Value>) -> ToolOutcome {
            ToolOutcome::ok(format!("{:?}", parameters))
        }
    }

    fn echo(name: &str) -> Arc<dyn ToolAdapter> {
        Arc::new(EchoAdapter {
            tool_name: name.to_string(),
        })
    }

    #[test]
    fn test_register_and_resolve_instance_identity() {
        let mut registry = ToolRegistry::new();
        registry.register(echo("tool1"));

        let a = registry.resolve("tool1").unwrap();
        let b = registry.resolve("tool1").unwrap();
        // Instance registrations resolve to the same adapter.
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_resolve_missing_tool() {
        let registry = ToolRegistry::new();
        let err = registry.resolve("ghost").err().unwrap();
        assert!(matches!(err, IntegrationError::ToolNotFound(name) if name == "ghost"));
    }

    #[test]
    fn test_reregistration_overwrites() {
        let mut registry = ToolRegistry::new();
        registry.register(echo("tool1"));
        let first = registry.resolve("tool1").unwrap();

        registry.register(echo("tool1"));
        let second = registry.resolve("tool1").unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_factory_is_lazy_and_fresh_per_resolution() {
        let built = Arc::new(AtomicUsize::new(0));
        let counter = built.clone();

        let mut registry = ToolRegistry::new();
        registry.register_factory(
            "lazy",
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(echo("lazy"))
            }),
        );
        // Nothing is built until the first resolve.
        assert_eq!(built.load(Ordering::SeqCst), 0);

        let a = registry.resolve("lazy").unwrap();
        let b = registry.resolve("lazy").unwrap();
        assert_eq!(built.load(Ordering::SeqCst), 2);
        // Fresh instances, behaviorally equivalent.
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a.name(), b.name());
    }

    #[test]
    fn test_factory_failure_does_not_corrupt_registry() {
        let mut registry = ToolRegistry::new();
        registry.register_factory("broken", Box::new(|| anyhow::bail!("no backend")));
        registry.register(echo("tool1"));

        assert!(matches!(
            registry.resolve("broken").err().unwrap(),
            IntegrationError::ToolNotFound(_)
        ));
        // Other bindings are unaffected, and the broken one can retry.
        assert!(registry.resolve("tool1").is_ok());
        assert!(registry.resolve("broken").is_err());
    }

    #[test]
    fn test_registered_tools_sorted() {
        let mut registry = ToolRegistry::new();
        registry.register(echo("zeta"));
        registry.register(echo("alpha"));
        assert_eq!(registry.registered_tools(), vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_unregister() {
        let mut registry = ToolRegistry::new();
        registry.register(echo("tool1"));
        assert!(registry.unregister("tool1"));
        assert!(!registry.unregister("tool1"));
        assert!(registry.resolve("tool1").is_err());
    }

    #[test]
    fn test_catalogue_from_registered_adapters() {
        let mut registry = ToolRegistry::new();
        registry.register(echo("tool1"));
        registry.register_factory("broken", Box::new(|| anyhow::bail!("no backend")));

        let catalogue = registry.catalogue();
        assert!(catalogue.contains("tool1"));
        assert_eq!(catalogue.get("tool1").unwrap()[0].name, "text");
        // Failing factory is skipped, not fatal.
        assert!(!catalogue.contains("broken"));
    }
}
