use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PraxisConfig {
    pub retry: RetrySettings,
    pub chain_of_thought: CotSettings,
}

impl PraxisConfig {
    /// Load config from a TOML file, falling back to defaults for missing
    /// fields. After loading, env var overrides are applied.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config: PraxisConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Try to load from path; if the file doesn't exist, return defaults with
    /// env overrides.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!("Config file not found or invalid ({}), using defaults", e);
                let mut cfg = Self::default();
                cfg.apply_env_overrides();
                cfg
            }
        }
    }

    /// Apply environment variable overrides on top of file-based config.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("PRAXIS_MAX_ATTEMPTS") {
            if let Ok(n) = v.parse() {
                self.retry.max_attempts = n;
            }
        }
        if let Ok(v) = std::env::var("PRAXIS_COT_REQUIRED") {
            self.chain_of_thought.required = matches!(v.as_str(), "1" | "true" | "yes");
        }
        if let Ok(v) = std::env::var("PRAXIS_COT_MIN_WORDS") {
            if let Ok(n) = v.parse() {
                self.chain_of_thought.min_words = n;
            }
        }
    }
}

// ============================================================================
// Sub-configs
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Maximum pipeline attempts per `advance` call, including the first.
    pub max_attempts: u32,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CotSettings {
    /// Whether a missing reasoning field fails the gate. When false, only a
    /// present-but-thin field fails.
    pub required: bool,
    /// Minimum word count for a reasoning field to count as substantive.
    pub min_words: usize,
}

impl Default for CotSettings {
    fn default() -> Self {
        Self {
            required: false,
            min_words: 5,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
