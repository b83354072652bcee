//! The re-prompting transport seam.
//!
//! How a corrective prompt actually reaches a model is outside this crate.
//! Callers plug a transport in through this trait; without one, the
//! integrator re-enters the pipeline with the built prompt itself, which
//! keeps retry behavior deterministic and testable.

use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait Reprompt: Send + Sync {
    /// Send the corrective prompt back to the model and return its new
    /// response text. A transport error is fatal for the run.
    async fn reprompt(&self, prompt: &str) -> Result<String>;
}
