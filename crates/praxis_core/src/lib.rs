pub mod config;
pub mod error;
pub mod tools;

pub use config::PraxisConfig;
pub use error::{CotFailure, IntegrationError, SchemaViolation};
pub use tools::{
    Directive, IntegrationReport, ParamType, ParameterSpec, StepDef, StepOutcome, ToolAdapter,
    ToolCatalogue, ToolErrorKind, ToolOutcome,
};
