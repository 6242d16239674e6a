//! Krait runtime: hook execution and two-tier configuration layering for
//! agent tool pipelines. External command hooks gate tool calls before they
//! run, observe them after, and fire on lifecycle events; user-global and
//! project-local JSON settings merge into one effective ruleset.

pub mod config;
pub mod hooks;
pub mod pipeline;
pub mod tool;

pub use config::{
    ConfigScope, ConfigStore, HookDefinition, HookEntries, HookType, HooksConfig, HooksConfigView,
    MatcherGroup, Settings,
};
pub use hooks::{
    FailureKind, GateDecision, HookExecutionContext, HookOutcome, PolicyGate,
};
pub use pipeline::ToolPipeline;
pub use tool::Tool;

/// Initialize structured JSON logging.
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    fmt()
        .json()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
}
