//! Hook engine: compiled matchers, command execution, and the policy gate.

pub mod context;
pub mod executor;
pub mod gate;
pub mod matcher;

pub use context::HookExecutionContext;
pub use executor::{FailureKind, HookOutcome, DEFAULT_TIMEOUT_MS, MAX_TIMEOUT_MS};
pub use gate::{GateDecision, PolicyGate};
pub use matcher::CompiledMatcher;
