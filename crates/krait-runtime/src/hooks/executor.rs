//! Runs a single command hook in a shell subprocess with a hard deadline.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

use super::context::HookExecutionContext;
use crate::config::{HookDefinition, COMMAND_HOOK_KIND};

/// Deadline applied when a definition does not set its own timeout.
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;
/// Largest timeout a definition may configure, in milliseconds.
pub const MAX_TIMEOUT_MS: i64 = 60_000;

/// Why a hook failed. Timeouts stay distinguishable from plain non-zero
/// exits so callers can report them differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The definition was rejected before any process was spawned.
    Validation,
    /// The subprocess could not be spawned or exited non-zero.
    Execution,
    /// The subprocess outlived its deadline and was force-terminated.
    Timeout,
}

/// Result of running one hook. Success carries combined output, failure
/// carries the error text surfaced to the operator when the hook blocks.
#[derive(Debug, Clone, PartialEq)]
pub enum HookOutcome {
    Success { output: String },
    Failure { kind: FailureKind, error: String },
}

impl HookOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, HookOutcome::Success { .. })
    }

    pub fn output(&self) -> Option<&str> {
        match self {
            HookOutcome::Success { output } => Some(output),
            HookOutcome::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            HookOutcome::Success { .. } => None,
            HookOutcome::Failure { error, .. } => Some(error),
        }
    }
}

/// Reject definitions that must never reach a shell: wrong kind, blank
/// command, or a timeout outside `(0, MAX_TIMEOUT_MS]`.
pub fn validate(def: &HookDefinition) -> Result<(), String> {
    if def.kind != COMMAND_HOOK_KIND {
        return Err(format!("unsupported hook type '{}'", def.kind));
    }
    if def.command.trim().is_empty() {
        return Err("hook command is empty".to_string());
    }
    if let Some(timeout) = def.timeout {
        if timeout <= 0 || timeout > MAX_TIMEOUT_MS {
            return Err(format!(
                "hook timeout {timeout}ms outside (0, {MAX_TIMEOUT_MS}ms]"
            ));
        }
    }
    Ok(())
}

/// Validate, then run `def.command` under `sh -c` with the hook environment
/// overlay. The child is killed when the deadline passes.
pub async fn execute(def: &HookDefinition, context: &HookExecutionContext) -> HookOutcome {
    if let Err(reason) = validate(def) {
        return HookOutcome::Failure {
            kind: FailureKind::Validation,
            error: format!("Invalid hook configuration: {reason}"),
        };
    }

    let context_json = match serde_json::to_string(context) {
        Ok(json) => json,
        Err(e) => {
            return HookOutcome::Failure {
                kind: FailureKind::Execution,
                error: format!("Failed to encode hook context: {e}"),
            };
        }
    };
    let hook_type = if context.tool_name.is_some() {
        "tool"
    } else {
        "event"
    };
    let timeout_ms = def.timeout.map(|t| t as u64).unwrap_or(DEFAULT_TIMEOUT_MS);

    debug!(command = %def.command, hook_type, timeout_ms, "Executing hook");

    let child = Command::new("sh")
        .arg("-c")
        .arg(&def.command)
        .env("HOOK_TYPE", hook_type)
        .env("HOOK_TOOL_NAME", context.tool_name.as_deref().unwrap_or(""))
        .env("HOOK_TIMESTAMP", &context.timestamp)
        .env("HOOK_CONTEXT", &context_json)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn();

    let child = match child {
        Ok(child) => child,
        Err(e) => {
            return HookOutcome::Failure {
                kind: FailureKind::Execution,
                error: format!("Failed to spawn hook: {e}"),
            };
        }
    };

    let deadline = Duration::from_millis(timeout_ms);
    let output = match tokio::time::timeout(deadline, child.wait_with_output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return HookOutcome::Failure {
                kind: FailureKind::Execution,
                error: format!("Failed to collect hook output: {e}"),
            };
        }
        // The elapsed branch drops the child, which kills it (kill_on_drop)
        Err(_) => {
            return HookOutcome::Failure {
                kind: FailureKind::Timeout,
                error: format!("Hook timed out after {timeout_ms}ms"),
            };
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr);

    if output.status.success() {
        let mut combined = stdout;
        if !stderr.is_empty() {
            combined.push_str("\nstderr: ");
            combined.push_str(&stderr);
        }
        HookOutcome::Success { output: combined }
    } else {
        let error = if stderr.trim().is_empty() {
            format!("Hook exited with {}", output.status)
        } else {
            stderr.to_string()
        };
        HookOutcome::Failure {
            kind: FailureKind::Execution,
            error,
        }
    }
}
