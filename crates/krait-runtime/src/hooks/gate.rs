//! The pre-tool authorization gate and lifecycle hook runners.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use anyhow::Result;
use serde_json::Value;
use tracing::warn;

use super::context::HookExecutionContext;
use super::executor::{self, HookOutcome};
use super::matcher::CompiledMatcher;
use crate::config::{
    ConfigScope, ConfigStore, HookDefinition, HookType, HooksConfig, MatcherGroup,
};

/// Verdict of a pre-tool check. Blocking carries the offending hook's exact
/// captured text so the operator can diagnose the failing check.
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    Allow,
    Block { reason: String },
}

impl GateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GateDecision::Allow)
    }

    pub fn blocked_reason(&self) -> Option<&str> {
        match self {
            GateDecision::Allow => None,
            GateDecision::Block { reason } => Some(reason),
        }
    }
}

struct CompiledGroup {
    matcher: CompiledMatcher,
    hooks: Vec<HookDefinition>,
}

impl CompiledGroup {
    fn compile(group: &MatcherGroup) -> Self {
        Self {
            matcher: CompiledMatcher::compile(&group.matcher),
            hooks: group.hooks.clone(),
        }
    }
}

/// One immutable compilation of the merged config. `reload()` swaps the
/// whole Arc, so concurrent checks observe either the old or the new
/// structure, never a mix.
struct CompiledHooks {
    pre_tool_use: Vec<CompiledGroup>,
    post_tool_use: Vec<CompiledGroup>,
    global: HooksConfig,
    local: HooksConfig,
    merged: HooksConfig,
}

impl CompiledHooks {
    fn build(store: &ConfigStore) -> Self {
        let view = store.hooks_config();
        let local = if store.allow_local_hooks() {
            view.local
        } else {
            HooksConfig::default()
        };
        Self {
            pre_tool_use: view
                .merged
                .pre_tool_use
                .iter()
                .map(CompiledGroup::compile)
                .collect(),
            post_tool_use: view
                .merged
                .post_tool_use
                .iter()
                .map(CompiledGroup::compile)
                .collect(),
            global: view.global,
            local,
            merged: view.merged,
        }
    }
}

/// Gates tool calls through user-configured command hooks.
///
/// Constructed once and passed explicitly to whatever dispatches tool
/// calls. The enabled flag is process-scoped and independent of file
/// state; the local-hooks security switch is fixed at construction.
pub struct PolicyGate {
    store: Arc<ConfigStore>,
    enabled: AtomicBool,
    compiled: RwLock<Arc<CompiledHooks>>,
}

impl PolicyGate {
    pub fn new(store: Arc<ConfigStore>) -> Self {
        let compiled = Arc::new(CompiledHooks::build(&store));
        Self {
            store,
            enabled: AtomicBool::new(true),
            compiled: RwLock::new(compiled),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Re-read the store and swap in a freshly compiled snapshot.
    pub fn reload(&self) {
        self.store.invalidate();
        let rebuilt = Arc::new(CompiledHooks::build(&self.store));
        *self.compiled.write().unwrap_or_else(|e| e.into_inner()) = rebuilt;
    }

    fn snapshot(&self) -> Arc<CompiledHooks> {
        self.compiled.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Evaluate PreToolUse hooks for a tool call. Matching groups run in
    /// merge order (global before local) and each group's hooks run
    /// sequentially, each awaited before the next starts — later hooks may
    /// assume earlier hooks' side effects happened, so this loop must never
    /// be parallelized.
    pub async fn check_before_tool(&self, tool_name: &str, tool_args: Value) -> GateDecision {
        if !self.is_enabled() {
            return GateDecision::Allow;
        }
        let compiled = self.snapshot();
        if compiled.pre_tool_use.is_empty() {
            return GateDecision::Allow;
        }

        let context = HookExecutionContext::for_tool(tool_name, tool_args);

        for group in &compiled.pre_tool_use {
            if !group.matcher.matches(tool_name) {
                continue;
            }
            for hook in &group.hooks {
                match executor::execute(hook, &context).await {
                    HookOutcome::Failure { error, .. } if hook.is_blocking() => {
                        warn!(tool = tool_name, reason = %error, "Tool call blocked by hook");
                        return GateDecision::Block { reason: error };
                    }
                    HookOutcome::Failure { error, .. } => {
                        warn!(tool = tool_name, error = %error, "Non-blocking hook failed");
                    }
                    HookOutcome::Success { output } => {
                        // A hook can veto explicitly, blocking or not, by
                        // printing a line that is exactly "block".
                        if output_requests_block(&output) {
                            warn!(tool = tool_name, "Tool call vetoed by hook output");
                            return GateDecision::Block { reason: output };
                        }
                    }
                }
            }
        }

        GateDecision::Allow
    }

    /// Run PostToolUse hooks. A completed action cannot be vetoed
    /// retroactively, so outcomes are logged and swallowed.
    pub async fn notify_after_tool(&self, tool_name: &str, tool_args: Value, tool_result: Value) {
        if !self.is_enabled() {
            return;
        }
        let compiled = self.snapshot();
        if compiled.post_tool_use.is_empty() {
            return;
        }

        let context = HookExecutionContext::for_tool_result(tool_name, tool_args, tool_result);
        for group in &compiled.post_tool_use {
            if group.matcher.matches(tool_name) {
                run_sequence(&group.hooks, &context, HookType::PostToolUse).await;
            }
        }
    }

    pub async fn notify(&self, message: &str) {
        if !self.is_enabled() {
            return;
        }
        let compiled = self.snapshot();
        if compiled.merged.notification.is_empty() {
            return;
        }
        let context = HookExecutionContext::for_message(message);
        run_sequence(&compiled.merged.notification, &context, HookType::Notification).await;
    }

    pub async fn on_session_stop(&self) {
        if !self.is_enabled() {
            return;
        }
        let compiled = self.snapshot();
        if compiled.merged.stop.is_empty() {
            return;
        }
        let context = HookExecutionContext::for_session_stop();
        run_sequence(&compiled.merged.stop, &context, HookType::Stop).await;
    }

    pub async fn on_subagent_stop(&self, agent_name: &str) {
        if !self.is_enabled() {
            return;
        }
        let compiled = self.snapshot();
        if compiled.merged.subagent_stop.is_empty() {
            return;
        }
        let context = HookExecutionContext::for_subagent(agent_name);
        run_sequence(&compiled.merged.subagent_stop, &context, HookType::SubagentStop).await;
    }

    /// The merged configuration currently in effect.
    pub fn active_hooks(&self) -> HooksConfig {
        self.snapshot().merged.clone()
    }

    pub fn global_hooks(&self) -> HooksConfig {
        self.snapshot().global.clone()
    }

    /// Local hooks as loaded, or empty when the security switch disabled
    /// them.
    pub fn local_hooks(&self) -> HooksConfig {
        self.snapshot().local.clone()
    }

    /// Persist a hooks config to one scope, then reload the merged view.
    pub fn update_hooks(&self, hooks: HooksConfig, scope: ConfigScope) -> Result<()> {
        self.store.persist_hooks(hooks, scope)?;
        self.reload();
        Ok(())
    }
}

/// Run a flat hook list sequentially, logging failures without propagating.
async fn run_sequence(hooks: &[HookDefinition], context: &HookExecutionContext, event: HookType) {
    for hook in hooks {
        if let HookOutcome::Failure { error, .. } = executor::execute(hook, context).await {
            warn!(event = %event, command = %hook.command, error = %error, "Hook failed");
        }
    }
}

/// True when the trimmed output contains a line that is exactly `block`,
/// any letter case.
fn output_requests_block(output: &str) -> bool {
    output
        .trim()
        .lines()
        .any(|line| line.trim_end_matches('\r').eq_ignore_ascii_case("block"))
}
