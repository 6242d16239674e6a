//! Tool dispatch with pre/post hook gating.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use dashmap::DashMap;
use serde_json::Value;
use tracing::info;

use crate::hooks::{GateDecision, PolicyGate};
use crate::tool::Tool;

const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(60);

/// Registry plus the policy gate every tool call passes through: the gate
/// is consulted before any tool runs, and notified after a successful run.
pub struct ToolPipeline {
    tools: DashMap<String, Arc<dyn Tool>>,
    gate: Arc<PolicyGate>,
    default_timeout: Duration,
}

impl ToolPipeline {
    pub fn new(gate: Arc<PolicyGate>) -> Self {
        Self {
            tools: DashMap::new(),
            gate,
            default_timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn register_tool(&self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn gate(&self) -> &PolicyGate {
        &self.gate
    }

    /// Run one tool call through the gate. A blocked call aborts with the
    /// blocking hook's reason and the tool never executes.
    pub async fn run_tool(&self, name: &str, args: Value) -> Result<Value> {
        if let GateDecision::Block { reason } =
            self.gate.check_before_tool(name, args.clone()).await
        {
            anyhow::bail!("Tool '{name}' blocked by hook: {reason}");
        }

        let tool = self
            .tools
            .get(name)
            .map(|entry| entry.value().clone())
            .with_context(|| format!("Tool '{name}' not registered"))?;

        info!(tool = name, "Executing tool");
        let result = tokio::time::timeout(self.default_timeout, tool.execute(args.clone()))
            .await
            .context("Tool execution timeout")?
            .context("Tool execution failed")?;

        self.gate.notify_after_tool(name, args, result.clone()).await;
        Ok(result)
    }
}
