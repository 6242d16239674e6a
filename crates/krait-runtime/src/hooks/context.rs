use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

/// Snapshot of the event that triggered a hook, handed to the subprocess
/// whole as `HOOK_CONTEXT`. Immutable once constructed; the timestamp is
/// always set at construction time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookExecutionContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_args: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    pub timestamp: String,
}

impl HookExecutionContext {
    fn stamped() -> Self {
        Self {
            tool_name: None,
            tool_args: None,
            tool_result: None,
            message: None,
            agent_name: None,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    pub fn for_tool(tool_name: &str, tool_args: Value) -> Self {
        Self {
            tool_name: Some(tool_name.to_string()),
            tool_args: Some(tool_args),
            ..Self::stamped()
        }
    }

    pub fn for_tool_result(tool_name: &str, tool_args: Value, tool_result: Value) -> Self {
        Self {
            tool_name: Some(tool_name.to_string()),
            tool_args: Some(tool_args),
            tool_result: Some(tool_result),
            ..Self::stamped()
        }
    }

    pub fn for_message(message: &str) -> Self {
        Self {
            message: Some(message.to_string()),
            ..Self::stamped()
        }
    }

    pub fn for_session_stop() -> Self {
        Self::stamped()
    }

    pub fn for_subagent(agent_name: &str) -> Self {
        Self {
            agent_name: Some(agent_name.to_string()),
            ..Self::stamped()
        }
    }
}
