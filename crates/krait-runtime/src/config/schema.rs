use serde::{Deserialize, Serialize};
use std::fmt;

/// The only hook kind currently supported.
pub const COMMAND_HOOK_KIND: &str = "command";

/// Whole-file model for a `.krait/settings.json` at either scope.
/// Unknown keys are ignored so older binaries tolerate newer files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude_patterns: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub include_patterns: Vec<String>,

    #[serde(skip_serializing_if = "HooksConfig::is_empty")]
    pub hooks: HooksConfig,
}

/// Hook lists keyed by lifecycle point. Pre/PostToolUse are matcher-based,
/// the rest are flat lists run unconditionally for their event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HooksConfig {
    #[serde(rename = "PreToolUse", skip_serializing_if = "Vec::is_empty")]
    pub pre_tool_use: Vec<MatcherGroup>,

    #[serde(rename = "PostToolUse", skip_serializing_if = "Vec::is_empty")]
    pub post_tool_use: Vec<MatcherGroup>,

    #[serde(rename = "Notification", skip_serializing_if = "Vec::is_empty")]
    pub notification: Vec<HookDefinition>,

    #[serde(rename = "Stop", skip_serializing_if = "Vec::is_empty")]
    pub stop: Vec<HookDefinition>,

    #[serde(rename = "SubagentStop", skip_serializing_if = "Vec::is_empty")]
    pub subagent_stop: Vec<HookDefinition>,
}

impl HooksConfig {
    pub fn is_empty(&self) -> bool {
        self.pre_tool_use.is_empty()
            && self.post_tool_use.is_empty()
            && self.notification.is_empty()
            && self.stop.is_empty()
            && self.subagent_stop.is_empty()
    }

    /// Shape-aware view of one hook type: matcher groups or a flat list.
    pub fn entries(&self, kind: HookType) -> HookEntries<'_> {
        match kind {
            HookType::PreToolUse => HookEntries::Groups(&self.pre_tool_use),
            HookType::PostToolUse => HookEntries::Groups(&self.post_tool_use),
            HookType::Notification => HookEntries::Flat(&self.notification),
            HookType::Stop => HookEntries::Flat(&self.stop),
            HookType::SubagentStop => HookEntries::Flat(&self.subagent_stop),
        }
    }
}

/// The five recognized hook lifecycle points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookType {
    PreToolUse,
    PostToolUse,
    Notification,
    Stop,
    SubagentStop,
}

impl HookType {
    pub const ALL: [HookType; 5] = [
        HookType::PreToolUse,
        HookType::PostToolUse,
        HookType::Notification,
        HookType::Stop,
        HookType::SubagentStop,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HookType::PreToolUse => "PreToolUse",
            HookType::PostToolUse => "PostToolUse",
            HookType::Notification => "Notification",
            HookType::Stop => "Stop",
            HookType::SubagentStop => "SubagentStop",
        }
    }
}

impl fmt::Display for HookType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Borrowed view distinguishing matcher-based from flat hook types.
pub enum HookEntries<'a> {
    Groups(&'a [MatcherGroup]),
    Flat(&'a [HookDefinition]),
}

impl HookEntries<'_> {
    pub fn is_empty(&self) -> bool {
        match self {
            HookEntries::Groups(groups) => groups.is_empty(),
            HookEntries::Flat(defs) => defs.is_empty(),
        }
    }
}

/// A matcher string plus the hooks that run when it matches a tool name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatcherGroup {
    pub matcher: String,
    pub hooks: Vec<HookDefinition>,
}

impl MatcherGroup {
    pub fn new(matcher: impl Into<String>, hooks: Vec<HookDefinition>) -> Self {
        Self {
            matcher: matcher.into(),
            hooks,
        }
    }
}

/// One external command hook as persisted in the settings file.
///
/// `kind` stays a plain string so an unrecognized value fails that hook at
/// validation time instead of failing the whole file parse. Timeout is
/// milliseconds; range-checked before execution, not at parse time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookDefinition {
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default)]
    pub command: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocking: Option<bool>,
}

impl HookDefinition {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            kind: COMMAND_HOOK_KIND.to_string(),
            command: command.into(),
            timeout: None,
            blocking: None,
        }
    }

    pub fn with_timeout(mut self, timeout_ms: i64) -> Self {
        self.timeout = Some(timeout_ms);
        self
    }

    pub fn with_blocking(mut self, blocking: bool) -> Self {
        self.blocking = Some(blocking);
        self
    }

    pub fn is_blocking(&self) -> bool {
        self.blocking.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hooks_config_deserializes_wire_format() {
        let raw = json!({
            "PreToolUse": [
                {
                    "matcher": "execute_command",
                    "hooks": [
                        {"type": "command", "command": "echo pre", "blocking": true, "timeout": 1000}
                    ]
                }
            ],
            "Stop": [
                {"type": "command", "command": "echo done"}
            ]
        });

        let config: HooksConfig = serde_json::from_value(raw).unwrap();
        assert_eq!(config.pre_tool_use.len(), 1);
        assert_eq!(config.pre_tool_use[0].matcher, "execute_command");
        assert_eq!(config.pre_tool_use[0].hooks[0].command, "echo pre");
        assert_eq!(config.pre_tool_use[0].hooks[0].timeout, Some(1000));
        assert!(config.pre_tool_use[0].hooks[0].is_blocking());
        assert_eq!(config.stop.len(), 1);
        assert!(config.post_tool_use.is_empty());
        assert!(!config.is_empty());
    }

    #[test]
    fn test_hooks_config_serializes_pascal_case_keys() {
        let config = HooksConfig {
            pre_tool_use: vec![MatcherGroup::new(
                "shell",
                vec![HookDefinition::new("echo hi")],
            )],
            subagent_stop: vec![HookDefinition::new("echo bye")],
            ..Default::default()
        };

        let value = serde_json::to_value(&config).unwrap();
        assert!(value.get("PreToolUse").is_some());
        assert!(value.get("SubagentStop").is_some());
        // Empty lists are omitted entirely
        assert!(value.get("PostToolUse").is_none());
        assert_eq!(value["PreToolUse"][0]["hooks"][0]["type"], "command");
    }

    #[test]
    fn test_settings_ignores_unknown_keys() {
        let raw = json!({
            "defaultModel": "some-model",
            "futureSetting": {"nested": true}
        });

        let settings: Settings = serde_json::from_value(raw).unwrap();
        assert_eq!(settings.default_model.as_deref(), Some("some-model"));
        assert!(settings.hooks.is_empty());
    }

    #[test]
    fn test_settings_empty_serializes_to_empty_object() {
        let value = serde_json::to_value(Settings::default()).unwrap();
        assert_eq!(value, json!({}));
    }

    #[test]
    fn test_entries_view_matches_shape() {
        let config = HooksConfig {
            notification: vec![HookDefinition::new("echo ping")],
            ..Default::default()
        };

        assert!(matches!(
            config.entries(HookType::PreToolUse),
            HookEntries::Groups(groups) if groups.is_empty()
        ));
        assert!(matches!(
            config.entries(HookType::Notification),
            HookEntries::Flat(defs) if defs.len() == 1
        ));
        for kind in HookType::ALL {
            // Every hook type resolves to exactly one of the two shapes
            let _ = config.entries(kind);
        }
    }
}
