//! Two-tier merge: project-local values override user-global ones field by
//! field, while hook lists concatenate with global entries first.

use super::schema::{HooksConfig, Settings};

/// Merge global and local settings into the effective view.
///
/// Scalars: local wins when present. Pattern lists: local wins when
/// non-empty. Hooks: per-type concatenation via [`merge_hooks`]; when
/// `allow_local_hooks` is false the local file contributes no hooks at all,
/// though its other fields still merge normally.
pub fn merge_settings(global: &Settings, local: &Settings, allow_local_hooks: bool) -> Settings {
    let empty_hooks = HooksConfig::default();
    let local_hooks = if allow_local_hooks {
        &local.hooks
    } else {
        &empty_hooks
    };

    Settings {
        api_key: local.api_key.clone().or_else(|| global.api_key.clone()),
        default_model: local
            .default_model
            .clone()
            .or_else(|| global.default_model.clone()),
        temperature: local.temperature.or(global.temperature),
        system_message: local
            .system_message
            .clone()
            .or_else(|| global.system_message.clone()),
        base_url: local.base_url.clone().or_else(|| global.base_url.clone()),
        exclude_patterns: pick_patterns(&global.exclude_patterns, &local.exclude_patterns),
        include_patterns: pick_patterns(&global.include_patterns, &local.include_patterns),
        hooks: merge_hooks(&global.hooks, local_hooks),
    }
}

/// Concatenate hook lists per hook type: all global entries precede all
/// local entries, order preserved, nothing deduplicated. Flat hook types
/// (Notification/Stop/SubagentStop) get the same treatment as matcher-based
/// ones, so both scopes' hooks run.
pub fn merge_hooks(global: &HooksConfig, local: &HooksConfig) -> HooksConfig {
    HooksConfig {
        pre_tool_use: concat(&global.pre_tool_use, &local.pre_tool_use),
        post_tool_use: concat(&global.post_tool_use, &local.post_tool_use),
        notification: concat(&global.notification, &local.notification),
        stop: concat(&global.stop, &local.stop),
        subagent_stop: concat(&global.subagent_stop, &local.subagent_stop),
    }
}

fn pick_patterns(global: &[String], local: &[String]) -> Vec<String> {
    if local.is_empty() {
        global.to_vec()
    } else {
        local.to_vec()
    }
}

fn concat<T: Clone>(global: &[T], local: &[T]) -> Vec<T> {
    let mut merged = Vec::with_capacity(global.len() + local.len());
    merged.extend_from_slice(global);
    merged.extend_from_slice(local);
    merged
}
