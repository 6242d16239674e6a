//! Hooks management: list by scope, seed a starter config, show an example.

use std::sync::Arc;

use anyhow::{Context, Result};

use krait_runtime::{
    ConfigScope, ConfigStore, HookDefinition, HookEntries, HookType, HooksConfig, MatcherGroup,
    PolicyGate,
};

pub fn run_list(store: Arc<ConfigStore>, show_source: bool) -> Result<()> {
    let gate = PolicyGate::new(store);
    let global = gate.global_hooks();
    let local = gate.local_hooks();
    let merged = gate.active_hooks();

    if merged.is_empty() && global.is_empty() && local.is_empty() {
        println!("No hooks configured");
        println!(
            "Run \"keeper hooks init\" for global hooks or \"keeper hooks init --local\" for project-specific hooks"
        );
        return Ok(());
    }

    if show_source && !global.is_empty() {
        println!("Global User Hooks (~/.krait/settings.json):");
        println!("{}", "─".repeat(45));
        print!("{}", format_hooks(&global));
        println!();
    }
    if show_source && !local.is_empty() {
        println!("Local Project Hooks (.krait/settings.json):");
        println!("{}", "─".repeat(45));
        print!("{}", format_hooks(&local));
        println!();
    }

    if show_source {
        println!("Merged Configuration (active):");
    } else {
        println!("Configured Hooks:");
    }
    println!("{}", "─".repeat(40));
    print!("{}", format_hooks(&merged));
    Ok(())
}

pub fn run_init(store: &ConfigStore, local: bool) -> Result<()> {
    let scope = if local {
        ConfigScope::Local
    } else {
        ConfigScope::Global
    };
    store.persist_hooks(starter_hooks(local), scope)?;

    println!("Hooks configuration initialized with examples");
    println!(
        "Edit {} to customize hooks",
        store.scope_path(scope).display()
    );
    if local {
        println!();
        println!("Note: the local settings file is kept in .gitignore");
    }
    Ok(())
}

pub fn run_example() -> Result<()> {
    let json = serde_json::to_string_pretty(&example_hooks())
        .context("Failed to encode example config")?;
    println!("Example Hooks Configuration:");
    println!("{}", "─".repeat(40));
    println!("{json}");
    println!();
    println!("Add this to your ~/.krait/settings.json under the \"hooks\" key");
    Ok(())
}

fn format_hooks(hooks: &HooksConfig) -> String {
    let mut out = String::new();
    for kind in HookType::ALL {
        let entries = hooks.entries(kind);
        if entries.is_empty() {
            continue;
        }
        out.push_str(&format!("\n{kind}:\n"));
        match entries {
            HookEntries::Groups(groups) => {
                for group in groups {
                    out.push_str(&format!("  Matcher: {}\n", group.matcher));
                    for hook in &group.hooks {
                        push_hook(&mut out, hook, 4);
                    }
                }
            }
            HookEntries::Flat(defs) => {
                for hook in defs {
                    push_hook(&mut out, hook, 2);
                }
            }
        }
    }
    out
}

fn push_hook(out: &mut String, hook: &HookDefinition, indent: usize) {
    let pad = " ".repeat(indent);
    out.push_str(&format!("{pad}- Command: {}\n", hook.command));
    if let Some(timeout) = hook.timeout {
        out.push_str(&format!("{pad}  Timeout: {timeout}ms\n"));
    }
    if let Some(blocking) = hook.blocking {
        out.push_str(&format!("{pad}  Blocking: {blocking}\n"));
    }
}

fn starter_hooks(local: bool) -> HooksConfig {
    let scope = if local { "local" } else { "global" };
    HooksConfig {
        pre_tool_use: vec![MatcherGroup::new(
            "execute_command",
            vec![
                HookDefinition::new(format!("echo '[HOOK] Executing command ({scope})'"))
                    .with_blocking(false),
            ],
        )],
        post_tool_use: vec![MatcherGroup::new(
            "create_file",
            vec![HookDefinition::new(format!(
                "echo '[HOOK] File operation completed ({scope})'"
            ))],
        )],
        stop: vec![HookDefinition::new(format!(
            "echo '[HOOK] Session completed ({scope})'"
        ))],
        ..Default::default()
    }
}

fn example_hooks() -> HooksConfig {
    HooksConfig {
        pre_tool_use: vec![
            MatcherGroup::new(
                "execute_command",
                vec![
                    HookDefinition::new("echo \"[HOOK] Command execution: $HOOK_TOOL_NAME\"")
                        .with_blocking(true),
                ],
            ),
            MatcherGroup::new(
                "delete_file",
                vec![
                    HookDefinition::new("echo '[HOOK] File deletion blocked' && exit 1")
                        .with_blocking(true),
                ],
            ),
        ],
        post_tool_use: vec![MatcherGroup::new(
            "create_file",
            vec![HookDefinition::new("echo '[HOOK] File created'")],
        )],
        notification: vec![HookDefinition::new(
            "echo \"[NOTIFICATION] $HOOK_CONTEXT\" >> ~/krait-notifications.log",
        )],
        stop: vec![HookDefinition::new(
            "echo \"[HOOK] Session ended at $HOOK_TIMESTAMP\"",
        )],
        subagent_stop: vec![HookDefinition::new(
            "echo \"[HOOK] Subagent $HOOK_CONTEXT completed\"",
        )],
    }
}
