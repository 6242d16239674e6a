//! End-to-end gate behavior against real settings files and real shell
//! subprocesses.

use std::fs;
use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;

use krait_runtime::{ConfigStore, GateDecision, PolicyGate};

struct Fixture {
    home: TempDir,
    project: TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            home: TempDir::new().unwrap(),
            project: TempDir::new().unwrap(),
        }
    }

    fn write_global(&self, json: &str) {
        let dir = self.home.path().join(".krait");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("settings.json"), json).unwrap();
    }

    fn write_local(&self, json: &str) {
        let dir = self.project.path().join(".krait");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("settings.json"), json).unwrap();
    }

    fn gate(&self) -> PolicyGate {
        self.gate_with_local_hooks(true)
    }

    fn gate_with_local_hooks(&self, allow_local_hooks: bool) -> PolicyGate {
        PolicyGate::new(Arc::new(ConfigStore::new(
            self.project.path(),
            self.home.path(),
            allow_local_hooks,
        )))
    }
}

// Global non-blocking hook that echoes; the call goes through.
#[tokio::test]
async fn test_global_nonblocking_hook_allows() {
    let fx = Fixture::new();
    fx.write_global(
        r#"{"hooks":{"PreToolUse":[{"matcher":"execute_command","hooks":[
            {"type":"command","command":"echo ok","blocking":false}
        ]}]}}"#,
    );

    let decision = fx.gate().check_before_tool("execute_command", json!({})).await;
    assert_eq!(decision, GateDecision::Allow);
}

// Local blocking hook that exits 1; the call is blocked.
#[tokio::test]
async fn test_local_blocking_hook_blocks() {
    let fx = Fixture::new();
    fx.write_local(
        r#"{"hooks":{"PreToolUse":[{"matcher":"delete_file","hooks":[
            {"type":"command","command":"echo deletion denied >&2; exit 1","blocking":true}
        ]}]}}"#,
    );

    let decision = fx.gate().check_before_tool("delete_file", json!({})).await;
    assert!(!decision.is_allowed());
    assert!(decision.blocked_reason().unwrap().contains("deletion denied"));
}

// A 100ms deadline against a 5s command resolves as a timeout, promptly.
#[tokio::test]
async fn test_blocking_hook_timeout_blocks_promptly() {
    let fx = Fixture::new();
    fx.write_global(
        r#"{"hooks":{"PreToolUse":[{"matcher":"slow_tool","hooks":[
            {"type":"command","command":"sleep 5","timeout":100,"blocking":true}
        ]}]}}"#,
    );

    let started = std::time::Instant::now();
    let decision = fx.gate().check_before_tool("slow_tool", json!({})).await;
    assert!(!decision.is_allowed());
    assert!(decision.blocked_reason().unwrap().contains("timed out"));
    assert!(
        started.elapsed() < std::time::Duration::from_secs(2),
        "timeout was not enforced"
    );
}

#[tokio::test]
async fn test_nonblocking_failure_allows_but_still_ran() {
    let fx = Fixture::new();
    let witness = fx.project.path().join("ran");
    fx.write_global(&format!(
        r#"{{"hooks":{{"PreToolUse":[{{"matcher":"shell","hooks":[
            {{"type":"command","command":"touch {}; exit 1","blocking":false}}
        ]}}]}}}}"#,
        witness.display()
    ));

    let decision = fx.gate().check_before_tool("shell", json!({})).await;
    assert!(decision.is_allowed());
    assert!(witness.exists(), "non-blocking hook did not execute");
}

#[tokio::test]
async fn test_block_output_vetoes_nonblocking_hook() {
    let fx = Fixture::new();
    fx.write_global(
        r#"{"hooks":{"PreToolUse":[{"matcher":"shell","hooks":[
            {"type":"command","command":"echo BLOCK","blocking":false}
        ]}]}}"#,
    );

    let decision = fx.gate().check_before_tool("shell", json!({})).await;
    assert!(!decision.is_allowed());
    assert!(decision
        .blocked_reason()
        .unwrap()
        .to_lowercase()
        .contains("block"));
}

// Global groups run before local groups; hooks within a pass are strictly
// sequential, so the witness file records the order.
#[tokio::test]
async fn test_global_hooks_run_before_local_hooks() {
    let fx = Fixture::new();
    let log = fx.project.path().join("order.log");
    fx.write_global(&format!(
        r#"{{"hooks":{{"PreToolUse":[{{"matcher":"shell","hooks":[
            {{"type":"command","command":"echo first >> {log}"}},
            {{"type":"command","command":"echo second >> {log}"}}
        ]}}]}}}}"#,
        log = log.display()
    ));
    fx.write_local(&format!(
        r#"{{"hooks":{{"PreToolUse":[{{"matcher":"shell","hooks":[
            {{"type":"command","command":"echo third >> {log}"}}
        ]}}]}}}}"#,
        log = log.display()
    ));

    let decision = fx.gate().check_before_tool("shell", json!({})).await;
    assert!(decision.is_allowed());
    assert_eq!(fs::read_to_string(&log).unwrap(), "first\nsecond\nthird\n");
}

// A block short-circuits: nothing after the offending hook runs.
#[tokio::test]
async fn test_block_short_circuits_remaining_hooks() {
    let fx = Fixture::new();
    let log = fx.project.path().join("order.log");
    fx.write_global(&format!(
        r#"{{"hooks":{{"PreToolUse":[{{"matcher":"shell","hooks":[
            {{"type":"command","command":"echo ran >> {log}; exit 1","blocking":true}},
            {{"type":"command","command":"echo never >> {log}"}}
        ]}}]}}}}"#,
        log = log.display()
    ));

    let decision = fx.gate().check_before_tool("shell", json!({})).await;
    assert!(!decision.is_allowed());
    assert_eq!(fs::read_to_string(&log).unwrap(), "ran\n");
}

#[tokio::test]
async fn test_local_hooks_switch_leaves_global_only() {
    let fx = Fixture::new();
    fx.write_global(
        r#"{"hooks":{"PreToolUse":[{"matcher":"shell","hooks":[
            {"type":"command","command":"echo global"}
        ]}]}}"#,
    );
    fx.write_local(
        r#"{"hooks":{"PreToolUse":[{"matcher":"shell","hooks":[
            {"type":"command","command":"exit 1","blocking":true}
        ]}],"Stop":[{"type":"command","command":"echo local stop"}]}}"#,
    );

    let gate = fx.gate_with_local_hooks(false);
    assert!(gate.local_hooks().is_empty());

    let active = gate.active_hooks();
    assert_eq!(active.pre_tool_use.len(), 1);
    assert_eq!(active.pre_tool_use[0].hooks[0].command, "echo global");
    assert!(active.stop.is_empty());

    // The local blocking hook must not fire
    let decision = gate.check_before_tool("shell", json!({})).await;
    assert!(decision.is_allowed());
}

#[tokio::test]
async fn test_reload_picks_up_new_hooks() {
    let fx = Fixture::new();
    let gate = fx.gate();

    assert!(gate
        .check_before_tool("delete_file", json!({}))
        .await
        .is_allowed());

    fx.write_local(
        r#"{"hooks":{"PreToolUse":[{"matcher":"delete_file","hooks":[
            {"type":"command","command":"exit 1","blocking":true}
        ]}]}}"#,
    );
    gate.reload();

    assert!(!gate
        .check_before_tool("delete_file", json!({}))
        .await
        .is_allowed());
}

// Pattern matchers select by regex; unrelated tools pass untouched.
#[tokio::test]
async fn test_pattern_matcher_selects_tools() {
    let fx = Fixture::new();
    fx.write_global(
        r#"{"hooks":{"PreToolUse":[{"matcher":"^(create|delete)_file$","hooks":[
            {"type":"command","command":"exit 1","blocking":true}
        ]}]}}"#,
    );
    let gate = fx.gate();

    assert!(!gate.check_before_tool("delete_file", json!({})).await.is_allowed());
    assert!(!gate.check_before_tool("create_file", json!({})).await.is_allowed());
    assert!(gate.check_before_tool("read_file", json!({})).await.is_allowed());
}

// An invalid definition in a blocking position blocks as a validation
// failure without ever spawning.
#[tokio::test]
async fn test_invalid_blocking_definition_blocks() {
    let fx = Fixture::new();
    fx.write_global(
        r#"{"hooks":{"PreToolUse":[{"matcher":"shell","hooks":[
            {"type":"command","command":"","blocking":true}
        ]}]}}"#,
    );

    let decision = fx.gate().check_before_tool("shell", json!({})).await;
    assert!(!decision.is_allowed());
    assert!(decision
        .blocked_reason()
        .unwrap()
        .contains("Invalid hook configuration"));
}

#[tokio::test]
async fn test_malformed_settings_file_disables_nothing() {
    let fx = Fixture::new();
    fx.write_global("{ this is not json");

    // Unparseable config loads as empty; every call passes
    let decision = fx.gate().check_before_tool("anything", json!({})).await;
    assert!(decision.is_allowed());
}
