//! Full-stack tests: configuration, real adapters, session and transport
//!
//! Frames go in through an in-memory reader and come out of an in-memory
//! writer, exactly as they would over stdio.

use std::sync::Arc;

use poly_git_core::Transport;
use poly_git_mcp::{ServerConfig, build_session};
use poly_git_test_utils::{decode_all, notification, request};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

async fn exchange(config: &ServerConfig, input: Vec<u8>) -> Vec<Value> {
    let session = Arc::new(build_session(config).unwrap());
    let mut output = Vec::new();
    Transport::new(&input[..], &mut output)
        .serve(session)
        .await
        .unwrap();
    decode_all(&output)
}

/// Every forge enabled, none of them able to reach anything.
fn offline_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.github.binary = Some("/nonexistent/gh".into());
    config.gitlab.binary = Some("/nonexistent/glab".into());
    config.gitea.binary = Some("/nonexistent/tea".into());
    config.bitbucket.username_env = "POLY_GIT_IT_UNSET_USER".into();
    config.bitbucket.app_password_env = "POLY_GIT_IT_UNSET_PASSWORD".into();
    config
}

fn call(id: i64, name: &str, arguments: Value) -> Vec<u8> {
    request(json!(id), "tools/call", json!({"name": name, "arguments": arguments}))
}

fn tool_text(message: &Value) -> (&str, bool) {
    let result = &message["result"];
    (
        result["content"][0]["text"].as_str().unwrap_or_default(),
        result["isError"] == json!(true),
    )
}

// ============================================================================
// Handshake and catalog
// ============================================================================

#[tokio::test]
async fn test_handshake_and_catalog() {
    let mut input = request(json!(1), "initialize", json!({}));
    input.extend(notification("notifications/initialized"));
    input.extend(request(json!(2), "tools/list", json!({})));

    let messages = exchange(&offline_config(), input).await;
    assert_eq!(messages.len(), 2);

    let init = &messages[0]["result"];
    assert_eq!(init["protocolVersion"], "2024-11-05");
    assert_eq!(init["serverInfo"]["name"], "poly-git-mcp");
    assert_eq!(init["capabilities"], json!({"tools": {"listChanged": false}}));

    let tools = messages[1]["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 28);
    assert_eq!(tools[0]["name"], "gh_repo_list");
    assert_eq!(tools[tools.len() - 1]["name"], "bb_pipeline_list");
}

#[tokio::test]
async fn test_adapter_subset_limits_catalog() {
    let config = offline_config().with_overrides(Some(vec!["gitea".into()]), false);
    let messages = exchange(&config, request(json!(1), "tools/list", json!({}))).await;

    let names: Vec<&str> = messages[0]["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec![
            "tea_repo_list",
            "tea_issue_list",
            "tea_issue_create",
            "tea_pr_list",
            "tea_release_list"
        ]
    );
}

// ============================================================================
// Tool failures are results, not protocol errors
// ============================================================================

#[tokio::test]
async fn test_failures_are_flagged_results() {
    let mut input = call(1, "glab_mr_list", json!({"repo": "grp/proj"}));
    input.extend(call(2, "bb_repo_list", json!({"workspace": "acme"})));
    input.extend(call(3, "gh_issue_view", json!({"repo": "octo/hello"})));
    input.extend(call(4, "svn_log", json!({})));

    let messages = exchange(&offline_config(), input).await;
    assert_eq!(messages.len(), 4);
    assert!(messages.iter().all(|m| m.get("error").is_none()));

    assert_eq!(
        tool_text(&messages[0]),
        ("Error: command not found: /nonexistent/glab", true)
    );
    assert_eq!(
        tool_text(&messages[1]),
        (
            "Error: missing Bitbucket credentials: set POLY_GIT_IT_UNSET_USER and POLY_GIT_IT_UNSET_PASSWORD",
            true
        )
    );
    assert_eq!(
        tool_text(&messages[2]),
        ("Error: invalid arguments: 'number' is required", true)
    );
    assert_eq!(tool_text(&messages[3]), ("Error: Unknown tool: svn_log", true));
}

// ============================================================================
// Real subprocesses
// ============================================================================

#[cfg(unix)]
#[tokio::test]
async fn test_cli_adapter_runs_real_process() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let ok = dir.path().join("fake-gh");
    let failing = dir.path().join("fake-tea");
    std::fs::write(&ok, "#!/bin/sh\nprintf '%s\\n' \"$@\"\n").unwrap();
    std::fs::write(&failing, "#!/bin/sh\necho 'no login found' >&2\nexit 3\n").unwrap();
    for script in [&ok, &failing] {
        std::fs::set_permissions(script, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    let mut config = offline_config();
    config.github.binary = Some(ok.display().to_string());
    config.gitea.binary = Some(failing.display().to_string());

    let mut input = call(1, "gh_release_list", json!({"repo": "octo/hello", "limit": 2}));
    input.extend(call(2, "tea_repo_list", json!({})));

    let messages = exchange(&config, input).await;

    assert_eq!(
        tool_text(&messages[0]),
        ("release\nlist\n--repo\nocto/hello\n--limit\n2", false)
    );
    assert!(messages[0]["result"].get("isError").is_none());

    let expected = format!("Error: {} exited with code 3: no login found", failing.display());
    assert_eq!(tool_text(&messages[1]), (expected.as_str(), true));
}
