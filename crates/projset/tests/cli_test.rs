//! Integration tests for the `projset` CLI binary.
//!
//! Argument parsing, help output, completions, and error handling run
//! without a server; the settings round trips run against wiremock.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `projset` binary with env isolation.
///
/// Clears all `PROJSET_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn projset_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("projset");
    cmd.env("HOME", "/tmp/projset-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/projset-cli-test-nonexistent")
        .env_remove("PROJSET_PROFILE")
        .env_remove("PROJSET_SERVER")
        .env_remove("PROJSET_TOKEN")
        .env_remove("PROJSET_ORG")
        .env_remove("PROJSET_PROJECT")
        .env_remove("PROJSET_OUTPUT")
        .env_remove("PROJSET_INSECURE")
        .env_remove("PROJSET_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run the binary off the async runtime so wiremock keeps serving.
async fn run(args: Vec<String>) -> std::process::Output {
    tokio::task::spawn_blocking(move || projset_cmd().args(args).output().unwrap())
        .await
        .unwrap()
}

/// A mock server answering the two load requests for `acme/backend`.
async fn project_server() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/0/projects/acme/backend/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "2",
            "name": "Backend",
            "slug": "backend",
            "securityToken": "abc123",
            "team": { "id": "4", "slug": "core" },
            "options": { "sentry:resolve_age": 0 },
            "config": [
                { "name": "mail:subject_prefix", "type": "string", "label": "Subject prefix" }
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/0/organizations/acme/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "slug": "acme",
            "teams": [
                { "id": "4", "slug": "core", "isMember": true },
                { "id": "5", "slug": "web", "isMember": true }
            ]
        })))
        .mount(&server)
        .await;

    server
}

fn api_root(server: &MockServer) -> String {
    format!("{}/api/0/", server.uri())
}

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_owned()).collect()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = projset_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    projset_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("project settings")
            .and(predicate::str::contains("show"))
            .and(predicate::str::contains("fields"))
            .and(predicate::str::contains("set")),
    );
}

#[test]
fn test_version_flag() {
    projset_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("projset"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    projset_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    projset_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_completions_fish() {
    projset_cmd()
        .args(["completions", "fish"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = projset_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_show_without_server() {
    let output = projset_cmd().args(["show", "acme/backend"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(
        text.contains("No server configured"),
        "Expected config hint:\n{text}"
    );
}

#[test]
fn test_show_without_project() {
    let output = projset_cmd()
        .args(["show", "--server", "http://127.0.0.1:9/api/0/"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("No project selected"));
}

#[test]
fn test_malformed_route() {
    let output = projset_cmd()
        .args(["show", "acme", "--server", "http://127.0.0.1:9/api/0/"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("org/project"));
}

#[test]
fn test_set_requires_assignments() {
    let output = projset_cmd().arg("set").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_config_show_no_config() {
    projset_cmd()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[defaults]"));
}

#[test]
fn test_config_path() {
    projset_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_invalid_output_format() {
    let output = projset_cmd()
        .args(["show", "--output", "xml"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("xml"));
}

#[test]
fn test_config_subcommands_exist() {
    projset_cmd().args(["config", "--help"]).assert().success().stdout(
        predicate::str::contains("init")
            .and(predicate::str::contains("show"))
            .and(predicate::str::contains("set"))
            .and(predicate::str::contains("profiles"))
            .and(predicate::str::contains("use"))
            .and(predicate::str::contains("set-token")),
    );
}

// ── Against a server ────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_show_json_renders_sections() {
    let server = project_server().await;
    let output = run(args(&[
        "show",
        "acme/backend",
        "-o",
        "json",
        "--server",
        &api_root(&server),
    ]))
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let sections: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(sections[0]["title"], "Project Details");

    let details = sections[0]["fields"].as_array().unwrap();
    let keys: Vec<_> = details
        .iter()
        .map(|f| f["descriptor"]["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, ["name", "slug", "team"]);
    assert_eq!(details[2]["value"], "core");

    let email = sections[1]["fields"].as_array().unwrap();
    assert_eq!(email[0]["descriptor"]["label"], "Subject prefix");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_show_section_filter_table() {
    let server = project_server().await;
    let output = run(args(&[
        "show",
        "acme/backend",
        "--section",
        "event",
        "--color",
        "never",
        "--server",
        &api_root(&server),
    ]))
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let text = String::from_utf8_lossy(&output.stdout);
    assert!(text.contains("Event Settings"));
    assert!(text.contains("Disabled"));
    assert!(text.contains("There is no undo"));
    assert!(!text.contains("Project Details"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_set_saves_changed_fields() {
    let server = project_server().await;
    Mock::given(method("PUT"))
        .and(path("/api/0/projects/acme/backend/"))
        .and(body_partial_json(json!({ "slug": "api", "name": "Backend" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "config": [{ "name": "slug", "value": "api" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let output = run(args(&[
        "set",
        "-r",
        "acme/backend",
        "slug=api",
        "-o",
        "plain",
        "--server",
        &api_root(&server),
    ]))
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "slug=api");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_set_rejected_exits_with_field_errors() {
    let server = project_server().await;
    Mock::given(method("PUT"))
        .and(path("/api/0/projects/acme/backend/"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "slug": ["Slug is taken"] })),
        )
        .mount(&server)
        .await;

    let output = run(args(&[
        "set",
        "-r",
        "acme/backend",
        "slug=frontend",
        "--color",
        "never",
        "--server",
        &api_root(&server),
    ]))
    .await;
    assert_eq!(output.status.code(), Some(6));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Slug is taken"), "{stderr}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_set_dry_run_sends_nothing() {
    let server = project_server().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let output = run(args(&[
        "set",
        "-r",
        "acme/backend",
        "mail:subject_prefix=[acme]",
        "--dry-run",
        "-o",
        "json-compact",
        "--server",
        &api_root(&server),
    ]))
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let body: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["mail:subject_prefix"], "[acme]");
    assert_eq!(body["slug"], "backend");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_enabling_auto_resolve_needs_confirmation() {
    let server = project_server().await;
    let output = run(args(&[
        "set",
        "-r",
        "acme/backend",
        "sentry:resolve_age=2d",
        "--server",
        &api_root(&server),
    ]))
    .await;
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("requires confirmation"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unknown_field_is_a_usage_error() {
    let server = project_server().await;
    let output = run(args(&[
        "set",
        "-r",
        "acme/backend",
        "nope=1",
        "--server",
        &api_root(&server),
    ]))
    .await;
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Unknown field 'nope'"));
}
