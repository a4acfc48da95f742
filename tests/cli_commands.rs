use assert_cmd::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Command;

const PAGE: &str = "tests/fixtures/checkout.html";

/// Command isolated from any user configuration: `--config` points into
/// a scratch directory.
fn pinmark(config_dir: &Path) -> Command {
    let bin = assert_cmd::cargo::cargo_bin!("pinmark");
    let mut cmd = Command::new(bin);
    cmd.env_remove("RUST_LOG")
        .arg("--config")
        .arg(config_dir.join("config.yaml"));
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let assert = cmd.assert().success();
    String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 output")
}

fn json_of(cmd: &mut Command) -> Value {
    serde_json::from_str(&stdout_of(cmd)).expect("valid json")
}

fn page() -> PathBuf {
    let page = PathBuf::from(PAGE);
    assert!(page.exists(), "fixture missing");
    page
}

#[test]
fn capture_emits_fingerprint_fields() {
    let dir = tempfile::tempdir().unwrap();
    let value = json_of(pinmark(dir.path()).args([
        "capture",
        "--html",
        PAGE,
        "--selector",
        "button.primary",
        "-o",
        "json",
    ]));

    assert_eq!(value["tagName"].as_str(), Some("button"));
    assert_eq!(value["classList"], serde_json::json!(["btn", "primary"]));
    assert_eq!(value["textSnippet"].as_str(), Some("Place order"));
    assert_eq!(value["attributes"]["data-testid"].as_str(), Some("submit"));
    assert_eq!(value["attributes"]["type"].as_str(), Some("submit"));
    assert_eq!(
        value["domPath"].as_str(),
        Some("main:nth-child(1) > form:nth-child(1) > button:nth-child(2)")
    );
    assert!(value.get("id").is_none());
}

#[test]
fn captured_fingerprint_resolves_back() {
    let dir = tempfile::tempdir().unwrap();
    let stored = stdout_of(pinmark(dir.path()).args([
        "capture",
        "--html",
        page().to_str().unwrap(),
        "--selector",
        "li.item > button",
        "--index",
        "1",
    ]));
    let fingerprint_file = dir.path().join("fp.json");
    std::fs::write(&fingerprint_file, stored.trim()).unwrap();

    let value = json_of(pinmark(dir.path()).args([
        "resolve",
        "--html",
        PAGE,
        "--fingerprint-file",
        fingerprint_file.to_str().unwrap(),
        "-o",
        "json",
    ]));

    assert_eq!(value["found"], Value::Bool(true));
    assert_eq!(value["tier"].as_str(), Some("class-combination"));
    assert_eq!(
        value["path"].as_str(),
        Some("main:nth-child(1) > ul:nth-child(2) > li:nth-child(2) > button:nth-child(2)")
    );
    assert_eq!(value["tag"].as_str(), Some("button"));
}

#[test]
fn resolve_not_found_still_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let value = json_of(pinmark(dir.path()).args([
        "resolve",
        "--html",
        PAGE,
        "--fingerprint",
        r#"{"tagName":"table","classList":["grid"]}"#,
        "-o",
        "json",
    ]));
    assert_eq!(value["found"], Value::Bool(false));
    assert!(value.get("path").is_none());

    let human = stdout_of(pinmark(dir.path()).args([
        "resolve",
        "--html",
        PAGE,
        "--fingerprint",
        "definitely not json",
    ]));
    assert!(human.contains("Element not found"));
}

#[test]
fn resolve_explain_lists_every_tier() {
    let dir = tempfile::tempdir().unwrap();
    let value = json_of(pinmark(dir.path()).args([
        "resolve",
        "--html",
        PAGE,
        "--fingerprint",
        r#"{"tagName":"button","attributes":{"data-testid":"submit"}}"#,
        "--explain",
        "-o",
        "json",
    ]));

    assert_eq!(value["tier"].as_str(), Some("attribute"));
    let tiers = value["tiers"].as_array().unwrap();
    assert_eq!(tiers.len(), 5);
    assert_eq!(tiers[0]["tier"].as_str(), Some("id"));
    assert_eq!(tiers[0]["outcome"].as_str(), Some("no candidate"));
    assert_eq!(tiers[1]["outcome"].as_str(), Some("matched"));
    assert_eq!(tiers[1]["validated"], Value::Bool(true));
    assert_eq!(tiers[4]["tier"].as_str(), Some("fallback"));
    assert_eq!(tiers[4]["validated"], Value::Bool(false));
}

#[test]
fn configured_chain_limits_resolution() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.yaml"),
        "resolver:\n  tiers: [path]\n",
    )
    .unwrap();

    // attribute tier would find it; only the path tier is enabled
    let value = json_of(pinmark(dir.path()).args([
        "resolve",
        "--html",
        PAGE,
        "--fingerprint",
        r#"{"tagName":"button","attributes":{"data-testid":"submit"}}"#,
        "-o",
        "json",
    ]));
    assert_eq!(value["found"], Value::Bool(false));
}

#[test]
fn path_prints_structural_path() {
    let dir = tempfile::tempdir().unwrap();
    let out = stdout_of(pinmark(dir.path()).args([
        "path",
        "--html",
        PAGE,
        "--selector",
        "li.item",
        "--index",
        "1",
    ]));
    assert_eq!(out.trim(), "main:nth-child(1) > ul:nth-child(2) > li:nth-child(2)");
}

#[test]
fn path_rejects_out_of_range_index() {
    let dir = tempfile::tempdir().unwrap();
    pinmark(dir.path())
        .args(["path", "--html", PAGE, "--selector", "li.item", "--index", "9"])
        .assert()
        .failure();
}

#[test]
fn score_ranks_candidates() {
    let dir = tempfile::tempdir().unwrap();
    let value = json_of(pinmark(dir.path()).args([
        "score",
        "--html",
        PAGE,
        "--selector",
        "button.remove",
        "--fingerprint",
        r#"{"tagName":"button","classList":["remove"],"textSnippet":"Remove Desk"}"#,
        "-o",
        "json",
    ]));

    let candidates = value.as_array().unwrap();
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0]["score"].as_i64(), Some(15));
    assert_eq!(candidates[0]["valid"], Value::Bool(false));
    assert_eq!(candidates[1]["score"].as_i64(), Some(30));
    assert_eq!(candidates[1]["valid"], Value::Bool(true));
}

#[test]
fn attach_writes_missing_fingerprints() {
    let dir = tempfile::tempdir().unwrap();
    let records = dir.path().join("records.json");
    std::fs::write(
        &records,
        r#"[
            {"name": "a", "path": "src/Nav.vue:4:3"},
            {"name": "div", "path": "src/Gone.vue:1:1"}
        ]"#,
    )
    .unwrap();

    let summary = json_of(pinmark(dir.path()).args([
        "attach",
        "--html",
        PAGE,
        "--records",
        records.to_str().unwrap(),
        "--write",
        "-o",
        "json",
    ]));
    assert_eq!(summary["total"].as_u64(), Some(2));
    assert_eq!(summary["updated"].as_u64(), Some(1));

    let saved: Value = serde_json::from_str(&std::fs::read_to_string(&records).unwrap()).unwrap();
    let stable_id = saved[0]["stableId"].as_str().expect("fingerprint stored");
    let fingerprint: Value = serde_json::from_str(stable_id).unwrap();
    assert_eq!(fingerprint["tagName"].as_str(), Some("a"));
    assert_eq!(fingerprint["textSnippet"].as_str(), Some("Home"));
    assert!(saved[1].get("stableId").is_none());
}

#[test]
fn config_commands_use_defaults_without_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = stdout_of(pinmark(dir.path()).args(["config", "validate"]));
    assert!(out.contains("defaults are valid"));

    let tiers = json_of(pinmark(dir.path()).args(["config", "get", "resolver.tiers", "-o", "json"]));
    assert_eq!(
        tiers,
        serde_json::json!(["id", "attribute", "class-combination", "path", "fallback"])
    );
}

#[test]
fn config_set_persists_valid_values_only() {
    let dir = tempfile::tempdir().unwrap();
    pinmark(dir.path())
        .args(["config", "set", "resolver.tiers", r#"["fallback","id"]"#])
        .assert()
        .success();
    let tiers = json_of(pinmark(dir.path()).args(["config", "get", "resolver.tiers", "-o", "json"]));
    assert_eq!(tiers, serde_json::json!(["fallback", "id"]));

    pinmark(dir.path())
        .args(["config", "set", "resolver.tiers", "[]"])
        .assert()
        .failure();
    pinmark(dir.path())
        .args(["config", "set", "logging.level", "loud"])
        .assert()
        .failure();
}
