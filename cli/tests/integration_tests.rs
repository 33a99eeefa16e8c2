use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn optlayer(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_optlayer"))
        .args(args)
        .output()
        .expect("failed to run optlayer")
}

fn write(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, contents).expect("failed to write fixture");
    path.to_str().unwrap().to_string()
}

const SCHEMA_YAML: &str = r#"config:
  name: config
  type: R
  default: app.json
verbose:
  name: verbose
  alias: v
  type: b
jobs:
  name: jobs
  type: n
  default: 1
"#;

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_accepts_valid_schema() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(dir.path(), "schema.yaml", SCHEMA_YAML);

    let output = optlayer(&["check", "--schema", &schema]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["options"], 3);
    assert_eq!(json["diagnostics"], serde_json::json!([]));
}

#[test]
fn check_reports_schema_diagnostics() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(
        dir.path(),
        "schema.json",
        r#"{ "test": { "name": "not-test", "type": "b" } }"#,
    );

    let output = optlayer(&["check", "--schema", &schema]);
    assert!(!output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let codes: Vec<&str> = json["diagnostics"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["ASP100", "ASP101"]);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: 2 diagnostic(s) reported"));
}

#[test]
fn check_fails_on_missing_schema_file() {
    let output = optlayer(&["check", "--schema", "/nonexistent/schema.json"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to load schema"));
}

// ---------------------------------------------------------------------------
// resolve
// ---------------------------------------------------------------------------

#[test]
fn resolve_layers_argv_config_and_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(dir.path(), "schema.yaml", SCHEMA_YAML);
    write(dir.path(), "app.json", r#"{ "options": { "jobs": 4, "verbose": false } }"#);

    let cwd = dir.path().to_str().unwrap();
    let output = optlayer(&["resolve", "--schema", &schema, "--cwd", cwd, "--", "-v", "input.txt", "--", "raw"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let values = json["values"].as_array().unwrap();
    assert_eq!(values[1]["name"], "verbose");
    assert_eq!(values[1]["provenance"], "argv");
    assert_eq!(values[1]["value"], true);
    assert_eq!(values[2]["provenance"], "config");
    assert_eq!(values[2]["value"], 4.0);
    assert_eq!(json["args"], serde_json::json!(["input.txt"]));
    assert_eq!(json["rest"], serde_json::json!(["raw"]));
    assert_eq!(json["config_chain"].as_array().unwrap().len(), 1);
}

#[test]
fn resolve_yaml_output_and_cli_diagnostics() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write(dir.path(), "schema.yaml", SCHEMA_YAML);

    let cwd = dir.path().to_str().unwrap();
    let output = optlayer(&[
        "resolve", "--schema", &schema, "--cwd", cwd, "--format", "yaml", "--", "--jobs", "many", "--nope",
    ]);
    assert!(!output.status.success());

    let report: serde_yaml::Value = serde_yaml::from_slice(&output.stdout).unwrap();
    let messages: Vec<&str> = report["diagnostics"]
        .as_sequence()
        .unwrap()
        .iter()
        .map(|d| d["message"].as_str().unwrap())
        .collect();
    assert_eq!(
        messages,
        vec![
            "Invalid CLI argument '--jobs': Value 'many' is not a valid number",
            "Invalid CLI argument 'nope': Option is not valid",
        ]
    );
}
