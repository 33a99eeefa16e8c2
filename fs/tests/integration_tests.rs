use std::path::Path;
use std::sync::Arc;

use optlayer_core::{DiagnosticCode, Environment, LoadError, Provenance, ResolvedValue, parse};
use optlayer_fs::{FsEnvironment, load_schema};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn write(dir: &Path, relative: &str, contents: &str) {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

const SCHEMA: &str = r#"{
  "config": { "name": "config", "alias": "c", "type": "R", "default": "app" },
  "name": { "name": "name", "type": "s", "default": "fallback" },
  "level": { "name": "level", "type": "n" },
  "sources": { "name": "sources", "type": "G" },
  "readme": { "name": "readme", "type": "f" }
}"#;

// ---------------------------------------------------------------------------
// Module loading
// ---------------------------------------------------------------------------

#[test]
fn test_module_candidates_resolve_extensionless_paths() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "app.yaml", "options:\n  name: from-yaml\n");
    write(dir.path(), "nested/index.json", r#"{ "options": {} }"#);

    let env = FsEnvironment::new(dir.path());

    let module = env.load_module(&dir.path().join("app")).unwrap();
    assert_eq!(module.path, dir.path().join("app.yaml"));

    let nested = env.load_module(&dir.path().join("nested")).unwrap();
    assert_eq!(nested.path, dir.path().join("nested/index.json"));
}

#[test]
fn test_malformed_module_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "broken.json", "{ not json");

    let env = FsEnvironment::new(dir.path());
    let err = env.load_module(&dir.path().join("broken.json")).unwrap_err();
    assert!(matches!(err, LoadError::Parse { .. }));
}

#[test]
fn test_glob_returns_paths_relative_to_cwd() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "src/a.rs", "");
    write(dir.path(), "src/b.rs", "");
    write(dir.path(), "src/c.txt", "");

    let env = FsEnvironment::new(dir.path());
    assert_eq!(
        env.glob("src/*.rs", dir.path()),
        vec!["src/a.rs".to_string(), "src/b.rs".to_string()]
    );
    assert!(env.glob("[invalid", dir.path()).is_empty());
}

#[test]
fn test_glob_base_directory_with_pattern_characters() {
    let dir = tempfile::tempdir().unwrap();
    let cwd = dir.path().join("proj[1]");
    write(&cwd, "a.rs", "");
    write(&cwd, "b.txt", "");

    let env = FsEnvironment::new(&cwd);
    assert_eq!(env.glob("*.rs", &cwd), vec!["a.rs".to_string()]);
}

// ---------------------------------------------------------------------------
// End to end
// ---------------------------------------------------------------------------

#[test]
fn test_resolution_against_real_files() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "schema.json", SCHEMA);
    write(
        dir.path(),
        "app.json",
        r#"{ "extends": "./base/shared", "options": { "level": 2 } }"#,
    );
    write(
        dir.path(),
        "base/shared.yml",
        "extends: ./missing\noptions:\n  level: 9\n  readme: README.md\n",
    );
    write(dir.path(), "base/README.md", "# shared");
    write(dir.path(), "lib/one.rs", "");
    write(dir.path(), "lib/two.rs", "");

    let schema = load_schema(dir.path().join("schema.json")).unwrap();
    let env = Arc::new(FsEnvironment::new(dir.path()));
    let state = parse(["--sources", "lib/*.rs,lib/one.rs", "input"], schema, env).unwrap();

    assert!(state.diagnostics.is_empty(), "{:?}", state.diagnostics.messages());
    assert_eq!(state.args, vec!["input".to_string()]);
    assert_eq!(state.value("level").and_then(ResolvedValue::as_number), Some(2.0));
    assert_eq!(state.provenance("level"), Some(Provenance::Config));
    assert_eq!(state.value("name").and_then(ResolvedValue::as_str), Some("fallback"));
    assert_eq!(state.provenance("name"), Some(Provenance::Default));
    assert_eq!(
        state.config_chain,
        vec![dir.path().join("app.json"), dir.path().join("base/shared.yml")]
    );

    let ResolvedValue::File(readme) = state.value("readme").unwrap() else {
        panic!("expected a file");
    };
    assert_eq!(readme.contents().as_deref(), Some("# shared"));

    let sources: Vec<&str> = state
        .value("sources")
        .and_then(ResolvedValue::as_files)
        .unwrap()
        .iter()
        .map(|f| f.filename.as_str())
        .collect();
    assert_eq!(sources, vec!["lib/one.rs", "lib/two.rs"]);
}

#[test]
fn test_invalid_module_reports_module_path() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "schema.json", SCHEMA);
    write(dir.path(), "conf/app.json", r#"{ "options": { "level": "high", "unknown": 1 } }"#);

    let schema = load_schema(dir.path().join("schema.json")).unwrap();
    let env = Arc::new(FsEnvironment::new(dir.path()));
    let state = parse(["-c", "conf/app"], schema, env).unwrap();

    let module = dir.path().join("conf/app.json");
    assert_eq!(
        state.diagnostics.messages(),
        vec![
            format!(
                "Invalid Configuration Option at '{}': Property 'level' has an invalid type 'String', expected 'Number'",
                module.display()
            ),
            format!("Invalid Configuration Option at '{}': Property 'unknown' is invalid", module.display()),
        ]
    );
    assert!(state.diagnostics.contains(DiagnosticCode::UnexpectedOption));
    assert_eq!(state.provenance("name"), Some(Provenance::Unprovided));
}

#[test]
fn test_schema_file_errors() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "bad.yaml", "config: [1, 2\n");

    assert!(load_schema(dir.path().join("bad.yaml")).is_err());
    assert!(load_schema(dir.path().join("absent.json")).is_err());
}
