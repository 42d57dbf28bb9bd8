use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::{Value, json};

const BASE: &str = "https://schemas.colorscript.dev";

fn uri(category: &str, slug: &str) -> String {
    format!("{BASE}/api/v1/{category}/{slug}/0/")
}

fn write_schema(root: &Path, kind: &str, slug: &str, descriptor: Value, script_file: &str) {
    let dir = root.join(kind).join(slug);
    fs::create_dir_all(&dir).expect("failed to create schema dir");
    fs::write(dir.join("schema.json"), descriptor.to_string()).expect("failed to write schema");
    fs::write(dir.join(script_file), format!("// {slug}\nreturn input;\n"))
        .expect("failed to write script");
}

/// rgb-color <-> hex-color, and invert requiring rgb-color.
fn write_store(root: &Path) {
    let script = |file: &str| json!({ "type": "colorscript", "script": format!("./{file}") });
    write_schema(
        root,
        "types",
        "rgb-color",
        json!({
            "type": "color",
            "name": "RGB",
            "conversions": [
                { "source": "$self", "target": uri("core", "hex-color"), "script": script("convert.cs") }
            ]
        }),
        "convert.cs",
    );
    write_schema(
        root,
        "types",
        "hex-color",
        json!({
            "type": "color",
            "name": "Hex",
            "initializers": [{ "keyword": "hex", "script": script("hex.cs") }]
        }),
        "hex.cs",
    );
    write_schema(
        root,
        "functions",
        "invert",
        json!({
            "type": "function",
            "name": "Invert",
            "keyword": "invert",
            "script": script("invert.cs"),
            "requirements": [uri("core", "rgb-color")]
        }),
        "invert.cs",
    );
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_color-schema"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run color-schema")
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).expect("failed to read output"))
        .expect("output is not JSON")
}

// ---------------------------------------------------------------------------
// bundle
// ---------------------------------------------------------------------------

#[test]
fn bundle_writes_inlined_bundle_with_dependencies() {
    let store = tempfile::tempdir().unwrap();
    write_store(store.path());
    let output = store.path().join("out").join("bundle.json");

    let result = run(&[
        "--schemas-dir",
        store.path().to_str().unwrap(),
        "bundle",
        "invert",
        "--output",
        output.to_str().unwrap(),
    ]);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));

    let raw = fs::read_to_string(&output).unwrap();
    assert!(!raw.contains("\"./"));

    let bundle: Value = serde_json::from_str(&raw).unwrap();
    let uris: Vec<&str> = bundle["schemas"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["uri"].as_str().unwrap())
        .collect();
    assert_eq!(
        uris,
        vec![
            uri("core", "rgb-color"),
            uri("core", "hex-color"),
            uri("function", "invert")
        ]
    );
    assert_eq!(bundle["metadata"]["requestedSchemas"], json!(["invert"]));
    assert!(
        bundle["metadata"]["generatedBy"]
            .as_str()
            .unwrap()
            .starts_with("color-schema --schemas-dir")
    );
}

#[test]
fn bundle_honors_base_url_flag() {
    let store = tempfile::tempdir().unwrap();
    write_store(store.path());
    let output = store.path().join("bundle.json");

    let result = run(&[
        "--schemas-dir",
        store.path().to_str().unwrap(),
        "--base-url",
        "https://custom.example.com/",
        "bundle",
        "type:hex-color",
        "--output",
        output.to_str().unwrap(),
    ]);
    assert!(result.status.success());

    let bundle = read_json(&output);
    let schemas = bundle["schemas"].as_array().unwrap();
    assert_eq!(schemas.len(), 1);
    assert_eq!(
        schemas[0]["uri"],
        "https://custom.example.com/api/v1/core/hex-color/0/"
    );
}

#[test]
fn bundle_unknown_schema_fails() {
    let store = tempfile::tempdir().unwrap();
    write_store(store.path());
    let output = store.path().join("bundle.json");

    let result = run(&[
        "--schemas-dir",
        store.path().to_str().unwrap(),
        "bundle",
        "mystery",
        "--output",
        output.to_str().unwrap(),
    ]);
    assert_eq!(result.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("error:"));
    assert!(stderr.contains("type:mystery"));
    assert!(!output.exists());
}

#[test]
fn config_file_supplies_base_url() {
    let store = tempfile::tempdir().unwrap();
    write_store(store.path());
    let config = store.path().join("bundler.yml");
    fs::write(
        &config,
        format!(
            "base_url: \"https://yaml.example.com\"\nschemas_dir: \"{}\"\n",
            store.path().display()
        ),
    )
    .unwrap();
    let output = store.path().join("bundle.json");

    let result = run(&[
        "--config",
        config.to_str().unwrap(),
        "bundle",
        "hex-color",
        "--output",
        output.to_str().unwrap(),
    ]);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));
    let bundle = read_json(&output);
    assert!(
        bundle["schemas"][0]["uri"]
            .as_str()
            .unwrap()
            .starts_with("https://yaml.example.com/")
    );
}

// ---------------------------------------------------------------------------
// build
// ---------------------------------------------------------------------------

#[test]
fn build_writes_registry_artifacts() {
    let store = tempfile::tempdir().unwrap();
    write_store(store.path());
    let out = tempfile::tempdir().unwrap();

    let result = run(&[
        "--schemas-dir",
        store.path().to_str().unwrap(),
        "build",
        "--output",
        out.path().to_str().unwrap(),
    ]);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));

    let registry = read_json(&out.path().join("registry.json"));
    assert_eq!(registry["metadata"]["typeCount"], 2);
    assert_eq!(registry["metadata"]["functionCount"], 1);
    assert_eq!(registry["types"][0]["uri"], uri("core", "hex-color"));

    for file in [
        "types.json",
        "functions.json",
        "manifest.json",
        "types/rgb-color.json",
        "types/hex-color.json",
        "functions/invert.json",
    ] {
        assert!(out.path().join(file).is_file(), "missing {file}");
    }
    let manifest = read_json(&out.path().join("manifest.json"));
    assert_eq!(manifest["bundle_hash"], registry["metadata"]["bundleHash"]);
}

// ---------------------------------------------------------------------------
// deps
// ---------------------------------------------------------------------------

#[test]
fn deps_prints_resolved_dependencies() {
    let store = tempfile::tempdir().unwrap();
    write_store(store.path());

    let result = run(&["--schemas-dir", store.path().to_str().unwrap(), "deps", "invert"]);
    assert!(result.status.success());
    let report: Value = serde_json::from_slice(&result.stdout).unwrap();
    assert_eq!(report["resolvedDependencies"]["types"], json!(["rgb-color"]));
    assert_eq!(report["resolvedDependencies"]["functions"], json!([]));

    let result = run(&[
        "--schemas-dir",
        store.path().to_str().unwrap(),
        "deps",
        "invert",
        "--include-conversions",
    ]);
    let report: Value = serde_json::from_slice(&result.stdout).unwrap();
    assert_eq!(
        report["resolvedDependencies"]["types"],
        json!(["rgb-color", "hex-color"])
    );
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

#[test]
fn validate_accepts_fresh_bundle() {
    let store = tempfile::tempdir().unwrap();
    write_store(store.path());
    let output = store.path().join("bundle.json");
    let schemas_dir = store.path().to_str().unwrap();

    let result = run(&["--schemas-dir", schemas_dir, "bundle", "invert", "--output", output.to_str().unwrap()]);
    assert!(result.status.success());

    let result = run(&["validate", output.to_str().unwrap()]);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));
    assert!(String::from_utf8_lossy(&result.stdout).contains("Validated bundle"));
}

#[test]
fn validate_rejects_uninlined_script() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bundle.json");
    let bundle = json!({
        "schemas": [{
            "uri": uri("function", "invert"),
            "schema": {
                "type": "function",
                "name": "Invert",
                "keyword": "invert",
                "script": { "type": "colorscript", "script": "./invert.cs" }
            }
        }],
        "metadata": {
            "requestedSchemas": ["invert"],
            "resolvedDependencies": { "types": [], "functions": [] },
            "generatedAt": "2026-01-01T00:00:00Z"
        }
    });
    fs::write(&path, bundle.to_string()).unwrap();

    let result = run(&["validate", path.to_str().unwrap()]);
    assert_eq!(result.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("./invert.cs"));
    assert!(stderr.contains("validation error(s)"));
}
