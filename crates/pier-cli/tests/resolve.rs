use std::fs;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::Value;

fn pier() -> Command {
    cargo_bin_cmd!("pier")
}

fn write_batch(dir: &Path, content: &str) -> std::path::PathBuf {
    let batch = serde_json::json!([
        {"name": "helper.py", "content": "x = 1", "active": false},
        {"name": "main.py", "content": content, "active": true},
    ]);
    let path = dir.join("batch.json");
    fs::write(&path, batch.to_string()).expect("write batch");
    path
}

fn resolved_json(batch: &Path, extra: &[&str]) -> Value {
    let assert = pier()
        .args(["--json", "resolve"])
        .arg(batch)
        .arg("--no-probe")
        .args(extra)
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    serde_json::from_str(&stdout).expect("outcome JSON")
}

#[test]
fn scanned_import_proposes_the_module_name() {
    let temp = tempfile::tempdir().unwrap();
    let batch = write_batch(temp.path(), "import requests");

    let outcome = resolved_json(&batch, &[]);
    assert_eq!(outcome["kind"], "success");
    assert_eq!(outcome["dependencies"], serde_json::json!(["requests"]));
}

#[test]
fn declared_metadata_wins_and_gains_companions() {
    let temp = tempfile::tempdir().unwrap();
    let content = "# /// script\n# dependencies = [\"pydantic_ai\"]\n# ///\nimport numpy\n";
    let batch = write_batch(temp.path(), content);

    let outcome = resolved_json(&batch, &[]);
    assert_eq!(
        outcome["dependencies"],
        serde_json::json!(["pydantic_ai", "typing_extensions>=4.12"])
    );
}

#[test]
fn name_table_maps_import_names_to_packages() {
    let temp = tempfile::tempdir().unwrap();
    let batch = write_batch(temp.path(), "import PIL");
    let table = temp.path().join("table.json");
    fs::write(&table, r#"{"PIL": "pillow"}"#).unwrap();

    let outcome = resolved_json(&batch, &["--name-table", table.to_str().unwrap()]);
    assert_eq!(outcome["dependencies"], serde_json::json!(["pillow"]));
}

#[test]
fn dotted_unknown_imports_resolve_to_nothing() {
    let temp = tempfile::tempdir().unwrap();
    let batch = write_batch(temp.path(), "import acme.widgets");

    let outcome = resolved_json(&batch, &[]);
    assert_eq!(outcome["dependencies"], serde_json::json!([]));
}

#[test]
fn unanalyzable_source_reports_null_dependencies() {
    let temp = tempfile::tempdir().unwrap();
    let batch = write_batch(temp.path(), "x = 'unterminated\nimport requests\n");

    let outcome = resolved_json(&batch, &[]);
    assert_eq!(outcome["kind"], "success");
    assert_eq!(outcome["dependencies"], Value::Null);
}

#[test]
fn batch_without_an_active_file_reports_null_dependencies() {
    let temp = tempfile::tempdir().unwrap();
    let batch = temp.path().join("batch.json");
    fs::write(
        &batch,
        r#"[{"name": "lib.py", "content": "import requests", "active": false}]"#,
    )
    .unwrap();

    let assert = pier()
        .args(["--json", "resolve"])
        .arg(&batch)
        .arg("--no-probe")
        .assert()
        .success();
    let outcome: Value =
        serde_json::from_str(&String::from_utf8(assert.get_output().stdout.clone()).unwrap())
            .unwrap();
    assert_eq!(outcome["dependencies"], Value::Null);
}

#[test]
fn duplicate_metadata_blocks_exit_with_a_user_error() {
    let temp = tempfile::tempdir().unwrap();
    let block = "# /// script\n# dependencies = [\"httpx\"]\n# ///\n";
    let batch = write_batch(temp.path(), &format!("{block}\n{block}"));

    pier()
        .arg("resolve")
        .arg(&batch)
        .arg("--no-probe")
        .assert()
        .code(1)
        .stderr(predicates::str::contains("multiple"));
}

#[test]
fn human_output_lists_the_dependencies() {
    let temp = tempfile::tempdir().unwrap();
    let batch = write_batch(temp.path(), "import requests\nimport rich\n");

    pier()
        .arg("resolve")
        .arg(&batch)
        .arg("--no-probe")
        .assert()
        .success()
        .stdout(predicates::str::contains("requests, rich, pygments"));
}

#[test]
fn missing_batch_file_is_an_error() {
    pier()
        .arg("resolve")
        .arg("does-not-exist.json")
        .arg("--no-probe")
        .assert()
        .failure();
}
