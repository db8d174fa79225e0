//! End-to-end tests for the `sqlog` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn sqlog() -> Command {
    let mut cmd = Command::cargo_bin("sqlog").unwrap();
    cmd.env("RUST_LOG", "warn");
    cmd
}

#[test]
fn test_bench_reports_latency_and_cleans_up() {
    let tmp = TempDir::new().unwrap();
    sqlog()
        .args(["bench", "--rows", "20", "--cols", "5", "--dir"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Write time per row"))
        .stdout(predicate::str::contains("Write time per element"));

    assert!(!tmp.path().join("bench.db").exists());
}

#[test]
fn test_bench_keep_leaves_rows_on_disk() {
    let tmp = TempDir::new().unwrap();
    sqlog()
        .args(["bench", "--rows", "3", "--cols", "2", "--keep", "--dir"])
        .arg(tmp.path())
        .assert()
        .success();

    sqlog()
        .args(["query", "bench", "SELECT COUNT(*) AS n FROM bench", "-f", "json", "--dir"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"n\": 3"));
}

#[test]
fn test_create_columns_query_delete() {
    let tmp = TempDir::new().unwrap();

    sqlog()
        .args(["create", "runs", "--level", "WARNING", "--columns", "iter,score", "--dir"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("level WARNING"));

    sqlog()
        .args(["columns", "runs", "--dir"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout("iter\nscore\n");

    sqlog()
        .args(["query", "runs", "INSERT INTO runs VALUES (3, 1.5)", "--dir"])
        .arg(tmp.path())
        .assert()
        .success();

    sqlog()
        .args(["query", "runs", "SELECT score FROM runs ORDER BY iter DESC LIMIT 1", "--dir"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1.5"))
        .stdout(predicate::str::contains("(1 rows)"));

    // Dry run keeps the file
    sqlog()
        .args(["delete", "runs", "--dir"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"));
    assert!(tmp.path().join("runs.db").exists());

    sqlog()
        .args(["delete", "runs", "--force", "--dir"])
        .arg(tmp.path())
        .assert()
        .success();
    assert!(!tmp.path().join("runs.db").exists());

    sqlog()
        .args(["columns", "runs", "--dir"])
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_create_twice_fails() {
    let tmp = TempDir::new().unwrap();
    sqlog()
        .args(["create", "log", "--dir"])
        .arg(tmp.path())
        .assert()
        .success();
    sqlog()
        .args(["create", "log", "--dir"])
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_create_rejects_unknown_level() {
    let tmp = TempDir::new().unwrap();
    sqlog()
        .args(["create", "log", "--level", "circuital", "--dir"])
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid level"));
    assert!(!tmp.path().join("log.db").exists());
}

#[test]
fn test_create_from_yaml_config() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("logger.yaml");
    let yaml = format!(
        "name: metrics\ndir: {}\nlevel: error\ncolumns: [ts, loss, acc]\n",
        tmp.path().display()
    );
    std::fs::write(&config_path, yaml).unwrap();

    sqlog()
        .args(["create", "--config"])
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("columns: ts, loss, acc"));

    assert!(tmp.path().join("metrics.db").exists());
}

#[test]
fn test_list_loggers() {
    let tmp = TempDir::new().unwrap();
    for name in ["alpha", "beta"] {
        sqlog()
            .args(["create", name, "--dir"])
            .arg(tmp.path())
            .assert()
            .success();
    }

    sqlog()
        .arg("list")
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("alpha"))
        .stdout(predicate::str::contains("beta"))
        .stdout(predicate::str::contains("ts, data"));
}

#[test]
fn test_query_syntax_error_fails() {
    let tmp = TempDir::new().unwrap();
    sqlog()
        .args(["create", "log", "--dir"])
        .arg(tmp.path())
        .assert()
        .success();
    sqlog()
        .args(["query", "log", "SELEKT 1", "--dir"])
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("SQLite error"));
}
