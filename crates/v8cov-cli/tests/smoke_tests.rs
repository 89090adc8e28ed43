//! Smoke tests for the v8cov CLI
//!
//! Run the real binary against V8 coverage fixtures written to a temp dir.

#![allow(deprecated)] // Allow deprecated Command::cargo_bin until assert_cmd is updated
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Get a command for the v8cov binary, isolated from the caller's environment
fn v8cov() -> Command {
    let mut cmd = Command::cargo_bin("v8cov").expect("v8cov binary should exist");
    cmd.env_remove("V8COV_COVERAGE_PATH")
        .env_remove("V8COV_OUTPUT_TYPE")
        .env_remove("V8COV_LOG")
        .env_remove("V8COV_LOG_FORMAT");
    cmd
}

const APP: &str = "function used() {\n  return 1;\n}\nfunction unused() {\n  return 2;\n}\nused();\n";

/// Coverage dir with one app script, one node_modules script and one internal script
struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let app = dir.path().join("src/app.js");
        let dep = dir.path().join("node_modules/dep/index.js");
        for path in [&app, &dep] {
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, APP).unwrap();
        }

        let functions = r#"[
            {"functionName":"","isBlockCoverage":false,"ranges":[{"startOffset":0,"endOffset":74,"count":1}]},
            {"functionName":"used","isBlockCoverage":false,"ranges":[{"startOffset":0,"endOffset":31,"count":1}]},
            {"functionName":"unused","isBlockCoverage":false,"ranges":[{"startOffset":32,"endOffset":65,"count":0}]}
        ]"#;
        let json = format!(
            r#"{{"result":[
                {{"scriptId":"1","url":"file://{}","functions":{functions}}},
                {{"scriptId":"2","url":"file://{}","functions":{functions}}},
                {{"scriptId":"3","url":"node:internal/main/run_main_module","functions":[]}}
            ]}}"#,
            app.display(),
            dep.display(),
        );
        let cov = dir.path().join("cov");
        fs::create_dir_all(&cov).unwrap();
        fs::write(cov.join("coverage-1234-5678-0.json"), json).unwrap();
        fs::write(cov.join("notes.txt"), "not coverage").unwrap();
        Self { dir }
    }

    fn cov(&self) -> PathBuf {
        self.dir.path().join("cov")
    }

    fn app(&self) -> String {
        self.dir.path().join("src/app.js").display().to_string()
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("{}: {e}", path.display()))
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    v8cov()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_flag() {
    v8cov()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--coverage-path"))
        .stdout(predicate::str::contains("--output-type"))
        .stdout(predicate::str::contains("--exclude"));
}

#[test]
fn test_coverage_path_required() {
    v8cov()
        .assert()
        .failure()
        .stderr(predicate::str::contains("--coverage-path"));
}

// ============================================================================
// Output validation
// ============================================================================

#[test]
fn test_file_and_dir_rejected() {
    let fx = Fixture::new();
    v8cov()
        .arg("-c")
        .arg(fx.cov())
        .args(["-o", "a.json", "-d", "out"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "Error: Cannot specify both outputDir and outputFile",
        ));
}

#[test]
fn test_html_requires_dir() {
    let fx = Fixture::new();
    v8cov()
        .arg("-c")
        .arg(fx.cov())
        .args(["-t", "html"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "Output directory is required for html output",
        ));
}

#[test]
fn test_lcov_rejects_output_file() {
    let fx = Fixture::new();
    v8cov()
        .arg("-c")
        .arg(fx.cov())
        .args(["-t", "lcov", "-o"])
        .arg(fx.path("lcov.info"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("produces multiple files"));
}

#[test]
fn test_missing_coverage_path() {
    v8cov()
        .args(["-c", "/nonexistent/v8cov/coverage"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("/nonexistent/v8cov/coverage"));
}

#[test]
fn test_invalid_coverage_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("coverage-bad.json"), r#"{"result":[{"url":"x"}]}"#).unwrap();
    v8cov()
        .arg("-c")
        .arg(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("coverage-bad.json"));
}

// ============================================================================
// Reports
// ============================================================================

#[test]
fn test_json_to_stdout() {
    let fx = Fixture::new();
    let output = v8cov().arg("-c").arg(fx.cov()).assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();

    let map: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let files = map.as_object().unwrap();
    assert_eq!(files.len(), 1, "node_modules and non-file scripts are dropped");

    let app = &map[fx.app()];
    assert_eq!(app["path"], fx.app());
    assert_eq!(app["all"], false);
    assert_eq!(app["fnMap"]["0"]["name"], "used");
    assert_eq!(app["f"]["1"], 0);
    assert_eq!(app["s"]["4"], 0);
    assert_eq!(app["s"]["6"], 1);
}

#[test]
fn test_custom_exclude_keeps_node_modules() {
    let fx = Fixture::new();
    let output = v8cov()
        .arg("-c")
        .arg(fx.cov())
        .args(["-e", "**/nothing/**"])
        .assert()
        .success();
    let map: serde_json::Value = serde_json::from_slice(&output.get_output().stdout).unwrap();
    assert_eq!(map.as_object().unwrap().len(), 2);
}

#[test]
fn test_exclude_accepts_a_list() {
    let fx = Fixture::new();
    let output = v8cov()
        .arg("-c")
        .arg(fx.cov())
        .args(["-e", "**/nothing/**", "**/src/**"])
        .assert()
        .success();
    let map: serde_json::Value = serde_json::from_slice(&output.get_output().stdout).unwrap();
    let files = map.as_object().unwrap();
    assert_eq!(files.len(), 1);
    assert!(files.keys().all(|k| k.contains("node_modules")));
}

#[test]
fn test_text_summary_to_stdout() {
    let fx = Fixture::new();
    v8cov()
        .arg("-c")
        .arg(fx.cov())
        .args(["-t", "text-summary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Coverage summary"))
        .stdout(predicate::str::contains("Statements   : 57.14% ( 4/7 )"))
        .stdout(predicate::str::contains("Functions    : 50% ( 1/2 )"));
}

#[test]
fn test_text_table_to_stdout() {
    let fx = Fixture::new();
    v8cov()
        .arg("-c")
        .arg(fx.cov())
        .args(["--output-type", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("% Stmts"))
        .stdout(predicate::str::contains("app.js"))
        .stdout(predicate::str::contains("4-6"));
}

#[test]
fn test_json_to_file() {
    let fx = Fixture::new();
    let out = fx.path("reports/final.json");
    v8cov()
        .arg("--coverage-path")
        .arg(fx.cov())
        .arg("--output-file")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let map: serde_json::Value = serde_json::from_str(&read(&out)).unwrap();
    assert!(map.get(fx.app()).is_some());
}

#[test]
fn test_lcov_dir() {
    let fx = Fixture::new();
    let out = fx.path("coverage");
    v8cov()
        .current_dir(fx.dir.path())
        .arg("-p")
        .arg(fx.cov())
        .args(["-t", "lcov", "-d"])
        .arg(&out)
        .assert()
        .success();

    let lcov = read(&out.join("lcov.info"));
    assert!(lcov.contains("SF:src/app.js\n"));
    assert!(lcov.contains("FNF:2\nFNH:1\nFNDA:1,used\nFNDA:0,unused\n"));
    assert!(lcov.contains("LF:7"));
    assert!(lcov.contains("LH:4"));
    assert!(out.join("lcov-report/index.html").exists());
}

#[test]
fn test_html_dir() {
    let fx = Fixture::new();
    let out = fx.path("html");
    v8cov()
        .arg("-c")
        .arg(fx.cov())
        .args(["-t", "html", "-d"])
        .arg(&out)
        .assert()
        .success();

    let index = read(&out.join("index.html"));
    assert!(index.contains("app.js.html"));
    let page = read(&out.join("app.js.html"));
    assert!(page.contains("function unused"));
}

#[test]
fn test_json_summary_and_cobertura() {
    let fx = Fixture::new();
    let out = fx.path("out");
    for t in ["json-summary", "cobertura"] {
        v8cov()
            .arg("-c")
            .arg(fx.cov())
            .args(["-t", t, "-d"])
            .arg(&out)
            .assert()
            .success();
    }
    let summary: serde_json::Value =
        serde_json::from_str(&read(&out.join("coverage-summary.json"))).unwrap();
    assert_eq!(summary["total"]["functions"]["covered"], 1);
    assert!(read(&out.join("cobertura-coverage.xml")).contains("<coverage"));
}

#[test]
fn test_missing_source_is_skipped() {
    let fx = Fixture::new();
    fs::remove_file(fx.path("src/app.js")).unwrap();
    let output = v8cov()
        .arg("-c")
        .arg(fx.cov())
        .args(["-e", "**/nothing/**"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Error processing"));
    let map: serde_json::Value = serde_json::from_slice(&output.get_output().stdout).unwrap();
    assert_eq!(map.as_object().unwrap().len(), 1);
}

#[test]
fn test_verbose_prints_summary() {
    let fx = Fixture::new();
    let out = fx.path("out");
    v8cov()
        .arg("-c")
        .arg(fx.cov())
        .args(["-v", "--color", "never", "-t", "lcovonly", "-d"])
        .arg(&out)
        .assert()
        .success()
        .stderr(predicate::str::contains("Converted 1 scripts"))
        .stderr(predicate::str::contains("lcov.info"));
}

#[test]
fn test_env_coverage_path() {
    let fx = Fixture::new();
    v8cov()
        .env("V8COV_COVERAGE_PATH", fx.cov())
        .env("V8COV_OUTPUT_TYPE", "text-summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("Coverage summary"));
}
