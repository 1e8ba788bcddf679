use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

#[allow(deprecated)]
fn whereami() -> Command {
    let mut cmd = Command::cargo_bin("whereami").expect("binary");
    cmd.env_remove("WHEREAMI_CONFIG").env_remove("RUST_LOG");
    cmd
}

fn write_source(name: &str, text: &str) -> (TempDir, std::path::PathBuf) {
    let temp = tempdir().unwrap();
    let path = temp.path().join(name);
    fs::write(&path, text).unwrap();
    (temp, path)
}

/// A function whose body is long enough that its header is outside the default window
fn long_function() -> String {
    let mut text = String::from(
        "namespace app {\n    int run(int argc, char **argv) {\n        while (keep_running_forever) {\n",
    );
    for i in 0..30 {
        text.push_str(&format!("            step({i});\n"));
    }
    text.push_str("        }\n    }\n}\n");
    text
}

#[test]
fn prints_chain_without_trailing_newline() {
    let (_temp, path) = write_source("main.cpp", &long_function());

    whereami()
        .arg(&path)
        .arg("30")
        .assert()
        .success()
        .stdout("..1: app {..2: int run(..3: while (keep_r$) {");
}

#[test]
fn nearby_ancestors_collapse_to_ellipsis() {
    let (_temp, path) = write_source("main.cpp", &long_function());

    whereami()
        .arg(&path)
        .arg("5")
        .assert()
        .success()
        .stdout("...");
}

#[test]
fn window_flag_controls_proximity() {
    let (_temp, path) = write_source("main.cpp", &long_function());

    whereami()
        .arg(&path)
        .arg("5")
        .arg("--window")
        .arg("0")
        .assert()
        .success()
        .stdout("..1: app {..2: int run(..3: while (keep_r$) {");
}

#[test]
fn full_flag_disables_truncation() {
    let (_temp, path) = write_source("main.cpp", &long_function());

    whereami()
        .arg(&path)
        .arg("30")
        .arg("--full")
        .assert()
        .success()
        .stdout("..1: app {..2: int run(..3: while (keep_running_forever) {");
}

#[test]
fn line_zero_prints_every_line() {
    let text = "a {\n    b;\n    c {\n        d;\n}\n";
    let (_temp, path) = write_source("five.c", text);

    let output = whereami().arg(&path).arg("0").output().expect("run");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[0].starts_with("1: 0: 0: "));
    assert!(lines[3].starts_with("4: 3: 8: "));
    assert!(stdout.ends_with('\n'));
}

#[test]
fn out_of_range_line_fails() {
    let (_temp, path) = write_source("three.c", "a;\nb;\nc;\n");

    whereami()
        .arg(&path)
        .arg("4")
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn missing_file_fails() {
    let temp = tempdir().unwrap();

    whereami()
        .arg(temp.path().join("nope.c"))
        .arg("1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not read file"));
}

#[test]
fn non_numeric_line_is_rejected() {
    let (_temp, path) = write_source("x.c", "x\n");

    whereami().arg(&path).arg("abc").assert().failure();
}

#[test]
fn control_bytes_are_reported_as_warnings() {
    let (_temp, path) = write_source("bell.c", "a\u{7};\n");

    whereami()
        .arg(&path)
        .arg("1")
        .assert()
        .success()
        .stdout("")
        .stderr(predicate::str::contains(
            "bell.c:1: unexpected non-printable character 0x07",
        ));
}

#[test]
fn quiet_still_reports_warnings() {
    let (_temp, path) = write_source("bell.c", "a\u{7};\n");

    whereami()
        .arg(&path)
        .arg("1")
        .arg("--quiet")
        .assert()
        .success()
        .stderr(predicate::str::contains("0x07"));
}

#[test]
fn json_output_is_structured() {
    let (_temp, path) = write_source("main.cpp", &long_function());

    let output = whereami()
        .arg(&path)
        .arg("30")
        .arg("--json")
        .output()
        .expect("run");
    assert!(output.status.success());

    let body: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    let report = &body[0];
    assert_eq!(report["line"], 30);
    assert_eq!(report["outer_line"], 3);
    assert_eq!(report["indentation"], 12);
    assert_eq!(report["chain"][1]["snippet"], "int run(");
    assert_eq!(report["elided"], false);
}

fn write_config(dir: &Path, text: &str) -> std::path::PathBuf {
    let path = dir.join("whereami.toml");
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn config_file_and_env_are_honored() {
    let (temp, path) = write_source("main.cpp", &long_function());
    let config = write_config(temp.path(), "proximity_window = 0\n");

    whereami()
        .arg(&path)
        .arg("5")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("..1: app {"));

    whereami()
        .env("WHEREAMI_CONFIG", &config)
        .arg(&path)
        .arg("5")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("..1: app {"));
}

#[test]
fn invalid_config_fails() {
    let (temp, path) = write_source("x.c", "x\n");
    let config = write_config(temp.path(), "tab_width = 0\n");

    whereami()
        .arg(&path)
        .arg("1")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not load config"));
}

#[test]
fn tab_width_flag_changes_indentation() {
    let (_temp, path) = write_source("tabs.c", "a {\n\tb;\n");

    let output = whereami()
        .arg(&path)
        .arg("0")
        .arg("--tab-width")
        .arg("4")
        .output()
        .expect("run");
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.lines().nth(1).unwrap().starts_with("2: 1: 4: "));
}
