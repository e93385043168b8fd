use std::fs;
use std::process::Command;

use serde_json::Value;

const TABLE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/debug_data.csv");

#[test]
fn generate_json_to_file() {
    let exe = env!("CARGO_BIN_EXE_raritygen");
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("combinations.json");
    let ledger = dir.path().join("ledger.csv");

    let status = Command::new(exe)
        .args([
            "generate",
            TABLE,
            "-n",
            "5",
            "--output",
            output.to_str().unwrap(),
            "--ledger",
            ledger.to_str().unwrap(),
        ])
        .status()
        .expect("generate failed");
    assert!(status.success());

    let json: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    let map = json.as_object().unwrap();
    assert_eq!(map.len(), 5);
    assert_eq!(json["0"]["Block1"], "Cobble");

    let ledger = fs::read_to_string(&ledger).unwrap();
    assert_eq!(ledger.lines().count(), 10);
}

#[test]
fn generate_all_as_csv_to_stdout() {
    let exe = env!("CARGO_BIN_EXE_raritygen");
    let output = Command::new(exe)
        .args(["generate", TABLE, "-n", "-1", "--format", "csv"])
        .output()
        .expect("generate failed");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.ends_with("\n\n"));
    let mut lines = stdout.lines();
    assert_eq!(lines.next(), Some("Block1,Block2,Block3"));
    assert_eq!(lines.count(), 27);
}

#[test]
fn json_stdout_ends_with_one_newline() {
    let exe = env!("CARGO_BIN_EXE_raritygen");
    let output = Command::new(exe)
        .args(["generate", TABLE, "-n", "2"])
        .output()
        .expect("generate failed");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.ends_with("}\n"));
    let json: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json.as_object().unwrap().len(), 2);
}

#[test]
fn catalog_summary_lists_features() {
    let exe = env!("CARGO_BIN_EXE_catalog_summary");
    let output = Command::new(exe).arg(TABLE).output().expect("summary failed");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Block1 (3 traits)"));
    assert!(stdout.contains("27 possible combinations"));
}

#[test]
fn catalog_summary_without_table_prints_usage() {
    let exe = env!("CARGO_BIN_EXE_catalog_summary");
    let output = Command::new(exe).output().expect("summary failed");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage:"));
    assert!(stderr.contains("<table_csv>"));
}

#[test]
fn runs_are_reproducible() {
    let exe = env!("CARGO_BIN_EXE_raritygen");
    let run = || {
        Command::new(exe)
            .args(["generate", TABLE, "-n", "12"])
            .output()
            .expect("generate failed")
            .stdout
    };
    assert_eq!(run(), run());
}

#[test]
fn over_capacity_exits_with_hint() {
    let exe = env!("CARGO_BIN_EXE_raritygen");
    let output = Command::new(exe)
        .args(["generate", TABLE, "-n", "28"])
        .output()
        .expect("run failed");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("possible count is 27"));
    assert!(output.stdout.is_empty());
}

#[test]
fn missing_table_reports_path() {
    let exe = env!("CARGO_BIN_EXE_raritygen");
    let output = Command::new(exe)
        .args(["inspect", "no_such_table.csv"])
        .output()
        .expect("run failed");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no_such_table.csv"));
}

#[test]
fn inspect_prints_universe_size() {
    let exe = env!("CARGO_BIN_EXE_raritygen");
    let output = Command::new(exe)
        .args(["inspect", TABLE])
        .output()
        .expect("run failed");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Block2: 3 traits"));
    assert!(stdout.contains("possible combinations: 27"));
}

#[test]
fn report_prints_series() {
    let exe = env!("CARGO_BIN_EXE_raritygen");
    let output = Command::new(exe)
        .args(["report", TABLE, "--points", "3"])
        .output()
        .expect("run failed");
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    let points = json.as_array().unwrap();
    assert_eq!(points.len(), 3);
    assert_eq!(points[2]["combinations_count"].as_f64().unwrap(), 27.0);
    assert_eq!(points[0]["features"].as_array().unwrap().len(), 3);
}

#[test]
fn config_enables_preprocessors() {
    let exe = env!("CARGO_BIN_EXE_raritygen");
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    fs::write(
        &config,
        "[table]\npreprocessors = [\"fill-feature-names\", \"normalize-weights\"]\n",
    )
    .unwrap();
    let table = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/sheet_export.csv");

    let output = Command::new(exe)
        .args([
            "generate",
            table,
            "--config",
            config.to_str().unwrap(),
            "--format",
            "csv",
        ])
        .output()
        .expect("run failed");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let rows: Vec<&str> = stdout.lines().filter(|l| !l.is_empty()).collect();
    assert_eq!(rows[0], "Background,Eyes");
    assert_eq!(rows[1], "Blue,Round");
    assert_eq!(rows.len(), 5);
}

#[test]
fn unnormalized_table_is_rejected_without_config() {
    let exe = env!("CARGO_BIN_EXE_raritygen");
    let table = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/sheet_export.csv");
    let output = Command::new(exe)
        .args(["generate", table])
        .output()
        .expect("run failed");
    assert!(!output.status.success());
}
