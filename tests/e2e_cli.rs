
use assert_cmd::{cargo, prelude::*};
use predicates::prelude::*;
use serde_json::Value;
use std::process::Command;
use tempfile::TempDir;
use workbook_helpers::sample_workbook;

/// Command running inside `dir`, so default file names resolve there
fn base_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("portfolio-report"));
    cmd.current_dir(dir.path());
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn report_prints_tables_and_returns_without_color() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let workbook = sample_workbook(&dir);

    let mut cmd = base_cmd(&dir);
    cmd.arg("--no-color")
        .arg("report")
        .arg(&workbook)
        .arg("--no-chart");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Invested by month"))
        .stdout(predicate::str::contains("Market_Value_%"))
        .stdout(predicate::str::contains("By asset allocation"))
        .stdout(predicate::str::contains("The simple return is 10.00%"))
        .stdout(predicate::str::contains("The annualized return is 4.88%"))
        .stdout(predicate::str::contains("\u{001b}[").not());

    assert!(!dir.path().join("Accum_Invested_Money.png").exists());
}

#[test]
fn default_run_reads_account_xlsx_and_draws_chart() {
    let dir = TempDir::new().expect("failed to create temp dir");
    sample_workbook(&dir);

    // No subcommand: report over ./Account.xlsx
    let mut cmd = base_cmd(&dir);
    cmd.arg("--no-color");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Chart saved to"))
        .stdout(predicate::str::contains("The simple return is 10.00%"));

    let chart = dir.path().join("Accum_Invested_Money.png");
    assert!(chart.exists(), "chart should be written next to the workbook");
    assert!(std::fs::metadata(&chart).expect("chart metadata").len() > 0);
}

#[test]
fn report_chart_can_be_svg() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let workbook = sample_workbook(&dir);

    let mut cmd = base_cmd(&dir);
    cmd.arg("--no-color")
        .arg("report")
        .arg(&workbook)
        .arg("--chart")
        .arg("invested.svg");

    cmd.assert().success();

    let svg = std::fs::read_to_string(dir.path().join("invested.svg")).expect("svg written");
    assert!(svg.contains("<svg"));
}

#[test]
fn report_json_is_machine_readable() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let workbook = sample_workbook(&dir);

    let mut cmd = base_cmd(&dir);
    cmd.arg("--json").arg("report").arg(&workbook).arg("--no-chart");

    let output = cmd.output().expect("failed to run");
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(json["monthly"].as_array().map(|a| a.len()), Some(4));
    assert_eq!(json["yearly"].as_array().map(|a| a.len()), Some(3));
    assert_eq!(json["breakdowns"].as_array().map(|a| a.len()), Some(5));
    assert_eq!(
        json["holdings"]["unheld"],
        Value::Array(vec![Value::String("WATCH".to_string())])
    );
    assert!(!json["returns"]["annualized"].is_null());
}

#[test]
fn config_file_points_at_workbook() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let workbook = sample_workbook(&dir);
    let renamed = dir.path().join("Broker.xlsx");
    std::fs::rename(&workbook, &renamed).expect("rename workbook");

    std::fs::write(
        dir.path().join("portfolio-report.toml"),
        "workbook = \"Broker.xlsx\"\nchart_path = \"broker.svg\"\n",
    )
    .expect("write config");

    let mut cmd = base_cmd(&dir);
    cmd.arg("--no-color").arg("report");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("The simple return is 10.00%"));
    assert!(dir.path().join("broker.svg").exists());
}

#[test]
fn unknown_config_key_is_rejected() {
    let dir = TempDir::new().expect("failed to create temp dir");
    sample_workbook(&dir);
    let config = dir.path().join("custom.toml");
    std::fs::write(&config, "colour = true\n").expect("write config");

    let mut cmd = base_cmd(&dir);
    cmd.arg("--config").arg(&config).arg("report").arg("--no-chart");

    cmd.assert().failure();
}

#[test]
fn missing_workbook_fails_with_message() {
    let dir = TempDir::new().expect("failed to create temp dir");

    let mut cmd = base_cmd(&dir);
    cmd.arg("--no-color").arg("report").arg("Missing.xlsx");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("workbook not found"));
}

#[test]
fn missing_sheet_lists_available_sheets() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let workbook = sample_workbook(&dir);

    let mut cmd = base_cmd(&dir);
    cmd.arg("report")
        .arg(&workbook)
        .arg("--prices-sheet")
        .arg("Prices")
        .arg("--no-chart");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("'Prices' not found"))
        .stderr(predicate::str::contains("Account, Last"));
}

#[test]
fn inspect_shows_sheets_and_columns() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let workbook = sample_workbook(&dir);

    let mut cmd = base_cmd(&dir);
    cmd.arg("--no-color")
        .arg("inspect")
        .arg(&workbook)
        .arg("--rows")
        .arg("2");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Account"))
        .stdout(predicate::str::contains("Last"))
        .stdout(predicate::str::contains("Acum_loc_quantity"))
        .stdout(predicate::str::contains("First 2 rows"))
        .stdout(predicate::str::contains("\u{001b}[").not());
}

#[test]
fn inspect_prices_sheet_as_json() {
    let dir = TempDir::new().expect("failed to create temp dir");
    let workbook = sample_workbook(&dir);

    let mut cmd = base_cmd(&dir);
    cmd.arg("--json")
        .arg("inspect")
        .arg(&workbook)
        .arg("--sheet")
        .arg("Last");

    let output = cmd.output().expect("failed to run");
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(json["sheet"], "Last");
    assert_eq!(json["data_rows"], 4);
}
