//! Integration tests for the calorieko binary.
//!
//! These tests verify end-to-end behavior including:
//! - Onboarding and profile persistence
//! - Calculator subcommands
//! - Journal logging, summaries and CSV export
//! - Chart JSON output
//! - Pairing and scan sequences

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn cli() -> Command {
    Command::cargo_bin("calorieko").expect("Failed to find calorieko binary")
}

/// CLI bound to a scratch data directory
fn cli_in(dir: &TempDir) -> Command {
    let mut cmd = cli();
    cmd.arg("--data-dir").arg(dir.path());
    cmd
}

fn onboard(dir: &TempDir) {
    cli_in(dir)
        .args([
            "onboard", "--age", "29", "--sex", "female", "--height", "160", "--weight", "65",
        ])
        .assert()
        .success();
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "CalorieKo nutrition and fitness calculator",
        ));
}

#[test]
fn test_onboard_saves_profile() {
    let dir = setup_test_dir();

    cli_in(&dir)
        .args([
            "onboard",
            "--age",
            "29",
            "--sex",
            "female",
            "--height",
            "160",
            "--weight",
            "65",
            "--calorie-target",
            "1800",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Profile saved"))
        .stdout(predicate::str::contains("BMI: 25.4 (Overweight)"))
        .stdout(predicate::str::contains("1800 kcal"));

    let profile = fs::read_to_string(dir.path().join("profile.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&profile).unwrap();
    assert_eq!(json["targets"]["daily_calories"], 1800);
    assert_eq!(json["biometrics"]["sex"], "female");
}

#[test]
fn test_onboard_rejects_invalid_height() {
    let dir = setup_test_dir();

    cli_in(&dir)
        .args([
            "onboard", "--age", "29", "--sex", "male", "--height", "0", "--weight", "64",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Height"));

    assert!(!dir.path().join("profile.json").exists());
}

#[test]
fn test_bmi_from_flags() {
    cli()
        .args(["bmi", "--weight", "70", "--height", "175"])
        .assert()
        .success()
        .stdout(predicate::str::contains("BMI: 22.9 (Normal)"));
}

#[test]
fn test_bmi_zero_height_fails() {
    cli()
        .args(["bmi", "--weight", "70", "--height", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("InvalidInput"));
}

#[test]
fn test_bmi_uses_saved_profile() {
    let dir = setup_test_dir();
    onboard(&dir);

    cli_in(&dir)
        .arg("bmi")
        .assert()
        .success()
        .stdout(predicate::str::contains("BMI: 25.4"));
}

#[test]
fn test_burn_with_activity() {
    cli()
        .args(["burn", "--activity", "running", "--minutes", "30", "--weight", "70"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Running: 291 kcal"));
}

#[test]
fn test_burn_with_explicit_met() {
    cli()
        .args(["burn", "--met", "8.3", "--minutes", "30", "--weight", "70"])
        .assert()
        .success()
        .stdout(predicate::str::contains("291 kcal"));
}

#[test]
fn test_burn_unknown_activity_fails() {
    cli()
        .args(["burn", "--activity", "teleporting", "--minutes", "30", "--weight", "70"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown activity"));
}

#[test]
fn test_pace() {
    cli()
        .args(["pace", "--distance-km", "5", "--seconds", "1650"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pace: 5:30 /km"))
        .stdout(predicate::str::contains("Speed: 10.9 km/h"));
}

#[test]
fn test_pace_zero_distance_fails() {
    cli()
        .args(["pace", "--distance-km", "0", "--seconds", "600"])
        .assert()
        .failure();
}

#[test]
fn test_log_and_summary() {
    let dir = setup_test_dir();

    cli_in(&dir)
        .args([
            "log", "meal", "--name", "Tapsilog", "--calories", "380", "--sodium", "820",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged Meal: Tapsilog"));

    cli_in(&dir)
        .args([
            "log",
            "workout",
            "--activity",
            "running",
            "--minutes",
            "30",
            "--weight",
            "70",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("291 kcal"));

    let journal = fs::read_to_string(dir.path().join("journal/activity.jsonl")).unwrap();
    assert_eq!(journal.lines().count(), 2);

    cli_in(&dir)
        .arg("summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("Consumed:  380 kcal"))
        .stdout(predicate::str::contains("Burned:    291 kcal"))
        .stdout(predicate::str::contains("Net:       89 kcal"))
        .stdout(predicate::str::contains("Sodium:    820 mg"));
}

#[test]
fn test_summary_demo() {
    let dir = setup_test_dir();

    cli_in(&dir)
        .args(["summary", "--demo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Net:       650 kcal"))
        .stdout(predicate::str::contains("Remaining: 1350 kcal"));
}

#[test]
fn test_summary_uses_profile_targets() {
    let dir = setup_test_dir();

    cli_in(&dir)
        .args([
            "onboard",
            "--age",
            "40",
            "--sex",
            "male",
            "--height",
            "180",
            "--weight",
            "80",
            "--calorie-target",
            "2500",
        ])
        .assert()
        .success();

    cli_in(&dir)
        .args(["summary", "--demo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Remaining: 1850 kcal"));
}

#[test]
fn test_week_demo() {
    cli()
        .args(["week", "--demo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Weekly average: 2031 kcal"));
}

#[test]
fn test_week_empty_journal() {
    let dir = setup_test_dir();

    cli_in(&dir)
        .arg("week")
        .assert()
        .success()
        .stdout(predicate::str::contains("No entries"));
}

#[test]
fn test_chart_json_output() {
    let output = cli()
        .args(["chart", "--kind", "calorie", "--bars", "0.6"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["axis_max"], 2500.0);
    assert_eq!(json["points"].as_array().unwrap().len(), 7);
    assert_eq!(json["grid"].as_array().unwrap().len(), 6);
    assert_eq!(json["bars"].as_array().unwrap().len(), 7);
}

#[test]
fn test_chart_from_csv() {
    let dir = setup_test_dir();
    let csv_path = dir.path().join("weight.csv");
    fs::write(&csv_path, "label,value\nW1,71.3\nW2,70.8\nW3,69.9\n").unwrap();

    let output = cli()
        .args(["chart", "--kind", "weight", "--csv"])
        .arg(&csv_path)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["axis_min"], 68.0);
    assert_eq!(json["axis_max"], 72.0);
    assert_eq!(json["kind"], "weight");
}

#[test]
fn test_export_creates_csv() {
    let dir = setup_test_dir();

    for name in ["Lugaw", "Pancit"] {
        cli_in(&dir)
            .args(["log", "meal", "--name", name, "--calories", "300"])
            .assert()
            .success();
    }

    let out = dir.path().join("daily.csv");
    cli_in(&dir)
        .args(["export", "--output"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 days"));

    let contents = fs::read_to_string(&out).unwrap();
    assert!(contents.contains("date,consumed,burned,net,sodium_mg"));
    assert!(contents.contains(",600,0,600,0"));
}

#[test]
fn test_met_table() {
    cli()
        .arg("met")
        .assert()
        .success()
        .stdout(predicate::str::contains("Running"))
        .stdout(predicate::str::contains("8.3"));
}

#[test]
fn test_pair_instant() {
    cli()
        .args(["pair", "--instant"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Searching"))
        .stdout(predicate::str::contains("Connecting"))
        .stdout(predicate::str::contains("Pairing finished: Connected"));
}

#[test]
fn test_scan_forced_outcomes() {
    cli()
        .args(["scan", "--instant", "--outcome", "success"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DetectingDish"))
        .stdout(predicate::str::contains("dish recognised"));

    cli()
        .args(["scan", "--instant", "--outcome", "failure"])
        .assert()
        .success()
        .stdout(predicate::str::contains("could not recognise dish"));
}

#[test]
fn test_scan_seed_is_reproducible() {
    let run = || {
        cli()
            .args(["scan", "--instant", "--seed", "1234"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone()
    };

    assert_eq!(run(), run());
}

#[test]
fn test_custom_config_timings() {
    let dir = setup_test_dir();
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        "[sequencer]\nsearch_ms = 1\nconnect_ms = 1\n",
    )
    .unwrap();

    cli()
        .arg("--config")
        .arg(&config_path)
        .arg("pair")
        .assert()
        .success()
        .stdout(predicate::str::contains("Connected"));
}

#[test]
fn test_log_meal_rejects_out_of_range_calories() {
    let dir = setup_test_dir();

    cli_in(&dir)
        .args(["log", "meal", "--name", "Lechon", "--calories", "2147483647"])
        .assert()
        .failure();

    cli_in(&dir)
        .args(["log", "meal", "--name", "Lechon", "--calories", "-5"])
        .assert()
        .failure();

    assert!(!dir.path().join("journal/activity.jsonl").exists());
}

#[test]
fn test_log_workout_rejects_impossible_burn() {
    let dir = setup_test_dir();

    cli_in(&dir)
        .args([
            "log",
            "workout",
            "--activity",
            "running",
            "--minutes",
            "100000000",
            "--weight",
            "70",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("InvalidInput"));

    assert!(!dir.path().join("journal/activity.jsonl").exists());
}

#[test]
fn test_chart_from_journal() {
    let dir = setup_test_dir();

    for (name, kcal) in [("Tapsilog", "380"), ("Sinigang", "420")] {
        cli_in(&dir)
            .args(["log", "meal", "--name", name, "--calories", kcal])
            .assert()
            .success();
    }

    let output = cli_in(&dir)
        .args(["chart", "--kind", "calorie", "--from-journal"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let points = json["points"].as_array().unwrap();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0]["value"], 800.0);
    assert_eq!(json["axis_max"], 1000.0);
}

#[test]
fn test_chart_from_empty_journal_fails() {
    let dir = setup_test_dir();

    cli_in(&dir)
        .args(["chart", "--kind", "sodium", "--from-journal"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("EmptySeries"));
}

#[test]
fn test_met_table_by_category() {
    cli()
        .args(["met", "--category", "sports"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sports"))
        .stdout(predicate::str::contains("Running").not());
}

#[test]
fn test_debug_logging_reports_paths() {
    let dir = setup_test_dir();

    cli_in(&dir)
        .env("RUST_LOG", "debug")
        .arg("met")
        .assert()
        .success()
        .stderr(predicate::str::contains("Using profile"));
}
