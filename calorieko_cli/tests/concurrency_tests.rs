//! Concurrency tests for the calorieko binary.
//!
//! These tests verify that multiple processes can safely:
//! - Append to the activity journal simultaneously (file locking)
//! - Read the journal while it is being written
//! - Save the profile without leaving temp files behind

use assert_cmd::Command;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

fn cli() -> Command {
    Command::cargo_bin("calorieko").expect("Failed to find calorieko binary")
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

#[test]
fn test_parallel_journal_appends() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let data_dir = data_dir.clone();
            thread::spawn(move || {
                cli()
                    .arg("--data-dir")
                    .arg(&data_dir)
                    .args(["log", "meal", "--name"])
                    .arg(format!("Meal {}", i))
                    .args(["--calories", "250", "--sodium", "300"])
                    .assert()
                    .success();
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("logging thread panicked");
    }

    let journal_path = data_dir.join("journal/activity.jsonl");
    let content = std::fs::read_to_string(&journal_path).expect("Failed to read journal");

    // Every line must be a complete record
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines.len(), 8, "Expected 8 records, got {}", lines.len());
    for line in lines {
        let value: serde_json::Value =
            serde_json::from_str(line).expect("journal line was torn by a concurrent writer");
        assert_eq!(value["entry"]["calories"], 250);
    }
}

#[test]
fn test_reads_during_writes() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    let writer_dir = data_dir.clone();
    let writer = thread::spawn(move || {
        for i in 0..5 {
            thread::sleep(Duration::from_millis(i * 5));
            cli()
                .arg("--data-dir")
                .arg(&writer_dir)
                .args(["log", "meal", "--name", "Turon", "--calories", "200"])
                .assert()
                .success();
        }
    });

    for _ in 0..5 {
        cli()
            .arg("--data-dir")
            .arg(&data_dir)
            .arg("summary")
            .assert()
            .success();
    }

    writer.join().expect("writer thread panicked");

    let output = cli()
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("summary")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8_lossy(&output);
    assert!(stdout.contains("Consumed:  1000 kcal"), "{}", stdout);
}

#[test]
fn test_repeated_onboarding_keeps_single_profile() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let data_dir = data_dir.clone();
            thread::spawn(move || {
                cli()
                    .arg("--data-dir")
                    .arg(&data_dir)
                    .args(["onboard", "--age", "30", "--sex", "male", "--height", "175"])
                    .arg("--weight")
                    .arg(format!("{}", 70 + i))
                    .assert()
                    .success();
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("onboarding thread panicked");
    }

    let files: Vec<_> = std::fs::read_dir(&data_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(files, vec!["profile.json".to_string()]);

    let profile = std::fs::read_to_string(data_dir.join("profile.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&profile).expect("profile is valid JSON");
    assert_eq!(json["biometrics"]["age_years"], 30);
}
