#![cfg(feature = "cli")]

use assert_cmd::Command;
use predicates::str::contains as str_contains;
use tempfile::tempdir;

#[allow(deprecated)]
fn run_cli(script: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.env("SCHOOL_CALENDAR_BACKEND", "memory")
        .write_stdin(script.to_string())
        .assert()
}

#[test]
fn cli_adds_and_lists_a_class() {
    run_cli(
        "add class\nset subject Maths\nset group 6A\nset day mercredi\nset start 10:00\nset end 11:00\nsubmit\nlist classes\nquit\n",
    )
    .success()
    .stdout(str_contains("Class saved."))
    .stdout(str_contains("mercredi"))
    .stdout(str_contains("10:00-11:00"));
}

#[test]
fn cli_reports_validation_errors() {
    run_cli("add class\nset subject Maths\nset group 6A\nset start 08:00\nset end 07:00\nsubmit\nquit\n")
        .success()
        .stdout(str_contains("endTime: End time must be after start time"));
}

#[test]
fn cli_rejects_set_without_open_editor() {
    run_cli("set name Nothing\nquit\n")
        .success()
        .stdout(str_contains("No editor is open."));
}

#[test]
fn cli_adds_a_vacation_with_duration() {
    run_cli(
        "add vacation\nset name Printemps\nset startDate 2025-04-12\nset endDate 2025-04-27\nsubmit\nlist vacations\nquit\n",
    )
    .success()
    .stdout(str_contains("Vacation period saved."))
    .stdout(str_contains("| 16 "));
}

#[test]
fn cli_persists_to_json_directory() {
    let dir = tempdir().expect("temp dir");
    let data_dir = dir.path().to_string_lossy().to_string();

    #[allow(deprecated)]
    let mut first = Command::cargo_bin("cli").expect("cli binary");
    first
        .env("SCHOOL_CALENDAR_BACKEND", "json")
        .env("SCHOOL_CALENDAR_DATA_DIR", &data_dir)
        .write_stdin("add holiday\nset name Armistice\nset date 2024-11-11\nsubmit\nquit\n")
        .assert()
        .success()
        .stdout(str_contains("Holiday saved."));

    #[allow(deprecated)]
    let mut second = Command::cargo_bin("cli").expect("cli binary");
    second
        .env("SCHOOL_CALENDAR_BACKEND", "json")
        .env("SCHOOL_CALENDAR_DATA_DIR", &data_dir)
        .write_stdin("list holidays\nquit\n")
        .assert()
        .success()
        .stdout(str_contains("Armistice"));
}

#[test]
fn cli_exports_holidays_to_csv() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("entries.csv");
    let script = format!(
        "add holiday\nset name Noël\nset date 2024-12-25\nsubmit\nexport {}\nquit\n",
        path.display()
    );
    run_cli(&script).success().stdout(str_contains("Exported to"));
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("Noël"));
}
