use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn coursemap() -> Command {
    Command::cargo_bin("coursemap").expect("coursemap binary")
}

#[test]
fn ingest_then_stats_round_trip() {
    let dir = tempdir().expect("tempdir");
    let db = dir.path().join("courses.db");
    let csv_path = dir.path().join("catalog.csv");
    std::fs::write(
        &csv_path,
        "Program(s),UCEAP Official Title,UCEAP Semester Units\nRome,Roman History,3\nTokyo,Modern Japan,4\n",
    )
    .expect("write csv");

    coursemap()
        .arg("ingest")
        .arg("--db")
        .arg(&db)
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"imported\": 2"))
        .stdout(predicate::str::contains("Roman History"));

    coursemap()
        .arg("stats")
        .arg("--db")
        .arg(&db)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total\": 2"))
        .stdout(predicate::str::contains("\"programs\": 2"));
}

#[test]
fn reingest_replaces_the_previous_dataset() {
    let dir = tempdir().expect("tempdir");
    let db = dir.path().join("courses.db");
    let first = dir.path().join("first.csv");
    let second = dir.path().join("second.csv");
    std::fs::write(&first, "Program(s)\nRome\nTokyo\n").expect("write first");
    std::fs::write(&second, "Program(s)\nMadrid\n").expect("write second");

    coursemap()
        .arg("ingest")
        .arg("--db")
        .arg(&db)
        .arg(&first)
        .assert()
        .success();
    coursemap()
        .arg("ingest")
        .arg("--db")
        .arg(&db)
        .arg(&second)
        .assert()
        .success();

    coursemap()
        .arg("stats")
        .arg("--db")
        .arg(&db)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total\": 1"));
}

#[test]
fn ingest_reports_unreadable_input_files() {
    let dir = tempdir().expect("tempdir");
    let db = dir.path().join("courses.db");

    coursemap()
        .arg("ingest")
        .arg("--db")
        .arg(&db)
        .arg(dir.path().join("missing.xlsx"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read"));
}
