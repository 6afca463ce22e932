use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::tempdir;

fn cli(home: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("fintrack_cli").unwrap();
    cmd.env("FINTRACK_CLI_SCRIPT", "1")
        .env("FINTRACK_HOME", home)
        .env("NO_COLOR", "1")
        .env("RUST_LOG", "off");
    cmd
}

#[test]
fn script_mode_runs_basic_flow() {
    let home = tempdir().unwrap();
    let input = "add Coffee 4.50 2024-01-01 expense\n\
                 add Salary 2000 2024-01-02 income\n\
                 filter income\n\
                 view\n\
                 summary\n\
                 exit\n";

    cli(home.path())
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Added"))
        .stdout(contains("Filter set to income"))
        .stdout(contains("Balance: $1995.50"));

    let json = std::fs::read_to_string(home.path().join("transactions.json")).unwrap();
    assert!(json.contains("\"Coffee\""));
    assert!(json.contains("\"isExpense\":true"));
}

#[test]
fn script_mode_keeps_going_after_bad_input() {
    let home = tempdir().unwrap();
    let input = "add Coffee zero 2024-01-01 expense\n\
                 frobnicate\n\
                 add \"Morning coffee\" 4.50 2024-01-01 expense\n\
                 list\n";

    cli(home.path())
        .write_stdin(input)
        .assert()
        .success()
        .stderr(contains("is not a number"))
        .stderr(contains("unknown command"))
        .stdout(contains("Morning coffee"));
}

#[test]
fn remove_requires_confirmation() {
    let home = tempdir().unwrap();
    cli(home.path())
        .write_stdin("add Coffee 4.50 2024-01-01 expense\n")
        .assert()
        .success();

    let json = std::fs::read_to_string(home.path().join("transactions.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let id = value[0]["id"].as_str().unwrap().to_string();

    cli(home.path())
        .write_stdin(format!("remove {id}\nsummary\n"))
        .assert()
        .success()
        .stderr(contains("--yes"))
        .stdout(contains("Expense: $4.50"));

    cli(home.path())
        .write_stdin(format!("remove {id} --yes\nsummary\n"))
        .assert()
        .success()
        .stdout(contains("Removed").and(contains("Balance: $0.00")));
}
