use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

fn tally(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tally_cli").unwrap();
    cmd.env("TALLY_CLI_SCRIPT", "1")
        .env("TALLY_HOME", home.path())
        .env("RUST_LOG", "off");
    cmd
}

#[test]
fn script_mode_records_and_summarizes_a_month() {
    let home = TempDir::new().unwrap();
    let input = "\
add income 5000 Salary July pay --month 2025-07
add expense 500 Food Groceries --month 2025-07
month 2025-07
exit
";

    tally(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Recorded income $5,000.00 in Salary"))
        .stdout(contains("Income : $5,000.00"))
        .stdout(contains("Balance: $4,500.00"));

    let stored = std::fs::read_to_string(home.path().join("data/tally_transactions.json")).unwrap();
    assert!(stored.contains("\"Groceries\""));
}

#[test]
fn script_mode_reports_errors_and_keeps_going() {
    let home = TempDir::new().unwrap();
    let input = "\
add expense 12 Nonexistent Mystery item
frobnicate
settings mode professional
tax total 116 16
";

    tally(&home)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Unknown expense category `Nonexistent`"))
        .stdout(contains("Entry mode set to professional"))
        .stdout(contains("Base : $100.00"))
        .stdout(contains("Tax  : $16.00"));
}

#[test]
fn backup_round_trip_between_homes() {
    let first = TempDir::new().unwrap();
    let backup = first.path().join("backup.json");
    let input = format!(
        "category add expense Pets\nadd expense 42.5 Pets Vet visit --month 2025-03\nexport {}\n",
        backup.display()
    );
    tally(&first)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Exported 1 transaction(s)"));

    let second = TempDir::new().unwrap();
    let input = format!("import {}\nstats expense 2025-03\n", backup.display());
    tally(&second)
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Transactions: 1"))
        .stdout(contains("Pets"))
        .stdout(contains("100.0%"));
}

#[test]
fn clear_requires_confirmation_flag_in_scripts() {
    let home = TempDir::new().unwrap();
    tally(&home)
        .write_stdin("add income 10 Sales Lemonade stand\nclear\nclear --yes\nlist\n")
        .assert()
        .success()
        .stdout(contains("refusing to clear without `--yes`"))
        .stdout(contains("All data cleared."))
        .stdout(contains("No transactions recorded."));
}
