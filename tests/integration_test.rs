//! Integration tests for the bank ledger CLI.
//!
//! These tests run the actual binary against temporary command scripts and
//! verify the emitted account states and history rows.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

/// Run the binary against a script written to a temp file.
fn run_script(script: &str) -> assert_cmd::assert::Assert {
    let mut file = NamedTempFile::new().expect("create temp file");
    write!(file, "{}", script).expect("write script");

    let mut cmd = Command::cargo_bin("bank-ledger").expect("binary exists");
    cmd.arg(file.path()).assert()
}

#[test]
fn test_end_to_end_balances() {
    let script = "\
op,account,to,amount,name,kind
open,,,1000.00,Alice,Savings
open,,,500.00,Bob,Checking
deposit,1,,200.00,,
withdraw,1,,300.00,,
transfer,1,2,100.00,,";

    run_script(script)
        .success()
        .stdout(predicate::str::contains("account,name,kind,balance,avg_amount"))
        .stdout(predicate::str::contains("1,Alice,Savings,800.00"))
        .stdout(predicate::str::contains("2,Bob,Checking,600.00"));
}

#[test]
fn test_average_tracks_unflagged_transactions() {
    let script = "\
op,account,to,amount,name,kind
open,,,1000.00,Alice,Savings
deposit,1,,200.00,,
withdraw,1,,300.00,,";

    run_script(script)
        .success()
        .stdout(predicate::str::contains("1,Alice,Savings,900.00,500.00"));
}

#[test]
fn test_high_frequency_scenario_flags_transactions() {
    let mut script = String::from(
        "op,account,to,amount,name,kind\nopen,,,1000.00,Fraudster One,Checking\n",
    );
    for _ in 0..11 {
        script.push_str("deposit,1,,1.00,,\n");
    }
    script.push_str("history,1,,,,\n");

    run_script(&script)
        .success()
        .stdout(predicate::str::contains("High transaction frequency detected."));
}

#[test]
fn test_anomalous_amount_scenario_flags_the_large_deposit() {
    let script = "\
op,account,to,amount,name,kind
open,,,100.00,Fraudster Two,Savings
deposit,1,,150.00,,
deposit,1,,5000.00,,
history,1,,,,";

    run_script(script)
        .success()
        .stdout(predicate::str::contains(
            "tx,1,3,DEPOSIT,5000.00,true,Transaction amount is significantly higher than average.",
        ))
        .stdout(predicate::str::contains("tx,1,2,DEPOSIT,150.00,false,"));
}

#[test]
fn test_rejected_rows_do_not_stop_the_script() {
    let script = "\
op,account,to,amount,name,kind
open,,,100.00,Alice,Savings
withdraw,1,,500.00,,
frobnicate,1,,1.00,,
deposit,42,,1.00,,
deposit,1,,25.00,,";

    run_script(script)
        .success()
        .stdout(predicate::str::contains("1,Alice,Savings,125.00"));
}

#[test]
fn test_missing_argument_prints_usage() {
    Command::cargo_bin("bank-ledger")
        .expect("binary exists")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage: bank-ledger"));
}

#[test]
fn test_missing_input_file_fails() {
    Command::cargo_bin("bank-ledger")
        .expect("binary exists")
        .arg("no-such-file.csv")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}
