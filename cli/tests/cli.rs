use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_cli_solve_prints_option_report() {
    let mut cmd = Command::cargo_bin("grtoolkit").unwrap();
    cmd.arg("solve")
        .arg("Eq(a_tan, dv_dt)")
        .arg("Eq(a_tan, r*alpha)")
        .args(["--find", "a_tan", "-k", "r=2", "-k", "alpha=3"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("OPTION 0\nFrom Equation: Eq(a_tan, dv_dt):\na_tan = [dv_dt]"))
        .stdout(predicate::str::contains("OPTION 1\nFrom Equation: Eq(a_tan, r*alpha):\na_tan = [6]"));
}

#[test]
fn test_cli_solve_raw_output() {
    let mut cmd = Command::cargo_bin("grtoolkit").unwrap();
    cmd.args(["solve", "Eq(x, x)", "Eq(y, 2*x)", "-f", "y", "-k", "x=4", "--raw"]);

    cmd.assert()
        .success()
        .stdout("True\n[8]\n");
}

#[test]
fn test_cli_solve_json_output() {
    let mut cmd = Command::cargo_bin("grtoolkit").unwrap();
    cmd.args(["solve", "v = d/t", "-f", "v", "-k", "d=100", "-k", "t=8", "--json"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"kind\": \"solutions\""))
        .stdout(predicate::str::contains("\"12.5\""));
}

#[test]
fn test_cli_malformed_equation_is_isolated() {
    let mut cmd = Command::cargo_bin("grtoolkit").unwrap();
    cmd.args(["solve", "Eq(x, 1", "Eq(x, 2)", "-f", "x", "--raw"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("error: Expression error"))
        .stdout(predicate::str::contains("[2]"));
}

#[test]
fn test_cli_strict_mode_fails() {
    let mut cmd = Command::cargo_bin("grtoolkit").unwrap();
    cmd.args(["solve", "Eq(x, 1", "Eq(x, 2)", "-f", "x", "--strict"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Expression error"));
}

#[test]
fn test_cli_invalid_target() {
    let mut cmd = Command::cargo_bin("grtoolkit").unwrap();
    cmd.args(["solve", "Eq(x, 1)", "-f", "dv/dt"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid variable 'dv/dt'"));
}

#[test]
fn test_cli_solve_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("kinematics.txt");
    fs::write(
        &path,
        "# tangential acceleration\nEq(a_tan, dv_dt)\n\nEq(a_tan, r*alpha)\n",
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("grtoolkit").unwrap();
    cmd.arg("solve")
        .arg("--file")
        .arg(&path)
        .args(["-f", "a_tan", "-k", "r=2", "-k", "alpha=3", "--raw", "--unknowns"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("[dv_dt]\n[6]\n"))
        .stdout(predicate::str::contains("Unknowns"));
}

#[test]
fn test_cli_no_equations() {
    let mut cmd = Command::cargo_bin("grtoolkit").unwrap();
    cmd.args(["solve", "-f", "x"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("No equations given"));
}

#[test]
fn test_cli_system() {
    let mut cmd = Command::cargo_bin("grtoolkit").unwrap();
    cmd.args(["system", "x + y = 3", "x - y = 1", "--json"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"kind\": \"unique\""))
        .stdout(predicate::str::contains("\"x\": \"2\""));
}

#[test]
fn test_cli_resistance() {
    let mut cmd = Command::cargo_bin("grtoolkit").unwrap();
    cmd.args(["resistance", "p=2", "l=10", "A=4"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("R = [5]"));
}

#[test]
fn test_cli_rlc_critically_damped() {
    let mut cmd = Command::cargo_bin("grtoolkit").unwrap();
    cmd.args(["rlc", "-R", "5", "-C", "0.16", "-L", "1", "A1=1", "A2=2", "t=0"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("critically damped"))
        .stdout(predicate::str::contains("i = [2]"));
}

#[test]
fn test_cli_rlc_rejects_zero_resistance() {
    let mut cmd = Command::cargo_bin("grtoolkit").unwrap();
    cmd.args(["rlc", "-R", "0", "-C", "0.16", "-L", "1"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("must be positive"));
}

#[test]
fn test_cli_quiet_prints_only_unknowns_table() {
    let mut cmd = Command::cargo_bin("grtoolkit").unwrap();
    cmd.args(["solve", "Eq(a_tan, dv_dt)", "-f", "a_tan", "--quiet", "--unknowns"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("OPTION").not())
        .stdout(predicate::str::contains("dv_dt"));
}
