//! Smoke tests to verify command wiring

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_top_level_help() {
    let mut cmd = Command::cargo_bin("itemctl").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("init-db"));
}

#[test]
fn test_serve_help() {
    let mut cmd = Command::cargo_bin("itemctl").unwrap();
    cmd.arg("serve").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Port to listen on"))
        .stdout(predicate::str::contains("DB_POOL_MAX"));
}

#[test]
fn test_init_db_help() {
    let mut cmd = Command::cargo_bin("itemctl").unwrap();
    cmd.arg("init-db").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("DATABASE_URL"));
}

#[test]
fn test_invalid_port_rejected() {
    let mut cmd = Command::cargo_bin("itemctl").unwrap();
    cmd.arg("serve").arg("--port").arg("not-a-port");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_bad_database_url_fails_fast() {
    let mut cmd = Command::cargo_bin("itemctl").unwrap();
    cmd.arg("init-db")
        .arg("--database-url")
        .arg("not a url")
        .env_remove("RUST_LOG");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to create database pool"));
}
