//! End-to-end CLI tests for the filmfeed binary.
//!
//! None of these reach the network: they exit before the first fetch.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Command with an isolated config directory.
fn filmfeed(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("filmfeed").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env("HOME", config_home.path())
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_binary_help_displays_usage() {
    let home = TempDir::new().unwrap();
    filmfeed(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Wikipedia film articles"))
        .stdout(predicate::str::contains("--list-languages"));
}

#[test]
fn test_binary_version_displays_version() {
    let home = TempDir::new().unwrap();
    filmfeed(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("filmfeed"));
}

#[test]
fn test_binary_invalid_flag_returns_error() {
    let home = TempDir::new().unwrap();
    filmfeed(&home)
        .arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_binary_lists_languages() {
    let home = TempDir::new().unwrap();
    filmfeed(&home)
        .arg("--list-languages")
        .assert()
        .success()
        .stdout(predicate::str::contains("en"))
        .stdout(predicate::str::contains("zh-tw"))
        .stdout(predicate::str::contains("https://de.wikipedia.org/w/api.php"));
}

#[test]
fn test_binary_unknown_language_fails() {
    let home = TempDir::new().unwrap();
    filmfeed(&home)
        .args(["--language", "xx", "-q"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown language 'xx'"));
}

#[test]
fn test_binary_zero_pages_rejected() {
    let home = TempDir::new().unwrap();
    filmfeed(&home).args(["--pages", "0"]).assert().failure();
}

#[test]
fn test_binary_invalid_config_file_fails() {
    let home = TempDir::new().unwrap();
    let dir = home.path().join("filmfeed");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), "years_per_fetch = 0\n").unwrap();

    filmfeed(&home)
        .arg("-q")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config.toml"));
}

#[test]
fn test_binary_config_language_is_validated() {
    let home = TempDir::new().unwrap();
    let dir = home.path().join("filmfeed");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), "language = \"klingon\"\n").unwrap();

    filmfeed(&home)
        .arg("-q")
        .assert()
        .failure()
        .stderr(predicate::str::contains("language"));
}
