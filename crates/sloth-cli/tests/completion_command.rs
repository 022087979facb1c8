use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

#[allow(deprecated)]
fn get_sloth_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("sloth")
}

#[test]
fn test_completion_bash_generates_script() {
    let mut cmd = Command::new(get_sloth_bin());
    cmd.arg("completion").arg("--shell").arg("bash");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("_sloth()"))
        .stdout(predicate::str::contains("complete -F _sloth"));
}

#[test]
fn test_completion_zsh_generates_script() {
    let mut cmd = Command::new(get_sloth_bin());
    cmd.arg("completion").arg("--shell").arg("zsh");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("#compdef sloth"));
}

#[test]
fn test_completion_invalid_shell() {
    let mut cmd = Command::new(get_sloth_bin());
    cmd.arg("completion").arg("--shell").arg("invalid-shell");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_completion_requires_shell_flag() {
    let mut cmd = Command::new(get_sloth_bin());
    cmd.arg("completion");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_completion_appears_in_main_help() {
    let mut cmd = Command::new(get_sloth_bin());
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("completion"))
        .stdout(predicate::str::contains("Generate shell completion"));
}
