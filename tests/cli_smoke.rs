//! Behavioural smoke tests for the CLI entrypoint.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn help_lists_subcommands() {
    let mut cmd = cargo_bin_cmd!("oneprovider");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("templates"))
        .stdout(predicate::str::contains("rename-ssh-key"));
}

#[test]
fn missing_subcommand_prints_usage() {
    let mut cmd = cargo_bin_cmd!("oneprovider");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn malformed_endpoint_fails_before_any_request() {
    let mut cmd = cargo_bin_cmd!("oneprovider");
    cmd.arg("templates")
        .env("ONEPROVIDER_ENDPOINT", "not a uri")
        .env("ONEPROVIDER_API_KEY", "api")
        .env("ONEPROVIDER_CLIENT_KEY", "client")
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("configuration error"))
        .stderr(predicate::str::contains("not a uri"));
}

#[test]
fn missing_credentials_exit_with_configuration_error() {
    let mut cmd = cargo_bin_cmd!("oneprovider");
    cmd.arg("sizes")
        .env_remove("ONEPROVIDER_API_KEY")
        .env_remove("ONEPROVIDER_CLIENT_KEY")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("configuration error"));
}
