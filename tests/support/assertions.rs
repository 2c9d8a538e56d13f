//! Test assertion helpers.

use std::process::Output;

/// Assert that a command output was successful.
pub fn assert_success(output: &Output) {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("Command failed:\n{}", stderr);
    }
}

/// Assert that a command output failed.
pub fn assert_failure(output: &Output) {
    assert!(
        !output.status.success(),
        "Expected command to fail but it succeeded"
    );
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

pub fn assert_stdout_contains(output: &Output, expected: &str) {
    let out = stdout(output);
    assert!(
        out.contains(expected),
        "stdout missing '{}', got: {}",
        expected,
        out
    );
}

pub fn assert_stderr_contains(output: &Output, expected: &str) {
    let err = stderr(output);
    assert!(
        err.contains(expected),
        "stderr missing '{}', got: {}",
        expected,
        err
    );
}

pub fn assert_stdout_excludes(output: &Output, excluded: &str) {
    let out = stdout(output);
    assert!(
        !out.contains(excluded),
        "stdout should not contain '{}', got: {}",
        excluded,
        out
    );
}

/// The first `age1...` word on stdout.
pub fn public_key_in(output: &Output) -> String {
    stdout(output)
        .split_whitespace()
        .find(|word| word.starts_with("age1"))
        .unwrap_or_else(|| panic!("no public key in output: {}", stdout(output)))
        .to_string()
}

/// The encrypted challenge from invite/reissue instructions.
pub fn challenge_in(output: &Output) -> String {
    stdout(output)
        .lines()
        .find_map(|line| line.trim().strip_prefix("lockbox respond "))
        .unwrap_or_else(|| panic!("no challenge in output: {}", stdout(output)))
        .trim()
        .to_string()
}
