//! Error output and hints.

use crate::support::*;
use predicates::prelude::*;

#[test]
fn test_no_key_suggests_keygen() {
    let t = Test::new();
    let output = t.run(BOB, &["cred", "list"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "no private key");
    assert_stderr_contains(&output, "lockbox keygen");
}

#[test]
fn test_uninitialized_store_suggests_init() {
    let t = Test::new();
    t.keygen(BOB, BOB_EMAIL);

    let output = t.run(BOB, &["cred", "list"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "not initialized");
    assert_stderr_contains(&output, "lockbox init");
}

#[test]
fn test_missing_email_suggests_init() {
    let t = Test::init();
    assert_success(&t.run(BOB, &["keygen"]));

    let output = t.run(BOB, &["cred", "list"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "missing config field: email");
    assert_stderr_contains(&output, "lockbox init");
}

#[test]
fn test_outsider_denied() {
    let t = Test::init();
    t.keygen(CAROL, CAROL_EMAIL);

    let output = t.run(CAROL, &["cred", "list"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "access denied");
}

#[test]
fn test_completions() {
    let output = Test::new().run(ALICE, &["completions", "bash"]);
    assert_success(&output);
    assert_stdout_contains(&output, "lockbox");
}

#[test]
fn test_verbose_logs_to_stderr() {
    let t = Test::init();
    let output = t.run(ALICE, &["--verbose", "cred", "list", "--json"]);
    assert_success(&output);
    assert_stderr_contains(&output, "opening store");
    let refs: Vec<String> = serde_json::from_str(&stdout(&output)).unwrap();
    assert!(refs.is_empty());
}

#[test]
fn test_unknown_role_rejected_by_parser() {
    let t = Test::init();
    t.cmd(ALICE)
        .args(["team", "invite", BOB_EMAIL, "--role", "superuser"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid role"));
}

#[test]
fn test_errors_go_to_stderr_only() {
    let t = Test::new();
    t.cmd(BOB)
        .args(["env", "show", "web", "dev"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("✗"));
}
