//! Per-secret access command tests.

use crate::support::*;

#[test]
fn test_grant_limits_credential_to_list() {
    let t = Test::init();
    t.join(BOB, BOB_EMAIL, "dev");
    t.join(CAROL, CAROL_EMAIL, "dev");
    assert_success(&t.cred_add(ALICE, "github.com", "bot", "hunter2"));
    assert_success(&t.cred_reveal(CAROL, "github.com", "bot"));

    let output = t.run(ALICE, &["access", "grant", "github.com/bot", BOB_EMAIL]);
    assert_success(&output);
    assert_stdout_contains(&output, "can now read");

    let output = t.run(ALICE, &["access", "list", "github.com/bot"]);
    assert_success(&output);
    assert_stdout_contains(&output, BOB_EMAIL);
    assert_stdout_contains(&output, ALICE_EMAIL);
    assert_stdout_excludes(&output, CAROL_EMAIL);

    assert_success(&t.cred_reveal(BOB, "github.com", "bot"));
    assert_failure(&t.cred_reveal(CAROL, "github.com", "bot"));
}

#[test]
fn test_env_access_with_write() {
    let t = Test::init();
    t.join(BOB, BOB_EMAIL, "dev");
    assert_success(&t.env_set(ALICE, "web", "prod", "A=1"));

    assert_failure(&t.env_set(BOB, "web", "prod", "A=2"));

    let output = t.run(
        ALICE,
        &["access", "grant", "web/prod", BOB_EMAIL, "--env", "--level", "write"],
    );
    assert_success(&output);
    assert_success(&t.env_set(BOB, "web", "prod", "A=2"));

    let output = t.run(ALICE, &["env", "show", "web", "prod", "--format", "dotenv"]);
    assert_eq!(stdout(&output), "A=\"2\"\n");
}

#[test]
fn test_revoke_requires_explicit_entry() {
    let t = Test::init();
    t.join(BOB, BOB_EMAIL, "dev");
    assert_success(&t.cred_add(ALICE, "github.com", "bot", "pw"));

    let output = t.run(ALICE, &["access", "revoke", "github.com/bot", BOB_EMAIL]);
    assert_failure(&output);
    assert_stderr_contains(&output, "role-based");
}

#[test]
fn test_bad_secret_name() {
    let t = Test::init();
    let output = t.run(ALICE, &["access", "list", "no-slash"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "invalid path");
}
