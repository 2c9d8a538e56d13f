//! Key and passphrase command tests.

use crate::support::*;

#[test]
fn test_keygen_then_whoami() {
    let t = Test::new();
    let key = t.keygen(BOB, BOB_EMAIL);
    assert!(key.starts_with("age1"));

    let output = t.run(BOB, &["whoami"]);
    assert_success(&output);
    assert_stdout_contains(&output, &key);
    assert_stdout_contains(&output, BOB_EMAIL);
    assert_stdout_contains(&output, "false");
}

#[test]
fn test_keygen_never_overwrites() {
    let t = Test::new();
    t.keygen(BOB, BOB_EMAIL);

    let output = t.run(BOB, &["keygen"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "already exists");
}

#[test]
fn test_protected_key_needs_passphrase() {
    let t = Test::new();
    let output = t
        .cmd(ALICE)
        .args(["init", "--email", ALICE_EMAIL, "--protect"])
        .env("LOCKBOX_PASSPHRASE", "open sesame")
        .output()
        .unwrap();
    assert_success(&output);

    // Not a terminal and no passphrase supplied.
    let output = t.run(ALICE, &["cred", "list"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "passphrase required");
    assert_stderr_contains(&output, "LOCKBOX_PASSPHRASE");

    let output = t.run(ALICE, &["--passphrase", "wrong", "cred", "list"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "invalid passphrase");

    let output = t.run(ALICE, &["--passphrase", "open sesame", "cred", "list"]);
    assert_success(&output);

    let output = t.run(ALICE, &["whoami"]);
    assert_success(&output);
    assert_stdout_contains(&output, "true");
}

#[test]
fn test_passphrase_remove() {
    let t = Test::new();
    let output = t
        .cmd(ALICE)
        .args(["keygen", "--protect"])
        .env("LOCKBOX_PASSPHRASE", "open sesame")
        .output()
        .unwrap();
    assert_success(&output);

    let output = t.run(ALICE, &["--passphrase", "open sesame", "passphrase", "remove"]);
    assert_success(&output);
    assert_stderr_contains(&output, "unencrypted");

    let output = t.run(ALICE, &["whoami"]);
    assert_stdout_contains(&output, "false");
}
