//! Init command tests.

use crate::support::*;
use lockbox::core::constants::{RECIPIENTS_FILE, TEAM_FILE};

#[test]
fn test_init_creates_team_and_roster() {
    let t = Test::new();
    let output = t.init_as(ALICE, ALICE_EMAIL);
    assert_success(&output);
    assert_stdout_contains(&output, "initialized");
    assert_stdout_contains(&output, ALICE_EMAIL);

    let team = std::fs::read_to_string(t.store().join(TEAM_FILE)).unwrap();
    assert!(team.contains(ALICE_EMAIL));
    assert!(team.contains("admin"));

    let roster = std::fs::read_to_string(t.store().join(RECIPIENTS_FILE)).unwrap();
    assert!(roster.contains(&public_key_in(&output)));
}

#[test]
fn test_init_normalizes_email() {
    let t = Test::new();
    assert_success(&t.init_as(ALICE, "  Alice@Example.COM "));

    let output = t.run(ALICE, &["team", "list"]);
    assert_success(&output);
    assert_stdout_contains(&output, "alice@example.com (you)");
}

#[test]
fn test_init_twice_fails() {
    let t = Test::init();
    let output = t.init_as(ALICE, ALICE_EMAIL);
    assert_failure(&output);
    assert_stderr_contains(&output, "already exists");
}

#[test]
fn test_init_reuses_existing_key() {
    let t = Test::new();
    let key = t.keygen(ALICE, ALICE_EMAIL);

    let output = t.init_as(ALICE, ALICE_EMAIL);
    assert_success(&output);
    assert_stdout_contains(&output, "using existing key");
    assert_eq!(public_key_in(&output), key);
}

#[test]
fn test_init_rejects_bad_email() {
    let t = Test::new();
    let output = t.init_as(ALICE, "not-an-email");
    assert_failure(&output);
    assert_stderr_contains(&output, "invalid email");
    assert!(!t.store().join(TEAM_FILE).exists());
}
