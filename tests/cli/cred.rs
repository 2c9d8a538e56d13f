//! Credential command tests.

use crate::support::*;

#[test]
fn test_add_show_remove() {
    let t = Test::init();
    let output = t.cred_add(ALICE, "github.com", "bot", "ghp_0123456789abcdef");
    assert_success(&output);
    assert_stdout_contains(&output, "saved");

    let output = t.run(ALICE, &["cred", "show", "github.com", "bot"]);
    assert_success(&output);
    assert_stdout_contains(&output, "robot");
    assert_stdout_contains(&output, "ghp_••••••••");
    assert_stdout_excludes(&output, "ghp_0123456789abcdef");

    let output = t.cred_reveal(ALICE, "github.com", "bot");
    assert_success(&output);
    assert_stdout_contains(&output, "ghp_0123456789abcdef");
    assert_stdout_contains(&output, ALICE_EMAIL);

    assert_success(&t.run(ALICE, &["cred", "rm", "github.com", "bot"]));
    let output = t.run(ALICE, &["cred", "show", "github.com", "bot"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "not found");
}

#[test]
fn test_list_json() {
    let t = Test::init();
    assert_success(&t.cred_add(ALICE, "github.com", "bot", "pw1"));
    assert_success(&t.cred_add(ALICE, "aws.amazon.com", "deploy", "pw2"));

    let output = t.run(ALICE, &["cred", "list", "--json"]);
    assert_success(&output);
    let refs: Vec<String> = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(refs, vec!["aws.amazon.com/deploy", "github.com/bot"]);
}

#[test]
fn test_empty_password_rejected() {
    let t = Test::init();
    let output = t.cred_add(ALICE, "github.com", "bot", "");
    assert_failure(&output);
    assert_stderr_contains(&output, "cannot be empty");
}

#[test]
fn test_stored_file_is_ciphertext() {
    let t = Test::init();
    assert_success(&t.cred_add(ALICE, "github.com", "bot", "hunter2-hunter2"));

    let bytes = std::fs::read(t.store().join("credentials/github.com/bot.age")).unwrap();
    let text = String::from_utf8_lossy(&bytes);
    assert!(!text.contains("hunter2-hunter2"));
    assert!(!text.contains("robot"));
}

#[test]
fn test_traversal_name_rejected() {
    let t = Test::init();
    let output = t.cred_add(ALICE, "..", "bot", "pw");
    assert_failure(&output);
    assert_stderr_contains(&output, "invalid website");
}
