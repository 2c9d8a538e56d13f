//! Team command tests: the full invite, verify, revoke cycle across
//! separate users.

use crate::support::*;

/// Alice invites Bob with an unverified key; Bob answers the challenge.
fn invite_and_verify(t: &Test) -> String {
    let key = t.keygen(BOB, BOB_EMAIL);

    let output = t.run(ALICE, &["team", "invite", BOB_EMAIL, "--key", &key, "--role", "dev"]);
    assert_success(&output);
    let challenge = challenge_in(&output);

    let output = t.run(BOB, &["respond", &challenge]);
    assert_success(&output);
    let response = stdout(&output).trim().to_string();

    let output = t.run(ALICE, &["team", "verify", BOB_EMAIL, &response]);
    assert_success(&output);
    assert_stdout_contains(&output, "verified");
    key
}

#[test]
fn test_invite_verify_and_read() {
    let t = Test::init();
    assert_success(&t.cred_add(ALICE, "github.com", "bot", "hunter2"));

    let key = t.keygen(BOB, BOB_EMAIL);
    let output = t.run(ALICE, &["team", "invite", BOB_EMAIL, "--key", &key]);
    assert_success(&output);
    let challenge = challenge_in(&output);

    // Pending: listed, but not yet a recipient.
    let output = t.run(ALICE, &["team", "pending"]);
    assert_stdout_contains(&output, BOB_EMAIL);
    let roster = std::fs::read_to_string(t.store().join(".lockbox-recipients")).unwrap();
    assert!(!roster.contains(&key));

    let response = stdout(&t.run(BOB, &["respond", &challenge])).trim().to_string();
    assert_success(&t.run(ALICE, &["team", "verify", BOB_EMAIL, &response]));
    let roster = std::fs::read_to_string(t.store().join(".lockbox-recipients")).unwrap();
    assert!(roster.contains(&key));

    // Existing secrets reach Bob after a re-encrypt.
    assert_failure(&t.cred_reveal(BOB, "github.com", "bot"));
    let output = t.run(ALICE, &["reencrypt"]);
    assert_success(&output);
    assert_stdout_contains(&output, "1/1");

    let output = t.cred_reveal(BOB, "github.com", "bot");
    assert_success(&output);
    assert_stdout_contains(&output, "hunter2");
}

#[test]
fn test_wrong_response_rejected() {
    let t = Test::init();
    let key = t.keygen(BOB, BOB_EMAIL);
    assert_success(&t.run(ALICE, &["team", "invite", BOB_EMAIL, "--key", &key]));

    let output = t.run(ALICE, &["team", "verify", BOB_EMAIL, "d3Jvbmc="]);
    assert_failure(&output);
    assert_stderr_contains(&output, "does not match");
    assert_stderr_contains(&output, "lockbox respond");
}

#[test]
fn test_reissue_replaces_challenge() {
    let t = Test::init();
    let key = t.keygen(BOB, BOB_EMAIL);
    let first = challenge_in(&t.run(ALICE, &["team", "invite", BOB_EMAIL, "--key", &key]));

    let output = t.run(ALICE, &["team", "reissue", BOB_EMAIL]);
    assert_success(&output);
    let second = challenge_in(&output);
    assert_ne!(first, second);

    let stale = stdout(&t.run(BOB, &["respond", &first])).trim().to_string();
    assert_failure(&t.run(ALICE, &["team", "verify", BOB_EMAIL, &stale]));

    let fresh = stdout(&t.run(BOB, &["respond", &second])).trim().to_string();
    assert_success(&t.run(ALICE, &["team", "verify", BOB_EMAIL, &fresh]));
}

#[test]
fn test_revoke_reencrypts() {
    let t = Test::init();
    invite_and_verify(&t);
    assert_success(&t.cred_add(ALICE, "github.com", "bot", "hunter2"));
    assert_success(&t.cred_reveal(BOB, "github.com", "bot"));

    let output = t.run(ALICE, &["team", "revoke", BOB_EMAIL]);
    assert_success(&output);
    assert_stdout_contains(&output, "revoked");
    assert_stdout_contains(&output, "1/1");
    assert_stderr_contains(&output, "rotate");

    let output = t.cred_reveal(BOB, "github.com", "bot");
    assert_failure(&output);
    assert_stderr_contains(&output, "access denied");
}

#[test]
fn test_dev_cannot_see_prod() {
    let t = Test::init();
    invite_and_verify(&t);
    assert_success(&t.env_set(ALICE, "web", "dev", "DEBUG=1"));
    assert_success(&t.env_set(ALICE, "web", "prod", "DATABASE_URL=postgres://prod"));

    assert_success(&t.run(BOB, &["env", "show", "web", "dev"]));
    let output = t.run(BOB, &["env", "show", "web", "prod"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "decryption failed");

    assert_success(&t.run(ALICE, &["team", "grant", BOB_EMAIL, "prod-access"]));
    assert_success(&t.run(ALICE, &["reencrypt", "--scope", "projects"]));
    assert_success(&t.run(BOB, &["env", "show", "web", "prod"]));
}

#[test]
fn test_list_json() {
    let t = Test::init();
    let key = t.keygen(BOB, BOB_EMAIL);
    assert_success(&t.invite_trusted(BOB_EMAIL, &key, "dev,staging-access"));

    let output = t.run(ALICE, &["team", "list", "--json"]);
    assert_success(&output);
    let value: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(value["count"], 2);
    let bob = &value["members"][1];
    assert_eq!(bob["email"], BOB_EMAIL);
    assert_eq!(bob["roles"], serde_json::json!(["dev", "staging-access"]));
}

#[test]
fn test_member_cannot_invite() {
    let t = Test::init();
    t.join(BOB, BOB_EMAIL, "dev");

    let output = t.run(BOB, &["team", "invite", CAROL_EMAIL]);
    assert_failure(&output);
    assert_stderr_contains(&output, "access denied");
}

#[test]
fn test_admin_cannot_revoke_self_or_drop_last_role() {
    let t = Test::init();
    t.join(BOB, BOB_EMAIL, "dev");

    let output = t.run(ALICE, &["team", "revoke", ALICE_EMAIL]);
    assert_failure(&output);
    assert_stderr_contains(&output, "your own");

    let output = t.run(ALICE, &["team", "ungrant", BOB_EMAIL, "dev"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "at least one role");
}

#[test]
fn test_invalid_key_rejected() {
    let t = Test::init();
    let output = t.run(ALICE, &["team", "invite", BOB_EMAIL, "--key", INVALID_PUBLIC_KEY]);
    assert_failure(&output);
    assert_stderr_contains(&output, "invalid public key");
}

#[test]
fn test_config_email_of_another_member_denied() {
    let t = Test::init();
    let config = t.home(BOB).join("lockbox.toml");
    let output = t
        .cmd(BOB)
        .env("LOCKBOX_CONFIG", &config)
        .args(["keygen", "--email", BOB_EMAIL])
        .output()
        .unwrap();
    assert_success(&output);
    let key = public_key_in(&output);
    assert_success(&t.invite_trusted(BOB_EMAIL, &key, "dev"));

    // Bob edits his config to claim Alice's email.
    let text = std::fs::read_to_string(&config).unwrap();
    std::fs::write(&config, text.replace(BOB_EMAIL, ALICE_EMAIL)).unwrap();

    let as_alice = |args: &[&str]| {
        t.cmd(BOB)
            .env("LOCKBOX_CONFIG", &config)
            .args(args)
            .output()
            .unwrap()
    };
    let output = as_alice(&["team", "grant", BOB_EMAIL, "admin"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "access denied");

    let output = as_alice(&[
        "team", "invite", CAROL_EMAIL, "--key", STRANGER_PUBLIC_KEY, "--trust", "--role", "admin",
    ]);
    assert_failure(&output);
    assert_stderr_contains(&output, "access denied");

    let roster = std::fs::read_to_string(t.store().join(".lockbox-recipients")).unwrap();
    assert!(!roster.contains(STRANGER_PUBLIC_KEY));
    let output = t.run(ALICE, &["team", "list", "--json"]);
    assert_success(&output);
    assert!(!stdout(&output).contains(CAROL_EMAIL));
}

#[test]
fn test_pending_admin_cannot_invite() {
    let t = Test::init();
    let key = t.keygen(BOB, BOB_EMAIL);
    let output = t.run(ALICE, &["team", "invite", BOB_EMAIL, "--key", &key, "--role", "admin"]);
    assert_success(&output);

    let output = t.run(
        BOB,
        &["team", "invite", CAROL_EMAIL, "--key", STRANGER_PUBLIC_KEY, "--trust"],
    );
    assert_failure(&output);
    assert_stderr_contains(&output, "access denied");

    let roster = std::fs::read_to_string(t.store().join(".lockbox-recipients")).unwrap();
    assert!(!roster.contains(STRANGER_PUBLIC_KEY));
    assert!(!roster.contains(&key));
}
