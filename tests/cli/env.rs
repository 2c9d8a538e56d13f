//! Env command tests.

use crate::support::*;

#[test]
fn test_set_show_formats() {
    let t = Test::init();
    assert_success(&t.env_set(ALICE, "web", "dev", "API_KEY=sk_live_0123456789"));
    assert_success(&t.run(ALICE, &["env", "set", "web", "dev", "PORT=8080", "--plain"]));

    let output = t.run(ALICE, &["env", "show", "web", "dev"]);
    assert_success(&output);
    assert_stdout_contains(&output, "sk_l••••••••");
    assert_stdout_contains(&output, "8080");
    assert_stdout_excludes(&output, "sk_live_0123456789");

    let output = t.run(ALICE, &["env", "show", "web", "dev", "--format", "dotenv"]);
    assert_success(&output);
    assert_eq!(stdout(&output), "API_KEY=\"sk_live_0123456789\"\nPORT=\"8080\"\n");

    let output = t.run(ALICE, &["env", "show", "web", "dev", "--format", "export"]);
    assert_stdout_contains(&output, "export PORT='8080'");

    let output = t.run(ALICE, &["env", "show", "web", "dev", "--format", "json"]);
    let vars: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(vars["API_KEY"], "sk_live_0123456789");
}

#[test]
fn test_set_requires_assignment() {
    let t = Test::init();
    let output = t.env_set(ALICE, "web", "dev", "NO_EQUALS");
    assert_failure(&output);
    assert_stderr_contains(&output, "KEY=VALUE");
}

#[test]
fn test_unset() {
    let t = Test::init();
    assert_success(&t.env_set(ALICE, "web", "dev", "A=1"));
    assert_success(&t.env_set(ALICE, "web", "dev", "B=2"));

    assert_success(&t.run(ALICE, &["env", "unset", "web", "dev", "A"]));
    let output = t.run(ALICE, &["env", "unset", "web", "dev", "A"]);
    assert_success(&output);
    assert_stderr_contains(&output, "not set");

    let output = t.run(ALICE, &["env", "show", "web", "dev", "--format", "dotenv"]);
    assert_eq!(stdout(&output), "B=\"2\"\n");
}

#[test]
fn test_import_dotenv_file() {
    let t = Test::init();
    let path = t.root.path().join("sample.env");
    std::fs::write(&path, SAMPLE_ENV).unwrap();

    let output = t.run(ALICE, &["env", "import", "web", "staging", path.to_str().unwrap()]);
    assert_success(&output);
    assert_stdout_contains(&output, "DATABASE_URL");

    let output = t.run(ALICE, &["env", "show", "web", "staging", "--format", "json"]);
    assert_success(&output);
    let vars: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(vars["API_KEY"], "sk-test-12345");
    assert_eq!(vars["SINGLE_QUOTED"], "single quoted");
    assert_eq!(vars["SPACES_IN_VALUE"], "hello world");
    assert_eq!(vars["SPECIAL_CHARS"], "p@ssw0rd!#$%");

    let output = t.run(ALICE, &["env", "list"]);
    assert_stdout_contains(&output, "web/staging");
}

#[test]
fn test_invalid_stage_rejected() {
    let t = Test::init();
    let output = t.env_set(ALICE, "web", "qa", "A=1");
    assert_failure(&output);
    assert_stderr_contains(&output, "invalid stage");
}
