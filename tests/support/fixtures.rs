//! Test fixtures and constants.

pub const ALICE: &str = "alice";
pub const ALICE_EMAIL: &str = "alice@example.com";
pub const BOB: &str = "bob";
pub const BOB_EMAIL: &str = "bob@example.com";
pub const CAROL: &str = "carol";
pub const CAROL_EMAIL: &str = "carol@example.com";

/// A valid age public key nobody holds the private half of.
pub const STRANGER_PUBLIC_KEY: &str =
    "age1ql3z7hjy54pw3hyww5ayyfg7zqgvc7w3j2elw8zmrj2kg5sfn9aqmcac8p";

pub const INVALID_PUBLIC_KEY: &str = "not-a-valid-age-key";

/// Sample .env content with the usual edge cases.
pub const SAMPLE_ENV: &str = r#"
# Database
DATABASE_URL=postgres://localhost/mydb
export API_KEY="sk-test-12345"
SINGLE_QUOTED='single quoted'
SPACES_IN_VALUE=hello world

SPECIAL_CHARS=p@ssw0rd!#$%
"#;
