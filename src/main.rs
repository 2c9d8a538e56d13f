//! lockbox - a team secrets vault backed by age encryption.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lockbox::cli::output;
use lockbox::cli::{execute, Cli};
use lockbox::error::{CipherError, ConfigError, Error, KeyError, StoreError, VerifyError};

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env("LOCKBOX_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("lockbox=debug")
        } else {
            EnvFilter::new("lockbox=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr).without_time())
        .init();

    if let Err(e) = execute(cli) {
        output::error(&e.to_string());
        if let Some(hint) = suggestion(&e) {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}

fn suggestion(e: &Error) -> Option<&'static str> {
    match e {
        Error::Store(StoreError::NotInitialized(_)) => Some("run: lockbox init --email <you>"),
        Error::Config(ConfigError::MissingField { field: "email" }) => {
            Some("run: lockbox init --email <you>")
        }
        Error::Key(KeyError::NoPrivateKey(_)) => Some("run: lockbox keygen"),
        Error::Key(KeyError::PassphraseRequired) => {
            Some("pass --passphrase or set LOCKBOX_PASSPHRASE")
        }
        Error::Cipher(CipherError::DecryptionFailed(_)) => {
            Some("you may not be a recipient; ask an admin to grant access and re-encrypt")
        }
        Error::Verify(VerifyError::ChallengeExpired(_)) => {
            Some("ask an admin to run: lockbox team reissue <email>")
        }
        Error::Verify(VerifyError::ChallengeMismatch(_)) => {
            Some("check the response was copied exactly from lockbox respond")
        }
        _ => None,
    }
}
