//! Key commands: keygen, whoami, passphrase, respond.

use tracing::info;

use crate::cli::context::Context;
use crate::cli::output;
use crate::cli::PassphraseAction;
use crate::core::cipher::Age;
use crate::core::identity::{self, Identity};
use crate::core::validation::normalize_email;
use crate::core::verification;
use crate::error::Result;

/// Generate a private key and print its public half, optionally
/// recording the operator email.
pub fn keygen(ctx: &Context, email: Option<&str>, protect: bool) -> Result<()> {
    let path = ctx.identity_path()?;
    info!("Generating key at {}", path.display());
    let email = email.map(normalize_email).transpose()?;

    let passphrase = if protect {
        Some(ctx.new_passphrase()?)
    } else {
        None
    };
    let identity = Identity::generate(&path, passphrase.as_deref().map(String::as_str))?;

    if let Some(email) = email {
        let mut config = ctx.config.clone();
        config.email = Some(email);
        if let Some(store) = ctx.store_override() {
            config.store = Some(store.to_path_buf());
        }
        config.save()?;
    }

    output::success(&format!("generated {}", output::key(&path.display().to_string())));
    println!("{}", identity.public_key());
    output::hint("send this public key to a team admin");
    Ok(())
}

/// Print the public key without unlocking the private key.
pub fn whoami(ctx: &Context) -> Result<()> {
    let path = ctx.identity_path()?;
    let public_key = identity::read_public_key(&path)?;

    if let Some(email) = &ctx.config.email {
        output::kv("email:", email);
    }
    output::kv("key file:", path.display());
    output::kv("protected:", identity::is_protected(&path)?);
    println!("{}", public_key);
    Ok(())
}

pub fn passphrase(ctx: &Context, action: PassphraseAction) -> Result<()> {
    let path = ctx.identity_path()?;
    match action {
        PassphraseAction::Set => {
            let new = ctx.new_passphrase()?;
            identity::set_passphrase(&path, &new)?;
            output::success("passphrase set");
        }
        PassphraseAction::Change => {
            let old = ctx.passphrase("Current passphrase")?;
            let new = ctx.prompt_new_passphrase()?;
            identity::change_passphrase(&path, &old, &new)?;
            output::success("passphrase changed");
        }
        PassphraseAction::Remove => {
            let old = ctx.passphrase("Current passphrase")?;
            identity::remove_passphrase(&path, &old)?;
            output::success("passphrase removed");
            output::warn("the private key is now stored unencrypted");
        }
    }
    Ok(())
}

/// Decrypt a verification challenge and print the response.
pub fn respond(ctx: &Context, challenge: &str) -> Result<()> {
    let cipher = Age::new(ctx.load_identity()?);
    let response = verification::respond(&cipher, challenge)?;

    println!("{}", response.as_str());
    output::hint("send this response to the admin who invited you");
    Ok(())
}
