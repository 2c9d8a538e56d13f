//! Init command - create a store with the caller as first admin.

use tracing::info;

use crate::cli::context::Context;
use crate::cli::output;
use crate::core::constants::{RECIPIENTS_FILE, TEAM_FILE};
use crate::core::identity::Identity;
use crate::core::store::Filesystem;
use crate::core::validation::normalize_email;
use crate::core::vault::Vault;
use crate::error::Result;

/// Initialize a store, generating a private key first if there is none.
pub fn execute(ctx: &Context, email: &str, name: Option<String>, protect: bool) -> Result<()> {
    let email = normalize_email(email)?;
    let name = name.unwrap_or_else(whoami::username);
    let store = ctx.store_dir()?;
    info!("Initializing store at {}", store.display());

    let identity_path = ctx.identity_path()?;
    let identity = if identity_path.exists() {
        output::dimmed(&format!("using existing key at {}", identity_path.display()));
        ctx.load_identity()?
    } else {
        let passphrase = if protect {
            Some(ctx.new_passphrase()?)
        } else {
            None
        };
        Identity::generate(&identity_path, passphrase.as_deref().map(String::as_str))?
    };

    let vault = Vault::init(
        Filesystem::new(&store),
        identity,
        &email,
        &name,
        ctx.config.state_dir()?,
    )?;

    let mut config = ctx.config.clone();
    config.email = Some(email.clone());
    config.store = Some(store.clone());
    config.save()?;

    output::success(&format!("initialized {}", output::key(&store.display().to_string())));
    output::kv("admin:", &email);
    output::kv("public key:", vault.public_key());
    output::hint(&format!(
        "commit {} and {} to share the team",
        TEAM_FILE, RECIPIENTS_FILE
    ));
    Ok(())
}
