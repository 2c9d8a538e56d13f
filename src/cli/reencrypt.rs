//! Re-encrypt command.

use tracing::info;

use crate::cli::context::Context;
use crate::cli::team::report;
use crate::cli::{output, ScopeArg};
use crate::core::reencrypt::Scope;
use crate::error::Result;

pub fn execute(ctx: &Context, scope: ScopeArg, paths: Vec<String>) -> Result<()> {
    let scope = if !paths.is_empty() {
        Scope::Paths(paths)
    } else {
        match scope {
            ScopeArg::All => Scope::All,
            ScopeArg::Credentials => Scope::Credentials,
            ScopeArg::Projects => Scope::Projects,
        }
    };
    info!("Re-encrypting {:?}", scope);

    let vault = ctx.open_vault()?;
    let stats = vault.reencrypt(&scope)?;

    if stats.is_complete() {
        output::success("re-encrypted");
    }
    report(&stats);
    Ok(())
}
