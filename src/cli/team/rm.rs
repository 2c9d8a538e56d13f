//! Team revoke command.

use tracing::info;

use crate::cli::context::Context;
use crate::cli::output;
use crate::core::reencrypt::Stats;
use crate::error::Result;

/// Remove a member, re-encrypting unless told not to.
pub fn execute(ctx: &Context, email: &str, reencrypt: bool) -> Result<()> {
    info!("Revoking {}", email);
    let vault = ctx.open_vault()?;

    match vault.revoke_member(email, reencrypt)? {
        Some(stats) => {
            output::success(&format!("revoked {}", output::key(email)));
            report(&stats);
        }
        None => {
            output::success(&format!("revoked {}", output::key(email)));
            output::warn("existing secrets were not re-encrypted; the old key can still open them");
        }
    }
    output::warn("rotate any credential they have already seen");
    Ok(())
}

/// Print re-encryption results.
pub(crate) fn report(stats: &Stats) {
    output::kv("re-encrypted:", format!("{}/{}", stats.succeeded, stats.total));
    if stats.skipped > 0 {
        output::kv("skipped:", stats.skipped);
    }
    if !stats.is_complete() {
        output::warn(&format!("{} file(s) failed", stats.failed));
        for error in &stats.errors {
            output::list_item(&format!("{}: {}", error.path, error.reason));
        }
        let retry: Vec<String> = stats
            .failed_paths()
            .iter()
            .map(|p| format!("--path {}", p))
            .collect();
        output::hint(&format!("retry: lockbox reencrypt {}", retry.join(" ")));
    }
}
