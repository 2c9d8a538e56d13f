//! Credential commands.

use std::io::{self, BufRead, IsTerminal};

use dialoguer::Password;
use tracing::info;
use zeroize::Zeroizing;

use crate::cli::context::Context;
use crate::cli::output;
use crate::cli::CredAction;
use crate::core::domain::Credential;
use crate::error::{Result, ValidationError};

pub fn execute(ctx: &Context, action: CredAction) -> Result<()> {
    match action {
        CredAction::Add {
            website,
            name,
            username,
            url,
            notes,
            tags,
        } => {
            info!("Adding credential {}/{}", website, name);
            let vault = ctx.open_vault()?;
            let password = read_password(&format!("Password for {}/{}", website, name))?;

            let mut credential =
                Credential::new(&website, &name, &username, &password, vault.operator());
            credential.url = url;
            credential.notes = notes;
            credential.tags = tags;
            vault.put_credential(credential)?;

            output::success(&format!("saved {}", output::key(&format!("{}/{}", website, name))));
            Ok(())
        }
        CredAction::Show {
            website,
            name,
            reveal,
        } => {
            let vault = ctx.open_vault()?;
            let credential = vault.get_credential(&website, &name)?;

            output::section(&format!("{}/{}", credential.website, credential.name));
            output::kv("username:", &credential.username);
            if reveal {
                output::kv("password:", &credential.password);
            } else {
                output::kv("password:", output::mask(&credential.password));
            }
            if let Some(url) = &credential.url {
                output::kv("url:", url);
            }
            if let Some(notes) = &credential.notes {
                output::kv("notes:", notes);
            }
            if !credential.tags.is_empty() {
                output::kv("tags:", credential.tags.join(", "));
            }
            output::kv(
                "updated:",
                format!(
                    "{} by {}",
                    credential.audit.updated_at.format("%Y-%m-%d %H:%M UTC"),
                    credential.audit.updated_by
                ),
            );
            Ok(())
        }
        CredAction::Rm { website, name } => {
            let vault = ctx.open_vault()?;
            vault.remove_credential(&website, &name)?;
            output::success(&format!("removed {}", output::key(&format!("{}/{}", website, name))));
            Ok(())
        }
        CredAction::List { json } => {
            let vault = ctx.open_vault()?;
            let refs: Vec<String> = vault
                .list_credentials()?
                .iter()
                .map(|r| r.to_string())
                .collect();

            if json {
                output::data(&serde_json::to_string_pretty(&refs)?);
            } else if refs.is_empty() {
                output::dimmed("no credentials stored");
            } else {
                for reference in &refs {
                    output::list_item(reference);
                }
            }
            Ok(())
        }
    }
}

/// Hidden prompt on a terminal, first line of stdin otherwise.
fn read_password(prompt: &str) -> Result<Zeroizing<String>> {
    let password = if io::stdin().is_terminal() {
        Zeroizing::new(Password::new().with_prompt(prompt).interact()?)
    } else {
        let mut line = Zeroizing::new(String::new());
        io::stdin().lock().read_line(&mut line)?;
        Zeroizing::new(line.trim_end_matches(['\r', '\n']).to_string())
    };

    if password.is_empty() {
        return Err(ValidationError::EmptyField("password").into());
    }
    Ok(password)
}
