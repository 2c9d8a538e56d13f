//! Environment variable commands.

use std::collections::BTreeMap;

use tracing::info;

use crate::cli::context::Context;
use crate::cli::output;
use crate::cli::{EnvAction, EnvFormat};
use crate::core::domain::EnvFile;
use crate::error::{Result, ValidationError};

pub fn execute(ctx: &Context, action: EnvAction) -> Result<()> {
    match action {
        EnvAction::Set {
            project,
            stage,
            assignment,
            plain,
        } => {
            let (key, value) = assignment
                .split_once('=')
                .ok_or_else(|| ValidationError::InvalidName {
                    field: "assignment",
                    value: assignment.clone(),
                    reason: "expected KEY=VALUE".to_string(),
                })?;
            info!("Setting {} in {}/{}", key, project, stage);

            let vault = ctx.open_vault()?;
            vault.set_env_var(&project, stage, key, value, !plain)?;
            output::success(&format!("set {} in {}/{}", output::key(key), project, stage));
            Ok(())
        }
        EnvAction::Unset {
            project,
            stage,
            key,
        } => {
            let vault = ctx.open_vault()?;
            if vault.unset_env_var(&project, stage, &key)? {
                output::success(&format!("removed {} from {}/{}", output::key(&key), project, stage));
            } else {
                output::warn(&format!("{} is not set in {}/{}", key, project, stage));
            }
            Ok(())
        }
        EnvAction::Show {
            project,
            stage,
            format,
        } => {
            let vault = ctx.open_vault()?;
            let env = vault.get_env(&project, stage)?;
            show(&env, format)
        }
        EnvAction::Import {
            project,
            stage,
            path,
        } => {
            let content = zeroize::Zeroizing::new(std::fs::read_to_string(&path)?);
            let vault = ctx.open_vault()?;
            let imported = vault.import_env(&project, stage, &content)?;

            output::success(&format!(
                "imported {} variables into {}/{}",
                output::count(imported.len()),
                project,
                stage
            ));
            for key in &imported {
                output::list_item(key);
            }
            Ok(())
        }
        EnvAction::List => {
            let vault = ctx.open_vault()?;
            let refs = vault.list_envs()?;
            if refs.is_empty() {
                output::dimmed("no env files stored");
            }
            for reference in &refs {
                output::list_item(&reference.to_string());
            }
            Ok(())
        }
    }
}

fn show(env: &EnvFile, format: EnvFormat) -> Result<()> {
    match format {
        EnvFormat::Masked => {
            output::section(&format!("{}/{}", env.project, env.stage));
            for var in &env.vars {
                if var.is_secret {
                    output::kv(&var.key, output::mask(&var.value));
                } else {
                    output::kv(&var.key, &var.value);
                }
            }
        }
        EnvFormat::Dotenv => print!("{}", env.to_dotenv().as_str()),
        EnvFormat::Export => print!("{}", env.to_export().as_str()),
        EnvFormat::Json => {
            let vars: BTreeMap<&str, &str> = env
                .vars
                .iter()
                .map(|v| (v.key.as_str(), v.value.as_str()))
                .collect();
            output::data(&serde_json::to_string_pretty(&vars)?);
        }
    }
    Ok(())
}
