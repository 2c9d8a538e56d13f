//! Secret operations.
//!
//! Writes resolve recipients against the current team and seal the whole
//! record; reads open it with the local identity.

use tracing::debug;

use super::Vault;
use crate::core::access::require_write;
use crate::core::cipher::Cipher;
use crate::core::constants::{CREDENTIALS_DIR, PROJECTS_DIR};
use crate::core::domain::{
    parse_dotenv, Audit, Credential, EnvFile, Secret, SecretRef, Stage, Team, User,
};
use crate::core::resolver::Resolver;
use crate::core::store::Store;
use crate::core::validation::{validate_env_key, validate_required};
use crate::error::{AccessError, CipherError, Error, Result, StoreError};

impl<S: Store> Vault<S> {
    /// Create or replace a credential.
    ///
    /// On replace, the stored permissions and creation audit are kept and
    /// any permissions on `credential` are ignored.
    ///
    /// # Errors
    ///
    /// Returns `AccessError::Denied` if the operator may not write it.
    pub fn put_credential(&self, mut credential: Credential) -> Result<()> {
        let reference = SecretRef::credential(&credential.website, &credential.name)?;
        validate_required("password", &credential.password)?;

        let team = self.team()?;
        let (operator, existing) = self.authorize_write(&team, &reference)?;
        match &existing {
            Some(previous) => {
                credential.permissions = previous.permissions().cloned();
                credential.audit = previous.audit().touched(&operator.email);
            }
            None => credential.audit = Audit::new(&operator.email),
        }

        self.write_secret(&team, &Secret::Credential(credential))
    }

    pub fn get_credential(&self, website: &str, name: &str) -> Result<Credential> {
        let reference = SecretRef::credential(website, name)?;
        let team = self.team()?;
        self.operator_in(&team)?;

        match self.read_secret(&reference)? {
            Secret::Credential(credential) => Ok(credential),
            Secret::Env(_) => Err(unexpected(&reference)),
        }
    }

    pub fn remove_credential(&self, website: &str, name: &str) -> Result<()> {
        let reference = SecretRef::credential(website, name)?;
        self.remove_secret(&reference)
    }

    /// Every credential in the store.
    pub fn list_credentials(&self) -> Result<Vec<SecretRef>> {
        self.list_refs(CREDENTIALS_DIR)
    }

    /// Every env file in the store.
    pub fn list_envs(&self) -> Result<Vec<SecretRef>> {
        self.list_refs(PROJECTS_DIR)
    }

    /// Create or replace a whole env file.
    pub fn put_env(&self, mut env: EnvFile) -> Result<()> {
        let reference = SecretRef::env(&env.project, env.stage)?;
        for var in &env.vars {
            validate_env_key(&var.key)?;
        }

        let team = self.team()?;
        let (operator, existing) = self.authorize_write(&team, &reference)?;
        match &existing {
            Some(previous) => {
                env.permissions = previous.permissions().cloned();
                env.audit = previous.audit().touched(&operator.email);
            }
            None => env.audit = Audit::new(&operator.email),
        }

        self.write_secret(&team, &Secret::Env(env))
    }

    pub fn get_env(&self, project: &str, stage: Stage) -> Result<EnvFile> {
        let reference = SecretRef::env(project, stage)?;
        let team = self.team()?;
        self.operator_in(&team)?;

        match self.read_secret(&reference)? {
            Secret::Env(env) => Ok(env),
            Secret::Credential(_) => Err(unexpected(&reference)),
        }
    }

    /// Set one variable, creating the env file if needed.
    pub fn set_env_var(
        &self,
        project: &str,
        stage: Stage,
        key: &str,
        value: &str,
        is_secret: bool,
    ) -> Result<()> {
        validate_env_key(key)?;
        let reference = SecretRef::env(project, stage)?;

        let team = self.team()?;
        let (operator, existing) = self.authorize_write(&team, &reference)?;
        let mut env = match existing {
            Some(Secret::Env(env)) => env,
            Some(Secret::Credential(_)) => return Err(unexpected(&reference)),
            None => EnvFile::new(project, stage, &operator.email),
        };
        env.set(key, value, is_secret)?;

        let mut secret = Secret::Env(env);
        secret.touch(&operator.email);
        self.write_secret(&team, &secret)
    }

    /// Remove one variable. Returns whether it existed.
    pub fn unset_env_var(&self, project: &str, stage: Stage, key: &str) -> Result<bool> {
        let reference = SecretRef::env(project, stage)?;

        let team = self.team()?;
        let (operator, existing) = self.authorize_write(&team, &reference)?;
        let mut env = match existing {
            Some(Secret::Env(env)) => env,
            Some(Secret::Credential(_)) => return Err(unexpected(&reference)),
            None => return Err(StoreError::NotFound(reference.to_string()).into()),
        };
        if !env.delete(key) {
            return Ok(false);
        }

        let mut secret = Secret::Env(env);
        secret.touch(&operator.email);
        self.write_secret(&team, &secret)?;
        Ok(true)
    }

    /// Merge `.env` content into an env file, creating it if needed.
    /// Returns the keys imported, in file order.
    pub fn import_env(&self, project: &str, stage: Stage, content: &str) -> Result<Vec<String>> {
        let vars = parse_dotenv(content);
        for var in &vars {
            validate_env_key(&var.key)?;
        }
        let reference = SecretRef::env(project, stage)?;

        let team = self.team()?;
        let (operator, existing) = self.authorize_write(&team, &reference)?;
        let mut env = match existing {
            Some(Secret::Env(env)) => env,
            Some(Secret::Credential(_)) => return Err(unexpected(&reference)),
            None => EnvFile::new(project, stage, &operator.email),
        };
        for var in &vars {
            env.set(&var.key, &var.value, var.is_secret)?;
        }

        let mut secret = Secret::Env(env);
        secret.touch(&operator.email);
        self.write_secret(&team, &secret)?;
        Ok(vars.iter().map(|v| v.key.clone()).collect())
    }

    pub fn remove_env(&self, project: &str, stage: Stage) -> Result<()> {
        let reference = SecretRef::env(project, stage)?;
        self.remove_secret(&reference)
    }

    fn remove_secret(&self, reference: &SecretRef) -> Result<()> {
        let team = self.team()?;
        let (_, existing) = self.authorize_write(&team, reference)?;
        if existing.is_none() {
            return Err(StoreError::NotFound(reference.to_string()).into());
        }
        debug!(secret = %reference, "removing secret");
        self.store.delete(&reference.path())
    }

    fn list_refs(&self, prefix: &str) -> Result<Vec<SecretRef>> {
        let team = self.team()?;
        self.operator_in(&team)?;
        Ok(self
            .store
            .list(prefix)?
            .iter()
            .filter_map(|path| SecretRef::from_path(path))
            .collect())
    }

    /// Check the operator may write `reference`, returning the operator
    /// and the stored secret, if any.
    ///
    /// A stored secret the operator cannot open is reported as a denial,
    /// so the answer does not reveal whether it exists.
    pub(super) fn authorize_write(
        &self,
        team: &Team,
        reference: &SecretRef,
    ) -> Result<(User, Option<Secret>)> {
        let operator = self.operator_in(team)?;

        let existing = if self.store.exists(&reference.path()) {
            match self.read_secret(reference) {
                Ok(secret) => Some(secret),
                Err(Error::Cipher(CipherError::DecryptionFailed(_))) => {
                    return Err(AccessError::Denied.into())
                }
                Err(e) => return Err(e),
            }
        } else {
            None
        };

        require_write(&operator, reference, existing.as_ref().and_then(Secret::permissions))?;
        Ok((operator, existing))
    }

    pub(super) fn read_secret(&self, reference: &SecretRef) -> Result<Secret> {
        let ciphertext = self.store.get(&reference.path())?;
        let plaintext = self.cipher.decrypt(&ciphertext)?;
        let secret = Secret::from_bytes(&plaintext)?;
        if secret.reference() != *reference {
            return Err(unexpected(reference));
        }
        Ok(secret)
    }

    pub(super) fn write_secret(&self, team: &Team, secret: &Secret) -> Result<()> {
        let recipients = Resolver::new(team, &self.cipher.public_key()).resolve(secret)?;
        let plaintext = secret.to_bytes()?;
        let ciphertext = self.cipher.encrypt(&plaintext, &recipients)?;
        self.store.set(&secret.path(), &ciphertext)?;

        debug!(secret = %secret.reference(), recipients = recipients.len(), "wrote secret");
        Ok(())
    }
}

fn unexpected(reference: &SecretRef) -> Error {
    StoreError::Malformed {
        file: "secret",
        reason: format!("{} does not hold {}", reference.path(), reference),
    }
    .into()
}
