//! Environment-variable and in-memory credential backends.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use secrecy::SecretString;

use super::{CredentialStore, ACCOUNT_KEY, PASSWORD_KEY};

/// Credential store that reads each key from a named environment variable.
pub struct EnvCredentialStore {
    vars: HashMap<String, String>,
}

impl EnvCredentialStore {
    pub fn new(account_var: impl Into<String>, password_var: impl Into<String>) -> Self {
        let mut vars = HashMap::new();
        vars.insert(ACCOUNT_KEY.to_string(), account_var.into());
        vars.insert(PASSWORD_KEY.to_string(), password_var.into());
        Self { vars }
    }
}

#[async_trait]
impl CredentialStore for EnvCredentialStore {
    async fn get(&self, key: &str) -> Result<Option<SecretString>> {
        let Some(var) = self.vars.get(key) else {
            return Ok(None);
        };

        match std::env::var(var) {
            Ok(value) if !value.is_empty() => Ok(Some(SecretString::from(value))),
            Ok(_) | Err(std::env::VarError::NotPresent) => Ok(None),
            Err(std::env::VarError::NotUnicode(_)) => {
                anyhow::bail!("Environment variable {var} is not valid UTF-8")
            }
        }
    }
}

/// Credential store holding fixed values, used for inline config and tests.
#[derive(Default)]
pub struct StaticCredentialStore {
    values: HashMap<String, SecretString>,
}

impl StaticCredentialStore {
    pub fn new(account: impl Into<String>, password: impl Into<String>) -> Self {
        let mut values = HashMap::new();
        values.insert(ACCOUNT_KEY.to_string(), SecretString::from(account.into()));
        values.insert(PASSWORD_KEY.to_string(), SecretString::from(password.into()));
        Self { values }
    }
}

#[async_trait]
impl CredentialStore for StaticCredentialStore {
    async fn get(&self, key: &str) -> Result<Option<SecretString>> {
        Ok(self.values.get(key).cloned())
    }
}
