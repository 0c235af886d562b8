//! Credential storage abstraction.
//!
//! The login account and password come from a backend selected in the
//! `[credentials]` table of `mfentry.toml`:
//!
//! ```toml
//! [credentials]
//! backend = "pass"
//! path = "finance/moneyforward"
//!
//! [credentials.fields]
//! account = "login"
//! ```

mod config;
mod env;
mod pass;

pub use config::CredentialConfig;
pub use env::{EnvCredentialStore, StaticCredentialStore};
pub use pass::{PassConfig, PassCredentialStore};

use anyhow::{Context, Result};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

/// Key of the login account identifier (the e-mail address).
pub const ACCOUNT_KEY: &str = "account";
/// Key of the login password.
pub const PASSWORD_KEY: &str = "password";

/// A read-only key-value store for credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Retrieve a credential by key.
    ///
    /// Returns `Ok(None)` if the key doesn't exist.
    /// Returns `Err` if there was an error accessing the backend.
    async fn get(&self, key: &str) -> Result<Option<SecretString>>;
}

/// Login credentials for the host application.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub account: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(account: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Read both login fields from `store`.
    pub async fn load(store: &dyn CredentialStore) -> Result<Self> {
        let account = store
            .get(ACCOUNT_KEY)
            .await?
            .with_context(|| format!("Credential {ACCOUNT_KEY:?} is not configured"))?;
        let password = store
            .get(PASSWORD_KEY)
            .await?
            .with_context(|| format!("Credential {PASSWORD_KEY:?} is not configured"))?;

        Ok(Self {
            account: account.expose_secret().to_string(),
            password,
        })
    }
}
