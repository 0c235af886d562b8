//! Credential configuration.
//!
//! Defines the `[credentials]` table of `mfentry.toml`, which selects the
//! backend holding the login account and password.

use serde::Deserialize;

use super::env::{EnvCredentialStore, StaticCredentialStore};
use super::pass::{PassConfig, PassCredentialStore};
use super::CredentialStore;

fn default_account_var() -> String {
    "MFENTRY_ACCOUNT".to_string()
}

fn default_password_var() -> String {
    "MFENTRY_PASSWORD".to_string()
}

/// Configuration for a credential store.
///
/// # Example
///
/// ```toml
/// [credentials]
/// backend = "env"
/// account_var = "MF_USER"
/// password_var = "MF_PASS"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum CredentialConfig {
    /// Environment variables.
    Env {
        #[serde(default = "default_account_var")]
        account_var: String,
        #[serde(default = "default_password_var")]
        password_var: String,
    },
    /// Password-store (pass) backend.
    Pass {
        #[serde(flatten)]
        config: PassConfig,
    },
    /// Values written directly in the config file.
    Inline { account: String, password: String },
}

impl Default for CredentialConfig {
    fn default() -> Self {
        CredentialConfig::Env {
            account_var: default_account_var(),
            password_var: default_password_var(),
        }
    }
}

impl CredentialConfig {
    /// Build a credential store from this configuration.
    pub fn build(&self) -> Box<dyn CredentialStore> {
        match self {
            CredentialConfig::Env {
                account_var,
                password_var,
            } => Box::new(EnvCredentialStore::new(account_var, password_var)),
            CredentialConfig::Pass { config } => {
                Box::new(PassCredentialStore::new(config.clone()))
            }
            CredentialConfig::Inline { account, password } => {
                Box::new(StaticCredentialStore::new(account, password))
            }
        }
    }
}
