//! `pass` (password-store) credential backend.
//!
//! The entry's first line is the login password. Later `name: value` lines
//! hold the other fields, such as the account e-mail.

use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use secrecy::SecretString;
use serde::Deserialize;
use tokio::process::Command;

use super::{CredentialStore, PASSWORD_KEY};

#[derive(Debug, Clone, Deserialize)]
pub struct PassConfig {
    /// Entry name, e.g. `finance/moneyforward`.
    pub path: String,

    /// Entry field to read for a credential key, when they differ
    /// (`account = "login"`).
    #[serde(default)]
    pub fields: HashMap<String, String>,
}

pub struct PassCredentialStore {
    config: PassConfig,
}

impl PassCredentialStore {
    pub fn new(config: PassConfig) -> Self {
        Self { config }
    }

    fn field_for<'a>(&'a self, key: &'a str) -> &'a str {
        self.config.fields.get(key).map_or(key, String::as_str)
    }

    async fn show(&self) -> Result<String> {
        let output = Command::new("pass")
            .arg("show")
            .arg(&self.config.path)
            .output()
            .await
            .context("Failed to run `pass`")?;

        if !output.status.success() {
            anyhow::bail!(
                "`pass show {}` failed: {}",
                self.config.path,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        String::from_utf8(output.stdout).context("`pass` printed invalid UTF-8")
    }
}

#[async_trait]
impl CredentialStore for PassCredentialStore {
    async fn get(&self, key: &str) -> Result<Option<SecretString>> {
        let entry = self.show().await?;
        Ok(entry_field(&entry, self.field_for(key)).map(SecretString::from))
    }
}

/// Value of `field` in a `pass` entry. The first line answers to the
/// password field.
fn entry_field(entry: &str, field: &str) -> Option<String> {
    let mut lines = entry.lines();
    let first = lines.next();
    if field == PASSWORD_KEY {
        return first.map(str::to_string);
    }
    lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim() == field)
        .map(|(_, value)| value.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::ACCOUNT_KEY;

    const ENTRY: &str = "s3cret: with colon\nlogin: me@example.com\nurl: https://id.moneyforward.com\n";

    #[test]
    fn first_line_is_the_password() {
        assert_eq!(
            entry_field(ENTRY, PASSWORD_KEY).as_deref(),
            Some("s3cret: with colon")
        );
    }

    #[test]
    fn named_fields_are_trimmed() {
        assert_eq!(entry_field(ENTRY, "login").as_deref(), Some("me@example.com"));
        assert_eq!(
            entry_field(ENTRY, "url").as_deref(),
            Some("https://id.moneyforward.com")
        );
        assert_eq!(entry_field(ENTRY, ACCOUNT_KEY), None);
    }

    #[test]
    fn configured_field_names_override_keys() {
        let store = PassCredentialStore::new(PassConfig {
            path: "finance/moneyforward".to_string(),
            fields: HashMap::from([(ACCOUNT_KEY.to_string(), "login".to_string())]),
        });

        assert_eq!(store.field_for(ACCOUNT_KEY), "login");
        assert_eq!(store.field_for(PASSWORD_KEY), PASSWORD_KEY);
    }
}
