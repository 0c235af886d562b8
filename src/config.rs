use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::convert::CategoryRule;
use crate::credentials::CredentialConfig;
use crate::duration::deserialize_duration;
use crate::wait::DEFAULT_POLL_INTERVAL;

/// Environment variable that overrides config file discovery.
pub const CONFIG_ENV_VAR: &str = "MFENTRY_CONFIG";

const CONFIG_FILE_NAME: &str = "mfentry.toml";

/// Host application URLs and page-shape constants.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub login_url: String,

    /// Page hosting the manual-entry buttons.
    pub entry_url: String,

    /// Login is considered complete once the location contains this.
    pub session_url_fragment: String,

    /// Location fragment of the settings page the host sometimes redirects to.
    pub diversion_url_fragment: String,

    /// Location fragment proving the entry page has loaded.
    pub entry_url_fragment: String,

    /// Position of the manual-entry button among the page's new-entry buttons.
    pub new_entry_index: usize,

    /// Re-navigation attempts before the guard gives up on a diversion.
    pub navigation_retries: u32,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            login_url: "https://id.moneyforward.com/sign_in".to_string(),
            entry_url: "https://moneyforward.com/cf#cf_new".to_string(),
            session_url_fragment: "moneyforward.com".to_string(),
            diversion_url_fragment: "moneyforward.com/profile/rule".to_string(),
            entry_url_fragment: "/cf".to_string(),
            new_entry_index: 1,
            navigation_retries: 3,
        }
    }
}

/// Wait bounds and pacing delays. All values accept "200ms" / "10s" / "1m".
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Interval between probes of every bounded wait.
    #[serde(deserialize_with = "deserialize_duration")]
    pub poll_interval: Duration,

    /// Default wait for mandatory fields (login inputs, form fields).
    #[serde(deserialize_with = "deserialize_duration")]
    pub element_wait: Duration,

    /// Wait for the entry modal and the new-entry buttons.
    #[serde(deserialize_with = "deserialize_duration")]
    pub modal_wait: Duration,

    /// How long to look for the continue button before using the page button.
    #[serde(deserialize_with = "deserialize_duration")]
    pub continue_probe: Duration,

    /// Wait for the entry page after re-navigating away from a diversion.
    #[serde(deserialize_with = "deserialize_duration")]
    pub navigation_wait: Duration,

    /// Final wait for the new-entry button once retries are exhausted.
    #[serde(deserialize_with = "deserialize_duration")]
    pub navigation_final_wait: Duration,

    #[serde(deserialize_with = "deserialize_duration")]
    pub otp_probe: Duration,

    #[serde(deserialize_with = "deserialize_duration")]
    pub login_wait: Duration,

    #[serde(deserialize_with = "deserialize_duration")]
    pub category_wait: Duration,

    /// Wait for the continue button after submitting.
    #[serde(deserialize_with = "deserialize_duration")]
    pub post_submit_wait: Duration,

    /// Pause around date entry while the date picker settles.
    #[serde(deserialize_with = "deserialize_duration")]
    pub date_settle: Duration,

    #[serde(deserialize_with = "deserialize_duration")]
    pub pre_submit: Duration,

    #[serde(deserialize_with = "deserialize_duration")]
    pub row_interval: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            element_wait: Duration::from_secs(10),
            modal_wait: Duration::from_secs(15),
            continue_probe: Duration::from_secs(2),
            navigation_wait: Duration::from_secs(10),
            navigation_final_wait: Duration::from_secs(15),
            otp_probe: Duration::from_secs(5),
            login_wait: Duration::from_secs(60),
            category_wait: Duration::from_secs(10),
            post_submit_wait: Duration::from_secs(5),
            date_settle: Duration::from_millis(200),
            pre_submit: Duration::from_millis(400),
            row_interval: Duration::from_millis(800),
        }
    }
}

/// Browser launch settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub headless: bool,
    pub incognito: bool,

    /// Chrome/Chromium binary. Discovered on PATH when unset.
    pub chrome_executable: Option<PathBuf>,

    /// Extra command-line switches.
    pub args: Vec<String>,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: false,
            incognito: true,
            chrome_executable: None,
            args: Vec::new(),
        }
    }
}

/// Settings for the PayPay conversion tool.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Value written to the institution column.
    pub institution: String,

    /// Keyword rules; the first rule with a matching keyword wins.
    pub category_rules: Vec<CategoryRule>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            institution: "PayPay".to_string(),
            category_rules: crate::convert::default_category_rules(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub timing: TimingConfig,
    pub browser: BrowserSettings,
    pub credentials: CredentialConfig,
    pub convert: ConvertConfig,
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        if config.timing.poll_interval.is_zero() {
            anyhow::bail!(
                "Invalid config file {}: timing.poll_interval must be greater than zero",
                path.display()
            );
        }

        Ok(config)
    }

    /// Load config from a file, or return default config if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Returns the config file path.
///
/// Resolution order:
/// 1. `$MFENTRY_CONFIG` if set
/// 2. `./mfentry.toml` if it exists in current directory
/// 3. `~/.local/share/mfentry/mfentry.toml` (XDG data directory)
pub fn default_config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
        return PathBuf::from(path);
    }

    let local_config = PathBuf::from(CONFIG_FILE_NAME);
    if local_config.exists() {
        return local_config;
    }

    if let Some(data_dir) = dirs::data_dir() {
        return data_dir.join("mfentry").join(CONFIG_FILE_NAME);
    }

    local_config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_match_host_constants() {
        let config = Config::default();
        assert_eq!(config.site.new_entry_index, 1);
        assert_eq!(config.site.navigation_retries, 3);
        assert_eq!(config.timing.login_wait, Duration::from_secs(60));
        assert_eq!(config.timing.otp_probe, Duration::from_secs(5));
        assert_eq!(config.timing.date_settle, Duration::from_millis(200));
        assert!(config.browser.incognito);
        assert!(!config.convert.category_rules.is_empty());
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(
            file,
            r#"
[site]
entry_url = "https://example.test/cf"

[timing]
row_interval = "2s"
pre_submit = "750ms"

[browser]
headless = true
"#
        )?;

        let config = Config::load(file.path())?;
        assert_eq!(config.site.entry_url, "https://example.test/cf");
        assert_eq!(config.site.login_url, SiteConfig::default().login_url);
        assert_eq!(config.timing.row_interval, Duration::from_secs(2));
        assert_eq!(config.timing.pre_submit, Duration::from_millis(750));
        assert_eq!(config.timing.element_wait, Duration::from_secs(10));
        assert!(config.browser.headless);
        assert!(config.browser.incognito);
        Ok(())
    }

    #[test]
    fn invalid_duration_is_rejected() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "[timing]\nrow_interval = \"soon\"")?;

        assert!(Config::load(file.path()).is_err());
        Ok(())
    }

    #[test]
    fn zero_poll_interval_is_rejected() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "[timing]\npoll_interval = \"0ms\"")?;

        let err = Config::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("poll_interval"));
        Ok(())
    }

    #[test]
    fn missing_file_yields_defaults() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let config = Config::load_or_default(&dir.path().join("absent.toml"))?;
        assert_eq!(config.site.entry_url, SiteConfig::default().entry_url);
        Ok(())
    }
}
