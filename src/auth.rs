//! Login, optional one-time passcode, and session establishment.

use anyhow::{Context, Result};
use secrecy::ExposeSecret;
use tracing::{debug, info};

use crate::browser::Driver;
use crate::config::SiteConfig;
use crate::credentials::Credentials;
use crate::duration::format_duration;
use crate::error::EntryError;
use crate::locator::Readiness;
use crate::page;
use crate::session::Session;

/// Supplies the one-time passcode when the host asks for one.
pub trait OtpPrompter: Send + Sync {
    fn ask_code(&self, prompt: &str) -> Result<String>;
}

/// Prompter returning a fixed code, for tests and scripted runs.
#[derive(Debug, Clone)]
pub struct FixedOtpPrompter {
    code: String,
}

impl FixedOtpPrompter {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

impl OtpPrompter for FixedOtpPrompter {
    fn ask_code(&self, _prompt: &str) -> Result<String> {
        Ok(self.code.clone())
    }
}

/// Reads the passcode from the controlling terminal.
#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default)]
pub struct TerminalOtpPrompter;

#[cfg(feature = "cli")]
impl OtpPrompter for TerminalOtpPrompter {
    fn ask_code(&self, prompt: &str) -> Result<String> {
        let code: String = dialoguer::Input::new()
            .with_prompt(prompt)
            .interact_text()
            .context("Failed to read one-time passcode")?;
        Ok(code.trim().to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    LoggedOut,
    CredentialsSubmitted,
    OtpPrompted,
    SessionEstablished,
}

pub struct AuthFlow {
    login_url: String,
    session_fragment: String,
    state: AuthState,
}

impl AuthFlow {
    pub fn new(site: &SiteConfig) -> Self {
        Self {
            login_url: site.login_url.clone(),
            session_fragment: site.session_url_fragment.clone(),
            state: AuthState::LoggedOut,
        }
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    /// Run the login sequence through to an established session.
    ///
    /// The passcode step is skipped when no passcode field appears within the
    /// probe window. Fails with `AuthTimeout` if the location never reaches
    /// the session domain.
    pub async fn login<D: Driver>(
        &mut self,
        session: &Session<D>,
        credentials: &Credentials,
        prompter: &dyn OtpPrompter,
    ) -> Result<AuthState> {
        let driver = session.driver();
        let timing = session.timing();

        driver
            .goto(&self.login_url)
            .await
            .context("Failed to open login page")?;

        let email = session.find(&page::email_input()).await?;
        session.replace_text(&email, &credentials.account).await?;
        driver.press_enter(&email).await?;

        let password = session.find(&page::password_input()).await?;
        session
            .replace_text(&password, credentials.password.expose_secret())
            .await?;
        driver.press_enter(&password).await?;
        self.transition(AuthState::CredentialsSubmitted);

        let otp = session
            .resolve(&page::otp_input(), Readiness::Present, timing.otp_probe)
            .await
            .ok();
        match otp {
            Some(field) => {
                self.transition(AuthState::OtpPrompted);
                let code = prompter.ask_code("二段階認証コードを入力してください")?;
                session.replace_text(&field, &code).await?;
                driver.press_enter(&field).await?;
                info!("Submitted one-time passcode");
            }
            None => info!("No one-time passcode requested"),
        }

        debug!(
            fragment = %self.session_fragment,
            timeout = %format_duration(timing.login_wait),
            "Waiting for session"
        );
        if !session
            .wait_for_url(&self.session_fragment, timing.login_wait)
            .await
        {
            let url = driver.current_url().await.unwrap_or_default();
            return Err(EntryError::AuthTimeout {
                timeout: timing.login_wait,
                url,
            }
            .into());
        }

        self.transition(AuthState::SessionEstablished);
        info!("Logged in");
        Ok(self.state)
    }

    fn transition(&mut self, next: AuthState) {
        debug!(from = ?self.state, to = ?next, "Auth state");
        self.state = next;
    }
}
