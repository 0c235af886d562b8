//! Recovery from the host's unsolicited redirects away from the entry page.
//!
//! Depending on account state the host sometimes sends the browser to a
//! settings page ("custom end day" rules) instead of the household book. The
//! guard re-navigates a bounded number of times, then insists on the entry
//! page's new-entry button.

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::browser::Driver;
use crate::config::SiteConfig;
use crate::locator::Readiness;
use crate::page;
use crate::session::{ModalState, Session};

#[derive(Debug, Clone)]
pub struct NavigationGuard {
    entry_url: String,
    diversion_fragment: String,
    entry_fragment: String,
    retries: u32,
}

impl NavigationGuard {
    pub fn new(site: &SiteConfig) -> Self {
        Self {
            entry_url: site.entry_url.clone(),
            diversion_fragment: site.diversion_url_fragment.clone(),
            entry_fragment: site.entry_url_fragment.clone(),
            retries: site.navigation_retries,
        }
    }

    pub fn entry_url(&self) -> &str {
        &self.entry_url
    }

    /// Make sure the browser is on the entry page.
    ///
    /// Returns the number of re-navigations performed. Fails with
    /// `ElementNotFound` when the new-entry button never shows up.
    pub async fn ensure_entry_page<D: Driver>(&self, session: &mut Session<D>) -> Result<u32> {
        let mut renavigations = 0;

        for attempt in 1..=self.retries {
            if !session.url_contains(&self.diversion_fragment).await {
                break;
            }

            warn!(
                attempt,
                entry_url = %self.entry_url,
                "Redirected away from the entry page; navigating back"
            );
            session
                .driver()
                .goto(&self.entry_url)
                .await
                .context("Failed to navigate back to the entry page")?;
            session.set_modal_state(ModalState::Closed);
            renavigations += 1;

            let timeout = session.timing().navigation_wait;
            let session_ref: &Session<D> = session;
            let settled = session_ref
                .wait_for(timeout)
                .until(session_ref.clock(), || async move {
                    self.entry_page_ready(session_ref).await.then_some(())
                })
                .await;
            if settled.is_none() {
                debug!(attempt, "Entry page did not settle after re-navigation");
            }
        }

        session
            .resolve(
                &page::new_entry_button(),
                Readiness::Present,
                session.timing().navigation_final_wait,
            )
            .await
            .context("Entry page is not available")?;

        Ok(renavigations)
    }

    async fn entry_page_ready<D: Driver>(&self, session: &Session<D>) -> bool {
        let button = page::new_entry_button();
        for locator in button.strategies() {
            if matches!(session.driver().find_all(locator).await, Ok(found) if !found.is_empty()) {
                return true;
            }
        }
        session.url_contains(&self.entry_fragment).await
    }
}
