//! The manual-entry modal: open, fill one record, submit.

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::browser::Driver;
use crate::config::SiteConfig;
use crate::error::{CategoryLevel, EntryError};
use crate::locator::Readiness;
use crate::models::{Direction, SkipReason, TransactionRecord};
use crate::navigation::NavigationGuard;
use crate::page;
use crate::session::{ModalState, Session};

/// How the entry modal was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenedVia {
    /// The "continue" button of the previous modal.
    Continue,
    /// The page's new-entry button.
    NewEntryButton,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitOutcome {
    /// Whether the continue button appeared after saving. Its absence does
    /// not prove the save failed; the host does not always offer it.
    pub continue_offered: bool,
}

pub struct EntryForm {
    guard: NavigationGuard,
    new_entry_index: usize,
}

impl EntryForm {
    pub fn new(site: &SiteConfig) -> Self {
        Self {
            guard: NavigationGuard::new(site),
            new_entry_index: site.new_entry_index,
        }
    }

    /// Open a blank entry modal and wait for its required fields.
    pub async fn open<D: Driver>(&self, session: &mut Session<D>) -> Result<OpenedVia> {
        if session.modal_state() == ModalState::Editing {
            return Err(EntryError::ModalAlreadyOpen.into());
        }

        let after_submit = session.modal_state() == ModalState::Submitted;
        let continued = after_submit && self.try_continue(session).await;

        let via = if continued {
            OpenedVia::Continue
        } else {
            if after_submit {
                debug!(reason = %SkipReason::NoContinueAvailable, "Opening entry form from the page");
            }
            self.guard.ensure_entry_page(session).await?;
            self.click_new_entry(session).await?;
            session
                .resolve(
                    &page::entry_modal(),
                    Readiness::Present,
                    session.timing().modal_wait,
                )
                .await?;
            OpenedVia::NewEntryButton
        };

        session.find(&page::date_field()).await?;
        session.find(&page::amount_field()).await?;
        session.set_modal_state(ModalState::Editing);
        debug!(?via, "Entry form open");
        Ok(via)
    }

    async fn try_continue<D: Driver>(&self, session: &Session<D>) -> bool {
        match self.continue_path(session).await {
            Ok(()) => true,
            Err(err) => {
                debug!(error = %err, "Continue button not usable");
                false
            }
        }
    }

    async fn continue_path<D: Driver>(&self, session: &Session<D>) -> Result<()> {
        let driver = session.driver();
        let button = session
            .resolve(
                &page::continue_button(),
                Readiness::Clickable,
                session.timing().continue_probe,
            )
            .await?;

        let style = driver.attribute(&button, "style").await?.unwrap_or_default();
        if style.contains("display: none") {
            anyhow::bail!("Continue button is hidden");
        }

        driver.click(&button).await?;
        session.find(&page::date_field()).await?;
        session.find(&page::amount_field()).await?;
        Ok(())
    }

    async fn click_new_entry<D: Driver>(&self, session: &Session<D>) -> Result<()> {
        let driver = session.driver();
        let spec = page::new_entry_button();
        let buttons = session
            .resolve_all(&spec, session.timing().modal_wait)
            .await?;

        let Some(target) = buttons.get(self.new_entry_index) else {
            return Err(EntryError::UnexpectedPageLayout {
                element: spec.name().to_string(),
                expected: self.new_entry_index + 1,
                found: buttons.len(),
            }
            .into());
        };

        driver.scroll_into_view(target).await?;
        if let Err(err) = driver.click(target).await {
            debug!(error = %err, "Native click failed; clicking via script");
            driver.script_click(target).await?;
        }
        Ok(())
    }

    /// Type `record` into the open modal.
    pub async fn fill<D: Driver>(&self, session: &Session<D>, record: &TransactionRecord) -> Result<()> {
        if session.modal_state() != ModalState::Editing {
            anyhow::bail!("No entry form is open");
        }
        let driver = session.driver();
        let timing = session.timing();

        let date = session.find(&page::date_field()).await?;
        driver.clear(&date).await?;
        session.pause(timing.date_settle).await;
        driver.type_text(&date, &record.date).await?;
        // The second click closes the date picker overlay, which otherwise
        // swallows the next input.
        driver.click(&date).await?;
        driver.click(&date).await?;
        session.pause(timing.date_settle).await;

        let toggle = match record.direction() {
            Direction::Income => page::income_toggle(),
            Direction::Expense => page::expense_toggle(),
        };
        match session.find_optional(&toggle, timing.element_wait).await {
            Some(element) => driver.click(&element).await?,
            None => debug!(toggle = toggle.name(), "Toggle not found; keeping current direction"),
        }

        let amount = session.find(&page::amount_field()).await?;
        session
            .replace_text(&amount, &record.amount().to_string())
            .await?;

        match session
            .find_optional(&page::sub_account_select(), timing.element_wait)
            .await
        {
            Some(select) => driver.set_value(&select, page::NO_SUB_ACCOUNT).await?,
            None => debug!("Sub-account select not found"),
        }

        if let Some(name) = &record.large_category {
            self.select_category(session, CategoryLevel::Large, name)
                .await?;
        }
        if let Some(name) = &record.middle_category {
            self.select_category(session, CategoryLevel::Middle, name)
                .await?;
        }

        let content = session.find(&page::content_field()).await?;
        session
            .replace_text(&content, &record.display_content())
            .await?;

        Ok(())
    }

    async fn select_category<D: Driver>(
        &self,
        session: &Session<D>,
        level: CategoryLevel,
        name: &str,
    ) -> Result<()> {
        let driver = session.driver();
        let picker = session.find(&page::category_picker(level)).await?;
        driver.click(&picker).await?;

        let option = session
            .resolve(
                &page::category_option(level, name),
                Readiness::Clickable,
                session.timing().category_wait,
            )
            .await
            .map_err(|_| EntryError::CategoryNotFound {
                level,
                name: name.to_string(),
            })?;
        driver
            .click(&option)
            .await
            .with_context(|| format!("Failed to choose {level} category {name:?}"))?;
        Ok(())
    }

    /// Save the modal.
    pub async fn submit<D: Driver>(&self, session: &mut Session<D>) -> Result<SubmitOutcome> {
        if session.modal_state() != ModalState::Editing {
            anyhow::bail!("No entry form is open");
        }
        session.pause(session.timing().pre_submit).await;

        let button = session.find(&page::submit_button()).await?;
        session.driver().click(&button).await?;
        session.set_modal_state(ModalState::Submitted);

        let continue_offered = session
            .find_optional(&page::continue_button(), session.timing().post_submit_wait)
            .await
            .is_some();
        if continue_offered {
            info!("Saved entry");
        } else {
            info!("Saved entry; continue button not offered");
        }

        Ok(SubmitOutcome { continue_offered })
    }
}
