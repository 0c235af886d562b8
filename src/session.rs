//! The single browser session a run drives.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::browser::Driver;
use crate::clock::{Clock, SystemClock};
use crate::config::TimingConfig;
use crate::locator::{self, LocatorSpec, Readiness};
use crate::wait::WaitPolicy;

/// State of the host's entry modal as far as this session knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalState {
    /// No modal has been opened, or the page was re-navigated.
    Closed,
    /// A modal is open and being filled.
    Editing,
    /// The last modal was submitted; a continue button may be on screen.
    Submitted,
}

/// Owns the driver, the clock and the timing settings for one run.
///
/// Exactly one session exists per run and at most one entry modal is open at
/// a time. Close it with [`Session::close`]; see [`crate::runner::run`] for the
/// scoped form that closes on every exit path.
pub struct Session<D: Driver> {
    driver: D,
    clock: Arc<dyn Clock>,
    timing: TimingConfig,
    modal: ModalState,
}

impl<D: Driver> Session<D> {
    pub fn new(driver: D, timing: TimingConfig) -> Self {
        Self {
            driver,
            clock: Arc::new(SystemClock::new()),
            timing,
            modal: ModalState::Closed,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    pub fn modal_state(&self) -> ModalState {
        self.modal
    }

    pub(crate) fn set_modal_state(&mut self, state: ModalState) {
        self.modal = state;
    }

    /// Wait policy with the session's poll interval.
    pub fn wait_for(&self, timeout: Duration) -> WaitPolicy {
        WaitPolicy::new(timeout, self.timing.poll_interval)
    }

    /// Fixed pacing delay.
    pub async fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            self.clock.sleep(duration).await;
        }
    }

    pub async fn resolve(
        &self,
        spec: &LocatorSpec,
        readiness: Readiness,
        timeout: Duration,
    ) -> Result<D::Element> {
        locator::resolve(
            &self.driver,
            self.clock(),
            spec,
            readiness,
            self.wait_for(timeout),
        )
        .await
    }

    /// Resolve a mandatory element with the default element wait.
    pub async fn find(&self, spec: &LocatorSpec) -> Result<D::Element> {
        self.resolve(spec, Readiness::Present, self.timing.element_wait)
            .await
    }

    /// Resolve an element whose absence is tolerated.
    pub async fn find_optional(&self, spec: &LocatorSpec, timeout: Duration) -> Option<D::Element> {
        self.resolve(spec, Readiness::Present, timeout).await.ok()
    }

    pub async fn resolve_all(&self, spec: &LocatorSpec, timeout: Duration) -> Result<Vec<D::Element>> {
        locator::resolve_all(&self.driver, self.clock(), spec, self.wait_for(timeout)).await
    }

    /// Poll the current location until it contains `fragment`.
    pub async fn wait_for_url(&self, fragment: &str, timeout: Duration) -> bool {
        self.wait_for(timeout)
            .until(self.clock(), || async move {
                self.url_contains(fragment).await.then_some(())
            })
            .await
            .is_some()
    }

    /// Whether the current location contains `fragment`. Driver errors count
    /// as "no".
    pub async fn url_contains(&self, fragment: &str) -> bool {
        match self.driver.current_url().await {
            Ok(url) => url.contains(fragment),
            Err(err) => {
                tracing::debug!(error = %err, "Failed to read current url");
                false
            }
        }
    }

    /// Clear a field and type `text` into it.
    pub async fn replace_text(&self, element: &D::Element, text: &str) -> Result<()> {
        self.driver.clear(element).await?;
        self.driver.type_text(element, text).await
    }

    /// Shut the browser down, consuming the session.
    pub async fn close(mut self) -> Result<()> {
        self.driver.close().await
    }
}
