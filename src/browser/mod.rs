//! The browser capability the entry engine drives.
//!
//! Everything the engine needs from a browser goes through [`Driver`], so the
//! flow can run against Chrome or against an in-memory fake.

#[cfg(feature = "chrome")]
mod chrome;

#[cfg(feature = "chrome")]
pub use chrome::{find_chrome, ChromeDriver};

use anyhow::Result;

use crate::locator::Locator;

/// Browser operations consumed by the session.
///
/// Element handles are opaque to the engine; they are only passed back into
/// the driver that produced them.
#[async_trait::async_trait]
pub trait Driver: Send + Sync {
    type Element: Send + Sync;

    async fn goto(&self, url: &str) -> Result<()>;

    async fn current_url(&self) -> Result<String>;

    /// All elements currently matching `locator`, in document order.
    async fn find_all(&self, locator: &Locator) -> Result<Vec<Self::Element>>;

    /// Visible and enabled.
    async fn is_clickable(&self, element: &Self::Element) -> Result<bool>;

    async fn attribute(&self, element: &Self::Element, name: &str) -> Result<Option<String>>;

    async fn click(&self, element: &Self::Element) -> Result<()>;

    /// Click through a script call, bypassing overlays that intercept the
    /// pointer.
    async fn script_click(&self, element: &Self::Element) -> Result<()>;

    async fn scroll_into_view(&self, element: &Self::Element) -> Result<()>;

    async fn clear(&self, element: &Self::Element) -> Result<()>;

    async fn type_text(&self, element: &Self::Element, text: &str) -> Result<()>;

    async fn press_enter(&self, element: &Self::Element) -> Result<()>;

    /// Assign `value` directly and dispatch a `change` event.
    async fn set_value(&self, element: &Self::Element, value: &str) -> Result<()>;

    /// Shut the browser down. Called exactly once per session.
    async fn close(&mut self) -> Result<()>;
}
