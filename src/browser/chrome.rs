//! [`Driver`] implementation over the Chrome DevTools Protocol.

use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::input::InsertTextParams;
use chromiumoxide::{Element, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;

use super::Driver;
use crate::config::BrowserSettings;
use crate::locator::Locator;

const CLICKABLE_JS: &str = r#"function() {
    const style = window.getComputedStyle(this);
    const rect = this.getBoundingClientRect();
    return !this.disabled
        && style.display !== 'none'
        && style.visibility !== 'hidden'
        && rect.width > 0
        && rect.height > 0;
}"#;

const CLEAR_JS: &str =
    "function() { this.value = ''; this.dispatchEvent(new Event('input', { bubbles: true })); }";

const SCROLL_JS: &str = "function() { this.scrollIntoView({ block: 'center' }); }";

const CLICK_JS: &str = "function() { this.click(); }";

/// A launched Chrome instance with a single page.
pub struct ChromeDriver {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl ChromeDriver {
    pub async fn launch(settings: &BrowserSettings) -> Result<Self> {
        let chrome_path = match &settings.chrome_executable {
            Some(path) => path.display().to_string(),
            None => find_chrome().context(
                "Chrome/Chromium not found. Install Chrome or set browser.chrome_executable.",
            )?,
        };

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .viewport(None)
            .arg("--log-level=3")
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--no-first-run")
            .arg("--no-default-browser-check");
        if !settings.headless {
            builder = builder.with_head();
        }
        if settings.incognito {
            builder = builder.arg("--incognito");
        }
        for arg in &settings.args {
            builder = builder.arg(arg.as_str());
        }
        let config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to configure browser: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("Failed to launch browser")?;
        let handler_task = tokio::spawn(async move { while (handler.next().await).is_some() {} });

        let page = browser
            .new_page("about:blank")
            .await
            .context("Failed to open browser page")?;

        Ok(Self {
            browser,
            page,
            handler_task,
        })
    }

    async fn call(&self, element: &Element, function: impl Into<String>) -> Result<Option<serde_json::Value>> {
        let returns = element.call_js_fn(function, false).await?;
        Ok(returns.result.value)
    }
}

#[async_trait::async_trait]
impl Driver for ChromeDriver {
    type Element = Element;

    async fn goto(&self, url: &str) -> Result<()> {
        self.page
            .goto(url)
            .await
            .with_context(|| format!("Failed to navigate to {url}"))?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.page.url().await?.unwrap_or_default())
    }

    async fn find_all(&self, locator: &Locator) -> Result<Vec<Element>> {
        if let Some(selector) = locator.css_selector() {
            return Ok(self.page.find_elements(selector).await?);
        }
        match locator.xpath_expression() {
            Some(xpath) => Ok(self.page.find_xpaths(xpath).await?),
            None => anyhow::bail!("Unsupported locator: {locator}"),
        }
    }

    async fn is_clickable(&self, element: &Element) -> Result<bool> {
        let value = self.call(element, CLICKABLE_JS).await?;
        Ok(value.and_then(|v| v.as_bool()).unwrap_or(false))
    }

    async fn attribute(&self, element: &Element, name: &str) -> Result<Option<String>> {
        Ok(element.attribute(name).await?)
    }

    async fn click(&self, element: &Element) -> Result<()> {
        element.click().await?;
        Ok(())
    }

    async fn script_click(&self, element: &Element) -> Result<()> {
        self.call(element, CLICK_JS).await?;
        Ok(())
    }

    async fn scroll_into_view(&self, element: &Element) -> Result<()> {
        self.call(element, SCROLL_JS).await?;
        Ok(())
    }

    async fn clear(&self, element: &Element) -> Result<()> {
        self.call(element, CLEAR_JS).await?;
        Ok(())
    }

    async fn type_text(&self, element: &Element, text: &str) -> Result<()> {
        // Key-event typing only knows US keyboard keys; insertText handles
        // any text, including Japanese.
        element.focus().await?;
        self.page.execute(InsertTextParams::new(text)).await?;
        Ok(())
    }

    async fn press_enter(&self, element: &Element) -> Result<()> {
        element.press_key("Enter").await?;
        Ok(())
    }

    async fn set_value(&self, element: &Element, value: &str) -> Result<()> {
        let function = format!(
            "function() {{ this.value = {}; this.dispatchEvent(new Event('change')); }}",
            serde_json::to_string(value)?
        );
        self.call(element, function).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        let closed = self.browser.close().await;
        if closed.is_ok() {
            let _ = self.browser.wait().await;
        }
        self.handler_task.abort();
        closed.context("Failed to close browser")?;
        Ok(())
    }
}

/// Find Chrome/Chromium executable.
pub fn find_chrome() -> Option<String> {
    for name in ["google-chrome", "chromium"] {
        if let Ok(output) = std::process::Command::new("which").arg(name).output() {
            if output.status.success() {
                let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path.is_empty() {
                    return Some(path);
                }
            }
        }
    }

    let candidates = [
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        "/run/current-system/sw/bin/google-chrome",
        "/run/current-system/sw/bin/chromium",
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        "C:\\Program Files\\Google\\Chrome\\Application\\chrome.exe",
    ];

    for candidate in candidates {
        if std::path::Path::new(candidate).exists() {
            return Some(candidate.to_string());
        }
    }
    None
}
