//! Element location with ordered fallback strategies.
//!
//! The host page does not always render a logical element under the same
//! identifier, so each element is described by a [`LocatorSpec`]: a list of
//! strategies tried in order, first success wins.

use std::fmt;

use anyhow::Result;
use tracing::debug;

use crate::browser::Driver;
use crate::clock::Clock;
use crate::error::EntryError;
use crate::wait::WaitPolicy;

/// One way of addressing an element on the page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    /// `id` attribute.
    Id(String),
    /// Arbitrary CSS selector.
    Css(String),
    /// A single class name.
    ClassName(String),
    /// An `<a>` whose normalized visible text equals the value.
    LinkText(String),
    XPath(String),
}

impl Locator {
    pub fn id(value: impl Into<String>) -> Self {
        Locator::Id(value.into())
    }

    pub fn css(value: impl Into<String>) -> Self {
        Locator::Css(value.into())
    }

    pub fn class_name(value: impl Into<String>) -> Self {
        Locator::ClassName(value.into())
    }

    pub fn link_text(value: impl Into<String>) -> Self {
        Locator::LinkText(value.into())
    }

    /// CSS selector for strategies that have one.
    pub fn css_selector(&self) -> Option<String> {
        match self {
            Locator::Id(id) => Some(format!("[id=\"{}\"]", escape_css_string(id))),
            Locator::Css(selector) => Some(selector.clone()),
            Locator::ClassName(class) => Some(format!(
                "[class~=\"{}\"]",
                escape_css_string(class)
            )),
            Locator::LinkText(_) | Locator::XPath(_) => None,
        }
    }

    /// XPath expression for strategies that need one.
    pub fn xpath_expression(&self) -> Option<String> {
        match self {
            Locator::LinkText(text) => Some(format!(
                "//a[normalize-space(.)={}]",
                xpath_literal(text.trim())
            )),
            Locator::XPath(expr) => Some(expr.clone()),
            _ => None,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Id(v) => write!(f, "id={v}"),
            Locator::Css(v) => write!(f, "css={v}"),
            Locator::ClassName(v) => write!(f, "class={v}"),
            Locator::LinkText(v) => write!(f, "link={v}"),
            Locator::XPath(v) => write!(f, "xpath={v}"),
        }
    }
}

fn escape_css_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Quote `value` as an XPath 1.0 string literal.
///
/// XPath has no escape syntax, so values containing both quote kinds are
/// split and joined with `concat()`.
fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{value}'");
    }
    if !value.contains('"') {
        return format!("\"{value}\"");
    }
    let parts: Vec<String> = value
        .split('\'')
        .map(|part| format!("'{part}'"))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}

/// How ready an element must be before it counts as resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Attached to the document.
    Present,
    /// Visible and enabled.
    Clickable,
}

/// Ordered fallback strategies for one logical element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorSpec {
    name: String,
    strategies: Vec<Locator>,
}

impl LocatorSpec {
    pub fn new(name: impl Into<String>, strategies: impl IntoIterator<Item = Locator>) -> Self {
        Self {
            name: name.into(),
            strategies: strategies.into_iter().collect(),
        }
    }

    pub fn single(name: impl Into<String>, locator: Locator) -> Self {
        Self::new(name, [locator])
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn strategies(&self) -> &[Locator] {
        &self.strategies
    }

    fn not_found(&self) -> EntryError {
        EntryError::ElementNotFound {
            element: self.name.clone(),
            attempted: self.strategies.clone(),
        }
    }
}

/// Resolve `spec` by trying each strategy in order, each for up to
/// `wait.timeout`. Returns the element from the first strategy that resolves.
pub async fn resolve<D: Driver>(
    driver: &D,
    clock: &dyn Clock,
    spec: &LocatorSpec,
    readiness: Readiness,
    wait: WaitPolicy,
) -> Result<D::Element> {
    for locator in spec.strategies() {
        let found = wait
            .until(clock, || async move { probe(driver, locator, readiness).await })
            .await;

        match found {
            Some(element) => {
                debug!(element = spec.name(), %locator, "Resolved element");
                return Ok(element);
            }
            None => {
                debug!(element = spec.name(), %locator, "Locator strategy timed out");
            }
        }
    }

    Err(spec.not_found().into())
}

/// Try each strategy of `spec` in order, waiting up to `wait.timeout` for
/// each, and return every match of the first one that finds anything, in
/// document order.
pub async fn resolve_all<D: Driver>(
    driver: &D,
    clock: &dyn Clock,
    spec: &LocatorSpec,
    wait: WaitPolicy,
) -> Result<Vec<D::Element>> {
    for locator in spec.strategies() {
        let found = wait
            .until(clock, || async move {
                match driver.find_all(locator).await {
                    Ok(elements) if !elements.is_empty() => Some(elements),
                    Ok(_) => None,
                    Err(err) => {
                        debug!(%locator, error = %err, "Element query failed");
                        None
                    }
                }
            })
            .await;

        if let Some(elements) = found {
            return Ok(elements);
        }
    }

    Err(spec.not_found().into())
}

async fn probe<D: Driver>(driver: &D, locator: &Locator, readiness: Readiness) -> Option<D::Element> {
    let elements = match driver.find_all(locator).await {
        Ok(elements) => elements,
        Err(err) => {
            debug!(%locator, error = %err, "Element query failed");
            return None;
        }
    };

    match readiness {
        Readiness::Present => elements.into_iter().next(),
        Readiness::Clickable => {
            for element in elements {
                match driver.is_clickable(&element).await {
                    Ok(true) => return Some(element),
                    Ok(false) => {}
                    Err(err) => debug!(%locator, error = %err, "Clickability check failed"),
                }
            }
            None
        }
    }
}
