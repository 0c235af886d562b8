#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use async_trait::async_trait;
use mfentry::browser::Driver;
use mfentry::clock::ManualClock;
use mfentry::config::{SiteConfig, TimingConfig};
use mfentry::error::{CategoryLevel, EntryError};
use mfentry::locator::Locator;
use mfentry::models::TransactionRecord;
use mfentry::page;
use mfentry::session::Session;

pub const LOGIN_URL: &str = "https://id.moneyforward.com/sign_in";
pub const HOME_URL: &str = "https://moneyforward.com/";
pub const ENTRY_URL: &str = "https://moneyforward.com/cf#cf_new";
pub const DIVERSION_URL: &str = "https://moneyforward.com/profile/rule";

/// Something the engine did to the fake browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Goto(String),
    Click(Locator, usize),
    ScriptClick(Locator, usize),
    Scroll(Locator, usize),
    Clear(Locator),
    Type(Locator, String),
    PressEnter(Locator),
    SetValue(Locator, String),
    Close,
}

/// Page change triggered by a click or an Enter key press.
#[derive(Debug, Clone)]
pub enum Effect {
    Show(Locator),
    Hide(Locator),
    Navigate(String),
}

#[derive(Debug, Clone)]
pub struct FakeElement {
    pub count: usize,
    pub visible: bool,
    pub style: Option<String>,
    /// Only attached while the location contains this fragment.
    pub on_url: Option<String>,
    pub click_fails: bool,
}

impl Default for FakeElement {
    fn default() -> Self {
        Self {
            count: 1,
            visible: true,
            style: None,
            on_url: None,
            click_fails: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementRef {
    pub locator: Locator,
    pub index: usize,
}

#[derive(Default)]
struct FakeState {
    url: String,
    elements: HashMap<Locator, FakeElement>,
    click_effects: HashMap<Locator, Vec<Effect>>,
    enter_effects: HashMap<Locator, Vec<Effect>>,
    /// target url -> (landing url, remaining count)
    redirects: HashMap<String, (String, usize)>,
    actions: Vec<Action>,
    closed: bool,
}

/// In-memory browser. Clones share state, so a test can keep a handle after
/// the session takes ownership of the driver.
#[derive(Clone, Default)]
pub struct FakeDriver {
    state: Arc<Mutex<FakeState>>,
}

impl FakeDriver {
    pub fn new(url: &str) -> Self {
        let driver = Self::default();
        driver.lock().url = url.to_string();
        driver
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn with(self, locator: Locator) -> Self {
        self.with_element(locator, FakeElement::default())
    }

    pub fn with_element(self, locator: Locator, element: FakeElement) -> Self {
        self.lock().elements.insert(locator, element);
        self
    }

    pub fn without(self, locator: &Locator) -> Self {
        self.lock().elements.remove(locator);
        self
    }

    pub fn on_click(self, locator: Locator, effect: Effect) -> Self {
        self.lock()
            .click_effects
            .entry(locator)
            .or_default()
            .push(effect);
        self
    }

    pub fn on_enter(self, locator: Locator, effect: Effect) -> Self {
        self.lock()
            .enter_effects
            .entry(locator)
            .or_default()
            .push(effect);
        self
    }

    /// The next `times` visits to `target` land on `landing` instead.
    pub fn redirect(self, target: &str, landing: &str, times: usize) -> Self {
        self.lock()
            .redirects
            .insert(target.to_string(), (landing.to_string(), times));
        self
    }

    pub fn url(&self) -> String {
        self.lock().url.clone()
    }

    pub fn actions(&self) -> Vec<Action> {
        self.lock().actions.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn clicks_on(&self, locator: &Locator) -> usize {
        self.actions()
            .iter()
            .filter(|a| matches!(a, Action::Click(l, _) if l == locator))
            .count()
    }

    pub fn typed_into(&self, locator: &Locator) -> Vec<String> {
        self.actions()
            .into_iter()
            .filter_map(|a| match a {
                Action::Type(l, text) if &l == locator => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn gotos(&self) -> Vec<String> {
        self.actions()
            .into_iter()
            .filter_map(|a| match a {
                Action::Goto(url) => Some(url),
                _ => None,
            })
            .collect()
    }

    /// Actions that touch the entry modal.
    pub fn form_interactions(&self) -> usize {
        self.actions()
            .iter()
            .filter(|a| !matches!(a, Action::Goto(_) | Action::Close))
            .count()
    }

    fn apply(state: &mut FakeState, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Show(locator) => {
                    let element = state.elements.entry(locator).or_default();
                    element.visible = true;
                    element.count = element.count.max(1);
                }
                Effect::Hide(locator) => {
                    state.elements.remove(&locator);
                }
                Effect::Navigate(url) => state.url = url,
            }
        }
    }

    fn ensure_open(state: &FakeState) -> Result<()> {
        if state.closed {
            anyhow::bail!("browser is closed");
        }
        Ok(())
    }
}

#[async_trait]
impl Driver for FakeDriver {
    type Element = ElementRef;

    async fn goto(&self, url: &str) -> Result<()> {
        let mut state = self.lock();
        Self::ensure_open(&state)?;
        state.actions.push(Action::Goto(url.to_string()));

        let landing = match state.redirects.get_mut(url) {
            Some((landing, remaining)) if *remaining > 0 => {
                *remaining -= 1;
                landing.clone()
            }
            _ => url.to_string(),
        };
        state.url = landing;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        let state = self.lock();
        Self::ensure_open(&state)?;
        Ok(state.url.clone())
    }

    async fn find_all(&self, locator: &Locator) -> Result<Vec<ElementRef>> {
        let state = self.lock();
        Self::ensure_open(&state)?;
        let Some(element) = state.elements.get(locator) else {
            return Ok(Vec::new());
        };
        if let Some(fragment) = &element.on_url {
            if !state.url.contains(fragment.as_str()) {
                return Ok(Vec::new());
            }
        }
        Ok((0..element.count)
            .map(|index| ElementRef {
                locator: locator.clone(),
                index,
            })
            .collect())
    }

    async fn is_clickable(&self, element: &ElementRef) -> Result<bool> {
        let state = self.lock();
        Ok(state
            .elements
            .get(&element.locator)
            .is_some_and(|e| e.visible))
    }

    async fn attribute(&self, element: &ElementRef, name: &str) -> Result<Option<String>> {
        let state = self.lock();
        if name != "style" {
            return Ok(None);
        }
        Ok(state
            .elements
            .get(&element.locator)
            .and_then(|e| e.style.clone()))
    }

    async fn click(&self, element: &ElementRef) -> Result<()> {
        let mut state = self.lock();
        Self::ensure_open(&state)?;
        if state
            .elements
            .get(&element.locator)
            .is_some_and(|e| e.click_fails)
        {
            anyhow::bail!("element click intercepted");
        }
        state
            .actions
            .push(Action::Click(element.locator.clone(), element.index));
        let effects = state
            .click_effects
            .get(&element.locator)
            .cloned()
            .unwrap_or_default();
        Self::apply(&mut state, effects);
        Ok(())
    }

    async fn script_click(&self, element: &ElementRef) -> Result<()> {
        let mut state = self.lock();
        Self::ensure_open(&state)?;
        state
            .actions
            .push(Action::ScriptClick(element.locator.clone(), element.index));
        let effects = state
            .click_effects
            .get(&element.locator)
            .cloned()
            .unwrap_or_default();
        Self::apply(&mut state, effects);
        Ok(())
    }

    async fn scroll_into_view(&self, element: &ElementRef) -> Result<()> {
        self.lock()
            .actions
            .push(Action::Scroll(element.locator.clone(), element.index));
        Ok(())
    }

    async fn clear(&self, element: &ElementRef) -> Result<()> {
        self.lock()
            .actions
            .push(Action::Clear(element.locator.clone()));
        Ok(())
    }

    async fn type_text(&self, element: &ElementRef, text: &str) -> Result<()> {
        self.lock()
            .actions
            .push(Action::Type(element.locator.clone(), text.to_string()));
        Ok(())
    }

    async fn press_enter(&self, element: &ElementRef) -> Result<()> {
        let mut state = self.lock();
        state
            .actions
            .push(Action::PressEnter(element.locator.clone()));
        let effects = state
            .enter_effects
            .get(&element.locator)
            .cloned()
            .unwrap_or_default();
        Self::apply(&mut state, effects);
        Ok(())
    }

    async fn set_value(&self, element: &ElementRef, value: &str) -> Result<()> {
        self.lock()
            .actions
            .push(Action::SetValue(element.locator.clone(), value.to_string()));
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        let mut state = self.lock();
        state.actions.push(Action::Close);
        state.closed = true;
        Ok(())
    }
}

/// Primary locator of a single-strategy element.
pub fn primary(spec: &mfentry::locator::LocatorSpec) -> Locator {
    spec.strategies()[0].clone()
}

pub fn category_locator(level: CategoryLevel, name: &str) -> Locator {
    primary(&page::category_option(level, name))
}

/// Household-book page with a working entry modal and the given category
/// options. Saving shows the continue button; continuing hides it.
pub fn entry_page(categories: &[&str]) -> FakeDriver {
    let continue_button = primary(&page::continue_button());
    let mut driver = FakeDriver::new(ENTRY_URL)
        .with_element(
            primary(&page::new_entry_button()),
            FakeElement {
                count: 2,
                on_url: Some("/cf".to_string()),
                ..FakeElement::default()
            },
        )
        .with(page::entry_modal().strategies()[0].clone())
        .with(primary(&page::date_field()))
        .with(primary(&page::amount_field()))
        .with(primary(&page::income_toggle()))
        .with(primary(&page::expense_toggle()))
        .with(primary(&page::sub_account_select()))
        .with(primary(&page::category_picker(CategoryLevel::Large)))
        .with(primary(&page::category_picker(CategoryLevel::Middle)))
        .with(primary(&page::content_field()))
        .with(primary(&page::submit_button()))
        .on_click(
            primary(&page::submit_button()),
            Effect::Show(continue_button.clone()),
        )
        .on_click(continue_button.clone(), Effect::Hide(continue_button));

    for name in categories {
        driver = driver.with(Locator::link_text(*name));
    }
    driver
}

pub fn site() -> SiteConfig {
    SiteConfig::default()
}

pub fn session(driver: FakeDriver) -> (Session<FakeDriver>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let session = Session::new(driver, TimingConfig::default()).with_clock(clock.clone());
    (session, clock)
}

pub fn record(cells: &[&str]) -> TransactionRecord {
    let row: Vec<String> = cells.iter().map(|s| s.to_string()).collect();
    TransactionRecord::from_row(&row).expect("valid test row")
}

/// The typed entry error anywhere in an error chain.
pub fn entry_error(err: &anyhow::Error) -> Option<&EntryError> {
    err.chain().find_map(|e| e.downcast_ref::<EntryError>())
}
