//! In-memory directory page for browser-free tests of the scrape loops.
//!
//! The fake understands exactly the default selectors from
//! [`ScrapeSettings::default`] and answers everything else with no matches.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use branchscout_scraper::region_select::option_selector;
use branchscout_scraper::{BrowserError, Element, Keys, Page, ScrapeSettings, Selector, WaitPolicy};

pub const BASE_URL: &str = "https://branches.test/list";

/// Raw texts rendered by one card. `None` leaves the sub-element out entirely.
#[derive(Debug, Clone, Default)]
pub struct FakeCard {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub status: Option<String>,
    pub summary: Option<String>,
}

impl FakeCard {
    pub fn new(name: &str, phone: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            phone: Some(phone.to_string()),
            status: Some("ເປີດ".to_string()),
            summary: Some("4.5 ★ (12)".to_string()),
        }
    }
}

#[derive(Debug, Default)]
pub struct FakeState {
    /// Cards rendered right after navigation in region mode.
    pub initial_cards: Vec<FakeCard>,
    /// Cards rendered by each region label once selected.
    pub regions: HashMap<String, Vec<FakeCard>>,
    /// Labels whose option click fails.
    pub broken_regions: HashSet<String>,
    /// When `false` the listbox never renders and only Enter commits a label.
    pub options_enabled: bool,
    /// Result pages; when non-empty, navigation lands on page 1.
    pub pages: Vec<Vec<FakeCard>>,
    pub next_disabled: bool,
    /// Card-name reads a region selection waits before its cards replace the old ones.
    pub render_delay_reads: u32,

    pub cards: Vec<FakeCard>,
    pub url: String,
    pub typed: String,
    pub select_all: bool,
    pub page_index: usize,
    /// Bumped on every re-render; element handles from older renders are stale.
    pub generation: u64,
    pub scrolls: u32,
    pub events: Vec<String>,
    pending: Option<(Vec<FakeCard>, u32)>,
}

impl FakeState {
    fn render(&mut self, cards: Vec<FakeCard>) {
        self.cards = cards;
        self.generation += 1;
    }

    fn apply_region(&mut self, label: &str) {
        if let Some(cards) = self.regions.get(label).cloned() {
            if self.render_delay_reads == 0 {
                self.render(cards);
            } else {
                self.pending = Some((cards, self.render_delay_reads));
            }
        }
    }

    /// Count down a delayed region render; the old cards stay until it lands.
    fn tick_pending(&mut self) {
        if let Some((cards, remaining)) = self.pending.take() {
            if remaining <= 1 {
                self.render(cards);
            } else {
                self.pending = Some((cards, remaining - 1));
            }
        }
    }

    fn has_next_page(&self) -> bool {
        self.page_index + 1 < self.pages.len()
    }
}

#[derive(Debug, Clone)]
enum Kind {
    Card(usize),
    DividerRow(usize),
    Text(String),
    ComboInput,
    Listbox,
    RegionOption(String),
    Next { generation: u64, disabled: bool },
}

#[derive(Clone)]
pub struct FakePage {
    state: Arc<Mutex<FakeState>>,
    settings: ScrapeSettings,
}

pub struct FakeElement {
    state: Arc<Mutex<FakeState>>,
    settings: ScrapeSettings,
    kind: Kind,
    generation: u64,
}

impl FakePage {
    pub fn new(state: FakeState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            settings: ScrapeSettings::default(),
        }
    }

    /// A region-mode page with the given initial cards; options render normally.
    pub fn with_regions(initial: Vec<FakeCard>, regions: &[(&str, Vec<FakeCard>)]) -> Self {
        Self::new(FakeState {
            initial_cards: initial,
            regions: regions
                .iter()
                .map(|(label, cards)| ((*label).to_string(), cards.clone()))
                .collect(),
            options_enabled: true,
            ..FakeState::default()
        })
    }

    pub fn with_pages(pages: Vec<Vec<FakeCard>>) -> Self {
        Self::new(FakeState {
            pages,
            ..FakeState::default()
        })
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake state lock")
    }

    fn element(&self, kind: Kind, generation: u64) -> FakeElement {
        FakeElement {
            state: Arc::clone(&self.state),
            settings: self.settings.clone(),
            kind,
            generation,
        }
    }
}

/// Default settings with every pause removed and short wait budgets.
pub fn fast_settings() -> ScrapeSettings {
    ScrapeSettings {
        wait: WaitPolicy::new(Duration::from_millis(200), Duration::from_millis(1)),
        option_timeout: Duration::from_millis(20),
        input_clear_pause: Duration::ZERO,
        scroll_top_pause: Duration::ZERO,
        scroll_pause: Duration::ZERO,
        page_settle: Duration::ZERO,
        ..ScrapeSettings::default()
    }
}

fn page_url(index: usize) -> String {
    if index == 0 {
        BASE_URL.to_string()
    } else {
        format!("{BASE_URL}?page={}", index + 1)
    }
}

#[async_trait]
impl Page for FakePage {
    type Element = FakeElement;

    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        let mut state = self.state();
        state.url = url.to_string();
        state.page_index = 0;
        let cards = match state.pages.first() {
            Some(first) => first.clone(),
            None => state.initial_cards.clone(),
        };
        state.render(cards);
        Ok(())
    }

    async fn current_url(&self) -> Result<String, BrowserError> {
        Ok(self.state().url.clone())
    }

    async fn find_all(&self, selector: &Selector) -> Result<Vec<FakeElement>, BrowserError> {
        let settings = &self.settings;
        let (kinds, generation) = {
            let mut state = self.state();
            if *selector == settings.cards.card_names {
                state.tick_pending();
            }
            let mut kinds = Vec::new();
            if *selector == settings.cards.card {
                kinds.extend((0..state.cards.len()).map(Kind::Card));
            } else if *selector == settings.cards.card_names {
                kinds.extend(state.cards.iter().filter_map(|c| c.name.clone()).map(Kind::Text));
            } else if *selector == settings.combobox.input {
                kinds.push(Kind::ComboInput);
            } else if *selector == settings.combobox.listbox {
                if state.options_enabled && state.regions.contains_key(state.typed.as_str()) {
                    kinds.push(Kind::Listbox);
                }
            } else if *selector == settings.next_strategies[0].selector && state.has_next_page() {
                kinds.push(Kind::Next {
                    generation: state.generation,
                    disabled: state.next_disabled,
                });
            }
            (kinds, state.generation)
        };
        Ok(kinds.into_iter().map(|k| self.element(k, generation)).collect())
    }

    async fn execute(&self, script: &str) -> Result<Value, BrowserError> {
        let mut state = self.state();
        if script.contains("scrollTo(0, document.body.scrollHeight)") {
            state.scrolls += 1;
            Ok(Value::Null)
        } else if script.contains("return document.body.scrollHeight") {
            Ok(json!(1200))
        } else {
            Ok(Value::Null)
        }
    }
}

impl FakeElement {
    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake state lock")
    }

    fn child(&self, kind: Kind) -> FakeElement {
        FakeElement {
            state: Arc::clone(&self.state),
            settings: self.settings.clone(),
            kind,
            generation: self.generation,
        }
    }
}

#[async_trait]
impl Element for FakeElement {
    async fn text(&self) -> Result<String, BrowserError> {
        match &self.kind {
            Kind::Text(text) => Ok(text.clone()),
            _ => Ok(String::new()),
        }
    }

    async fn click(&self) -> Result<(), BrowserError> {
        let mut state = self.state();
        match &self.kind {
            Kind::RegionOption(label) => {
                if state.broken_regions.contains(label) {
                    return Err(BrowserError::Driver(format!("option '{label}' detached")));
                }
                state.events.push(format!("option:{label}"));
                state.apply_region(label);
            }
            Kind::Next { generation, .. } if *generation == state.generation => {
                state.page_index += 1;
                state.url = page_url(state.page_index);
                let cards = state.pages[state.page_index].clone();
                state.render(cards);
                let event = format!("next:{}", state.page_index + 1);
                state.events.push(event);
            }
            _ => {}
        }
        Ok(())
    }

    async fn send_keys(&self, keys: Keys) -> Result<(), BrowserError> {
        if !matches!(self.kind, Kind::ComboInput) {
            return Ok(());
        }
        let mut state = self.state();
        match keys {
            Keys::Text(text) => state.typed.push_str(&text),
            Keys::SelectAll => state.select_all = true,
            Keys::Backspace => {
                if state.select_all {
                    state.typed.clear();
                    state.select_all = false;
                } else {
                    state.typed.pop();
                }
            }
            Keys::Enter => {
                let label = state.typed.clone();
                state.events.push(format!("enter:{label}"));
                state.apply_region(&label);
            }
        }
        Ok(())
    }

    async fn is_displayed(&self) -> Result<bool, BrowserError> {
        Ok(true)
    }

    async fn is_enabled(&self) -> Result<bool, BrowserError> {
        Ok(true)
    }

    async fn attr(&self, name: &str) -> Result<Option<String>, BrowserError> {
        match (&self.kind, name) {
            (Kind::Next { disabled: true, .. }, "class") => Ok(Some("page-link disabled".to_string())),
            (Kind::Next { disabled: false, .. }, "class") => Ok(Some("page-link".to_string())),
            _ => Ok(None),
        }
    }

    async fn find_all(&self, selector: &Selector) -> Result<Vec<Self>, BrowserError> {
        let cards = &self.settings.cards;
        let state = self.state();
        if self.generation != state.generation {
            return Err(BrowserError::Driver("stale element reference".to_string()));
        }

        let kinds: Vec<Kind> = match &self.kind {
            Kind::Card(i) => {
                let card = &state.cards[*i];
                if *selector == cards.name {
                    card.name.clone().map(Kind::Text).into_iter().collect()
                } else if *selector == cards.divider_row {
                    card.phone.as_ref().map(|_| Kind::DividerRow(*i)).into_iter().collect()
                } else if *selector == cards.status {
                    card.status.clone().map(Kind::Text).into_iter().collect()
                } else if *selector == cards.summary {
                    card.summary.clone().map(Kind::Text).into_iter().collect()
                } else {
                    Vec::new()
                }
            }
            Kind::DividerRow(i) if *selector == cards.name => {
                state.cards[*i].phone.clone().map(Kind::Text).into_iter().collect()
            }
            Kind::Listbox if *selector == option_selector(&state.typed) => {
                vec![Kind::RegionOption(state.typed.clone())]
            }
            _ => Vec::new(),
        };
        drop(state);
        Ok(kinds.into_iter().map(|k| self.child(k)).collect())
    }

    async fn is_present(&self) -> Result<bool, BrowserError> {
        Ok(self.generation == self.state().generation)
    }
}
