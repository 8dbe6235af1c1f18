use std::time::Duration;

use branchscout_core::AppConfig;

use crate::card::CardSelectors;
use crate::pagination::{default_next_strategies, NextStrategy};
use crate::region_select::ComboboxSelectors;
use crate::wait::WaitPolicy;

/// Pause between clearing the combobox and typing, so the widget drops its old filter.
const INPUT_CLEAR_PAUSE: Duration = Duration::from_millis(150);
/// Pause after scrolling back to the top before a region's convergence loop.
const SCROLL_TOP_PAUSE: Duration = Duration::from_millis(200);

/// Everything the scrape loops need to know about timing and page structure.
#[derive(Debug, Clone)]
pub struct ScrapeSettings {
    /// Budget and cadence for card presence and result-set change.
    pub wait: WaitPolicy,
    /// Budget for the combobox listbox and option to appear, and for the card
    /// names to change after a region is selected.
    pub option_timeout: Duration,
    pub input_clear_pause: Duration,
    pub scroll_top_pause: Duration,
    /// Settle pause between scroll-to-bottom and the next height read.
    pub scroll_pause: Duration,
    pub max_scroll_rounds: u32,
    pub page_scroll_rounds: u32,
    /// Settle pause after a next-page click.
    pub page_settle: Duration,
    pub max_pages: usize,
    pub cards: CardSelectors,
    pub combobox: ComboboxSelectors,
    /// Tried in order when looking for the next-page control.
    pub next_strategies: Vec<NextStrategy>,
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            wait: WaitPolicy::new(Duration::from_secs(30), Duration::from_millis(250)),
            option_timeout: Duration::from_millis(3000),
            input_clear_pause: INPUT_CLEAR_PAUSE,
            scroll_top_pause: SCROLL_TOP_PAUSE,
            scroll_pause: Duration::from_millis(800),
            max_scroll_rounds: 25,
            page_scroll_rounds: 3,
            page_settle: Duration::from_millis(800),
            max_pages: 50,
            cards: CardSelectors::default(),
            combobox: ComboboxSelectors::default(),
            next_strategies: default_next_strategies(),
        }
    }
}

impl ScrapeSettings {
    /// Timing knobs from the environment; selectors stay at their defaults.
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            wait: WaitPolicy::new(config.wait_timeout(), config.poll_interval()),
            option_timeout: config.option_timeout(),
            scroll_pause: config.scroll_pause(),
            max_scroll_rounds: config.max_scroll_rounds,
            page_scroll_rounds: config.page_scroll_rounds,
            page_settle: config.page_settle(),
            max_pages: config.max_pages,
            ..Self::default()
        }
    }

    /// Wait policy for combobox listbox and option lookups.
    #[must_use]
    pub fn option_wait(&self) -> WaitPolicy {
        self.wait.with_timeout(self.option_timeout)
    }
}
