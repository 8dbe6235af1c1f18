use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub start_url: String,
    pub webdriver_url: String,
    pub headless: bool,
    pub user_agent: Option<String>,
    pub regions_path: PathBuf,
    pub output_dir: PathBuf,
    pub write_csv: bool,
    pub log_level: String,
    /// Budget for every blocking wait (first card, result-set change, page navigation).
    pub wait_timeout_secs: u64,
    /// Shorter budget for the combobox option to become clickable before falling back to Enter.
    pub option_timeout_ms: u64,
    pub poll_interval_ms: u64,
    pub scroll_pause_ms: u64,
    pub max_scroll_rounds: u32,
    pub page_scroll_rounds: u32,
    pub page_settle_ms: u64,
    pub max_pages: usize,
}

impl AppConfig {
    #[must_use]
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    #[must_use]
    pub fn option_timeout(&self) -> Duration {
        Duration::from_millis(self.option_timeout_ms)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub fn scroll_pause(&self) -> Duration {
        Duration::from_millis(self.scroll_pause_ms)
    }

    #[must_use]
    pub fn page_settle(&self) -> Duration {
        Duration::from_millis(self.page_settle_ms)
    }
}
