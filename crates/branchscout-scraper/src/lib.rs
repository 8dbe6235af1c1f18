pub mod browser;
pub mod card;
pub mod converge;
pub mod error;
pub mod pagination;
pub mod region_select;
pub mod run;
pub mod settings;
pub mod wait;
pub mod webdriver;

pub use browser::{Element, Keys, Page, Selector};
pub use card::{extract_card, extract_cards, leading_number, CardSelectors};
pub use converge::{converge, scroll_until_settled, Convergence};
pub use error::{BrowserError, ScraperError};
pub use pagination::{advance_page, default_next_strategies, NextStrategy};
pub use region_select::{select_region, ComboboxSelectors, SelectionMethod};
pub use run::{bootstrap, run_pages, run_regions, PageReport, RegionOutcome, RegionReport};
pub use settings::ScrapeSettings;
pub use wait::{await_condition, await_some, WaitPolicy};
pub use webdriver::{BrowserOptions, WebDriverPage};
