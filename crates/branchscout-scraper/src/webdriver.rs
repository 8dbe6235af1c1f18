//! `thirtyfour` implementation of the browser capability.

use async_trait::async_trait;
use thirtyfour::prelude::*;
use thirtyfour::ChromiumLikeCapabilities;

use branchscout_core::AppConfig;

use crate::browser::{Element, Keys, Page, Selector};
use crate::error::BrowserError;

/// User agent sent by headless sessions when none is configured; some
/// directories serve an empty shell to the default headless UA.
const HEADLESS_FALLBACK_UA: &str = "Mozilla/5.0";

/// How to reach and configure the WebDriver-controlled browser.
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub webdriver_url: String,
    pub headless: bool,
    pub user_agent: Option<String>,
}

impl BrowserOptions {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            webdriver_url: config.webdriver_url.clone(),
            headless: config.headless,
            user_agent: config.user_agent.clone(),
        }
    }

    fn effective_user_agent(&self) -> Option<&str> {
        match self.user_agent.as_deref() {
            Some(ua) => Some(ua),
            None if self.headless => Some(HEADLESS_FALLBACK_UA),
            None => None,
        }
    }
}

/// A live Chrome session driven over WebDriver.
///
/// Must be released with [`WebDriverPage::quit`]; dropping it leaves the
/// browser process running until the WebDriver server reaps it.
pub struct WebDriverPage {
    driver: WebDriver,
}

impl WebDriverPage {
    /// Start a Chrome session on the configured WebDriver endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::Driver`] if capabilities are rejected or the
    /// WebDriver server cannot start a session.
    pub async fn connect(options: &BrowserOptions) -> Result<Self, BrowserError> {
        let mut caps = DesiredCapabilities::chrome();
        if options.headless {
            caps.add_arg("--headless=new")?;
        }
        caps.add_arg("--disable-gpu")?;
        caps.add_arg("--no-sandbox")?;
        caps.add_arg("--disable-dev-shm-usage")?;
        if let Some(ua) = options.effective_user_agent() {
            caps.add_arg(&format!("--user-agent={ua}"))?;
        }

        let driver = WebDriver::new(options.webdriver_url.as_str(), caps).await?;
        tracing::debug!(
            webdriver_url = %options.webdriver_url,
            headless = options.headless,
            "browser session started"
        );
        Ok(Self { driver })
    }

    /// End the browser session.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::Driver`] if the WebDriver server rejects the request.
    pub async fn quit(self) -> Result<(), BrowserError> {
        self.driver.quit().await?;
        Ok(())
    }
}

fn to_by(selector: &Selector) -> By {
    match selector {
        Selector::Css(css) => By::Css(css.as_str()),
        Selector::XPath(xpath) => By::XPath(xpath.as_str()),
    }
}

#[async_trait]
impl Page for WebDriverPage {
    type Element = WebDriverElement;

    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        self.driver.goto(url).await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String, BrowserError> {
        Ok(self.driver.current_url().await?.to_string())
    }

    async fn find_all(&self, selector: &Selector) -> Result<Vec<Self::Element>, BrowserError> {
        let elements = self.driver.find_all(to_by(selector)).await?;
        Ok(elements.into_iter().map(WebDriverElement).collect())
    }

    async fn execute(&self, script: &str) -> Result<serde_json::Value, BrowserError> {
        let ret = self.driver.execute(script, Vec::new()).await?;
        Ok(ret.json().clone())
    }
}

/// Element handle returned by [`WebDriverPage`].
#[derive(Clone)]
pub struct WebDriverElement(WebElement);

#[async_trait]
impl Element for WebDriverElement {
    async fn text(&self) -> Result<String, BrowserError> {
        Ok(self.0.text().await?)
    }

    async fn click(&self) -> Result<(), BrowserError> {
        self.0.click().await?;
        Ok(())
    }

    async fn send_keys(&self, keys: Keys) -> Result<(), BrowserError> {
        match keys {
            Keys::Text(text) => self.0.send_keys(text).await?,
            Keys::SelectAll => self.0.send_keys(Key::Control + "a").await?,
            Keys::Backspace => self.0.send_keys(Key::Backspace).await?,
            Keys::Enter => self.0.send_keys(Key::Enter).await?,
        }
        Ok(())
    }

    async fn is_displayed(&self) -> Result<bool, BrowserError> {
        Ok(self.0.is_displayed().await?)
    }

    async fn is_enabled(&self) -> Result<bool, BrowserError> {
        Ok(self.0.is_enabled().await?)
    }

    async fn attr(&self, name: &str) -> Result<Option<String>, BrowserError> {
        Ok(self.0.attr(name).await?)
    }

    async fn find_all(&self, selector: &Selector) -> Result<Vec<Self>, BrowserError> {
        let elements = self.0.find_all(to_by(selector)).await?;
        Ok(elements.into_iter().map(WebDriverElement).collect())
    }

    async fn is_present(&self) -> Result<bool, BrowserError> {
        Ok(self.0.is_present().await?)
    }
}
