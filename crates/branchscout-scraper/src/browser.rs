//! Browser capability seam.
//!
//! The scrape loops only ever talk to a [`Page`] and its [`Element`]s. The
//! production implementation wraps `thirtyfour` (see [`crate::webdriver`]);
//! tests drive the same loops against an in-memory page.

use async_trait::async_trait;

use crate::error::BrowserError;

/// Element locator understood by the browser capability.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    Css(String),
    XPath(String),
}

impl Selector {
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    pub fn xpath(selector: impl Into<String>) -> Self {
        Self::XPath(selector.into())
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selector::Css(css) => write!(f, "css `{css}`"),
            Selector::XPath(xpath) => write!(f, "xpath `{xpath}`"),
        }
    }
}

/// Keyboard input sent to a focused element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keys {
    Text(String),
    /// Ctrl+A.
    SelectAll,
    Backspace,
    Enter,
}

#[async_trait]
pub trait Element: Send + Sync + Sized {
    async fn text(&self) -> Result<String, BrowserError>;

    async fn click(&self) -> Result<(), BrowserError>;

    async fn send_keys(&self, keys: Keys) -> Result<(), BrowserError>;

    async fn is_displayed(&self) -> Result<bool, BrowserError>;

    async fn is_enabled(&self) -> Result<bool, BrowserError>;

    async fn attr(&self, name: &str) -> Result<Option<String>, BrowserError>;

    /// Descendants of this element matching `selector`.
    async fn find_all(&self, selector: &Selector) -> Result<Vec<Self>, BrowserError>;

    /// First descendant matching `selector`.
    async fn find(&self, selector: &Selector) -> Result<Self, BrowserError> {
        self.find_all(selector)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| BrowserError::NotFound {
                selector: selector.to_string(),
            })
    }

    /// `false` once the element has been detached from the document.
    async fn is_present(&self) -> Result<bool, BrowserError>;
}

#[async_trait]
pub trait Page: Send + Sync {
    type Element: Element;

    async fn navigate(&self, url: &str) -> Result<(), BrowserError>;

    async fn current_url(&self) -> Result<String, BrowserError>;

    async fn find_all(&self, selector: &Selector) -> Result<Vec<Self::Element>, BrowserError>;

    async fn find(&self, selector: &Selector) -> Result<Self::Element, BrowserError> {
        self.find_all(selector)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| BrowserError::NotFound {
                selector: selector.to_string(),
            })
    }

    /// Run a script in the page and return its JSON result.
    async fn execute(&self, script: &str) -> Result<serde_json::Value, BrowserError>;
}
