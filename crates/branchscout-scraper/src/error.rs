use thiserror::Error;

/// Failures reported by the browser capability itself.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("no element matches {selector}")]
    NotFound { selector: String },

    #[error("webdriver error: {0}")]
    Driver(String),

    #[error("unexpected script result: {0}")]
    Script(String),
}

impl From<thirtyfour::prelude::WebDriverError> for BrowserError {
    fn from(err: thirtyfour::prelude::WebDriverError) -> Self {
        Self::Driver(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error(transparent)]
    Browser(#[from] BrowserError),

    #[error("timed out after {waited_ms}ms waiting for {what}")]
    Timeout { what: String, waited_ms: u64 },

    #[error("session bootstrap failed for {url}: {source}")]
    Bootstrap {
        url: String,
        #[source]
        source: Box<ScraperError>,
    },

    #[error("region label must be non-empty")]
    InvalidRegionLabel,
}
