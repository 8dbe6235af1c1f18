//! Next-page discovery for paginated result sets.
//!
//! Directories disagree on how they render "next". Rather than one clever
//! selector, an ordered list of named strategies is tried until one yields an
//! actionable control that actually moves the page.

use crate::browser::{Element, Page, Selector};
use crate::error::{BrowserError, ScraperError};
use crate::settings::ScrapeSettings;
use crate::wait::await_condition;

/// One way of locating the next-page control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextStrategy {
    /// Short label used in logs.
    pub name: String,
    pub selector: Selector,
}

impl NextStrategy {
    pub fn new(name: impl Into<String>, selector: Selector) -> Self {
        Self {
            name: name.into(),
            selector,
        }
    }
}

/// Built-in strategies, most specific first.
#[must_use]
pub fn default_next_strategies() -> Vec<NextStrategy> {
    const ARROW_TEXT: &str = "contains(normalize-space(.), 'Next') \
        or contains(normalize-space(.), 'next') \
        or contains(normalize-space(.), '›') \
        or contains(normalize-space(.), '»')";

    vec![
        NextStrategy::new("rel-next", Selector::css("a[rel='next']")),
        NextStrategy::new("aria-label-next", Selector::css("button[aria-label*='Next']")),
        NextStrategy::new(
            "aria-label-next-lower",
            Selector::css("button[aria-label*='next']"),
        ),
        NextStrategy::new("anchor-has-next", Selector::css("a:has(.next)")),
        NextStrategy::new("pagination-next-anchor", Selector::css(".pagination .next a")),
        NextStrategy::new(
            "pagination-next-button",
            Selector::css(".pagination button.next"),
        ),
        NextStrategy::new("anchor-text", Selector::xpath(format!("//a[{ARROW_TEXT}]"))),
        NextStrategy::new(
            "button-text",
            Selector::xpath(format!("//button[{ARROW_TEXT}]")),
        ),
    ]
}

/// Whether a control's attributes mark it as disabled even though the
/// browser still reports it enabled (styled anchors, aria widgets).
#[must_use]
pub fn looks_disabled(disabled_attr: Option<&str>, class_attr: Option<&str>) -> bool {
    let disabled = disabled_attr
        .map(|value| value.trim().to_ascii_lowercase())
        .is_some_and(|value| value == "true" || value == "disabled");
    let class = class_attr.is_some_and(|value| value.contains("disabled"));
    disabled || class
}

/// Click the first actionable next-page control and wait for the page to move.
///
/// Returns the name of the strategy that advanced the page, or `None` when no
/// strategy produced a control that moved it (the last page).
///
/// # Errors
///
/// Returns [`BrowserError`] if the current URL cannot be read.
pub async fn advance_page<P: Page>(
    page: &P,
    settings: &ScrapeSettings,
) -> Result<Option<String>, BrowserError> {
    for strategy in &settings.next_strategies {
        let Some(control) = first_actionable(page, &strategy.selector).await else {
            continue;
        };
        if control_looks_disabled(&control).await {
            tracing::debug!(strategy = %strategy.name, "next control is disabled; skipping");
            continue;
        }

        let before = page.current_url().await?;
        if let Err(err) = control.click().await {
            tracing::debug!(strategy = %strategy.name, error = %err, "next click failed");
            continue;
        }

        let control = &control;
        let before = before.as_str();
        let moved = await_condition(settings.wait, "next page", || {
            page_moved(page, control, before)
        })
        .await;

        match moved {
            Ok(()) => {
                tokio::time::sleep(settings.page_settle).await;
                tracing::debug!(strategy = %strategy.name, "advanced to next page");
                return Ok(Some(strategy.name.clone()));
            }
            Err(ScraperError::Timeout { waited_ms, .. }) => {
                tracing::debug!(
                    strategy = %strategy.name,
                    waited_ms,
                    "page did not move after next click; trying next strategy"
                );
            }
            Err(err) => {
                tracing::debug!(strategy = %strategy.name, error = %err, "next strategy failed");
            }
        }
    }

    Ok(None)
}

/// First displayed and enabled match; lookup errors count as no match.
async fn first_actionable<P: Page>(page: &P, selector: &Selector) -> Option<P::Element> {
    let candidates = match page.find_all(selector).await {
        Ok(found) => found,
        Err(err) => {
            tracing::trace!(%selector, error = %err, "next control lookup failed");
            return None;
        }
    };
    for candidate in candidates {
        let displayed = candidate.is_displayed().await.unwrap_or(false);
        let enabled = candidate.is_enabled().await.unwrap_or(false);
        if displayed && enabled {
            return Some(candidate);
        }
    }
    None
}

async fn control_looks_disabled<E: Element>(control: &E) -> bool {
    let disabled = control.attr("disabled").await.ok().flatten();
    let class = control.attr("class").await.ok().flatten();
    looks_disabled(disabled.as_deref(), class.as_deref())
}

async fn page_moved<P: Page>(
    page: &P,
    control: &P::Element,
    before: &str,
) -> Result<bool, BrowserError> {
    if !control.is_present().await? {
        return Ok(true);
    }
    Ok(page.current_url().await? != before)
}
