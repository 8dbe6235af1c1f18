//! Branch card extraction.
//!
//! Every field is read independently. A sub-element that is missing, detached
//! mid-read, or renders only whitespace yields `None` for that field and
//! nothing else; the card is always emitted.

use std::sync::LazyLock;

use regex::Regex;

use branchscout_core::CardFields;

use crate::browser::{Element, Page, Selector};
use crate::error::BrowserError;

static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d,.]+").expect("valid regex"));

/// Locators for the rendered branch cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardSelectors {
    /// One match per branch card.
    pub card: Selector,
    /// Every card's name element, page-wide. Used as the result-set fingerprint.
    pub card_names: Selector,
    /// Name element, relative to a card.
    pub name: Selector,
    /// Row holding the phone number, relative to a card.
    pub divider_row: Selector,
    /// Open/closed marker, relative to a card.
    pub status: Selector,
    /// Right-aligned rating or review-count fragment, relative to a card.
    pub summary: Selector,
}

impl Default for CardSelectors {
    fn default() -> Self {
        Self {
            card: Selector::css("div.row div.col-lg-6 div.card"),
            card_names: Selector::css("div.row div.col-lg-6 div.card b.textCustomBranch"),
            name: Selector::css("b.textCustomBranch"),
            divider_row: Selector::css("div[style*='border-top']"),
            status: Selector::css("small.text-success"),
            summary: Selector::css("div[style*='justify-content: space-between'] > div"),
        }
    }
}

/// Leading run of digits, commas and periods in `text`, after trimming.
///
/// `"4.8 ★ (120)"` gives `"4.8"`; `"★★★"` gives `None`.
#[must_use]
pub fn leading_number(text: &str) -> Option<String> {
    LEADING_NUMBER
        .find(text.trim())
        .map(|m| m.as_str().to_string())
}

/// Read one card's fields.
pub async fn extract_card<E: Element>(card: &E, selectors: &CardSelectors) -> CardFields {
    let name = child_text(card, &selectors.name).await;
    let phone = match first_child(card, &selectors.divider_row).await {
        Some(row) => child_text(&row, &selectors.name).await,
        None => None,
    };
    let status = child_text(card, &selectors.status).await;
    let rating_or_count = child_text(card, &selectors.summary)
        .await
        .as_deref()
        .and_then(leading_number);

    CardFields {
        name,
        phone,
        status,
        rating_or_count,
    }
}

/// Read every card currently rendered on the page, in document order.
///
/// # Errors
///
/// Returns [`BrowserError`] only when the card list itself cannot be queried;
/// per-card problems degrade to `None` fields.
pub async fn extract_cards<P: Page>(
    page: &P,
    selectors: &CardSelectors,
) -> Result<Vec<CardFields>, BrowserError> {
    let cards = page.find_all(&selectors.card).await?;
    let mut out = Vec::with_capacity(cards.len());
    for card in &cards {
        out.push(extract_card(card, selectors).await);
    }
    Ok(out)
}

/// Trimmed names of every rendered card, used to detect a changed result set.
///
/// # Errors
///
/// Returns [`BrowserError`] if the name list cannot be queried.
pub async fn card_names<P: Page>(
    page: &P,
    selectors: &CardSelectors,
) -> Result<Vec<String>, BrowserError> {
    let elements = page.find_all(&selectors.card_names).await?;
    let mut names = Vec::with_capacity(elements.len());
    for element in &elements {
        if let Ok(text) = element.text().await {
            names.push(text.trim().to_string());
        }
    }
    Ok(names)
}

async fn first_child<E: Element>(parent: &E, selector: &Selector) -> Option<E> {
    match parent.find_all(selector).await {
        Ok(found) => found.into_iter().next(),
        Err(err) => {
            tracing::trace!(%selector, error = %err, "card sub-element lookup failed");
            None
        }
    }
}

async fn child_text<E: Element>(parent: &E, selector: &Selector) -> Option<String> {
    let child = first_child(parent, selector).await?;
    match child.text().await {
        Ok(text) => non_empty(&text),
        Err(err) => {
            tracing::trace!(%selector, error = %err, "card text read failed");
            None
        }
    }
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
