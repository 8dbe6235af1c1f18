//! Driving the react-select region combobox.

use crate::browser::{Element, Keys, Page, Selector};
use crate::error::{BrowserError, ScraperError};
use crate::settings::ScrapeSettings;
use crate::wait::await_some;

/// Locators for the react-select widget. React-select numbers its instances,
/// so both match on the id prefix and suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComboboxSelectors {
    pub input: Selector,
    pub listbox: Selector,
}

impl Default for ComboboxSelectors {
    fn default() -> Self {
        Self {
            input: Selector::css("[id^='react-select-'][id$='-input']"),
            listbox: Selector::css("[id^='react-select-'][id$='-listbox']"),
        }
    }
}

/// How the label was committed to the combobox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMethod {
    /// A matching option was displayed and clicked.
    OptionClicked,
    /// No matching option showed up in time; Enter was pressed on the typed label.
    EnterPressed,
}

/// Quote `value` as an XPath 1.0 string literal.
///
/// XPath 1.0 has no escape sequences, so a value holding both quote kinds is
/// assembled with `concat()`.
#[must_use]
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{value}'");
    }
    if !value.contains('"') {
        return format!("\"{value}\"");
    }

    let mut parts = Vec::new();
    for (i, chunk) in value.split('\'').enumerate() {
        if i > 0 {
            parts.push("\"'\"".to_string());
        }
        if !chunk.is_empty() {
            parts.push(format!("'{chunk}'"));
        }
    }
    format!("concat({})", parts.join(", "))
}

/// Option element inside the listbox whose normalized text contains `label`.
#[must_use]
pub fn option_selector(label: &str) -> Selector {
    let normalized = label.split_whitespace().collect::<Vec<_>>().join(" ");
    Selector::xpath(format!(
        ".//div[@role='option'][contains(normalize-space(.), {})]",
        xpath_literal(&normalized)
    ))
}

/// Type `label` into the region combobox and commit it.
///
/// The caller is responsible for checking that the result set actually
/// changed afterwards.
///
/// # Errors
///
/// - [`ScraperError::InvalidRegionLabel`] for a blank label
/// - [`ScraperError::Timeout`] if the combobox input never appears
/// - [`ScraperError::Browser`] if typing or clicking fails
pub async fn select_region<P: Page>(
    page: &P,
    label: &str,
    settings: &ScrapeSettings,
) -> Result<SelectionMethod, ScraperError> {
    let label = label.trim();
    if label.is_empty() {
        return Err(ScraperError::InvalidRegionLabel);
    }

    let input_selector = &settings.combobox.input;
    let input = await_some(settings.wait, "region combobox input", || {
        first_match(page, input_selector)
    })
    .await?;

    input.click().await?;
    input.send_keys(Keys::SelectAll).await?;
    input.send_keys(Keys::Backspace).await?;
    tokio::time::sleep(settings.input_clear_pause).await;
    input.send_keys(Keys::Text(label.to_string())).await?;

    let listbox_selector = &settings.combobox.listbox;
    let option = &option_selector(label);
    let found = await_some(settings.option_wait(), "region option", || {
        actionable_option(page, listbox_selector, option)
    })
    .await;

    match found {
        Ok(candidate) => {
            candidate.click().await?;
            tracing::debug!(label, "region option clicked");
            Ok(SelectionMethod::OptionClicked)
        }
        Err(ScraperError::Timeout { .. }) => {
            input.send_keys(Keys::Enter).await?;
            tracing::debug!(label, "no region option appeared; pressed Enter");
            Ok(SelectionMethod::EnterPressed)
        }
        Err(err) => Err(err),
    }
}

pub(crate) async fn first_match<P: Page>(
    page: &P,
    selector: &Selector,
) -> Result<Option<P::Element>, BrowserError> {
    Ok(page.find_all(selector).await?.into_iter().next())
}

async fn actionable_option<P: Page>(
    page: &P,
    listbox: &Selector,
    option: &Selector,
) -> Result<Option<P::Element>, BrowserError> {
    let Some(listbox) = first_match(page, listbox).await? else {
        return Ok(None);
    };
    for candidate in listbox.find_all(option).await? {
        if candidate.is_displayed().await? && candidate.is_enabled().await? {
            return Ok(Some(candidate));
        }
    }
    Ok(None)
}
