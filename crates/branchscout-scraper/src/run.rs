//! Region and page run loops.
//!
//! Both loops are strictly sequential over one page and fold every batch into
//! the caller's [`Aggregator`]. Per-unit failures are logged and reported but
//! never abort the run; only [`bootstrap`] is fatal.

use branchscout_core::{Aggregator, BranchRecord, Region, RegionCatalog};

use crate::browser::{Page, Selector};
use crate::card::{card_names, extract_cards, CardSelectors};
use crate::converge::{scroll_until_settled, SCROLL_TO_TOP};
use crate::error::{BrowserError, ScraperError};
use crate::pagination::advance_page;
use crate::region_select::select_region;
use crate::settings::ScrapeSettings;
use crate::wait::await_condition;

/// What happened to one catalog region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionOutcome {
    Scraped {
        /// Cards extracted for the region, before deduplication.
        scraped: usize,
        /// Records that were new to the aggregate.
        accepted: usize,
    },
    Skipped {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionReport {
    pub label: String,
    pub outcome: RegionOutcome,
}

impl RegionReport {
    /// Cards extracted for the region; zero when skipped.
    #[must_use]
    pub fn scraped(&self) -> usize {
        match self.outcome {
            RegionOutcome::Scraped { scraped, .. } => scraped,
            RegionOutcome::Skipped { .. } => 0,
        }
    }
}

/// One visited result page in paginated mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageReport {
    /// 1-based page number.
    pub index: usize,
    pub url: String,
    pub scraped: usize,
    pub accepted: usize,
}

/// Navigate to `url` and block until the first card renders.
///
/// # Errors
///
/// Returns [`ScraperError::Bootstrap`] wrapping the navigation or wait failure.
pub async fn bootstrap<P: Page>(
    page: &P,
    url: &str,
    settings: &ScrapeSettings,
) -> Result<(), ScraperError> {
    let result = async {
        page.navigate(url).await?;
        await_cards(page, settings).await
    }
    .await;

    result.map_err(|source| ScraperError::Bootstrap {
        url: url.to_string(),
        source: Box::new(source),
    })?;
    tracing::info!(url, "directory loaded");
    Ok(())
}

/// Walk every catalog region in order.
///
/// `on_progress` runs after each region with its report and the aggregate as
/// it stands, so callers can checkpoint output.
pub async fn run_regions<P, F>(
    page: &P,
    catalog: &RegionCatalog,
    settings: &ScrapeSettings,
    aggregator: &mut Aggregator,
    mut on_progress: F,
) -> Vec<RegionReport>
where
    P: Page,
    F: FnMut(&RegionReport, &Aggregator),
{
    let mut reports = Vec::with_capacity(catalog.len());

    for region in catalog {
        let label = region.label();
        let outcome = match scrape_region(page, region, settings).await {
            Ok(records) => {
                let scraped = records.len();
                let stats = aggregator.absorb(records);
                tracing::info!(
                    region = %label,
                    scraped,
                    accepted = stats.accepted,
                    discarded = stats.discarded,
                    total = aggregator.len(),
                    "region scraped"
                );
                RegionOutcome::Scraped {
                    scraped,
                    accepted: stats.accepted,
                }
            }
            Err(err) => {
                tracing::warn!(region = %label, error = %err, "region skipped");
                RegionOutcome::Skipped {
                    reason: err.to_string(),
                }
            }
        };

        let report = RegionReport { label, outcome };
        on_progress(&report, aggregator);
        reports.push(report);
    }

    reports
}

/// Select one region and read every card it renders.
async fn scrape_region<P: Page>(
    page: &P,
    region: &Region,
    settings: &ScrapeSettings,
) -> Result<Vec<BranchRecord>, ScraperError> {
    let label = region.label();
    let cards = &settings.cards;
    let before = card_names(page, cards).await.unwrap_or_default();

    let method = select_region(page, &label, settings).await?;
    tracing::debug!(region = %label, ?method, "region selected");

    let before = before.as_slice();
    match await_condition(settings.option_wait(), "region result change", || {
        names_changed(page, cards, before)
    })
    .await
    {
        Ok(()) => {}
        Err(ScraperError::Timeout { .. }) => {
            tracing::debug!(
                region = %label,
                "card names unchanged after selection; accepting any rendered card"
            );
            await_condition(settings.wait, "region result set", || {
                has_any(page, &cards.card)
            })
            .await?;
        }
        Err(err) => return Err(err),
    }

    page.execute(SCROLL_TO_TOP).await?;
    tokio::time::sleep(settings.scroll_top_pause).await;
    scroll_until_settled(page, settings.max_scroll_rounds, settings.scroll_pause).await?;

    let records = extract_cards(page, cards)
        .await?
        .into_iter()
        .map(|fields| BranchRecord::for_region(fields, &region.name))
        .collect();
    Ok(records)
}

/// Walk result pages from the current one, following next-page controls.
///
/// Stops at the first page without an actionable next control, after
/// `max_pages` pages, or when a later page fails to render cards.
pub async fn run_pages<P, F>(
    page: &P,
    settings: &ScrapeSettings,
    aggregator: &mut Aggregator,
    mut on_page: F,
) -> Vec<PageReport>
where
    P: Page,
    F: FnMut(&PageReport, &Aggregator),
{
    let mut reports = Vec::new();

    for index in 1..=settings.max_pages {
        if index > 1 {
            if let Err(err) = await_cards(page, settings).await {
                tracing::warn!(page = index, error = %err, "no cards on page; stopping pagination");
                break;
            }
        }

        let report = match scrape_page(page, index, settings, aggregator).await {
            Ok(report) => report,
            Err(err) => {
                tracing::warn!(page = index, error = %err, "page scrape failed; stopping pagination");
                break;
            }
        };
        tracing::info!(
            page = index,
            url = %report.url,
            scraped = report.scraped,
            accepted = report.accepted,
            total = aggregator.len(),
            "page scraped"
        );
        on_page(&report, aggregator);
        reports.push(report);

        if index == settings.max_pages {
            tracing::info!(max_pages = settings.max_pages, "page limit reached");
            break;
        }
        match advance_page(page, settings).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                tracing::info!(page = index, "no next-page control; pagination finished");
                break;
            }
            Err(err) => {
                tracing::warn!(page = index, error = %err, "next-page lookup failed; stopping pagination");
                break;
            }
        }
    }

    reports
}

async fn scrape_page<P: Page>(
    page: &P,
    index: usize,
    settings: &ScrapeSettings,
    aggregator: &mut Aggregator,
) -> Result<PageReport, BrowserError> {
    if let Err(err) =
        scroll_until_settled(page, settings.page_scroll_rounds, settings.scroll_pause).await
    {
        tracing::debug!(page = index, error = %err, "page scroll failed; extracting what rendered");
    }

    let url = page.current_url().await?;
    let records: Vec<BranchRecord> = extract_cards(page, &settings.cards)
        .await?
        .into_iter()
        .map(|fields| BranchRecord::for_page(fields, &url))
        .collect();
    let scraped = records.len();
    let stats = aggregator.absorb(records);

    Ok(PageReport {
        index,
        url,
        scraped,
        accepted: stats.accepted,
    })
}

async fn await_cards<P: Page>(page: &P, settings: &ScrapeSettings) -> Result<(), ScraperError> {
    let card = &settings.cards.card;
    await_condition(settings.wait, "branch cards", || has_any(page, card)).await
}

async fn has_any<P: Page>(page: &P, selector: &Selector) -> Result<bool, BrowserError> {
    Ok(!page.find_all(selector).await?.is_empty())
}

/// The region re-render is done once the card-name list differs from the
/// one captured before the selection. A region whose cards carry the same
/// names as the previous one never changes it, so the caller falls back to
/// plain card presence after a short grace period.
async fn names_changed<P: Page>(
    page: &P,
    cards: &CardSelectors,
    before: &[String],
) -> Result<bool, BrowserError> {
    let names = card_names(page, cards).await?;
    Ok(names.as_slice() != before)
}
