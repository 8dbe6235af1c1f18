//! One browser session per command: bootstrap, scrape, tear down, flush.
//!
//! The scrape future is raced against Ctrl-C. Whichever finishes first, the
//! browser is quit and the aggregate is flushed before the command returns.
//! A session that never scraped a record writes nothing, so a failed start
//! leaves the previous run's files in place.

use anyhow::Context;

use branchscout_core::{Aggregator, AppConfig, RegionCatalog};
use branchscout_scraper::{
    bootstrap, run_pages, run_regions, BrowserOptions, Page, RegionOutcome, ScrapeSettings,
    WebDriverPage,
};

use crate::output::{FlushReport, OutputSink, SinkError};

/// What a session walks once the directory has loaded.
#[derive(Debug)]
pub(crate) enum Mode {
    Regions(RegionCatalog),
    Pages,
}

pub(crate) async fn run_session(config: &AppConfig, mode: Mode) -> anyhow::Result<()> {
    let settings = ScrapeSettings::from_app_config(config);
    let mut sink = OutputSink::new(&config.output_dir, config.write_csv);
    let mut aggregator = Aggregator::new();

    let page = WebDriverPage::connect(&BrowserOptions::from_app_config(config))
        .await
        .with_context(|| format!("failed to start browser via {}", config.webdriver_url))?;

    let outcome = tokio::select! {
        result = scrape(&page, config, &mode, &settings, &mut sink, &mut aggregator) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("interrupted; closing browser and saving collected records");
            Err(anyhow::anyhow!("interrupted"))
        }
    };

    if let Err(e) = page.quit().await {
        tracing::warn!(error = %e, "failed to close browser session");
    }

    let flushed = final_flush(&mut sink, &aggregator);
    if let Err(e) = &flushed {
        tracing::error!(error = %e, "final flush failed");
    }
    outcome?;

    match flushed? {
        Some(report) => println!(
            "Saved {} unique branches to {} ({} region files{})",
            report.records,
            sink.dir().display(),
            report.region_files.len(),
            if report.csv.is_some() { ", csv" } else { "" },
        ),
        None => println!("No branches scraped; nothing written to {}", sink.dir().display()),
    }
    Ok(())
}

async fn scrape<P: Page>(
    page: &P,
    config: &AppConfig,
    mode: &Mode,
    settings: &ScrapeSettings,
    sink: &mut OutputSink,
    aggregator: &mut Aggregator,
) -> anyhow::Result<()> {
    bootstrap(page, &config.start_url, settings).await?;

    match mode {
        Mode::Regions(catalog) => {
            let reports = run_regions(page, catalog, settings, aggregator, |report, agg| {
                println!("{}: {} branches (total {})", report.label, report.scraped(), agg.len());
                checkpoint(sink, agg);
            })
            .await;

            let skipped: Vec<&str> = reports
                .iter()
                .filter(|r| matches!(r.outcome, RegionOutcome::Skipped { .. }))
                .map(|r| r.label.as_str())
                .collect();
            if !skipped.is_empty() {
                tracing::warn!(
                    count = skipped.len(),
                    regions = %skipped.join(", "),
                    "regions skipped"
                );
            }
        }
        Mode::Pages => {
            let reports = run_pages(page, settings, aggregator, |report, agg| {
                println!(
                    "Page {}: got {} rows; total unique {}",
                    report.index,
                    report.scraped,
                    agg.len()
                );
                checkpoint(sink, agg);
            })
            .await;
            tracing::info!(pages = reports.len(), "pagination finished");
        }
    }

    Ok(())
}

/// Only an aggregate holding at least one record is worth writing.
fn should_flush(aggregator: &Aggregator) -> bool {
    !aggregator.is_empty()
}

fn checkpoint(sink: &mut OutputSink, aggregator: &Aggregator) {
    if !should_flush(aggregator) {
        return;
    }
    if let Err(e) = sink.flush(aggregator) {
        tracing::warn!(error = %e, "checkpoint flush failed");
    }
}

fn final_flush(
    sink: &mut OutputSink,
    aggregator: &Aggregator,
) -> Result<Option<FlushReport>, SinkError> {
    if !should_flush(aggregator) {
        tracing::warn!(
            dir = %sink.dir().display(),
            "nothing scraped; leaving previous output untouched"
        );
        return Ok(None);
    }
    sink.flush(aggregator).map(Some)
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
