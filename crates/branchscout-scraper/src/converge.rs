//! Lazy-load convergence.
//!
//! Infinite-scroll listings never announce that they are finished. The loop
//! here keeps triggering a load, pauses, and re-reads a cheap proxy signal
//! (document height) until two consecutive reads agree or the round budget is
//! spent.

use std::future::Future;
use std::time::Duration;

use crate::browser::Page;
use crate::error::BrowserError;

const SCROLL_TO_BOTTOM: &str = "window.scrollTo(0, document.body.scrollHeight);";
const SCROLL_HEIGHT: &str = "return document.body.scrollHeight";
pub(crate) const SCROLL_TO_TOP: &str = "window.scrollTo(0, 0);";

/// Result of a [`converge`] run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Convergence<S> {
    /// Number of trigger actions issued.
    pub triggers: u32,
    /// `false` when the round budget ran out before the signal settled.
    pub converged: bool,
    /// Last observed signal value.
    pub signal: S,
}

/// Trigger, settle, measure; stop when the signal repeats or after `max_rounds` triggers.
///
/// The signal is read once before the first trigger, so a sequence of reads
/// `[1000, 2000, 2000]` issues exactly two triggers.
///
/// # Errors
///
/// Propagates the first error from `trigger` or `measure`.
pub async fn converge<S, T, TFut, M, MFut>(
    max_rounds: u32,
    settle: Duration,
    mut trigger: T,
    mut measure: M,
) -> Result<Convergence<S>, BrowserError>
where
    S: PartialEq,
    T: FnMut() -> TFut,
    TFut: Future<Output = Result<(), BrowserError>>,
    M: FnMut() -> MFut,
    MFut: Future<Output = Result<S, BrowserError>>,
{
    let mut last = measure().await?;
    let mut triggers = 0u32;

    for _ in 0..max_rounds {
        trigger().await?;
        triggers += 1;
        if !settle.is_zero() {
            tokio::time::sleep(settle).await;
        }

        let next = measure().await?;
        if next == last {
            return Ok(Convergence {
                triggers,
                converged: true,
                signal: next,
            });
        }
        last = next;
    }

    Ok(Convergence {
        triggers,
        converged: false,
        signal: last,
    })
}

/// Scroll the page to the bottom until the document height stops growing.
///
/// # Errors
///
/// Returns [`BrowserError`] if a script fails or the height is not numeric.
pub async fn scroll_until_settled<P: Page>(
    page: &P,
    max_rounds: u32,
    settle: Duration,
) -> Result<Convergence<i64>, BrowserError> {
    let outcome = converge(
        max_rounds,
        settle,
        || async move { page.execute(SCROLL_TO_BOTTOM).await.map(drop) },
        || scroll_height(page),
    )
    .await?;

    if outcome.converged {
        tracing::debug!(
            triggers = outcome.triggers,
            height = outcome.signal,
            "scroll converged"
        );
    } else {
        tracing::debug!(
            triggers = outcome.triggers,
            height = outcome.signal,
            "scroll round budget exhausted before height settled"
        );
    }
    Ok(outcome)
}

async fn scroll_height<P: Page>(page: &P) -> Result<i64, BrowserError> {
    let value = page.execute(SCROLL_HEIGHT).await?;
    numeric_signal(&value)
}

#[allow(clippy::cast_possible_truncation)]
fn numeric_signal(value: &serde_json::Value) -> Result<i64, BrowserError> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f.round() as i64))
        .ok_or_else(|| BrowserError::Script(format!("expected numeric scroll height, got {value}")))
}
