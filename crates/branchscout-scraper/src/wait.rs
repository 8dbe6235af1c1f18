//! Bounded polling against the live page.
//!
//! Every place the remote page may still be updating (first render, region
//! re-render, combobox options, navigation) goes through [`await_some`] or
//! [`await_condition`]. Check errors are treated as "not yet" because the
//! DOM is expected to be mid-update while polling.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::{BrowserError, ScraperError};

/// Timeout and poll cadence for a single wait site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl WaitPolicy {
    #[must_use]
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    /// Same poll cadence, different budget.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self { timeout, ..self }
    }
}

/// Poll `check` until it yields a value or the policy's timeout elapses.
///
/// The check always runs at least once, even with a zero timeout.
///
/// # Errors
///
/// Returns [`ScraperError::Timeout`] naming `what` when the budget runs out.
pub async fn await_some<T, F, Fut>(
    policy: WaitPolicy,
    what: &str,
    mut check: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, BrowserError>>,
{
    let started = Instant::now();
    let deadline = started + policy.timeout;
    let mut polls = 0u32;

    loop {
        polls += 1;
        match check().await {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => {}
            Err(err) => {
                tracing::trace!(what, polls, error = %err, "wait check failed; polling again");
            }
        }

        let now = Instant::now();
        if now >= deadline {
            let waited_ms = u64::try_from(now.duration_since(started).as_millis())
                .unwrap_or(u64::MAX);
            tracing::debug!(what, polls, waited_ms, "wait timed out");
            return Err(ScraperError::Timeout {
                what: what.to_string(),
                waited_ms,
            });
        }

        let remaining = deadline - now;
        tokio::time::sleep(policy.poll_interval.min(remaining)).await;
    }
}

/// Poll `predicate` until it holds or the policy's timeout elapses.
///
/// # Errors
///
/// Returns [`ScraperError::Timeout`] naming `what` when the budget runs out.
pub async fn await_condition<F, Fut>(
    policy: WaitPolicy,
    what: &str,
    mut predicate: F,
) -> Result<(), ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, BrowserError>>,
{
    await_some(policy, what, || {
        let check = predicate();
        async move { check.await.map(|ok| ok.then_some(())) }
    })
    .await
}
