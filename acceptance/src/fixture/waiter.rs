//! Eventual-Consistency Waiter
//!
//! Polls a read path until a condition holds or a deadline passes. A timeout
//! is a value the caller inspects, not an error.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep_until, timeout_at, Instant};
use tracing::debug;

use crate::error::{FixtureError, FixtureResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Succeeded { attempts: u32, elapsed: Duration },
    TimedOut { attempts: u32, elapsed: Duration },
}

impl WaitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, WaitOutcome::Succeeded { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            WaitOutcome::Succeeded { attempts, .. } | WaitOutcome::TimedOut { attempts, .. } => *attempts,
        }
    }

    pub fn elapsed(&self) -> Duration {
        match self {
            WaitOutcome::Succeeded { elapsed, .. } | WaitOutcome::TimedOut { elapsed, .. } => *elapsed,
        }
    }

    /// Treat a timeout as a failure of `what`
    pub fn into_result(self, what: &str) -> FixtureResult<()> {
        match self {
            WaitOutcome::Succeeded { .. } => Ok(()),
            WaitOutcome::TimedOut { attempts, elapsed } => Err(FixtureError::TimedOutWaiting {
                what: what.to_string(),
                elapsed,
                attempts,
            }),
        }
    }
}

/// Poll `predicate` every `poll_interval` until it holds or `timeout` elapses
///
/// Each invocation is bounded by the remaining time, so a predicate that hangs
/// still ends in `TimedOut`. The predicate is tried once more at the
/// deadline when the regular schedule would overshoot it.
pub async fn await_condition<F, Fut>(mut predicate: F, timeout: Duration, poll_interval: Duration) -> WaitOutcome
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let started = Instant::now();
    let deadline = started + timeout;
    let mut attempts = 0;

    loop {
        attempts += 1;

        match timeout_at(deadline, predicate()).await {
            Ok(true) => {
                return WaitOutcome::Succeeded {
                    attempts,
                    elapsed: started.elapsed(),
                };
            }
            Ok(false) => debug!("⏳ Condition not met after attempt {}", attempts),
            Err(_) => debug!("⏳ Attempt {} still running at the deadline", attempts),
        }

        let now = Instant::now();
        if now >= deadline {
            return WaitOutcome::TimedOut {
                attempts,
                elapsed: started.elapsed(),
            };
        }
        // The last attempt lands on the deadline itself
        sleep_until((now + poll_interval).min(deadline)).await;
    }
}

/// Like [`await_condition`], counting any predicate error as "not yet"
pub async fn await_ok<F, Fut, E>(mut predicate: F, timeout: Duration, poll_interval: Duration) -> WaitOutcome
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, E>>,
    E: Display,
{
    await_condition(
        || {
            let attempt = predicate();
            async move {
                match attempt.await {
                    Ok(met) => met,
                    Err(e) => {
                        debug!("⏳ Check failed, treating as not met: {}", e);
                        false
                    }
                }
            }
        },
        timeout,
        poll_interval,
    )
    .await
}
