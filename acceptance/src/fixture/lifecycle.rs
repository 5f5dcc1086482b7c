//! Fixture lifecycle
//!
//! Runs setup, the scenario body and teardown in that order. Teardown runs
//! exactly once whatever happened before it: setup errors, a failing body or
//! a panicking body.

use std::future::Future;
use std::panic::{resume_unwind, AssertUnwindSafe};
use std::time::Duration;

use futures_util::FutureExt;
use tokio::time::timeout;
use tracing::{error, info, warn};

use super::builder::{FixtureBuilder, FixturePlan, FixtureSetup};
use super::handle::FixtureHandle;
use super::reaper::{FixtureReaper, TeardownReport};
use crate::error::{FixtureError, FixtureResult};

pub type ScenarioResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Everything that happened during one scenario's lifecycle
#[derive(Debug)]
pub struct LifecycleReport {
    pub handle: FixtureHandle,
    pub setup_errors: Vec<FixtureError>,
    pub body_error: Option<String>,
    pub teardown: FixtureResult<TeardownReport>,
}

impl LifecycleReport {
    pub fn is_success(&self) -> bool {
        self.setup_errors.is_empty() && self.body_error.is_none() && self.teardown.is_ok()
    }

    /// Fold the report into one result
    ///
    /// A cleanup failure on its own is returned as is; any combination of
    /// failures becomes `ScenarioFailed` listing each of them.
    pub fn into_result(self) -> FixtureResult<TeardownReport> {
        let mut failures: Vec<String> = self
            .setup_errors
            .iter()
            .map(|e| format!("setup: {e}"))
            .collect();
        if let Some(body_error) = self.body_error {
            failures.push(format!("scenario: {body_error}"));
        }

        match self.teardown {
            Ok(report) if failures.is_empty() => Ok(report),
            Ok(_) => Err(FixtureError::ScenarioFailed { failures }),
            Err(e) if failures.is_empty() => Err(e),
            Err(e) => {
                failures.push(format!("teardown: {e}"));
                Err(FixtureError::ScenarioFailed { failures })
            }
        }
    }
}

/// Owns one scenario's fixture from setup to teardown
///
/// Built fresh per scenario; nothing is shared between runs.
pub struct FixtureOrchestrator {
    builder: FixtureBuilder,
    reaper: FixtureReaper,
    plan: FixturePlan,
    body_timeout: Option<Duration>,
}

impl FixtureOrchestrator {
    pub fn new(builder: FixtureBuilder, reaper: FixtureReaper, plan: FixturePlan) -> Self {
        Self {
            builder,
            reaper,
            plan,
            body_timeout: None,
        }
    }

    /// Abandon the body after `limit`; teardown still runs
    pub fn with_body_timeout(mut self, limit: Duration) -> Self {
        self.body_timeout = Some(limit);
        self
    }

    /// Set up, hand a snapshot of the handle to `body`, then tear down
    ///
    /// The body still runs after a setup error: whatever was created is
    /// exercised and the setup error already fails the scenario. A panic in
    /// the body is resumed after teardown. A body that outlives the body
    /// timeout is dropped and reported as failed.
    pub async fn run<F, Fut>(self, body: F) -> LifecycleReport
    where
        F: FnOnce(FixtureHandle) -> Fut,
        Fut: Future<Output = ScenarioResult>,
    {
        let FixtureSetup { handle, errors } = self.builder.build(&self.plan).await;
        for e in &errors {
            error!("❌ Setup error: {}", e);
        }

        let body = AssertUnwindSafe(body(handle.clone())).catch_unwind();
        let body_result = match self.body_timeout {
            Some(limit) => match timeout(limit, body).await {
                Ok(result) => result,
                Err(_) => {
                    warn!("⏰ Scenario body exceeded {:?}, tearing down", limit);
                    Ok(Err(format!("scenario body timed out after {limit:?}").into()))
                }
            },
            None => body.await,
        };

        let teardown = self.reaper.tear_down(&handle).await;

        let body_error = match body_result {
            Ok(Ok(())) => None,
            Ok(Err(e)) => {
                error!("❌ Scenario body failed: {}", e);
                Some(e.to_string())
            }
            Err(panic) => {
                error!("💥 Scenario body panicked; teardown result: {:?}", teardown);
                resume_unwind(panic);
            }
        };

        let report = LifecycleReport {
            handle,
            setup_errors: errors,
            body_error,
            teardown,
        };
        info!(
            "🏁 Lifecycle for '{}' finished: {}",
            report.handle.entity_id(),
            if report.is_success() { "passed" } else { "failed" }
        );
        report
    }
}
