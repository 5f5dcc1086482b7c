//! Acceptance-runner error types

use std::time::Duration;
use thiserror::Error;

use shared::SharedError;

use crate::fixture::reaper::TeardownReport;

/// Failure to get any response out of a remote service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        Self::new(error.to_string())
    }
}

#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Subscription creation failed ({}): {reason}", status_label(.status))]
    SubscriptionCreation { status: Option<u16>, reason: String },

    #[error("Seeding '{entity_id}' failed after {written} samples ({}): {reason}", status_label(.status))]
    Seeding {
        entity_id: String,
        written: usize,
        status: Option<u16>,
        reason: String,
    },

    #[error("Timed out waiting for {what} after {elapsed:?} ({attempts} attempts)")]
    TimedOutWaiting { what: String, elapsed: Duration, attempts: u32 },

    #[error("Cleanup was not successful: {report}")]
    AggregatedCleanupFailure { report: TeardownReport },

    #[error("Subscription location already recorded: {existing}")]
    SubscriptionAlreadyRecorded { existing: String },

    #[error("Configuration error: {field}: {reason}")]
    Configuration { field: String, reason: String },

    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("UI driver error: {message}")]
    Ui { message: String },

    #[error("Assertion failed: {message}")]
    Assertion { message: String },

    #[error("Scenario failed: {}", .failures.join("; "))]
    ScenarioFailed { failures: Vec<String> },

    #[error("Shared component error: {0}")]
    Shared(#[from] SharedError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FixtureError {
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::Assertion { message: message.into() }
    }

    pub fn ui(message: impl Into<String>) -> Self {
        Self::Ui { message: message.into() }
    }
}

fn status_label(status: &Option<u16>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "no response".to_string(),
    }
}

pub type FixtureResult<T> = Result<T, FixtureError>;
