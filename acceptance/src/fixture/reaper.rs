//! Fixture Reaper
//!
//! Best-effort removal of everything a [`FixtureHandle`] claims. Each resource
//! kind is deleted independently, every outcome is kept, and a single
//! aggregated error is raised when any deletion failed.
//!
//! A resource that is already gone (404) counts as removed, so teardown can
//! be invoked again on the same handle without raising.

use std::fmt;
use std::sync::Arc;

use shared::ResourceKind;
use tracing::{debug, info, warn};

use super::handle::FixtureHandle;
use crate::error::{FixtureError, FixtureResult, TransportError};
use crate::traits::{ApiResponse, FixtureApi};

/// Why a deletion did not reach an acceptable terminal state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The service answered with a status other than 2xx or 404
    Status(u16),
    /// No response was obtained at all
    NoResponse(String),
}

/// Terminal state of one deletion attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionOutcome {
    Succeeded { status: u16 },
    AlreadyAbsent,
    SkippedNotCreated,
    Failed(FailureReason),
}

impl DeletionOutcome {
    /// Classify the raw result of a delete call
    pub fn from_response(result: Result<ApiResponse, TransportError>) -> Self {
        match result {
            Ok(response) if response.is_success() => DeletionOutcome::Succeeded {
                status: response.status,
            },
            Ok(response) if response.is_not_found() => DeletionOutcome::AlreadyAbsent,
            Ok(response) => DeletionOutcome::Failed(FailureReason::Status(response.status)),
            Err(e) => DeletionOutcome::Failed(FailureReason::NoResponse(e.message)),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, DeletionOutcome::Failed(_))
    }
}

impl fmt::Display for DeletionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeletionOutcome::Succeeded { status } => write!(f, "{status}"),
            DeletionOutcome::AlreadyAbsent => f.write_str("404"),
            DeletionOutcome::SkippedNotCreated => f.write_str("skipped (not created)"),
            DeletionOutcome::Failed(FailureReason::Status(status)) => write!(f, "{status}"),
            DeletionOutcome::Failed(FailureReason::NoResponse(reason)) => write!(f, "no response ({reason})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceOutcome {
    pub kind: ResourceKind,
    pub outcome: DeletionOutcome,
}

/// Outcomes of one teardown pass, one per resource kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeardownReport {
    pub outcomes: Vec<ResourceOutcome>,
}

impl TeardownReport {
    pub fn outcome(&self, kind: ResourceKind) -> Option<&DeletionOutcome> {
        self.outcomes
            .iter()
            .find(|resource| resource.kind == kind)
            .map(|resource| &resource.outcome)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ResourceOutcome> {
        self.outcomes.iter().filter(|resource| resource.outcome.is_failure())
    }

    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }
}

impl fmt::Display for TeardownReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .outcomes
            .iter()
            .map(|resource| format!("{}: {}", resource.kind, resource.outcome))
            .collect();
        f.write_str(&parts.join(" - "))
    }
}

/// Fold all outcomes into a report, or one error carrying every outcome
pub fn aggregate(outcomes: Vec<ResourceOutcome>) -> FixtureResult<TeardownReport> {
    let report = TeardownReport { outcomes };
    if report.is_clean() {
        Ok(report)
    } else {
        Err(FixtureError::AggregatedCleanupFailure { report })
    }
}

pub struct FixtureReaper {
    api: Arc<dyn FixtureApi>,
}

impl FixtureReaper {
    /// `api` should address the services directly, bypassing any access proxy
    pub fn new(api: Arc<dyn FixtureApi>) -> Self {
        Self { api }
    }

    /// Attempt every deletion concurrently, then aggregate
    pub async fn tear_down(&self, handle: &FixtureHandle) -> FixtureResult<TeardownReport> {
        info!("🧹 Tearing down fixture '{}' for tenant {}", handle.entity_id(), handle.tenant());

        let (subscription, time_series, entity) = tokio::join!(
            self.delete_subscription(handle),
            self.delete_time_series(handle),
            self.delete_entity(handle),
        );

        let result = aggregate(vec![
            ResourceOutcome { kind: ResourceKind::Subscription, outcome: subscription },
            ResourceOutcome { kind: ResourceKind::TimeSeries, outcome: time_series },
            ResourceOutcome { kind: ResourceKind::Entity, outcome: entity },
        ]);

        match &result {
            Ok(report) => info!("✅ Teardown complete: {}", report),
            Err(e) => warn!("⚠️ {}", e),
        }
        result
    }

    async fn delete_subscription(&self, handle: &FixtureHandle) -> DeletionOutcome {
        let Some(location) = handle.subscription_location() else {
            debug!("⏭️ No subscription recorded, skipping deletion");
            return DeletionOutcome::SkippedNotCreated;
        };

        let outcome = DeletionOutcome::from_response(self.api.delete_subscription(handle.tenant(), location).await);
        debug!("🗑️ Subscription {}: {}", location, outcome);
        outcome
    }

    async fn delete_time_series(&self, handle: &FixtureHandle) -> DeletionOutcome {
        let outcome = DeletionOutcome::from_response(
            self.api
                .delete_time_series(handle.tenant(), handle.entity_id(), handle.entity_type())
                .await,
        );
        debug!("🗑️ Time series of '{}': {}", handle.entity_id(), outcome);
        outcome
    }

    async fn delete_entity(&self, handle: &FixtureHandle) -> DeletionOutcome {
        let outcome = DeletionOutcome::from_response(self.api.delete_entity(handle.tenant(), handle.entity_id()).await);
        debug!("🗑️ Entity '{}': {}", handle.entity_id(), outcome);
        outcome
    }
}
