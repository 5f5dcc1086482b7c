//! Acceptance Testing Framework
//!
//! Fixture lifecycle and scenarios for acceptance tests against a deployed
//! context broker, QuantumLeap and Grafana.
//!
//! ## Main Interface
//!
//! Scenarios run inside a [`FixtureOrchestrator`]: it builds the forwarding
//! subscription and a seeded entity history, hands a [`FixtureHandle`] to the
//! scenario body and tears everything down afterwards, whatever the body did.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use acceptance::*;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let config = AcceptanceConfig::from_env()?;
//! let api: Arc<dyn FixtureApi> = Arc::new(FiwareApiClient::new(&config.broker_url, &config.timeseries_url)?);
//!
//! let orchestrator = FixtureOrchestrator::new(
//!     FixtureBuilder::new(api.clone()),
//!     FixtureReaper::new(api),
//!     config.fixture_plan(),
//! );
//!
//! let report = orchestrator
//!     .run(|handle| async move {
//!         tracing::info!("seeded {} samples", handle.created_sample_count());
//!         ScenarioResult::Ok(())
//!     })
//!     .await;
//! report.into_result()?;
//! # Ok(())
//! # }
//! ```

// Core modules
pub mod config;
pub mod error;
pub mod fixture;
pub mod runtime;
pub mod scenarios;
pub mod traits;

// Main interfaces - re-exported at crate root for convenience
pub use config::{AcceptanceConfig, AcceptanceConfigBuilder, KeycloakConfig};
pub use error::{FixtureError, FixtureResult, TransportError};
pub use fixture::{FixtureBuilder, FixtureHandle, FixtureOrchestrator, FixturePlan, FixtureReaper, LifecycleReport};

// Supporting types
pub use fixture::{await_condition, await_ok, DeletionOutcome, ScenarioResult, TeardownReport, WaitOutcome};
pub use runtime::{DashboardClient, FiwareApiClient, KeycloakTokenSource, WebDriverSession};
pub use scenarios::TestScenarios;
pub use traits::{ApiResponse, FixtureApi, Locator, TextMatch, UiDriver, UiDriverExt};
