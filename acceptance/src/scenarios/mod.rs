//! Test Scenarios
//!
//! Short scenario names for the acceptance suite

pub mod dashboard;
pub mod datasource;
pub mod grafana;

use crate::config::AcceptanceConfig;
use crate::fixture::ScenarioResult;

pub struct TestScenarios {
    config: AcceptanceConfig,
}

impl TestScenarios {
    pub fn new(config: AcceptanceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AcceptanceConfig {
        &self.config
    }

    /// Run a specific scenario by name
    pub async fn run_scenario(&self, name: &str) -> ScenarioResult {
        let config = &self.config;

        match name {
            // Deployment checks
            "deployed" => dashboard::deployed(config).await,
            "login_redirect" => dashboard::login_redirect(config).await,

            // Fixture-backed data flow
            "datasource" => datasource::datasource(config).await,

            // Dashboard navigation
            "air_quality" => dashboard::air_quality(config).await,

            // Run all tests
            "all" => {
                tracing::info!("🧪 Running FULL acceptance suite");

                dashboard::deployed(config).await?;
                dashboard::login_redirect(config).await?;
                datasource::datasource(config).await?;
                dashboard::air_quality(config).await?;

                tracing::info!("🏆 ALL acceptance tests COMPLETED successfully!");
                Ok(())
            }

            _ => Err(format!(
                "Unknown test scenario: '{}'. Available: {}",
                name,
                Self::available_scenarios().join(", ")
            )
            .into()),
        }
    }

    /// Get list of available scenarios
    pub fn available_scenarios() -> Vec<&'static str> {
        vec![
            // Individual tests
            "deployed", "login_redirect", "datasource", "air_quality",
            // Test suites
            "all",
        ]
    }
}
