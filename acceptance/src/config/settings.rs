//! Acceptance Configuration
//!
//! Every endpoint, credential and timing knob a run needs, read from plain
//! key/value input with defaults for a local deployment.

use std::time::Duration;

use shared::TenantContext;
use uuid::Uuid;

use crate::error::{FixtureError, FixtureResult};
use crate::fixture::{sample_count, FixturePlan};

/// Credentials for the password grant used when writes go through the access proxy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeycloakConfig {
    pub url: String,
    pub realm: String,
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    /// Access proxy in front of the broker
    pub pep_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptanceConfig {
    pub remote_driver_url: String,
    pub grafana_url: String,
    pub broker_url: String,
    /// Where the broker forwards notifications
    pub quantum_leap_url: String,
    /// Where time-series data is deleted from; usually the same service
    pub timeseries_url: String,
    pub tenant: TenantContext,
    pub entity_id: String,
    pub entity_type: String,
    pub datasource_checker_dashboard: String,
    pub historic_grid_position: usize,
    pub current_grid_position: usize,
    pub air_quality_dashboard: String,
    pub air_quality_home: String,
    pub grafana_user: String,
    pub grafana_password: String,
    pub keycloak: Option<KeycloakConfig>,
    pub wait_timeout: Duration,
    pub poll_interval: Duration,
    pub page_timeout: Duration,
    /// Budget for one scenario body; teardown runs after it either way
    pub scenario_timeout: Duration,
    pub seed_span: Duration,
    pub seed_step: Duration,
}

const KEYCLOAK_KEYS: [&str; 7] = [
    "KEYCLOAK_URL",
    "KEYCLOAK_REALM",
    "KEYCLOAK_CLIENT_ID",
    "KEYCLOAK_CLIENT_SECRET",
    "KEYCLOAK_USERNAME",
    "KEYCLOAK_PASSWORD",
    "PEP_URL",
];

impl Default for AcceptanceConfig {
    fn default() -> Self {
        Self {
            remote_driver_url: "http://localhost:4444".to_string(),
            grafana_url: "http://localhost:3000".to_string(),
            broker_url: "http://localhost:1026".to_string(),
            quantum_leap_url: "http://quantumleap-quantumleap:8668".to_string(),
            timeseries_url: "http://quantumleap-quantumleap:8668".to_string(),
            tenant: TenantContext::default(),
            entity_id: generate_entity_id(),
            entity_type: "AirQualityObserved".to_string(),
            datasource_checker_dashboard: "orion-datasource-checker".to_string(),
            historic_grid_position: 1,
            current_grid_position: 2,
            air_quality_dashboard: "air-quality-data-monitor".to_string(),
            air_quality_home: "aqapp-home".to_string(),
            grafana_user: "user".to_string(),
            grafana_password: "password".to_string(),
            keycloak: None,
            wait_timeout: Duration::from_secs(60),
            poll_interval: Duration::from_secs(1),
            page_timeout: Duration::from_secs(15),
            scenario_timeout: Duration::from_secs(600),
            seed_span: Duration::from_secs(48 * 60 * 60),
            seed_step: Duration::from_secs(5 * 60),
        }
    }
}

impl AcceptanceConfig {
    /// Create a new builder
    pub fn builder() -> crate::config::builder::AcceptanceConfigBuilder {
        crate::config::builder::AcceptanceConfigBuilder::new()
    }

    /// Load from the process environment, after reading a `.env` file if present
    pub fn from_env() -> FixtureResult<Self> {
        let _ = dotenv::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key/value source; absent or blank keys fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> FixtureResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let text = |key: &str, default: String| get(key).unwrap_or(default);
        let number = |key: &str, default: u64| -> FixtureResult<u64> {
            match get(key) {
                Some(raw) => raw.trim().parse().map_err(|_| FixtureError::Configuration {
                    field: key.to_string(),
                    reason: format!("expected a non-negative integer, got {raw:?}"),
                }),
                None => Ok(default),
            }
        };
        let minutes = |key: &str, default: Duration| -> FixtureResult<Duration> {
            let count = number(key, default.as_secs() / 60)?;
            count
                .checked_mul(60)
                .map(Duration::from_secs)
                .ok_or_else(|| FixtureError::Configuration {
                    field: key.to_string(),
                    reason: format!("{count} minutes does not fit in a duration"),
                })
        };

        let quantum_leap_url = text("QUANTUM_LEAP_URL", defaults.quantum_leap_url);
        let tenant = TenantContext::new(
            text("FIWARE_SERVICE", defaults.tenant.service().to_string()),
            text("FIWARE_SERVICE_PATH", defaults.tenant.service_path().to_string()),
        )?;

        let config = Self {
            remote_driver_url: text("REMOTE_DRIVER_URL", defaults.remote_driver_url),
            grafana_url: text("GRAFANA_URL", defaults.grafana_url),
            broker_url: text("BROKER_URL", defaults.broker_url),
            timeseries_url: text("TIMESERIES_URL", quantum_leap_url.clone()),
            quantum_leap_url,
            tenant,
            entity_id: text("TEST_ENTITY_ID", defaults.entity_id),
            entity_type: text("TEST_ENTITY_TYPE", defaults.entity_type),
            datasource_checker_dashboard: text(
                "DATASOURCE_CHECKER_DASHBOARD_NAME",
                defaults.datasource_checker_dashboard,
            ),
            historic_grid_position: number(
                "HISTORIC_DATA_GRID_POSITION",
                defaults.historic_grid_position as u64,
            )? as usize,
            current_grid_position: number(
                "CURRENT_DATA_GRID_POSITION",
                defaults.current_grid_position as u64,
            )? as usize,
            air_quality_dashboard: text(
                "AIR_QUALITY_DATA_MONITOR_DASHBOARD_NAME",
                defaults.air_quality_dashboard,
            ),
            air_quality_home: text("AIR_QUALITY_HOME", defaults.air_quality_home),
            grafana_user: text("GRAFANA_USERNAME", defaults.grafana_user),
            grafana_password: text("GRAFANA_PASSWORD", defaults.grafana_password),
            keycloak: keycloak_from(&get)?,
            wait_timeout: Duration::from_secs(number("WAIT_TIMEOUT_SECS", defaults.wait_timeout.as_secs())?),
            poll_interval: Duration::from_millis(number(
                "POLL_INTERVAL_MS",
                defaults.poll_interval.as_millis() as u64,
            )?),
            page_timeout: Duration::from_secs(number("PAGE_TIMEOUT_SECS", defaults.page_timeout.as_secs())?),
            scenario_timeout: Duration::from_secs(number(
                "SCENARIO_TIMEOUT_SECS",
                defaults.scenario_timeout.as_secs(),
            )?),
            seed_span: minutes("SEED_SPAN_MINUTES", defaults.seed_span)?,
            seed_step: minutes("SEED_STEP_MINUTES", defaults.seed_step)?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> FixtureResult<()> {
        if self.entity_id.trim().is_empty() {
            return Err(FixtureError::Configuration {
                field: "TEST_ENTITY_ID".to_string(),
                reason: "entity id must not be empty".to_string(),
            });
        }
        if self.seed_step.is_zero() {
            return Err(FixtureError::Configuration {
                field: "SEED_STEP_MINUTES".to_string(),
                reason: "step interval must be greater than zero".to_string(),
            });
        }
        if let Err(FixtureError::Configuration { reason, .. }) = sample_count(self.seed_span, self.seed_step) {
            return Err(FixtureError::Configuration {
                field: "SEED_SPAN_MINUTES".to_string(),
                reason,
            });
        }
        if self.scenario_timeout.is_zero() {
            return Err(FixtureError::Configuration {
                field: "SCENARIO_TIMEOUT_SECS".to_string(),
                reason: "scenario timeout must be greater than zero".to_string(),
            });
        }
        if self.poll_interval.is_zero() {
            return Err(FixtureError::Configuration {
                field: "POLL_INTERVAL_MS".to_string(),
                reason: "poll interval must be greater than zero".to_string(),
            });
        }
        if self.historic_grid_position == 0 || self.current_grid_position == 0 {
            return Err(FixtureError::Configuration {
                field: "DATA_GRID_POSITION".to_string(),
                reason: "grid positions start at 1".to_string(),
            });
        }
        Ok(())
    }

    /// Writes go through the access proxy when one is configured
    pub fn write_url(&self) -> &str {
        self.keycloak
            .as_ref()
            .map(|keycloak| keycloak.pep_url.as_str())
            .unwrap_or(&self.broker_url)
    }

    pub fn fixture_plan(&self) -> FixturePlan {
        FixturePlan {
            entity_id: self.entity_id.clone(),
            entity_type: self.entity_type.clone(),
            tenant: self.tenant.clone(),
            forward_target: self.quantum_leap_url.clone(),
            span: self.seed_span,
            step: self.seed_step,
        }
    }
}

/// All-or-nothing: a partial set of Keycloak keys is a mistake worth failing on
fn keycloak_from<F>(get: &F) -> FixtureResult<Option<KeycloakConfig>>
where
    F: Fn(&str) -> Option<String>,
{
    let values: Vec<Option<String>> = KEYCLOAK_KEYS.iter().map(|&key| get(key)).collect();
    let missing: Vec<&str> = KEYCLOAK_KEYS
        .iter()
        .zip(&values)
        .filter(|(_, value)| value.is_none())
        .map(|(key, _)| *key)
        .collect();

    if missing.len() == KEYCLOAK_KEYS.len() {
        return Ok(None);
    }
    if !missing.is_empty() {
        return Err(FixtureError::Configuration {
            field: missing.join(", "),
            reason: "required when the access proxy flow is configured".to_string(),
        });
    }

    let mut values = values.into_iter().flatten();
    let mut next = || values.next().unwrap_or_default();
    Ok(Some(KeycloakConfig {
        url: next(),
        realm: next(),
        client_id: next(),
        client_secret: next(),
        username: next(),
        password: next(),
        pep_url: next(),
    }))
}

/// Unique per run so concurrent runs against one environment do not collide
pub fn generate_entity_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("test-air-quality-{}", &suffix[..8])
}
