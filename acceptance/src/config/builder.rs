//! Acceptance Configuration Builder
//!
//! Provides a flexible builder pattern for constructing run configurations

use super::{AcceptanceConfig, KeycloakConfig};
use shared::TenantContext;
use std::time::Duration;

use crate::error::FixtureResult;

pub struct AcceptanceConfigBuilder {
    config: AcceptanceConfig,
}

impl AcceptanceConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: AcceptanceConfig::default(),
        }
    }

    /// Set the context broker base URL
    pub fn broker_url<S: Into<String>>(mut self, url: S) -> Self {
        self.config.broker_url = url.into();
        self
    }

    /// Set the notification target and the time-series deletion endpoint together
    pub fn quantum_leap_url<S: Into<String>>(mut self, url: S) -> Self {
        let url = url.into();
        self.config.timeseries_url = url.clone();
        self.config.quantum_leap_url = url;
        self
    }

    /// Delete time-series data somewhere other than the notification target
    pub fn timeseries_url<S: Into<String>>(mut self, url: S) -> Self {
        self.config.timeseries_url = url.into();
        self
    }

    /// Set the dashboard UI base URL
    pub fn grafana_url<S: Into<String>>(mut self, url: S) -> Self {
        self.config.grafana_url = url.into();
        self
    }

    /// Set the remote WebDriver endpoint
    pub fn remote_driver_url<S: Into<String>>(mut self, url: S) -> Self {
        self.config.remote_driver_url = url.into();
        self
    }

    pub fn tenant(mut self, tenant: TenantContext) -> Self {
        self.config.tenant = tenant;
        self
    }

    pub fn entity_id<S: Into<String>>(mut self, id: S) -> Self {
        self.config.entity_id = id.into();
        self
    }

    pub fn entity_type<S: Into<String>>(mut self, entity_type: S) -> Self {
        self.config.entity_type = entity_type.into();
        self
    }

    /// Set dashboard login credentials
    pub fn grafana_credentials<S: Into<String>>(mut self, user: S, password: S) -> Self {
        self.config.grafana_user = user.into();
        self.config.grafana_password = password.into();
        self
    }

    /// Route writes through an access proxy with a password-grant token
    pub fn keycloak(mut self, keycloak: KeycloakConfig) -> Self {
        self.config.keycloak = Some(keycloak);
        self
    }

    /// Set how much history to seed and at which step
    pub fn seed(mut self, span: Duration, step: Duration) -> Self {
        self.config.seed_span = span;
        self.config.seed_step = step;
        self
    }

    /// Set the propagation wait budget and poll interval
    pub fn wait(mut self, timeout: Duration, poll_interval: Duration) -> Self {
        self.config.wait_timeout = timeout;
        self.config.poll_interval = poll_interval;
        self
    }

    /// Set how long page transitions may take
    pub fn page_timeout(mut self, timeout: Duration) -> Self {
        self.config.page_timeout = timeout;
        self
    }

    /// Bound on one scenario body before teardown takes over
    pub fn scenario_timeout(mut self, timeout: Duration) -> Self {
        self.config.scenario_timeout = timeout;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> FixtureResult<AcceptanceConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for AcceptanceConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
