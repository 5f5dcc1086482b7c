//! Grafana availability check

use std::time::Duration;

use crate::error::{FixtureResult, TransportError};
use crate::fixture::{await_ok, WaitOutcome};

pub struct DashboardClient {
    grafana_url: String,
    client: reqwest::Client,
}

impl DashboardClient {
    pub fn new(grafana_url: &str) -> FixtureResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(TransportError::from)?;

        Ok(Self {
            grafana_url: grafana_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Status code of `GET <grafana>/`
    pub async fn health_check(&self) -> Result<u16, TransportError> {
        let response = self.client.get(format!("{}/", self.grafana_url)).send().await?;
        Ok(response.status().as_u16())
    }

    pub async fn is_deployed(&self) -> Result<bool, TransportError> {
        Ok(self.health_check().await? == 200)
    }

    /// Poll until Grafana answers 200 or `timeout` elapses
    pub async fn wait_for_ready(&self, timeout: Duration, poll_interval: Duration) -> WaitOutcome {
        tracing::info!("⏳ Waiting for Grafana at {}", self.grafana_url);
        await_ok(|| self.is_deployed(), timeout, poll_interval).await
    }
}
