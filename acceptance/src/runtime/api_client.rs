//! REST API Client for the context broker and time-series store
//!
//! Implements [`FixtureApi`] over reqwest. Every request carries the tenant
//! headers and a bearer token when a token source is configured.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, LOCATION};
use reqwest::RequestBuilder;
use shared::TenantContext;
use url::Url;

use super::auth::KeycloakTokenSource;
use crate::error::{FixtureResult, TransportError};
use crate::fixture::payload::{EntityUpsert, SubscriptionRequest};
use crate::traits::{ApiResponse, FixtureApi};

/// Placeholder token the access proxy expects when security is off
const NO_TOKEN: &str = "noToken";

#[derive(Clone)]
pub struct FiwareApiClient {
    broker_url: String,
    timeseries_url: String,
    client: reqwest::Client,
    tokens: Option<Arc<KeycloakTokenSource>>,
}

impl FiwareApiClient {
    pub fn new(broker_url: &str, timeseries_url: &str) -> FixtureResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(TransportError::from)?;

        Ok(Self {
            broker_url: broker_url.to_string(),
            timeseries_url: timeseries_url.to_string(),
            client,
            tokens: None,
        })
    }

    /// Attach a bearer token obtained from Keycloak to every request
    pub fn with_token_source(mut self, tokens: Arc<KeycloakTokenSource>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn broker_url(&self) -> &str {
        &self.broker_url
    }

    async fn authorization(&self) -> Result<String, TransportError> {
        let token = match &self.tokens {
            Some(tokens) => tokens
                .access_token()
                .await
                .map_err(|e| TransportError::new(e.to_string()))?,
            None => NO_TOKEN.to_string(),
        };
        Ok(format!("bearer {token}"))
    }

    async fn send(&self, request: RequestBuilder, tenant: &TenantContext) -> Result<ApiResponse, TransportError> {
        let mut request = request.header(AUTHORIZATION, self.authorization().await?);
        for (name, value) in tenant.headers() {
            request = request.header(name, value);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.unwrap_or_default();

        tracing::debug!("🌐 Response {} (location: {:?})", status, location);
        Ok(ApiResponse { status, location, body })
    }
}

/// Append path segments to a base URL, percent-encoding each segment
pub fn endpoint(base: &str, segments: &[&str]) -> Result<Url, TransportError> {
    let mut url = Url::parse(base).map_err(|e| TransportError::new(format!("invalid base URL {base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| TransportError::new(format!("{base} cannot be used as a base URL")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Resolve a `Location` value, absolute or relative to the broker
pub fn resolve_location(base: &str, location: &str) -> Result<Url, TransportError> {
    if let Ok(url) = Url::parse(location) {
        return Ok(url);
    }
    let segments: Vec<&str> = location.split('/').filter(|segment| !segment.is_empty()).collect();
    endpoint(base, &segments)
}

#[async_trait]
impl FixtureApi for FiwareApiClient {
    async fn create_subscription(
        &self,
        tenant: &TenantContext,
        subscription: &SubscriptionRequest,
    ) -> Result<ApiResponse, TransportError> {
        let url = endpoint(&self.broker_url, &["v2", "subscriptions"])?;
        tracing::info!("📬 Creating subscription at {}", url);
        self.send(self.client.post(url).json(subscription), tenant).await
    }

    async fn upsert_entity(
        &self,
        tenant: &TenantContext,
        entity: &EntityUpsert,
    ) -> Result<ApiResponse, TransportError> {
        let mut url = endpoint(&self.broker_url, &["v2", "entities"])?;
        url.query_pairs_mut().append_pair("options", "upsert");
        self.send(self.client.post(url).json(entity), tenant).await
    }

    async fn delete_subscription(
        &self,
        tenant: &TenantContext,
        location: &str,
    ) -> Result<ApiResponse, TransportError> {
        let url = resolve_location(&self.broker_url, location)?;
        self.send(self.client.delete(url), tenant).await
    }

    async fn delete_time_series(
        &self,
        tenant: &TenantContext,
        entity_id: &str,
        entity_type: &str,
    ) -> Result<ApiResponse, TransportError> {
        let mut url = endpoint(&self.timeseries_url, &["v2", "entities", entity_id])?;
        url.query_pairs_mut().append_pair("type", entity_type);
        self.send(self.client.delete(url), tenant).await
    }

    async fn delete_entity(
        &self,
        tenant: &TenantContext,
        entity_id: &str,
    ) -> Result<ApiResponse, TransportError> {
        let url = endpoint(&self.broker_url, &["v2", "entities", entity_id])?;
        self.send(self.client.delete(url), tenant).await
    }
}
