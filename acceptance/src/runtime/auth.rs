//! Keycloak password-grant token source

use std::time::Duration;

use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::config::KeycloakConfig;
use crate::error::{FixtureError, FixtureResult, TransportError};

/// Tokens are refreshed this long before they expire
const REFRESH_MARGIN: Duration = Duration::from_secs(30);

#[derive(Deserialize, Debug)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug)]
struct CachedToken {
    access_token: String,
    refresh_at: Instant,
}

pub struct KeycloakTokenSource {
    config: KeycloakConfig,
    client: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl KeycloakTokenSource {
    pub fn new(config: KeycloakConfig) -> FixtureResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(TransportError::from)?;

        Ok(Self {
            config,
            client,
            cached: Mutex::new(None),
        })
    }

    pub fn token_url(&self) -> String {
        format!(
            "{}/realms/{}/protocol/openid-connect/token",
            self.config.url.trim_end_matches('/'),
            self.config.realm
        )
    }

    /// Current access token, fetching a new one when the cached one is stale
    pub async fn access_token(&self) -> FixtureResult<String> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.access_token.clone());
            }
        }

        let token = self.fetch().await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    async fn fetch(&self) -> FixtureResult<CachedToken> {
        tracing::debug!("🔑 Requesting token from {}", self.token_url());

        let form = [
            ("grant_type", "password"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("username", self.config.username.as_str()),
            ("password", self.config.password.as_str()),
        ];

        let response = self
            .client
            .post(self.token_url())
            .form(&form)
            .send()
            .await
            .map_err(|e| FixtureError::Authentication { message: e.to_string() })?;

        if !response.status().is_success() {
            return Err(FixtureError::Authentication {
                message: format!("token request failed with status: {}", response.status()),
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| FixtureError::Authentication { message: e.to_string() })?;

        let lifetime = Duration::from_secs(token.expires_in.unwrap_or(60));
        Ok(CachedToken {
            access_token: token.access_token,
            refresh_at: Instant::now() + lifetime.saturating_sub(REFRESH_MARGIN),
        })
    }
}
