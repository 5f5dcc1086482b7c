//! Remote WebDriver session
//!
//! Speaks the W3C WebDriver wire protocol to a remote browser (a Selenium
//! standalone container in the stack). Only the commands the dashboard
//! scenarios need are implemented.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{FixtureError, FixtureResult, TransportError};
use crate::traits::{Locator, UiDriver};

/// Key the protocol uses for element references
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

#[derive(Deserialize, Debug)]
struct Envelope {
    #[serde(default)]
    value: Value,
}

pub struct WebDriverSession {
    session_url: String,
    client: reqwest::Client,
}

impl WebDriverSession {
    /// Open a Chrome session and set the implicit element wait
    pub async fn start(remote_url: &str, implicit_wait: Duration) -> FixtureResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(TransportError::from)?;

        let base = remote_url.trim_end_matches('/');
        let capabilities = json!({
            "capabilities": {
                "alwaysMatch": { "browserName": "chrome" }
            }
        });

        tracing::info!("🌐 Opening browser session at {}", base);
        let response = client.post(format!("{base}/session")).json(&capabilities).send().await;
        let value = unwrap_value(response).await?;

        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| FixtureError::ui("new session response carried no sessionId"))?;

        let session = Self {
            session_url: format!("{base}/session/{session_id}"),
            client,
        };
        session
            .post("timeouts", json!({ "implicit": implicit_wait.as_millis() as u64 }))
            .await?;

        tracing::debug!("✅ Browser session {} ready", session_id);
        Ok(session)
    }

    pub fn session_url(&self) -> &str {
        &self.session_url
    }

    async fn post(&self, command: &str, body: Value) -> FixtureResult<Value> {
        let url = format!("{}/{command}", self.session_url);
        unwrap_value(self.client.post(url).json(&body).send().await).await
    }

    async fn get(&self, command: &str) -> FixtureResult<Value> {
        let url = format!("{}/{command}", self.session_url);
        unwrap_value(self.client.get(url).send().await).await
    }

    async fn find_elements(&self, locator: &Locator) -> FixtureResult<Vec<String>> {
        let (using, value) = locator.strategy();
        let found = self.post("elements", json!({ "using": using, "value": value })).await?;

        let elements = found
            .as_array()
            .ok_or_else(|| FixtureError::ui("find elements response was not a list"))?;
        Ok(elements
            .iter()
            .filter_map(|element| element.get(ELEMENT_KEY).and_then(Value::as_str))
            .map(str::to_string)
            .collect())
    }

    async fn first_element(&self, locator: &Locator) -> FixtureResult<String> {
        self.find_elements(locator)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| FixtureError::ui(format!("no element matches {locator:?}")))
    }
}

/// Read the `value` member of a response, turning protocol errors into `Ui`
async fn unwrap_value(response: Result<reqwest::Response, reqwest::Error>) -> FixtureResult<Value> {
    let response = response.map_err(|e| FixtureError::ui(format!("webdriver unreachable: {e}")))?;
    let status = response.status();
    let envelope: Envelope = response
        .json()
        .await
        .map_err(|e| FixtureError::ui(format!("unreadable webdriver response ({status}): {e}")))?;

    if let Some(error) = envelope.value.get("error").and_then(Value::as_str) {
        let message = envelope
            .value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default();
        return Err(FixtureError::ui(format!("{error}: {message}")));
    }
    if !status.is_success() {
        return Err(FixtureError::ui(format!("webdriver returned status {status}")));
    }
    Ok(envelope.value)
}

#[async_trait]
impl UiDriver for WebDriverSession {
    async fn navigate(&self, url: &str) -> FixtureResult<()> {
        tracing::debug!("🧭 Navigating to {}", url);
        self.post("url", json!({ "url": url })).await?;
        Ok(())
    }

    async fn current_title(&self) -> FixtureResult<String> {
        let title = self.get("title").await?;
        Ok(title.as_str().unwrap_or_default().to_string())
    }

    async fn current_url(&self) -> FixtureResult<String> {
        let url = self.get("url").await?;
        Ok(url.as_str().unwrap_or_default().to_string())
    }

    async fn find_texts(&self, locator: &Locator) -> FixtureResult<Vec<String>> {
        let mut texts = Vec::new();
        for element in self.find_elements(locator).await? {
            let text = self.get(&format!("element/{element}/text")).await?;
            texts.push(text.as_str().unwrap_or_default().to_string());
        }
        Ok(texts)
    }

    async fn type_text(&self, locator: &Locator, text: &str) -> FixtureResult<()> {
        let element = self.first_element(locator).await?;
        self.post(&format!("element/{element}/value"), json!({ "text": text }))
            .await?;
        Ok(())
    }

    async fn click(&self, locator: &Locator) -> FixtureResult<()> {
        let element = self.first_element(locator).await?;
        self.post(&format!("element/{element}/click"), json!({})).await?;
        Ok(())
    }

    async fn quit(&self) -> FixtureResult<()> {
        tracing::debug!("🛑 Closing browser session");
        unwrap_value(self.client.delete(&self.session_url).send().await).await?;
        Ok(())
    }
}
