//! Trait definitions with mockall annotations for testing
//!
//! The fixture components never talk to reqwest or a browser directly. They
//! depend on these seams so the lifecycle can be exercised against mocks,
//! in-memory fakes or the real services.

use async_trait::async_trait;
use shared::TenantContext;

use crate::error::{FixtureResult, TransportError};
use crate::fixture::payload::{EntityUpsert, SubscriptionRequest};

/// Minimal view of an HTTP response the fixture components care about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub location: Option<String>,
    pub body: String,
}

impl ApiResponse {
    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            location: None,
            body: String::new(),
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

/// Write and delete operations against the context broker and time-series store
#[mockall::automock]
#[async_trait]
pub trait FixtureApi: Send + Sync {
    /// `POST <broker>/v2/subscriptions`
    async fn create_subscription(
        &self,
        tenant: &TenantContext,
        subscription: &SubscriptionRequest,
    ) -> Result<ApiResponse, TransportError>;

    /// `POST <broker>/v2/entities?options=upsert`
    async fn upsert_entity(
        &self,
        tenant: &TenantContext,
        entity: &EntityUpsert,
    ) -> Result<ApiResponse, TransportError>;

    /// `DELETE <broker>/<location>`
    async fn delete_subscription(
        &self,
        tenant: &TenantContext,
        location: &str,
    ) -> Result<ApiResponse, TransportError>;

    /// `DELETE <timeseries>/v2/entities/<id>?type=<type>`
    async fn delete_time_series(
        &self,
        tenant: &TenantContext,
        entity_id: &str,
        entity_type: &str,
    ) -> Result<ApiResponse, TransportError>;

    /// `DELETE <broker>/v2/entities/<id>`
    async fn delete_entity(
        &self,
        tenant: &TenantContext,
        entity_id: &str,
    ) -> Result<ApiResponse, TransportError>;
}

/// How to find elements on the rendered page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Css(String),
    XPath(String),
    Name(String),
    ClassName(String),
    TagName(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn xpath(expression: impl Into<String>) -> Self {
        Locator::XPath(expression.into())
    }

    /// WebDriver location strategy and value
    pub fn strategy(&self) -> (&'static str, String) {
        match self {
            Locator::Css(selector) => ("css selector", selector.clone()),
            Locator::XPath(expression) => ("xpath", expression.clone()),
            Locator::Name(name) => ("css selector", format!("[name=\"{name}\"]")),
            Locator::ClassName(class) => ("css selector", format!(".{class}")),
            Locator::TagName(tag) => ("tag name", tag.clone()),
        }
    }
}

/// Result of looking for rendered elements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMatch {
    Absent,
    Present(usize),
}

impl TextMatch {
    pub fn count(&self) -> usize {
        match self {
            TextMatch::Absent => 0,
            TextMatch::Present(count) => *count,
        }
    }
}

/// Opaque browser capability used for rendered-state assertions
#[mockall::automock]
#[async_trait]
pub trait UiDriver: Send + Sync {
    async fn navigate(&self, url: &str) -> FixtureResult<()>;

    async fn current_title(&self) -> FixtureResult<String>;

    async fn current_url(&self) -> FixtureResult<String>;

    /// Visible text of every element matching the locator, in document order
    async fn find_texts(&self, locator: &Locator) -> FixtureResult<Vec<String>>;

    /// Type into the first element matching the locator
    async fn type_text(&self, locator: &Locator, text: &str) -> FixtureResult<()>;

    /// Click the first element matching the locator
    async fn click(&self, locator: &Locator) -> FixtureResult<()>;

    async fn quit(&self) -> FixtureResult<()>;
}

/// Presence checks derived from [`UiDriver::find_texts`]
#[async_trait]
pub trait UiDriverExt: UiDriver {
    async fn find_text(&self, locator: &Locator) -> FixtureResult<TextMatch> {
        let texts = self.find_texts(locator).await?;
        Ok(match texts.len() {
            0 => TextMatch::Absent,
            count => TextMatch::Present(count),
        })
    }
}

impl<T: UiDriver + ?Sized> UiDriverExt for T {}
