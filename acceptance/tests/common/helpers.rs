//! Test helper utilities for acceptance integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use acceptance::fixture::payload::{EntityUpsert, SubscriptionRequest};
use acceptance::{ApiResponse, FixtureApi, FixtureResult, Locator, TransportError, UiDriver};
use async_trait::async_trait;
use shared::TenantContext;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::fixtures::{ENTITY_ID, SUBSCRIPTION_LOCATION};

/// In-memory [`FixtureApi`] that records every call and replays scripted answers
#[derive(Default)]
pub struct RecordingApi {
    pub calls: Mutex<Vec<String>>,
    subscription: Mutex<Option<Result<ApiResponse, TransportError>>>,
    upserts: Mutex<VecDeque<Result<ApiResponse, TransportError>>>,
}

impl RecordingApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subscription(self, response: Result<ApiResponse, TransportError>) -> Self {
        *self.subscription.lock().unwrap() = Some(response);
        self
    }

    /// Answers for successive upserts; once exhausted every upsert gets 204
    pub fn with_upserts(self, responses: Vec<Result<ApiResponse, TransportError>>) -> Self {
        *self.upserts.lock().unwrap() = responses.into();
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|call| call.starts_with(prefix)).count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl FixtureApi for RecordingApi {
    async fn create_subscription(
        &self,
        _tenant: &TenantContext,
        _subscription: &SubscriptionRequest,
    ) -> Result<ApiResponse, TransportError> {
        self.record("create_subscription".to_string());
        self.subscription
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok(ApiResponse::with_status(201).with_location(SUBSCRIPTION_LOCATION)))
    }

    async fn upsert_entity(&self, _tenant: &TenantContext, entity: &EntityUpsert) -> Result<ApiResponse, TransportError> {
        self.record(format!("upsert_entity {}", entity.id));
        self.upserts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ApiResponse::with_status(204)))
    }

    async fn delete_subscription(&self, _tenant: &TenantContext, location: &str) -> Result<ApiResponse, TransportError> {
        self.record(format!("delete_subscription {location}"));
        Ok(ApiResponse::with_status(204))
    }

    async fn delete_time_series(
        &self,
        _tenant: &TenantContext,
        entity_id: &str,
        _entity_type: &str,
    ) -> Result<ApiResponse, TransportError> {
        self.record(format!("delete_time_series {entity_id}"));
        Ok(ApiResponse::with_status(204))
    }

    async fn delete_entity(&self, _tenant: &TenantContext, entity_id: &str) -> Result<ApiResponse, TransportError> {
        self.record(format!("delete_entity {entity_id}"));
        Ok(ApiResponse::with_status(204))
    }
}

/// Dashboard stand-in whose historic table fills up after a few polls
pub struct FakeDashboard {
    entity_id: String,
    polls_until_history: usize,
    polls: AtomicUsize,
}

impl FakeDashboard {
    pub fn new(entity_id: &str, polls_until_history: usize) -> Self {
        Self {
            entity_id: entity_id.to_string(),
            polls_until_history,
            polls: AtomicUsize::new(0),
        }
    }

    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UiDriver for FakeDashboard {
    async fn navigate(&self, _url: &str) -> FixtureResult<()> {
        Ok(())
    }

    async fn current_title(&self) -> FixtureResult<String> {
        Ok("Orion datasource checker - Grafana".to_string())
    }

    async fn current_url(&self) -> FixtureResult<String> {
        Ok("http://grafana:3000/d/orion-datasource-checker".to_string())
    }

    async fn find_texts(&self, locator: &Locator) -> FixtureResult<Vec<String>> {
        match locator {
            Locator::XPath(_) => {
                let polls = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
                let rows = if polls >= self.polls_until_history { 3 } else { 1 };
                Ok(vec![self.entity_id.clone(); rows])
            }
            _ => Ok(vec![self.entity_id.clone()]),
        }
    }

    async fn type_text(&self, _locator: &Locator, _text: &str) -> FixtureResult<()> {
        Ok(())
    }

    async fn click(&self, _locator: &Locator) -> FixtureResult<()> {
        Ok(())
    }

    async fn quit(&self) -> FixtureResult<()> {
        Ok(())
    }
}

/// Broker accepting the subscription, every upsert and every delete
pub async fn mount_broker(server: &MockServer, expected_upserts: u64) {
    Mock::given(method("POST"))
        .and(path("/v2/subscriptions"))
        .respond_with(ResponseTemplate::new(201).insert_header("Location", SUBSCRIPTION_LOCATION))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/entities"))
        .respond_with(ResponseTemplate::new(204))
        .expect(expected_upserts)
        .mount(server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(SUBSCRIPTION_LOCATION))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("/v2/entities/{ENTITY_ID}")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(server)
        .await;
}

/// Time-series store answering the history delete with `status`
pub async fn mount_timeseries(server: &MockServer, status: u16) {
    Mock::given(method("DELETE"))
        .and(path(format!("/v2/entities/{ENTITY_ID}")))
        .respond_with(ResponseTemplate::new(status))
        .expect(1)
        .mount(server)
        .await;
}
