//! Test fixtures for acceptance integration tests

#![allow(dead_code)]

use std::time::Duration;

use acceptance::FixturePlan;
use shared::TenantContext;

pub const ENTITY_ID: &str = "e2e-aq";
pub const ENTITY_TYPE: &str = "AirQualityObserved";
pub const SUBSCRIPTION_LOCATION: &str = "/v2/subscriptions/sub-1";

pub fn create_test_tenant() -> TenantContext {
    TenantContext::new("AirQuality", "/alcantarilla").unwrap()
}

/// Plan seeding `span / step` samples, forwarding to `forward_target`
pub fn create_test_plan(span: Duration, step: Duration, forward_target: &str) -> FixturePlan {
    FixturePlan {
        entity_id: ENTITY_ID.to_string(),
        entity_type: ENTITY_TYPE.to_string(),
        tenant: create_test_tenant(),
        forward_target: forward_target.to_string(),
        span,
        step,
    }
}

/// Ten minutes of history at five-minute steps: two samples
pub fn create_short_plan(forward_target: &str) -> FixturePlan {
    create_test_plan(Duration::from_secs(10 * 60), Duration::from_secs(5 * 60), forward_target)
}
