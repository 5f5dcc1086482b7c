//! Fixture Builder
//!
//! Creates the forwarding subscription and the seeded entity history for one
//! scenario, recording on the handle exactly what the services accepted.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use shared::TenantContext;
use tracing::{debug, info, warn};

use super::handle::FixtureHandle;
use super::payload::{random_readings, EntityUpsert, SubscriptionRequest};
use crate::error::{FixtureError, FixtureResult};
use crate::traits::FixtureApi;

/// Everything needed to set up one scenario's fixture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixturePlan {
    pub entity_id: String,
    pub entity_type: String,
    pub tenant: TenantContext,
    /// Base URL the broker forwards notifications to
    pub forward_target: String,
    pub span: Duration,
    pub step: Duration,
}

/// Handle produced by setup plus every setup error that was reported
#[derive(Debug)]
pub struct FixtureSetup {
    pub handle: FixtureHandle,
    pub errors: Vec<FixtureError>,
}

impl FixtureSetup {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

pub struct FixtureBuilder {
    api: Arc<dyn FixtureApi>,
}

impl FixtureBuilder {
    pub fn new(api: Arc<dyn FixtureApi>) -> Self {
        Self { api }
    }

    /// Create the subscription first, then seed the history
    ///
    /// A failed subscription does not stop seeding. Whatever was created is
    /// on the returned handle so teardown can remove it.
    pub async fn build(&self, plan: &FixturePlan) -> FixtureSetup {
        let mut handle = FixtureHandle::new(&plan.entity_id, &plan.entity_type, plan.tenant.clone());
        let mut errors = Vec::new();

        info!("🏗️ Building fixture '{}' for tenant {}", plan.entity_id, plan.tenant);

        if let Err(e) = self.create_subscription(&mut handle, &plan.forward_target).await {
            warn!("⚠️ Continuing without subscription: {}", e);
            errors.push(e);
        }

        if let Err(e) = self.seed_historical_data(&mut handle, plan.span, plan.step).await {
            warn!("⚠️ Seeding stopped early: {}", e);
            errors.push(e);
        }

        info!(
            "🏗️ Fixture '{}' built: subscription={}, samples={}, errors={}",
            handle.entity_id(),
            handle.subscription_location().unwrap_or("none"),
            handle.created_sample_count(),
            errors.len()
        );

        FixtureSetup { handle, errors }
    }

    /// Create the forwarding subscription and record its location
    pub async fn create_subscription(
        &self,
        handle: &mut FixtureHandle,
        forward_target: &str,
    ) -> FixtureResult<String> {
        let request = SubscriptionRequest::forwarding(handle.entity_type(), handle.tenant(), forward_target);

        let response = self
            .api
            .create_subscription(handle.tenant(), &request)
            .await
            .map_err(|e| FixtureError::SubscriptionCreation {
                status: None,
                reason: e.message,
            })?;

        if !response.is_success() {
            return Err(FixtureError::SubscriptionCreation {
                status: Some(response.status),
                reason: format!("unexpected response: {}", response.body),
            });
        }

        let location = response.location.ok_or_else(|| FixtureError::SubscriptionCreation {
            status: Some(response.status),
            reason: "response carried no Location header".to_string(),
        })?;

        handle.record_subscription(location.clone())?;
        info!("📬 Subscription created at {}", location);
        Ok(location)
    }

    /// Upsert one sample per step over `span`, newest first
    ///
    /// Stops at the first rejected write. Samples written before that stay
    /// counted on the handle.
    pub async fn seed_historical_data(
        &self,
        handle: &mut FixtureHandle,
        span: Duration,
        step: Duration,
    ) -> FixtureResult<usize> {
        let offsets = sample_offsets(span, step)?;
        let now = Utc::now();
        let mut written = 0;

        info!("🌱 Seeding {} samples for '{}'", offsets.len(), handle.entity_id());

        for offset in offsets {
            let offset = chrono::Duration::from_std(offset).map_err(|e| FixtureError::Configuration {
                field: "span".to_string(),
                reason: e.to_string(),
            })?;
            let readings = random_readings(&mut rand::thread_rng());
            let sample = EntityUpsert::sample(handle.entity_id(), handle.entity_type(), readings, now - offset);

            let failure = match self.api.upsert_entity(handle.tenant(), &sample).await {
                Ok(response) if response.is_success() => None,
                Ok(response) => Some((Some(response.status), format!("unexpected response: {}", response.body))),
                Err(e) => Some((None, e.message)),
            };

            if let Some((status, reason)) = failure {
                return Err(FixtureError::Seeding {
                    entity_id: handle.entity_id().to_string(),
                    written,
                    status,
                    reason,
                });
            }

            handle.record_samples(1);
            written += 1;
            debug!("🌱 Sample {} upserted for '{}'", written, handle.entity_id());
        }

        Ok(written)
    }
}

/// Upper bound on the samples one plan may seed
pub const MAX_SAMPLES: usize = 50_000;

/// Number of samples covering `span` at `step`, rounded up
pub fn sample_count(span: Duration, step: Duration) -> FixtureResult<usize> {
    if step.is_zero() {
        return Err(FixtureError::Configuration {
            field: "step".to_string(),
            reason: "step interval must be greater than zero".to_string(),
        });
    }

    let count = span.as_nanos().div_ceil(step.as_nanos());
    if count > MAX_SAMPLES as u128 {
        return Err(FixtureError::Configuration {
            field: "span".to_string(),
            reason: format!("{count} samples requested, at most {MAX_SAMPLES} allowed"),
        });
    }
    Ok(count as usize)
}

/// Offsets back from now, one per step, covering `[0, span)`
pub fn sample_offsets(span: Duration, step: Duration) -> FixtureResult<Vec<Duration>> {
    let count = sample_count(span, step)?;
    Ok((0..count as u32).map(|i| step * i).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::traits::{ApiResponse, MockFixtureApi};
    use assert_matches::assert_matches;
    use std::sync::Mutex;

    const MINUTE: Duration = Duration::from_secs(60);

    fn plan() -> FixturePlan {
        FixturePlan {
            entity_id: "e2e-aq".to_string(),
            entity_type: "AirQualityObserved".to_string(),
            tenant: TenantContext::new("AirQuality", "/alcantarilla").unwrap(),
            forward_target: "http://quantumleap:8668".to_string(),
            span: 10 * MINUTE,
            step: 5 * MINUTE,
        }
    }

    #[test]
    fn test_sample_offsets_two_days_in_five_minute_steps() {
        let offsets = sample_offsets(48 * 60 * MINUTE, 5 * MINUTE).unwrap();
        assert_eq!(offsets.len(), 576);
        assert_eq!(offsets[0], Duration::ZERO);
        assert_eq!(offsets[1], 5 * MINUTE);
    }

    #[test]
    fn test_sample_offsets_partial_step_rounds_up() {
        assert_eq!(sample_offsets(11 * MINUTE, 5 * MINUTE).unwrap().len(), 3);
        assert!(sample_offsets(Duration::ZERO, 5 * MINUTE).unwrap().is_empty());
    }

    #[test]
    fn test_sample_count_is_capped() {
        assert_eq!(sample_count(48 * 60 * MINUTE, 5 * MINUTE).unwrap(), 576);
        assert_matches!(
            sample_offsets(Duration::from_secs(u64::MAX), MINUTE),
            Err(FixtureError::Configuration { .. })
        );
        assert_matches!(
            sample_count(MINUTE * (MAX_SAMPLES as u32 + 1), MINUTE),
            Err(FixtureError::Configuration { .. })
        );
        assert_eq!(sample_count(MINUTE * MAX_SAMPLES as u32, MINUTE).unwrap(), MAX_SAMPLES);
    }

    #[test]
    fn test_sample_offsets_rejects_zero_step() {
        assert_matches!(
            sample_offsets(MINUTE, Duration::ZERO),
            Err(FixtureError::Configuration { .. })
        );
    }

    #[tokio::test]
    async fn test_build_records_subscription_and_samples() {
        let mut api = MockFixtureApi::new();
        api.expect_create_subscription()
            .times(1)
            .returning(|_, _| Ok(ApiResponse::with_status(201).with_location("/v2/subscriptions/sub-1")));
        api.expect_upsert_entity()
            .times(2)
            .returning(|_, _| Ok(ApiResponse::with_status(204)));

        let setup = FixtureBuilder::new(Arc::new(api)).build(&plan()).await;

        assert!(setup.is_complete());
        assert_eq!(setup.handle.subscription_location(), Some("/v2/subscriptions/sub-1"));
        assert_eq!(setup.handle.created_sample_count(), 2);
    }

    #[tokio::test]
    async fn test_every_sample_upserts_the_same_entity() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorded = seen.clone();

        let mut api = MockFixtureApi::new();
        api.expect_upsert_entity().times(10).returning(move |tenant, entity| {
            recorded.lock().unwrap().push((
                tenant.service().to_string(),
                entity.id.clone(),
                entity.entity_type.clone(),
                entity.attributes.len(),
            ));
            Ok(ApiResponse::with_status(204))
        });

        let builder = FixtureBuilder::new(Arc::new(api));
        let mut handle = FixtureHandle::new("e2e-aq", "AirQualityObserved", plan().tenant);

        // Overlapping windows update the one entity instead of creating new ones
        let first = builder
            .seed_historical_data(&mut handle, 30 * MINUTE, 5 * MINUTE)
            .await
            .unwrap();
        let second = builder
            .seed_historical_data(&mut handle, 20 * MINUTE, 5 * MINUTE)
            .await
            .unwrap();

        assert_eq!((first, second), (6, 4));
        assert_eq!(handle.created_sample_count(), 10);
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 10);
        assert!(seen.iter().all(|(service, id, entity_type, attrs)| {
            service == "AirQuality" && id == "e2e-aq" && entity_type == "AirQualityObserved" && *attrs == 4
        }));
    }

    #[tokio::test]
    async fn test_subscription_failure_does_not_stop_seeding() {
        let mut api = MockFixtureApi::new();
        api.expect_create_subscription()
            .returning(|_, _| Ok(ApiResponse::with_status(500).with_body("boom")));
        api.expect_upsert_entity()
            .times(2)
            .returning(|_, _| Ok(ApiResponse::with_status(204)));

        let setup = FixtureBuilder::new(Arc::new(api)).build(&plan()).await;

        assert_eq!(setup.errors.len(), 1);
        assert_matches!(
            setup.errors[0],
            FixtureError::SubscriptionCreation { status: Some(500), .. }
        );
        assert_eq!(setup.handle.subscription_location(), None);
        assert_eq!(setup.handle.created_sample_count(), 2);
    }

    #[tokio::test]
    async fn test_subscription_without_location_is_an_error() {
        let mut api = MockFixtureApi::new();
        api.expect_create_subscription()
            .returning(|_, _| Ok(ApiResponse::with_status(201)));

        let builder = FixtureBuilder::new(Arc::new(api));
        let mut handle = FixtureHandle::new("e2e-aq", "AirQualityObserved", plan().tenant);

        let result = builder.create_subscription(&mut handle, "http://quantumleap:8668").await;
        assert_matches!(result, Err(FixtureError::SubscriptionCreation { status: Some(201), .. }));
        assert_eq!(handle.subscription_location(), None);
    }

    #[tokio::test]
    async fn test_subscription_transport_failure_has_no_status() {
        let mut api = MockFixtureApi::new();
        api.expect_create_subscription()
            .returning(|_, _| Err(TransportError::new("connection refused")));

        let builder = FixtureBuilder::new(Arc::new(api));
        let mut handle = FixtureHandle::new("e2e-aq", "AirQualityObserved", plan().tenant);

        let result = builder.create_subscription(&mut handle, "http://quantumleap:8668").await;
        assert_matches!(result, Err(FixtureError::SubscriptionCreation { status: None, .. }));
    }

    #[tokio::test]
    async fn test_seeding_fails_fast_and_keeps_partial_count() {
        let calls = Arc::new(Mutex::new(0));
        let counter = calls.clone();

        let mut api = MockFixtureApi::new();
        api.expect_upsert_entity().returning(move |_, _| {
            let mut calls = counter.lock().unwrap();
            *calls += 1;
            if *calls == 3 {
                Ok(ApiResponse::with_status(422).with_body("invalid"))
            } else {
                Ok(ApiResponse::with_status(204))
            }
        });

        let builder = FixtureBuilder::new(Arc::new(api));
        let mut handle = FixtureHandle::new("e2e-aq", "AirQualityObserved", plan().tenant);
        let result = builder
            .seed_historical_data(&mut handle, 60 * MINUTE, 5 * MINUTE)
            .await;

        assert_matches!(
            result,
            Err(FixtureError::Seeding { written: 2, status: Some(422), .. })
        );
        assert_eq!(*calls.lock().unwrap(), 3);
        assert_eq!(handle.created_sample_count(), 2);
    }
}
