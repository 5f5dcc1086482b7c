//! Record of what one scenario's setup actually created

use shared::TenantContext;

use crate::error::{FixtureError, FixtureResult};

/// Coordinates and created resources of one scenario's fixture
///
/// The coordinates are fixed at construction so teardown targets exactly what
/// setup wrote. Only the builder records creations, and a subscription
/// location can be recorded once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureHandle {
    entity_id: String,
    entity_type: String,
    tenant: TenantContext,
    subscription_location: Option<String>,
    created_sample_count: usize,
}

impl FixtureHandle {
    pub fn new(entity_id: impl Into<String>, entity_type: impl Into<String>, tenant: TenantContext) -> Self {
        Self {
            entity_id: entity_id.into(),
            entity_type: entity_type.into(),
            tenant,
            subscription_location: None,
            created_sample_count: 0,
        }
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn tenant(&self) -> &TenantContext {
        &self.tenant
    }

    pub fn subscription_location(&self) -> Option<&str> {
        self.subscription_location.as_deref()
    }

    pub fn created_sample_count(&self) -> usize {
        self.created_sample_count
    }

    pub(crate) fn record_subscription(&mut self, location: String) -> FixtureResult<()> {
        if let Some(existing) = &self.subscription_location {
            return Err(FixtureError::SubscriptionAlreadyRecorded {
                existing: existing.clone(),
            });
        }
        self.subscription_location = Some(location);
        Ok(())
    }

    pub(crate) fn record_samples(&mut self, count: usize) {
        self.created_sample_count += count;
    }
}
