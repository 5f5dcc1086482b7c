//! Core shared types and identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{SharedError, SharedResult};

/// Header carrying the tenant service name
pub const SERVICE_HEADER: &str = "Fiware-Service";

/// Header carrying the tenant service path
pub const SERVICE_PATH_HEADER: &str = "Fiware-ServicePath";

/// Logical partition every broker and time-series request is scoped to
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantContext {
    service: String,
    service_path: String,
}

impl TenantContext {
    /// Both parts must be non-empty
    pub fn new(service: impl Into<String>, service_path: impl Into<String>) -> SharedResult<Self> {
        let service = service.into();
        let service_path = service_path.into();

        if service.trim().is_empty() {
            return Err(SharedError::InvalidConfig {
                field: "service".to_string(),
                value: service,
            });
        }
        if service_path.trim().is_empty() {
            return Err(SharedError::InvalidConfig {
                field: "service_path".to_string(),
                value: service_path,
            });
        }

        Ok(Self { service, service_path })
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn service_path(&self) -> &str {
        &self.service_path
    }

    /// Header pairs to attach to every request
    pub fn headers(&self) -> [(&'static str, &str); 2] {
        [
            (SERVICE_HEADER, self.service.as_str()),
            (SERVICE_PATH_HEADER, self.service_path.as_str()),
        ]
    }
}

/// Tenant of the air-quality deployment the runner targets by default
impl Default for TenantContext {
    fn default() -> Self {
        Self {
            service: "AirQuality".to_string(),
            service_path: "/alcantarilla".to_string(),
        }
    }
}

impl fmt::Display for TenantContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.service, self.service_path)
    }
}

/// Kinds of external resources a fixture can own
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Forwarding subscription held by the context broker
    Subscription,
    /// Attribute history held by the time-series store
    TimeSeries,
    /// Origin entity held by the context broker
    Entity,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::Subscription,
        ResourceKind::TimeSeries,
        ResourceKind::Entity,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Subscription => "Subscription",
            ResourceKind::TimeSeries => "TimeSeries",
            ResourceKind::Entity => "Entity",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
