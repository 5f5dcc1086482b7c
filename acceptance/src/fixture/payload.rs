//! Request bodies sent to the context broker
//!
//! Only the fields the fixture needs are modelled. Everything else about the
//! broker's data model is left to the broker.

use chrono::{DateTime, SecondsFormat, Utc};
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;

use shared::TenantContext;

/// Attribute whose change triggers a notification
pub const TRIGGER_ATTRIBUTE: &str = "temperature";

/// Numeric readings carried by every seeded sample
pub const READING_ATTRIBUTES: [&str; 4] = ["temperature", "humidity", "co", "no2"];

/// Metadata forwarded alongside the readings
pub const FORWARDED_METADATA: [&str; 3] = ["dateCreated", "dateModified", "TimeInstant"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionRequest {
    pub description: String,
    pub subject: SubscriptionSubject,
    pub notification: SubscriptionNotification,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionSubject {
    pub entities: Vec<EntityPattern>,
    pub condition: SubscriptionCondition,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityPattern {
    #[serde(rename = "idPattern")]
    pub id_pattern: String,
    #[serde(rename = "type")]
    pub entity_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionCondition {
    pub attrs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionNotification {
    #[serde(rename = "httpCustom")]
    pub http_custom: HttpCustom,
    pub attrs: Vec<String>,
    pub metadata: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HttpCustom {
    pub url: String,
    pub headers: BTreeMap<String, String>,
}

impl SubscriptionRequest {
    /// Forward every entity of `entity_type` to `<forward_target>/v2/notify`
    pub fn forwarding(entity_type: &str, tenant: &TenantContext, forward_target: &str) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("fiware-service".to_string(), tenant.service().to_string());
        headers.insert("fiware-servicepath".to_string(), tenant.service_path().to_string());

        Self {
            description: format!("{entity_type} - broker to time-series subscription"),
            subject: SubscriptionSubject {
                entities: vec![EntityPattern {
                    id_pattern: ".*".to_string(),
                    entity_type: entity_type.to_string(),
                }],
                condition: SubscriptionCondition {
                    attrs: vec![TRIGGER_ATTRIBUTE.to_string()],
                },
            },
            notification: SubscriptionNotification {
                http_custom: HttpCustom {
                    url: format!("{}/v2/notify", forward_target.trim_end_matches('/')),
                    headers,
                },
                attrs: READING_ATTRIBUTES.iter().map(|attr| attr.to_string()).collect(),
                metadata: FORWARDED_METADATA.iter().map(|meta| meta.to_string()).collect(),
            },
        }
    }
}

/// One sample, upserted under a fixed entity id
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityUpsert {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub id: String,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, NumericAttribute>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericAttribute {
    #[serde(rename = "type")]
    pub attribute_type: String,
    pub value: f64,
    pub metadata: AttributeMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeMetadata {
    #[serde(rename = "TimeInstant")]
    pub time_instant: TimeInstant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeInstant {
    #[serde(rename = "type")]
    pub value_type: String,
    pub value: String,
}

impl EntityUpsert {
    /// Build a sample from readings paired with [`READING_ATTRIBUTES`]
    pub fn sample(entity_id: &str, entity_type: &str, readings: [f64; 4], observed_at: DateTime<Utc>) -> Self {
        let timestamp = observed_at.to_rfc3339_opts(SecondsFormat::Secs, true);

        let attributes = READING_ATTRIBUTES
            .iter()
            .zip(readings)
            .map(|(name, value)| {
                let attribute = NumericAttribute {
                    attribute_type: "Number".to_string(),
                    value,
                    metadata: AttributeMetadata {
                        time_instant: TimeInstant {
                            value_type: "DateTime".to_string(),
                            value: timestamp.clone(),
                        },
                    },
                };
                (name.to_string(), attribute)
            })
            .collect();

        Self {
            entity_type: entity_type.to_string(),
            id: entity_id.to_string(),
            attributes,
        }
    }
}

/// Random air-quality readings, in [`READING_ATTRIBUTES`] order
pub fn random_readings<R: Rng>(rng: &mut R) -> [f64; 4] {
    [
        rng.gen_range(0.0..20.0),
        rng.gen_range(0.0..20.0),
        rng.gen_range(0.0..1.0),
        rng.gen_range(0.0..1.0),
    ]
}
