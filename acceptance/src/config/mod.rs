//! Configuration Management
//!
//! This module provides the run configuration and a builder for assembling it in code.

pub mod builder;
pub mod settings;

// Re-export main types
pub use builder::AcceptanceConfigBuilder;
pub use settings::{generate_entity_id, AcceptanceConfig, KeycloakConfig};
