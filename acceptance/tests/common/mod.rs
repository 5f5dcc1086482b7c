//! Common test utilities and infrastructure
//!
//! Shared fixtures and stand-in services used by the lifecycle and
//! end-to-end suites.

#![allow(dead_code, unused_imports)]

pub mod fixtures;
pub mod helpers;

pub use fixtures::{create_short_plan, create_test_plan, create_test_tenant};
pub use helpers::{FakeDashboard, RecordingApi};
