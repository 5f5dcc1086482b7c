//! Fixture Lifecycle
//!
//! Builder, waiter and reaper for the resources one scenario creates in the
//! context broker and the time-series store.

pub mod builder;
pub mod handle;
pub mod lifecycle;
pub mod payload;
pub mod reaper;
pub mod waiter;

// Re-export main types
pub use builder::{sample_count, FixtureBuilder, FixturePlan, FixtureSetup, MAX_SAMPLES};
pub use handle::FixtureHandle;
pub use lifecycle::{FixtureOrchestrator, LifecycleReport, ScenarioResult};
pub use reaper::{aggregate, DeletionOutcome, FailureReason, FixtureReaper, ResourceOutcome, TeardownReport};
pub use waiter::{await_condition, await_ok, WaitOutcome};
