//! Shared types for the observability-stack acceptance runner
//!
//! Contains the coordinates every request is scoped by, the resource kinds a
//! fixture can own, and the tracing setup used by every binary.

pub mod types;
pub mod errors;
pub mod logging;

pub use types::*;
pub use errors::*;
