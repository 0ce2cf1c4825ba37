//! AWS-oriented adapters and handlers for storage gateway custom resources.
//!
//! This crate owns runtime integration details (Lambda handlers, vendor
//! adapters and process configuration). Contracts, typed properties and the
//! error taxonomy come from `sgw_provisioning_core`.

pub mod adapters;
pub mod config;
pub mod handlers;
pub mod telemetry;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
