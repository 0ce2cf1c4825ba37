//! Shared storage gateway provisioning primitives.
//!
//! This crate owns the lifecycle event contract, typed resource properties,
//! secret bundle parsing and the error taxonomy. It intentionally excludes
//! AWS SDK and Lambda runtime concerns; those live in
//! `sgw_provisioning_lambda`.

pub mod contract;
pub mod error;
pub mod properties;
pub mod secrets;
pub mod wait;
