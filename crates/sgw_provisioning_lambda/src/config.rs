//! Process-level settings read from the Lambda environment.
//!
//! Resource configuration always arrives on the event; only operational
//! knobs of the disk wait live here.

use std::time::Duration;

use sgw_provisioning_core::wait::DiskWaitPolicy;

pub const DISK_WAIT_MAX_ELAPSED_SECS: &str = "DISK_WAIT_MAX_ELAPSED_SECS";
pub const DISK_WAIT_INITIAL_DELAY_MS: &str = "DISK_WAIT_INITIAL_DELAY_MS";
pub const DISK_WAIT_MAX_DELAY_MS: &str = "DISK_WAIT_MAX_DELAY_MS";
pub const DISK_WAIT_MAX_ATTEMPTS: &str = "DISK_WAIT_MAX_ATTEMPTS";

pub fn disk_wait_policy_from_env() -> Result<DiskWaitPolicy, String> {
    disk_wait_policy_from_lookup(|key| std::env::var(key).ok())
}

pub fn disk_wait_policy_from_lookup(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<DiskWaitPolicy, String> {
    let defaults = DiskWaitPolicy::default();
    let policy = DiskWaitPolicy {
        max_attempts: parse_var(&lookup, DISK_WAIT_MAX_ATTEMPTS)?.unwrap_or(defaults.max_attempts),
        initial_delay: parse_var(&lookup, DISK_WAIT_INITIAL_DELAY_MS)?
            .map(Duration::from_millis)
            .unwrap_or(defaults.initial_delay),
        max_delay: parse_var(&lookup, DISK_WAIT_MAX_DELAY_MS)?
            .map(Duration::from_millis)
            .unwrap_or(defaults.max_delay),
        max_elapsed: parse_var(&lookup, DISK_WAIT_MAX_ELAPSED_SECS)?
            .map(Duration::from_secs)
            .unwrap_or(defaults.max_elapsed),
        ..defaults
    };

    if policy.max_elapsed.is_zero() {
        return Err(format!("{DISK_WAIT_MAX_ELAPSED_SECS} must be greater than zero"));
    }
    if policy.initial_delay.is_zero() {
        return Err(format!("{DISK_WAIT_INITIAL_DELAY_MS} must be greater than zero"));
    }
    if policy.initial_delay > policy.max_delay {
        return Err(format!(
            "{DISK_WAIT_INITIAL_DELAY_MS} must not exceed {DISK_WAIT_MAX_DELAY_MS}"
        ));
    }
    Ok(policy)
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, String> {
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| format!("{key} must be a non-negative integer, got '{raw}'")),
        _ => Ok(None),
    }
}
