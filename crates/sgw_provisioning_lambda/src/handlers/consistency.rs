use sgw_provisioning_core::error::ProvisioningError;
use sgw_provisioning_core::wait::{DiskWaitPolicy, WaitClock};
use tracing::{info, warn};

use crate::adapters::storage_gateway::{LocalDisk, StorageGatewayApi};

/// Polls `ListLocalDisks` for a freshly activated gateway until the call
/// succeeds. Any error counts as "not ready yet"; an empty inventory is a
/// successful answer and ends the wait.
pub fn wait_for_local_disks(
    api: &impl StorageGatewayApi,
    gateway_arn: &str,
    policy: &DiskWaitPolicy,
    clock: &impl WaitClock,
) -> Result<Vec<LocalDisk>, ProvisioningError> {
    let started = clock.now();
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        let last_error = match api.list_local_disks(gateway_arn) {
            Ok(disks) => {
                info!(
                    gateway_arn,
                    attempt,
                    disk_count = disks.len(),
                    elapsed_ms = (clock.now() - started).as_millis() as u64,
                    "local_disks_listed"
                );
                return Ok(disks);
            }
            Err(error) => error,
        };

        let elapsed = clock.now() - started;
        let Some(delay) = policy.next_delay(attempt, elapsed) else {
            return Err(ProvisioningError::DiskWaitTimedOut {
                gateway_arn: gateway_arn.to_string(),
                attempts: attempt,
                elapsed,
                last_error,
            });
        };

        warn!(
            gateway_arn,
            attempt,
            error = %last_error,
            delay_ms = delay.as_millis() as u64,
            "local_disks_not_ready"
        );
        clock.sleep(delay);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::test_helpers::{test_wait_policy, FakeStorageGateway, ManualClock, TEST_GATEWAY_ARN};

    #[test]
    fn retries_with_backoff_until_listing_succeeds() {
        let api = FakeStorageGateway::new().fail_disk_listing(3);
        let clock = ManualClock::new();

        let disks = wait_for_local_disks(&api, TEST_GATEWAY_ARN, &test_wait_policy(), &clock)
            .expect("disks become visible");

        assert_eq!(disks.len(), 2);
        assert_eq!(api.operations(), vec!["ListLocalDisks"; 4]);
        assert_eq!(
            clock.sleeps(),
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4)
            ]
        );
    }

    #[test]
    fn empty_inventory_ends_the_wait() {
        let api = FakeStorageGateway::with_disks(&[]);
        let clock = ManualClock::new();

        let disks = wait_for_local_disks(&api, TEST_GATEWAY_ARN, &test_wait_policy(), &clock)
            .expect("listing succeeded");

        assert!(disks.is_empty());
        assert!(clock.sleeps().is_empty());
    }

    #[test]
    fn gives_up_with_timeout_once_budget_is_spent() {
        let api = FakeStorageGateway::new().fail_operation("ListLocalDisks", "still booting");
        let clock = ManualClock::new();

        let error = wait_for_local_disks(&api, TEST_GATEWAY_ARN, &test_wait_policy(), &clock)
            .expect_err("never becomes ready");

        match error {
            ProvisioningError::DiskWaitTimedOut {
                gateway_arn,
                attempts,
                elapsed,
                last_error,
            } => {
                assert_eq!(gateway_arn, TEST_GATEWAY_ARN);
                assert_eq!(elapsed, Duration::from_secs(60));
                assert_eq!(last_error.message, "still booting");
                // 1 + 2 + 4 + 8 * 6 = 55s of sleeps, then 5s to fill the budget.
                assert_eq!(attempts, 11);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(clock.sleeps().iter().sum::<Duration>(), Duration::from_secs(60));
    }

    #[test]
    fn attempt_limit_bounds_the_wait() {
        let api = FakeStorageGateway::new().fail_operation("ListLocalDisks", "still booting");
        let clock = ManualClock::new();
        let policy = DiskWaitPolicy {
            max_attempts: 2,
            ..test_wait_policy()
        };

        let error = wait_for_local_disks(&api, TEST_GATEWAY_ARN, &policy, &clock)
            .expect_err("attempt limit reached");

        assert!(matches!(error, ProvisioningError::DiskWaitTimedOut { attempts: 2, .. }));
        assert_eq!(api.operations().len(), 2);
    }
}
