//! Backoff policy for waiting on eventually-consistent vendor state.
//!
//! A freshly activated gateway does not list its local disks right away.
//! The wait is bounded by an elapsed-time budget and, optionally, an attempt
//! count; delays grow exponentially with jitter between attempts.

use std::time::{Duration, Instant};

use rand::Rng;

pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(15);
pub const DEFAULT_MAX_ELAPSED: Duration = Duration::from_secs(300);
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct DiskWaitPolicy {
    /// Maximum number of attempts (0 = bounded by `max_elapsed` only).
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    pub max_elapsed: Duration,
    /// Scale each delay by a random factor in 0.5..1.5.
    pub jitter: bool,
}

impl Default for DiskWaitPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 0,
            initial_delay: DEFAULT_INITIAL_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            max_elapsed: DEFAULT_MAX_ELAPSED,
            jitter: true,
        }
    }
}

impl DiskWaitPolicy {
    /// Un-jittered delay after the given failed attempt (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(63) as i32;
        let seconds = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        let capped = seconds.min(self.max_delay.as_secs_f64());
        if capped.is_finite() && capped >= 0.0 {
            Duration::from_secs_f64(capped)
        } else {
            self.max_delay
        }
    }

    /// Delay to sleep before the next attempt, or `None` once the budget is
    /// spent. The delay never runs past the elapsed-time budget.
    pub fn next_delay(&self, attempt: u32, elapsed: Duration) -> Option<Duration> {
        if self.max_attempts > 0 && attempt >= self.max_attempts {
            return None;
        }
        if elapsed >= self.max_elapsed {
            return None;
        }

        let mut delay = self.delay_for(attempt);
        if self.jitter {
            let factor = rand::thread_rng().gen_range(0.5..1.5);
            delay = Duration::from_secs_f64(delay.as_secs_f64() * factor);
        }
        Some(delay.min(self.max_elapsed - elapsed))
    }
}

/// Time source for the wait loop.
pub trait WaitClock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

impl<C: WaitClock + ?Sized> WaitClock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration);
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl WaitClock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_policy() -> DiskWaitPolicy {
        DiskWaitPolicy {
            max_attempts: 0,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(1_000),
            backoff_multiplier: 2.0,
            max_elapsed: Duration::from_secs(10),
            jitter: false,
        }
    }

    #[test]
    fn delays_grow_exponentially_up_to_the_cap() {
        let policy = fixed_policy();
        let delays: Vec<u128> = (1..=6)
            .map(|attempt| policy.delay_for(attempt).as_millis())
            .collect();
        assert_eq!(delays, vec![100, 200, 400, 800, 1_000, 1_000]);
    }

    #[test]
    fn stops_once_elapsed_budget_is_spent() {
        let policy = fixed_policy();
        assert_eq!(policy.next_delay(1, Duration::from_secs(10)), None);
        assert_eq!(
            policy.next_delay(4, Duration::from_millis(9_900)),
            Some(Duration::from_millis(100))
        );
    }

    #[test]
    fn stops_at_attempt_limit_when_configured() {
        let policy = DiskWaitPolicy {
            max_attempts: 3,
            ..fixed_policy()
        };
        assert!(policy.next_delay(2, Duration::ZERO).is_some());
        assert_eq!(policy.next_delay(3, Duration::ZERO), None);
    }

    #[test]
    fn jittered_delay_stays_within_half_to_one_and_a_half() {
        let policy = DiskWaitPolicy {
            jitter: true,
            ..fixed_policy()
        };
        for _ in 0..100 {
            let delay = policy
                .next_delay(2, Duration::ZERO)
                .expect("budget remains");
            assert!(delay >= Duration::from_millis(100));
            assert!(delay <= Duration::from_millis(300));
        }
    }

    #[test]
    fn huge_attempt_counts_do_not_overflow() {
        let policy = fixed_policy();
        assert_eq!(policy.delay_for(u32::MAX), Duration::from_millis(1_000));
    }
}
