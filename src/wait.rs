//! Bounded polling used by every wait against the host page.

use std::future::Future;
use std::time::Duration;

use crate::clock::Clock;

/// Default polling interval between probes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// A `(timeout, interval)` pair for polling a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub timeout: Duration,
    pub interval: Duration,
}

impl WaitPolicy {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    /// Poll `probe` until it yields `Some`, or `None` once `timeout` elapses.
    ///
    /// The probe always runs at least once, and once more at the deadline, so
    /// a zero timeout is a single check.
    pub async fn until<T, F, Fut>(&self, clock: &dyn Clock, mut probe: F) -> Option<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Option<T>>,
    {
        let start = clock.now();
        loop {
            if let Some(value) = probe().await {
                return Some(value);
            }

            let elapsed = clock.now().saturating_sub(start);
            if elapsed >= self.timeout {
                return None;
            }

            let remaining = self.timeout - elapsed;
            clock.sleep(self.interval.min(remaining)).await;
        }
    }
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::cell::Cell;

    #[tokio::test]
    async fn returns_first_success() {
        let clock = ManualClock::new();
        let calls = Cell::new(0);
        let policy = WaitPolicy::new(Duration::from_secs(5), Duration::from_secs(1));

        let found = policy
            .until(&clock, || {
                calls.set(calls.get() + 1);
                let n = calls.get();
                async move { (n == 3).then_some(n) }
            })
            .await;

        assert_eq!(found, Some(3));
        assert_eq!(clock.now(), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn gives_up_after_timeout() {
        let clock = ManualClock::new();
        let calls = Cell::new(0);
        let policy = WaitPolicy::new(Duration::from_secs(2), Duration::from_millis(500));

        let found: Option<()> = policy
            .until(&clock, || {
                calls.set(calls.get() + 1);
                async { None }
            })
            .await;

        assert!(found.is_none());
        // t = 0, 0.5, 1.0, 1.5, 2.0
        assert_eq!(calls.get(), 5);
        assert_eq!(clock.now(), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn zero_timeout_checks_once() {
        let clock = ManualClock::new();
        let calls = Cell::new(0);
        let policy = WaitPolicy::new(Duration::ZERO, Duration::from_millis(500));

        let found: Option<()> = policy
            .until(&clock, || {
                calls.set(calls.get() + 1);
                async { None }
            })
            .await;

        assert!(found.is_none());
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn last_sleep_is_clamped_to_deadline() {
        let clock = ManualClock::new();
        let policy = WaitPolicy::new(Duration::from_millis(700), Duration::from_millis(500));

        let found: Option<()> = policy.until(&clock, || async { None }).await;

        assert!(found.is_none());
        assert_eq!(clock.now(), Duration::from_millis(700));
    }
}
