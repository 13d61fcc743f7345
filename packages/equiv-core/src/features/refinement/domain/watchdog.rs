//! Outer run watchdog

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::time::{sleep_until, Instant};

/// Deadline for a whole run. Expiry is acted upon exactly once.
#[derive(Debug)]
pub struct Watchdog {
    deadline: Instant,
    limit: Duration,
    fired: AtomicBool,
}

impl Watchdog {
    pub fn new(limit: Duration) -> Self {
        Self {
            deadline: Instant::now() + limit,
            limit,
            fired: AtomicBool::new(false),
        }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// Resolves at the deadline
    pub async fn expired(&self) {
        sleep_until(self.deadline).await
    }

    /// `true` for the first caller only
    pub fn fire(&self) -> bool {
        self.fired
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fires_once() {
        let watchdog = Watchdog::new(Duration::from_millis(1));
        watchdog.expired().await;
        assert!(watchdog.is_expired());
        assert!(watchdog.fire());
        assert!(!watchdog.fire());
        assert!(watchdog.has_fired());
    }

    #[tokio::test]
    async fn test_not_expired_before_deadline() {
        let watchdog = Watchdog::new(Duration::from_secs(3600));
        assert!(!watchdog.is_expired());
        assert!(!watchdog.has_fired());
    }
}
