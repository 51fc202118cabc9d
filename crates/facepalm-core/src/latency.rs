//! Fixed artificial latency applied to every simulated round-trip.

use core::time::Duration;
use tokio::time::{Instant, sleep_until};

/// A single latency constant shared by every route of a simulator.
///
/// Work is released at `submitted_at + delay`, so equal delays preserve
/// submission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatedLatency {
    delay: Duration,
}

impl SimulatedLatency {
    /// Creates a latency of `delay`.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Creates a latency from milliseconds.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    /// No latency at all.
    #[must_use]
    pub const fn none() -> Self {
        Self::new(Duration::ZERO)
    }

    /// The configured delay.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Deadline for work submitted now.
    #[must_use]
    pub fn deadline(&self) -> Instant {
        Instant::now() + self.delay
    }

    /// Waits until `deadline` has passed.
    pub async fn wait_until(deadline: Instant) {
        sleep_until(deadline).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_wait_until_deadline() {
        let latency = SimulatedLatency::from_millis(400);
        let start = Instant::now();
        SimulatedLatency::wait_until(latency.deadline()).await;
        assert!(start.elapsed() >= Duration::from_millis(400));
    }

    #[test]
    fn test_none_is_zero() {
        assert_eq!(SimulatedLatency::none().delay(), Duration::ZERO);
    }
}
