//! Redelivery bounds and backoff.

use std::time::Duration;

/// Controls how often and how soon unacknowledged records come back.
///
/// Delivery *n* stays invisible for `base × 2^(n-1)`, capped at `max`.
/// A record pulled for the `max_deliveries + 1`-th time is dropped instead
/// of processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedeliveryPolicy {
    max_deliveries: u32,
    base_visibility: Duration,
    max_visibility: Duration,
}

impl Default for RedeliveryPolicy {
    fn default() -> Self {
        Self {
            max_deliveries: 5,
            base_visibility: Duration::from_secs(10),
            max_visibility: Duration::from_secs(300),
        }
    }
}

impl RedeliveryPolicy {
    /// Creates a policy. A zero `max_deliveries` is raised to one.
    #[must_use]
    pub fn new(max_deliveries: u32, base_visibility: Duration, max_visibility: Duration) -> Self {
        Self {
            max_deliveries: max_deliveries.max(1),
            base_visibility,
            max_visibility: max_visibility.max(base_visibility),
        }
    }

    /// Creates a policy whose unacknowledged records are visible again at
    /// once.
    #[must_use]
    pub fn immediate(max_deliveries: u32) -> Self {
        Self::new(max_deliveries, Duration::ZERO, Duration::ZERO)
    }

    /// Returns the maximum number of deliveries.
    #[must_use]
    pub const fn max_deliveries(&self) -> u32 {
        self.max_deliveries
    }

    /// Returns the visibility timeout of the first delivery.
    #[must_use]
    pub const fn base_visibility(&self) -> Duration {
        self.base_visibility
    }

    /// Returns the visibility timeout cap.
    #[must_use]
    pub const fn max_visibility(&self) -> Duration {
        self.max_visibility
    }

    /// Returns how long delivery `attempt` (1-based) stays invisible.
    #[must_use]
    pub fn visibility_timeout(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_visibility
            .checked_mul(1_u32 << exponent)
            .map_or(self.max_visibility, |timeout| timeout.min(self.max_visibility))
    }

    /// Returns `true` when delivery `attempt` exceeds the bound.
    #[must_use]
    pub const fn is_exhausted(&self, attempt: u32) -> bool {
        attempt > self.max_deliveries
    }
}
