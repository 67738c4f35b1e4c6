use std::time::Duration;

/// Escalating cooldown applied after a whole extraction cycle failed.
///
/// The n-th consecutive failure waits `base * n²`, clamped to `[base, max]`.
/// Successes only walk the counter back one step at a time.
#[derive(Clone, Debug)]
pub struct PersistentErrorBackoff {
    base: Duration,
    max: Duration,
    consecutive_failures: u32,
}

impl Default for PersistentErrorBackoff {
    /// Two minutes, escalating up to six hours.
    fn default() -> Self {
        Self::new(Duration::from_secs(2 * 60), Duration::from_secs(6 * 3600))
    }
}

impl PersistentErrorBackoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max,
            consecutive_failures: 0,
        }
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Count one more failed cycle and return how long to wait before the next.
    pub fn record_failure(&mut self) -> Duration {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.cooldown()
    }

    pub fn record_success(&mut self) {
        self.consecutive_failures = self.consecutive_failures.saturating_sub(1);
    }

    /// Cooldown for the current failure count.
    pub fn cooldown(&self) -> Duration {
        let n = self.consecutive_failures;
        let scaled = self.base.saturating_mul(n.saturating_mul(n));
        // max wins over base when the two are inverted
        scaled.max(self.base).min(self.max)
    }
}
