//! Reentry pacing for the scheduling loop.
//!
//! After each tick the loop waits a fixed base interval, extended by the
//! largest delay a destination requested (the engine only reports one when
//! the mode honors it). When the loop comes back much later than planned,
//! e.g. after the process was suspended, the watchdog skips the next wait so
//! the run catches up instead of drifting further.

use std::time::Duration;
use tokio::time::Instant;
use tracing::warn;

/// Default pause between two scheduling turns
pub const DEFAULT_BASE_INTERVAL_MS: u64 = 250;

/// Default cap on the delay a single tick may request
pub const DEFAULT_MAX_REQUESTED_DELAY_MS: u64 = 60_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacingConfig {
    pub base_interval_ms: u64,
    /// Requested delays above this are clamped
    pub max_requested_delay_ms: u64,
    /// Force a zero delay after wall-clock drift
    pub watchdog: bool,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            base_interval_ms: DEFAULT_BASE_INTERVAL_MS,
            max_requested_delay_ms: DEFAULT_MAX_REQUESTED_DELAY_MS,
            watchdog: true,
        }
    }
}

impl PacingConfig {
    pub fn with_base_interval_ms(mut self, ms: u64) -> Self {
        self.base_interval_ms = ms;
        self
    }

    pub fn with_max_requested_delay_ms(mut self, ms: u64) -> Self {
        self.max_requested_delay_ms = ms;
        self
    }

    pub fn with_watchdog(mut self, enabled: bool) -> Self {
        self.watchdog = enabled;
        self
    }
}

/// Computes the wait before the next scheduling turn.
#[derive(Debug)]
pub struct ReentryPacer {
    config: PacingConfig,
    last_scheduled: Option<(Instant, Duration)>,
}

impl ReentryPacer {
    pub fn new(config: PacingConfig) -> Self {
        Self {
            config,
            last_scheduled: None,
        }
    }

    pub fn config(&self) -> &PacingConfig {
        &self.config
    }

    /// Delay before the next turn, given the largest delay requested during
    /// the tick that just ran.
    pub fn next_delay(&mut self, requested_ms: Option<u64>) -> Duration {
        let now = Instant::now();
        let requested = requested_ms
            .unwrap_or(0)
            .min(self.config.max_requested_delay_ms);
        let expected =
            Duration::from_millis(self.config.base_interval_ms.saturating_add(requested));

        let drifted = self.config.watchdog
            && self
                .last_scheduled
                .is_some_and(|(at, planned)| now.duration_since(at) > planned.saturating_mul(2));
        self.last_scheduled = Some((now, expected));

        if drifted {
            warn!(
                expected_ms = expected.as_millis() as u64,
                "Scheduling drift detected; re-entering immediately"
            );
            Duration::ZERO
        } else {
            expected
        }
    }

    /// Forget the previous turn, e.g. after a pause.
    pub fn reset(&mut self) {
        self.last_scheduled = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test(start_paused = true)]
    async fn test_base_interval_plus_requested_delay() {
        let mut pacer = ReentryPacer::new(PacingConfig::default());
        assert_eq!(pacer.next_delay(None), Duration::from_millis(250));

        advance(Duration::from_millis(250)).await;
        assert_eq!(pacer.next_delay(Some(500)), Duration::from_millis(750));
    }

    #[tokio::test(start_paused = true)]
    async fn test_requested_delay_is_clamped() {
        let mut pacer = ReentryPacer::new(PacingConfig::default().with_max_requested_delay_ms(1_000));
        assert_eq!(pacer.next_delay(Some(u64::MAX)), Duration::from_millis(1_250));

        let mut pacer = ReentryPacer::new(
            PacingConfig::default()
                .with_base_interval_ms(u64::MAX)
                .with_max_requested_delay_ms(u64::MAX),
        );
        assert_eq!(pacer.next_delay(Some(u64::MAX)), Duration::from_millis(u64::MAX));
        assert_eq!(pacer.next_delay(Some(u64::MAX)), Duration::from_millis(u64::MAX));
    }

    #[tokio::test(start_paused = true)]
    async fn test_watchdog_forces_zero_delay_after_drift() {
        let mut pacer = ReentryPacer::new(PacingConfig::default());
        pacer.next_delay(None);

        // back after 600ms against a 250ms plan
        advance(Duration::from_millis(600)).await;
        assert_eq!(pacer.next_delay(None), Duration::ZERO);

        // on schedule again
        advance(Duration::from_millis(250)).await;
        assert_eq!(pacer.next_delay(None), Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exactly_twice_the_interval_is_not_drift() {
        let mut pacer = ReentryPacer::new(PacingConfig::default());
        pacer.next_delay(None);
        advance(Duration::from_millis(500)).await;
        assert_eq!(pacer.next_delay(None), Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_watchdog_disabled() {
        let mut pacer = ReentryPacer::new(PacingConfig::default().with_watchdog(false));
        pacer.next_delay(None);
        advance(Duration::from_secs(10)).await;
        assert_eq!(pacer.next_delay(None), Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_forgets_previous_turn() {
        let mut pacer = ReentryPacer::new(PacingConfig::default().with_base_interval_ms(100));
        pacer.next_delay(None);
        advance(Duration::from_secs(5)).await;
        pacer.reset();
        assert_eq!(pacer.next_delay(None), Duration::from_millis(100));
    }
}
