//! Fixed-interval cadences multiplexed from variable frame deltas.

use std::time::Duration;

/// Converts arbitrary elapsed time into whole ticks of a fixed interval.
///
/// At most `max_burst` ticks are reported per advance; any further backlog is
/// discarded so a stalled event loop does not replay a burst of stale ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cadence {
    interval: Duration,
    accumulator: Duration,
    max_burst: u32,
}

impl Cadence {
    /// Creates a cadence whose first tick fires one full interval from now.
    #[must_use]
    pub const fn new(interval: Duration, max_burst: u32) -> Self {
        Self {
            interval,
            accumulator: Duration::ZERO,
            max_burst,
        }
    }

    /// Creates a cadence whose first tick fires on the next advance.
    #[must_use]
    pub const fn primed(interval: Duration, max_burst: u32) -> Self {
        Self {
            interval,
            accumulator: interval,
            max_burst,
        }
    }

    /// Fixed period of the cadence.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Time accumulated towards the next tick.
    #[must_use]
    pub const fn accumulated(&self) -> Duration {
        self.accumulator
    }

    /// Adds `dt` and returns the number of whole intervals that elapsed.
    pub fn advance(&mut self, dt: Duration) -> u32 {
        if self.interval.is_zero() {
            return 0;
        }

        self.accumulator = self.accumulator.saturating_add(dt);
        let whole = self.accumulator.as_nanos() / self.interval.as_nanos();
        let whole = u32::try_from(whole).unwrap_or(u32::MAX);
        self.accumulator = self
            .accumulator
            .saturating_sub(self.interval.saturating_mul(whole));

        whole.min(self.max_burst)
    }
}

/// Countdown that expires once its remaining time is consumed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Countdown {
    remaining: Duration,
}

impl Countdown {
    pub(crate) const fn new(duration: Duration) -> Self {
        Self {
            remaining: duration,
        }
    }

    /// Consumes `dt`; returns `true` once nothing remains.
    pub(crate) fn advance(&mut self, dt: Duration) -> bool {
        self.remaining = self.remaining.saturating_sub(dt);
        self.remaining.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_partial_intervals() {
        let mut cadence = Cadence::new(Duration::from_millis(30), 8);
        assert_eq!(cadence.advance(Duration::from_millis(16)), 0);
        assert_eq!(cadence.advance(Duration::from_millis(16)), 1);
        assert_eq!(cadence.accumulated(), Duration::from_millis(2));
    }

    #[test]
    fn drops_backlog_beyond_burst_limit() {
        let mut cadence = Cadence::new(Duration::from_millis(30), 8);
        assert_eq!(cadence.advance(Duration::from_millis(3_010)), 8);
        assert_eq!(cadence.accumulated(), Duration::from_millis(10));
    }

    #[test]
    fn primed_cadence_fires_immediately() {
        let mut cadence = Cadence::primed(Duration::from_millis(1500), 1);
        assert_eq!(cadence.advance(Duration::ZERO), 1);
        assert_eq!(cadence.advance(Duration::from_millis(1499)), 0);
    }

    #[test]
    fn zero_interval_never_fires() {
        let mut cadence = Cadence::new(Duration::ZERO, 8);
        assert_eq!(cadence.advance(Duration::from_secs(1)), 0);
    }

    #[test]
    fn countdown_expires_after_duration() {
        let mut countdown = Countdown::new(Duration::from_millis(1500));
        assert!(!countdown.advance(Duration::from_millis(1000)));
        assert!(countdown.advance(Duration::from_millis(500)));
    }
}
