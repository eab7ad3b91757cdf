//! Poll interval schedule.

use std::time::Duration;

/// Geometric backoff between status checks: starts at `base`, grows by
/// `factor` per check and never exceeds `cap`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollSchedule {
    base: Duration,
    factor: f64,
    cap: Duration,
}

impl PollSchedule {
    /// First interval.
    pub const DEFAULT_BASE: Duration = Duration::from_millis(800);
    /// Growth applied after every poll.
    pub const DEFAULT_FACTOR: f64 = 1.15;
    /// Longest interval.
    pub const DEFAULT_CAP: Duration = Duration::from_secs(2);

    /// Build a schedule. Factors below 1.0 (or NaN) are raised to 1.0 and a
    /// base above the cap is lowered to it, so intervals never decrease.
    pub fn new(base: Duration, factor: f64, cap: Duration) -> Self {
        Self {
            base: base.min(cap),
            factor: factor.max(1.0),
            cap,
        }
    }

    /// Build a schedule from seconds, falling back to the defaults for
    /// values that are negative or not finite.
    pub fn from_secs_f64(base: f64, factor: f64, cap: f64) -> Self {
        let base = Duration::try_from_secs_f64(base).unwrap_or(Self::DEFAULT_BASE);
        let cap = Duration::try_from_secs_f64(cap).unwrap_or(Self::DEFAULT_CAP);
        let factor = if factor.is_finite() { factor } else { Self::DEFAULT_FACTOR };
        Self::new(base, factor, cap)
    }

    /// First interval.
    pub fn base(&self) -> Duration {
        self.base
    }

    /// Multiplier applied after every poll.
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Upper bound for any interval.
    pub fn cap(&self) -> Duration {
        self.cap
    }

    /// Endless sequence of intervals.
    pub fn intervals(&self) -> PollIntervals {
        PollIntervals {
            next: self.base,
            factor: self.factor,
            cap: self.cap,
        }
    }
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BASE, Self::DEFAULT_FACTOR, Self::DEFAULT_CAP)
    }
}

/// Iterator over a [`PollSchedule`]. Never ends.
#[derive(Debug, Clone)]
pub struct PollIntervals {
    next: Duration,
    factor: f64,
    cap: Duration,
}

impl PollIntervals {
    /// The next wait.
    pub fn next_interval(&mut self) -> Duration {
        let current = self.next;
        self.next = Duration::try_from_secs_f64(current.as_secs_f64() * self.factor)
            .unwrap_or(self.cap)
            .min(self.cap);
        current
    }
}

impl Iterator for PollIntervals {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        Some(self.next_interval())
    }
}
