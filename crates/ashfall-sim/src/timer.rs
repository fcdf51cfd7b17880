//! Logical time and timers.
//!
//! All gameplay timing is expressed against a logical clock that advances by
//! a fixed step once per simulation tick. Nothing here reads the wall clock,
//! so a run is fully reproducible from its inputs.

use serde::{Deserialize, Serialize};

/// A point on the logical timeline, in milliseconds since the clock started.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct SimTime(u64);

impl SimTime {
    /// The start of the timeline.
    pub const ZERO: Self = Self(0);

    /// Creates a time from milliseconds.
    #[must_use]
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    /// Milliseconds since the clock started.
    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Milliseconds from `earlier` to `self`, saturating at zero.
    #[must_use]
    pub const fn since(self, earlier: SimTime) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// The time `ms` milliseconds later.
    #[must_use]
    pub const fn plus_millis(self, ms: u64) -> Self {
        Self(self.0.saturating_add(ms))
    }
}

/// Fixed-step logical clock.
///
/// Sampled once per tick; every comparison made during that tick uses the
/// same `now`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimClock {
    now: SimTime,
    tick_ms: u64,
    ticks: u64,
}

impl SimClock {
    /// Creates a clock at time zero advancing `tick_ms` per tick.
    #[must_use]
    pub fn new(tick_ms: u64) -> Self {
        Self {
            now: SimTime::ZERO,
            tick_ms: tick_ms.max(1),
            ticks: 0,
        }
    }

    /// Advances one tick and returns the new time.
    pub fn advance(&mut self) -> SimTime {
        self.now = self.now.plus_millis(self.tick_ms);
        self.ticks += 1;
        self.now
    }

    /// Current time.
    #[must_use]
    pub const fn now(&self) -> SimTime {
        self.now
    }

    /// Milliseconds per tick.
    #[must_use]
    pub const fn tick_ms(&self) -> u64 {
        self.tick_ms
    }

    /// Number of ticks advanced so far.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }
}

/// Duration/cooldown tracker.
///
/// A timer that was never started counts as expired, which makes a fresh
/// cooldown immediately usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Timer {
    duration_ms: u64,
    started_at: Option<SimTime>,
}

impl Timer {
    /// Creates an unstarted timer with the given duration.
    #[must_use]
    pub const fn new(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            started_at: None,
        }
    }

    /// Records `now` as the reference instant.
    pub fn start(&mut self, now: SimTime) {
        self.started_at = Some(now);
    }

    /// Forgets the reference instant.
    pub fn reset(&mut self) {
        self.started_at = None;
    }

    /// Changes the duration. The reference instant is left untouched.
    pub fn set_duration(&mut self, duration_ms: u64) {
        self.duration_ms = duration_ms;
    }

    /// Configured duration in milliseconds.
    #[must_use]
    pub const fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Instant the timer was last started.
    #[must_use]
    pub const fn started_at(&self) -> Option<SimTime> {
        self.started_at
    }

    /// Whether the timer has been started since the last reset.
    #[must_use]
    pub const fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    /// Milliseconds since the reference instant, or `None` if never started.
    #[must_use]
    pub fn elapsed(&self, now: SimTime) -> Option<u64> {
        self.started_at.map(|start| now.since(start))
    }

    /// `elapsed >= duration`; unstarted timers are expired.
    #[must_use]
    pub fn is_expired(&self, now: SimTime) -> bool {
        self.elapsed(now)
            .map_or(true, |elapsed| elapsed >= self.duration_ms)
    }

    /// Milliseconds until expiry (zero once expired).
    #[must_use]
    pub fn remaining(&self, now: SimTime) -> u64 {
        self.elapsed(now)
            .map_or(0, |elapsed| self.duration_ms.saturating_sub(elapsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unstarted_timer_is_expired() {
        let timer = Timer::new(500);
        assert!(timer.is_expired(SimTime::ZERO));
        assert_eq!(timer.elapsed(SimTime::ZERO), None);
        assert_eq!(timer.remaining(SimTime::from_millis(10)), 0);
    }

    #[test]
    fn test_timer_expiry() {
        let mut timer = Timer::new(500);
        timer.start(SimTime::from_millis(100));

        assert!(!timer.is_expired(SimTime::from_millis(599)));
        assert_eq!(timer.remaining(SimTime::from_millis(350)), 250);
        assert!(timer.is_expired(SimTime::from_millis(600)));
    }

    #[test]
    fn test_set_duration_keeps_reference() {
        let mut timer = Timer::new(1000);
        timer.start(SimTime::from_millis(0));
        timer.set_duration(200);

        assert_eq!(timer.started_at(), Some(SimTime::ZERO));
        assert!(timer.is_expired(SimTime::from_millis(200)));
    }

    #[test]
    fn test_reset() {
        let mut timer = Timer::new(1000);
        timer.start(SimTime::from_millis(0));
        timer.reset();
        assert!(!timer.is_started());
        assert!(timer.is_expired(SimTime::from_millis(1)));
    }

    #[test]
    fn test_clock_advance() {
        let mut clock = SimClock::new(16);
        clock.advance();
        let now = clock.advance();
        assert_eq!(now, SimTime::from_millis(32));
        assert_eq!(clock.ticks(), 2);
    }

    #[test]
    fn test_clock_rejects_zero_step() {
        let clock = SimClock::new(0);
        assert_eq!(clock.tick_ms(), 1);
    }
}
