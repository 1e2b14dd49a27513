//! Simulation time.
//!
//! All timestamps are [`TimeSpan`]s measured from simulation start. The
//! simulation clock only moves in whole steps, see [`GameTiming`].
//!
//! Entities can be paused on their own (for example while their map is not
//! being simulated). [`PauseState`] keeps track of how long an entity has
//! spent paused, and every timer that belongs to an entity must subtract that
//! offset before comparing against the clock.

use std::{
    fmt::{self, Display},
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};

const MICROS_PER_SECOND: i64 = 1_000_000;

/// A signed duration with microsecond resolution.
///
/// Used both for durations and for absolute simulation timestamps. Arithmetic
/// saturates instead of overflowing so [`TimeSpan::MAX`] can stand in for
/// "never".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct TimeSpan(i64);

impl TimeSpan {
    /// Zero length.
    pub const ZERO: Self = Self(0);
    /// The largest representable span.
    pub const MAX: Self = Self(i64::MAX);

    /// Creates a span from microseconds.
    #[must_use]
    pub const fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    /// Creates a span from milliseconds.
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis.saturating_mul(1_000))
    }

    /// Creates a span from whole seconds.
    #[must_use]
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs.saturating_mul(MICROS_PER_SECOND))
    }

    /// Creates a span from fractional seconds, rounded to the nearest microsecond.
    #[must_use]
    pub fn from_secs_f64(secs: f64) -> Self {
        Self((secs * MICROS_PER_SECOND as f64).round() as i64)
    }

    /// Returns the span in microseconds.
    #[must_use]
    pub const fn as_micros(self) -> i64 {
        self.0
    }

    /// Returns the span in fractional seconds.
    #[must_use]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / MICROS_PER_SECOND as f64
    }

    /// Returns true if the span is strictly positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl Add for TimeSpan {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for TimeSpan {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for TimeSpan {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for TimeSpan {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for TimeSpan {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

impl Sum for TimeSpan {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<f64> for TimeSpan {
    fn from(secs: f64) -> Self {
        Self::from_secs_f64(secs)
    }
}

impl From<TimeSpan> for f64 {
    fn from(span: TimeSpan) -> Self {
        span.as_secs_f64()
    }
}

impl Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.as_secs_f64())
    }
}

/// The simulation clock.
///
/// Advances by exactly one `tick_period` per step. Nothing in the simulation
/// reads wall-clock time.
#[derive(Debug, Clone)]
pub struct GameTiming {
    cur_time: TimeSpan,
    cur_tick: u64,
    tick_period: TimeSpan,
}

impl GameTiming {
    /// Creates a clock at time zero that steps at `tick_rate` steps per second.
    #[must_use]
    pub fn new(tick_rate: f64) -> Self {
        Self {
            cur_time: TimeSpan::ZERO,
            cur_tick: 0,
            tick_period: TimeSpan::from_secs_f64(1.0 / tick_rate),
        }
    }

    /// The current simulation time.
    #[must_use]
    pub const fn cur_time(&self) -> TimeSpan {
        self.cur_time
    }

    /// The number of steps taken so far.
    #[must_use]
    pub const fn cur_tick(&self) -> u64 {
        self.cur_tick
    }

    /// Length of a single step.
    #[must_use]
    pub const fn tick_period(&self) -> TimeSpan {
        self.tick_period
    }

    /// Advances the clock by one step.
    pub fn advance(&mut self) {
        self.cur_tick += 1;
        self.cur_time += self.tick_period;
    }
}

/// Tracks how much time an entity has spent paused.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PauseState {
    paused_since: Option<TimeSpan>,
    accumulated: TimeSpan,
}

impl PauseState {
    /// Returns true while the entity is paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused_since.is_some()
    }

    /// Starts a pause at `now`. Pausing twice keeps the first start.
    pub fn pause(&mut self, now: TimeSpan) {
        if self.paused_since.is_none() {
            self.paused_since = Some(now);
        }
    }

    /// Ends the current pause at `now` and folds it into the accumulated offset.
    pub fn unpause(&mut self, now: TimeSpan) {
        if let Some(since) = self.paused_since.take() {
            self.accumulated += now - since;
        }
    }

    /// Total paused time as of `now`, including a pause that is still running.
    #[must_use]
    pub fn pause_time(&self, now: TimeSpan) -> TimeSpan {
        match self.paused_since {
            Some(since) => self.accumulated + (now - since),
            None => self.accumulated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saturating_max() {
        assert_eq!(TimeSpan::MAX + TimeSpan::from_secs(5), TimeSpan::MAX);
        assert!(TimeSpan::from_secs(30) < TimeSpan::MAX);
    }

    #[test]
    fn test_fractional_seconds() {
        let span = TimeSpan::from_secs_f64(0.5);
        assert_eq!(span, TimeSpan::from_millis(500));
        assert!((span.as_secs_f64() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_clock_steps() {
        let mut timing = GameTiming::new(20.0);
        for _ in 0..40 {
            timing.advance();
        }
        assert_eq!(timing.cur_tick(), 40);
        assert_eq!(timing.cur_time(), TimeSpan::from_secs(2));
    }

    #[test]
    fn test_pause_accumulates() {
        let mut pause = PauseState::default();
        pause.pause(TimeSpan::from_secs(10));
        assert_eq!(pause.pause_time(TimeSpan::from_secs(14)), TimeSpan::from_secs(4));

        pause.unpause(TimeSpan::from_secs(15));
        assert!(!pause.is_paused());
        assert_eq!(pause.pause_time(TimeSpan::from_secs(100)), TimeSpan::from_secs(5));

        pause.pause(TimeSpan::from_secs(100));
        pause.pause(TimeSpan::from_secs(101));
        pause.unpause(TimeSpan::from_secs(102));
        assert_eq!(pause.pause_time(TimeSpan::from_secs(200)), TimeSpan::from_secs(7));
    }

    #[test]
    fn test_serde_as_seconds() {
        let span: TimeSpan = serde_json::from_str("2.5").expect("valid seconds");
        assert_eq!(span, TimeSpan::from_millis(2_500));
    }
}
