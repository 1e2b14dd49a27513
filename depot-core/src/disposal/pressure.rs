//! Disposal pressure as a pure function of time.
//!
//! Nothing here is stored or ticked. A unit only remembers when it will be
//! fully pressurized again (`next_pressurized`), and the state is derived
//! from that and the current time whenever someone asks. Every function takes
//! the unit's accumulated pause time so that a paused unit resumes exactly
//! where it left off.

use depot_utils::TimeSpan;
use serde::{Deserialize, Serialize};

/// Fraction of a full charge gained per second.
pub const PRESSURE_PER_SECOND: f64 = 0.05;

/// Readiness of a disposal unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PressureState {
    /// Just flushed, still inside the flush delay.
    Flushed,
    /// Building up pressure.
    Pressurizing,
    /// Ready to flush.
    Ready,
}

/// Time it takes to go from empty to full pressure.
#[must_use]
pub fn pressurize_time() -> TimeSpan {
    TimeSpan::from_secs_f64(1.0 / PRESSURE_PER_SECOND)
}

/// The pressure state at `now`.
#[must_use]
pub fn pressure_state(
    next_pressurized: TimeSpan,
    flush_delay: TimeSpan,
    pause_time: TimeSpan,
    now: TimeSpan,
) -> PressureState {
    let remaining = pause_time + next_pressurized - now;
    let pressurize_duration = pressurize_time() - flush_delay;

    if remaining > pressurize_duration {
        PressureState::Flushed
    } else if remaining.is_positive() {
        PressureState::Pressurizing
    } else {
        PressureState::Ready
    }
}

/// Pressure at `now` in `0.0..=1.0`.
#[must_use]
pub fn pressure(next_pressurized: TimeSpan, pause_time: TimeSpan, now: TimeSpan) -> f64 {
    let elapsed = now - pause_time - next_pressurized;
    (elapsed.as_secs_f64() / pressurize_time().as_secs_f64()).clamp(0.0, 1.0)
}

/// Folds a newly computed automatic flush time into the current schedule.
///
/// The schedule only ever moves earlier.
#[must_use]
pub fn earliest_flush(current: Option<TimeSpan>, candidate: TimeSpan) -> TimeSpan {
    current.unwrap_or(TimeSpan::MAX).min(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLUSH_DELAY: TimeSpan = TimeSpan::from_secs(3);

    /// State `elapsed` seconds after a flush at t=100.
    fn state_after(elapsed: f64) -> PressureState {
        let flushed_at = TimeSpan::from_secs(100);
        let next_pressurized = flushed_at + pressurize_time();
        pressure_state(
            next_pressurized,
            FLUSH_DELAY,
            TimeSpan::ZERO,
            flushed_at + TimeSpan::from_secs_f64(elapsed),
        )
    }

    #[test]
    fn test_cycle_is_twenty_seconds() {
        assert_eq!(pressurize_time(), TimeSpan::from_secs(20));
    }

    #[test]
    fn test_state_boundaries() {
        assert_eq!(state_after(0.0), PressureState::Flushed);
        assert_eq!(state_after(2.9), PressureState::Flushed);
        // remaining == pressurize duration is already pressurizing
        assert_eq!(state_after(3.0), PressureState::Pressurizing);
        assert_eq!(state_after(10.0), PressureState::Pressurizing);
        assert_eq!(state_after(19.9), PressureState::Pressurizing);
        assert_eq!(state_after(20.0), PressureState::Ready);
        assert_eq!(state_after(500.0), PressureState::Ready);
    }

    #[test]
    fn test_pause_shifts_every_transition() {
        let next_pressurized = TimeSpan::from_secs(20);
        let paused = TimeSpan::from_secs(7);

        assert_eq!(
            pressure_state(next_pressurized, FLUSH_DELAY, paused, TimeSpan::from_secs(9)),
            PressureState::Flushed
        );
        assert_eq!(
            pressure_state(next_pressurized, FLUSH_DELAY, paused, TimeSpan::from_secs(10)),
            PressureState::Pressurizing
        );
        assert_eq!(
            pressure_state(next_pressurized, FLUSH_DELAY, paused, TimeSpan::from_secs(26)),
            PressureState::Pressurizing
        );
        assert_eq!(
            pressure_state(next_pressurized, FLUSH_DELAY, paused, TimeSpan::from_secs(27)),
            PressureState::Ready
        );
    }

    #[test]
    fn test_pressure_is_clamped() {
        let next_pressurized = TimeSpan::from_secs(20);
        assert!(pressure(next_pressurized, TimeSpan::ZERO, TimeSpan::ZERO).abs() < f64::EPSILON);
        let half = pressure(next_pressurized, TimeSpan::ZERO, TimeSpan::from_secs(30));
        assert!((half - 0.5).abs() < 1e-9);
        let full = pressure(next_pressurized, TimeSpan::ZERO, TimeSpan::from_secs(1_000));
        assert!((full - 1.0).abs() < f64::EPSILON);
        let paused = pressure(next_pressurized, TimeSpan::from_secs(10), TimeSpan::from_secs(30));
        assert!(paused.abs() < f64::EPSILON);
    }

    #[test]
    fn test_flush_schedule_only_moves_earlier() {
        let t1 = TimeSpan::from_secs(30);
        let scheduled = earliest_flush(None, t1);
        assert_eq!(scheduled, t1);

        let later = earliest_flush(Some(scheduled), TimeSpan::from_secs(45));
        assert_eq!(later, t1);

        let earlier = earliest_flush(Some(scheduled), TimeSpan::from_secs(12));
        assert_eq!(earlier, TimeSpan::from_secs(12));
    }
}
