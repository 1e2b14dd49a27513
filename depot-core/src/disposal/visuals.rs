//! What a disposal unit looks like, derived from its state.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::pressure::PressureState;

/// Base appearance of the unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisualState {
    /// Not bolted down.
    UnAnchored,
    /// Anchored and ready.
    Anchored,
    /// Flush animation.
    OverlayFlushing,
    /// Charging up.
    OverlayCharging,
}

/// Position of the flush handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleState {
    /// Released.
    Normal,
    /// Pulled.
    Engaged,
}

bitflags! {
    /// Indicator lights on the front of the unit.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct LightStates: u8 {
        /// Something is inside.
        const FULL = 1;
        /// Building pressure.
        const CHARGING = 1 << 1;
        /// Pressurized.
        const READY = 1 << 2;
    }
}

/// Full display projection of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisposalVisuals {
    /// Base appearance.
    pub visual_state: VisualState,
    /// Handle overlay.
    pub handle: HandleState,
    /// Indicator lights.
    pub lights: LightStates,
}

impl DisposalVisuals {
    /// Computes the projection from the unit's current facts.
    #[must_use]
    pub fn compute(anchored: bool, state: PressureState, engaged: bool, powered: bool, has_contents: bool) -> Self {
        if !anchored {
            return Self {
                visual_state: VisualState::UnAnchored,
                handle: HandleState::Normal,
                lights: LightStates::empty(),
            };
        }

        let visual_state = match state {
            PressureState::Flushed => VisualState::OverlayFlushing,
            PressureState::Pressurizing => VisualState::OverlayCharging,
            PressureState::Ready => VisualState::Anchored,
        };
        let handle = if engaged {
            HandleState::Engaged
        } else {
            HandleState::Normal
        };

        let mut lights = LightStates::empty();
        if powered {
            if has_contents {
                lights |= LightStates::FULL;
            }
            lights |= match state {
                PressureState::Pressurizing | PressureState::Flushed => LightStates::CHARGING,
                PressureState::Ready => LightStates::READY,
            };
        }

        Self {
            visual_state,
            handle,
            lights,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unanchored_hides_everything() {
        let visuals = DisposalVisuals::compute(false, PressureState::Ready, true, true, true);
        assert_eq!(visuals.visual_state, VisualState::UnAnchored);
        assert_eq!(visuals.handle, HandleState::Normal);
        assert!(visuals.lights.is_empty());
    }

    #[test]
    fn test_lights() {
        let ready = DisposalVisuals::compute(true, PressureState::Ready, false, true, true);
        assert_eq!(ready.visual_state, VisualState::Anchored);
        assert_eq!(ready.lights, LightStates::FULL | LightStates::READY);

        let charging = DisposalVisuals::compute(true, PressureState::Flushed, true, true, false);
        assert_eq!(charging.visual_state, VisualState::OverlayFlushing);
        assert_eq!(charging.handle, HandleState::Engaged);
        assert_eq!(charging.lights, LightStates::CHARGING);

        let unpowered = DisposalVisuals::compute(true, PressureState::Pressurizing, false, false, true);
        assert_eq!(unpowered.visual_state, VisualState::OverlayCharging);
        assert!(unpowered.lights.is_empty());
    }
}
