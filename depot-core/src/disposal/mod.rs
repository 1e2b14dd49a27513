//! Disposal units.
//!
//! A disposal unit is an anchored receptacle that swallows items and mobs and
//! periodically flushes them into the pipe network. Flushing needs full
//! pressure, which builds up over [`pressure::PRESSURE_PER_SECOND`] after
//! every flush. The pressure itself is never stored, see [`pressure`].

pub mod pressure;
mod system;
pub mod visuals;

use depot_utils::{ContainerId, EntityId, TimeSpan};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::DisposalConfig;
use crate::container::ContainerKey;
use crate::insertion::{AfterInsertEvent, InsertionHook, TryInsertEvent};
use crate::world::World;

pub use pressure::{PRESSURE_PER_SECOND, PressureState};
pub use system::{
    after_insert, can_drag_drop_on, can_flush, can_insert, complete_insert, current_pressure, emag, init,
    interact_using, on_end_collide, prevents_collision, queue_automatic_engage, set_engaged, set_powered, snapshot,
    state, try_eject_contents, try_exit, try_flush, try_insert, update, update_visual_state, visuals,
};
pub use visuals::{DisposalVisuals, HandleState, LightStates, VisualState};

/// Id of the container every disposal unit keeps its contents in.
pub const DISPOSAL_CONTAINER: ContainerId = ContainerId::new_static("disposals");

/// Minimum time between two attempts of an occupant to climb out.
pub const EXIT_ATTEMPT_DELAY: TimeSpan = TimeSpan::from_millis(500);

/// State of a single disposal unit.
#[derive(Debug, Clone, PartialEq)]
pub struct DisposalUnit {
    /// Where the contents are kept.
    pub container: ContainerKey,
    /// When the unit is next fully pressurized, in unpaused time.
    pub next_pressurized: TimeSpan,
    /// How long the flush animation lasts.
    pub flush_delay: TimeSpan,
    /// Flush on its own after something was inserted.
    pub automatic_engage: bool,
    /// Delay of the automatic flush.
    pub automatic_engage_time: TimeSpan,
    /// Pending automatic flush, in unpaused time.
    pub next_flush: Option<TimeSpan>,
    /// Whether the unit has power.
    pub powered: bool,
    /// Whether the flush handle is pulled.
    pub engaged: bool,
    /// Objects thrown out recently, ignored by collision until they leave.
    pub recently_ejected: Vec<EntityId>,
    /// Delay when a mob climbs in on its own.
    pub entry_delay: TimeSpan,
    /// Delay when someone else is put in.
    pub dragged_entry_delay: TimeSpan,
    /// Last time an occupant tried to get out.
    pub last_exit_attempt: Option<TimeSpan>,
    /// Only objects carrying one of these tags are accepted.
    pub whitelist: Option<Vec<String>>,
    /// Objects carrying any of these tags are refused.
    pub blacklist: Option<Vec<String>>,
    disable_pressure: bool,
}

impl DisposalUnit {
    /// A fresh, unpowered unit with the configured defaults.
    #[must_use]
    pub fn new(container: ContainerKey, config: &DisposalConfig) -> Self {
        Self {
            container,
            next_pressurized: TimeSpan::ZERO,
            flush_delay: config.flush_delay,
            automatic_engage: config.automatic_engage,
            automatic_engage_time: config.automatic_engage_time,
            next_flush: None,
            powered: false,
            engaged: false,
            recently_ejected: Vec::new(),
            entry_delay: config.entry_delay,
            dragged_entry_delay: config.dragged_entry_delay,
            last_exit_attempt: None,
            whitelist: None,
            blacklist: None,
            disable_pressure: false,
        }
    }

    /// Returns true once the unit has been tampered with.
    #[must_use]
    pub const fn disable_pressure(&self) -> bool {
        self.disable_pressure
    }
}

/// Contents that left a unit through a flush.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlushedContents {
    /// The unit that flushed.
    pub unit: EntityId,
    /// What it flushed, in container order.
    pub contents: Vec<EntityId>,
}

/// Snapshot of a unit pushed to its user interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisposalUnitState {
    /// Pressure state at the time of the snapshot.
    pub state: PressureState,
    /// See [`DisposalUnit::next_pressurized`].
    pub next_pressurized: TimeSpan,
    /// See [`DisposalUnit::automatic_engage_time`].
    pub automatic_engage_time: TimeSpan,
    /// See [`DisposalUnit::next_flush`].
    pub next_flush: Option<TimeSpan>,
    /// See [`DisposalUnit::powered`].
    pub powered: bool,
    /// See [`DisposalUnit::engaged`].
    pub engaged: bool,
    /// Stable ids of recently ejected objects.
    pub recently_ejected: Vec<Uuid>,
    /// Pressure in `0.0..=1.0`.
    pub pressure: f64,
    /// Display projection.
    pub visuals: DisposalVisuals,
}

/// Hook registered on every disposal unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisposalUnitHook;

impl InsertionHook for DisposalUnitHook {
    fn try_insert(&self, world: &World, receptacle: EntityId, event: &mut TryInsertEvent) {
        if !can_insert(world, receptacle, event.subject) {
            event.block();
        }
        event.handled = true;
    }

    fn after_insert(&self, world: &mut World, receptacle: EntityId, event: &AfterInsertEvent) {
        after_insert(world, receptacle, event.inserted, event.user, false);
    }
}
