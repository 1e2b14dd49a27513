//! Receptacle user interfaces.
//!
//! Receptacles publish serializable snapshots of their state here. The
//! system keeps the latest snapshot per interface and forwards every change
//! to an optional [`UiSink`], which is where a presentation layer hooks in.
//! Nothing published here is read back by the simulation.

use std::fmt;

use depot_utils::EntityId;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::disposal::DisposalUnitState;
use crate::smart_fridge::SmartFridgeState;

/// Identifies one interface of a receptacle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UiKey {
    /// Disposal unit controls.
    DisposalUnit,
    /// Smart fridge listing.
    SmartFridge,
}

/// State published to an interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoundUiState {
    /// See [`DisposalUnitState`].
    DisposalUnit(DisposalUnitState),
    /// See [`SmartFridgeState`].
    SmartFridge(SmartFridgeState),
}

/// Receives published interface updates.
pub trait UiSink: Send {
    /// A new state was published.
    fn publish(&mut self, receptacle: EntityId, key: UiKey, state: &BoundUiState);

    /// The interface was closed for `actor`.
    fn closed(&mut self, _receptacle: EntityId, _key: UiKey, _actor: EntityId) {}
}

/// Open interfaces and their latest states.
#[derive(Default)]
pub struct UserInterfaceSystem {
    states: FxHashMap<(EntityId, UiKey), BoundUiState>,
    viewers: FxHashMap<(EntityId, UiKey), FxHashSet<EntityId>>,
    sink: Option<Box<dyn UiSink>>,
}

impl fmt::Debug for UserInterfaceSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserInterfaceSystem")
            .field("states", &self.states.len())
            .field("viewers", &self.viewers.len())
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

impl UserInterfaceSystem {
    /// Creates a system without a sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes every future publish to `sink`.
    pub fn set_sink(&mut self, sink: Box<dyn UiSink>) {
        self.sink = Some(sink);
    }

    /// Opens the interface for `actor`. Returns false if it already was.
    pub fn open(&mut self, receptacle: EntityId, key: UiKey, actor: EntityId) -> bool {
        self.viewers.entry((receptacle, key)).or_default().insert(actor)
    }

    /// Closes the interface for `actor`. Returns false if it wasn't open.
    pub fn close(&mut self, receptacle: EntityId, key: UiKey, actor: EntityId) -> bool {
        let Some(viewers) = self.viewers.get_mut(&(receptacle, key)) else {
            return false;
        };
        if !viewers.remove(&actor) {
            return false;
        }
        log::trace!("Closed {key:?} of {receptacle} for {actor}");
        if let Some(sink) = self.sink.as_mut() {
            sink.closed(receptacle, key, actor);
        }
        true
    }

    /// Returns true if `actor` has the interface open.
    #[must_use]
    pub fn is_open(&self, receptacle: EntityId, key: UiKey, actor: EntityId) -> bool {
        self.viewers
            .get(&(receptacle, key))
            .is_some_and(|viewers| viewers.contains(&actor))
    }

    /// Publishes a state. Returns false if it equals the current one.
    pub fn set_state(&mut self, receptacle: EntityId, key: UiKey, state: BoundUiState) -> bool {
        if self.states.get(&(receptacle, key)) == Some(&state) {
            return false;
        }
        if let Some(sink) = self.sink.as_mut() {
            sink.publish(receptacle, key, &state);
        }
        self.states.insert((receptacle, key), state);
        true
    }

    /// Latest published state.
    #[must_use]
    pub fn state(&self, receptacle: EntityId, key: UiKey) -> Option<&BoundUiState> {
        self.states.get(&(receptacle, key))
    }

    /// Forgets everything about a receptacle.
    pub fn remove_receptacle(&mut self, receptacle: EntityId) {
        self.states.retain(|(owner, _), _| *owner != receptacle);
        self.viewers.retain(|(owner, _), _| *owner != receptacle);
    }
}
