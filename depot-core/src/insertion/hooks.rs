//! Per-receptacle insertion hooks.
//!
//! Hooks are a closed set of variants dispatched through [`enum_dispatch`].
//! Every receptacle keeps its hooks in registration order and the broadcast
//! helpers in [`super`] call them in that order.

use depot_registry::Tags;
use depot_utils::EntityId;
use enum_dispatch::enum_dispatch;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::{AfterInsertEvent, TryInsertEvent};
use crate::disposal::DisposalUnitHook;
use crate::smart_fridge::SmartFridgeHook;
use crate::world::World;

/// Reacts to insertion attempts and completed insertions on a receptacle.
#[enum_dispatch]
pub trait InsertionHook {
    /// Called before an insert commits. Set [`TryInsertEvent::block`] to veto.
    fn try_insert(&self, _world: &World, _receptacle: EntityId, _event: &mut TryInsertEvent) {}

    /// Called after the subject has been moved into the receptacle.
    fn after_insert(&self, _world: &mut World, _receptacle: EntityId, _event: &AfterInsertEvent) {}
}

/// Every hook kind a receptacle can carry.
#[enum_dispatch(InsertionHook)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceptacleHook {
    /// Disposal unit policy and flush scheduling.
    DisposalUnitHook,
    /// Smart fridge inventory refresh.
    SmartFridgeHook,
    /// Tag based allow/deny filter.
    TagFilter,
}

/// Whether a [`TagFilter`] requires or forbids its tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// Only subjects carrying the tag get in.
    Require,
    /// Subjects carrying the tag are refused.
    Deny,
}

/// Vetoes subjects by tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFilter {
    /// The tag to look for.
    pub tag: String,
    /// Require or deny.
    pub mode: FilterMode,
}

impl InsertionHook for TagFilter {
    fn try_insert(&self, world: &World, _receptacle: EntityId, event: &mut TryInsertEvent) {
        let tagged = world
            .registry
            .get::<Tags>(event.subject)
            .is_some_and(|tags| tags.contains(&self.tag));
        let refused = match self.mode {
            FilterMode::Require => !tagged,
            FilterMode::Deny => tagged,
        };
        if refused {
            event.block();
        }
        event.handled = true;
    }
}

/// Hook lists, keyed by receptacle.
#[derive(Debug, Default)]
pub struct HookTable {
    hooks: FxHashMap<EntityId, SmallVec<[ReceptacleHook; 2]>>,
}

impl HookTable {
    /// Appends a hook to the receptacle's list.
    pub fn register(&mut self, receptacle: EntityId, hook: impl Into<ReceptacleHook>) {
        let hook = hook.into();
        let list = self.hooks.entry(receptacle).or_default();
        if list.contains(&hook) {
            log::debug!("Hook {hook:?} already registered on {receptacle}");
            return;
        }
        list.push(hook);
    }

    /// The receptacle's hooks in registration order.
    #[must_use]
    pub fn hooks_for(&self, receptacle: EntityId) -> &[ReceptacleHook] {
        match self.hooks.get(&receptacle) {
            Some(list) => list.as_slice(),
            None => &[],
        }
    }

    /// Drops every hook of the receptacle.
    pub fn remove_receptacle(&mut self, receptacle: EntityId) {
        self.hooks.remove(&receptacle);
    }
}
