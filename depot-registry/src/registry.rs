//! The object registry.

use depot_utils::{EntityId, PauseState, TimeSpan};
use rustc_hash::FxHashMap;
use uuid::Uuid;

use crate::components::{Component, Components};

/// Metadata every object has, regardless of its capabilities.
#[derive(Debug, Clone)]
pub struct MetaData {
    /// Stable identity, safe to hand to the presentation side.
    pub uuid: Uuid,
    /// Default display name.
    pub name: String,
    /// Pause bookkeeping for this object.
    pub pause: PauseState,
}

/// Owns every simulated object.
///
/// Lookups for missing objects or missing capabilities return `None` (or
/// `false`), which callers treat as a normal branch.
#[derive(Debug, Default)]
pub struct ObjectRegistry {
    next_id: u32,
    meta: FxHashMap<EntityId, MetaData>,
    by_uuid: FxHashMap<Uuid, EntityId>,
    components: Components,
}

impl ObjectRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new object with the given display name and no capabilities.
    pub fn spawn(&mut self, name: impl Into<String>) -> EntityId {
        self.next_id += 1;
        let id = EntityId(self.next_id);
        let uuid = Uuid::new_v4();
        self.meta.insert(
            id,
            MetaData {
                uuid,
                name: name.into(),
                pause: PauseState::default(),
            },
        );
        self.by_uuid.insert(uuid, id);
        log::trace!("Spawned {id} ({uuid})");
        id
    }

    /// Deletes an object and all of its capabilities.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        let Some(meta) = self.meta.remove(&id) else {
            return false;
        };
        self.by_uuid.remove(&meta.uuid);
        self.components.remove_all(id);
        log::trace!("Despawned {id} ({})", meta.name);
        true
    }

    /// Returns true if the object exists.
    #[must_use]
    pub fn exists(&self, id: EntityId) -> bool {
        self.meta.contains_key(&id)
    }

    /// Returns the number of live objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.meta.len()
    }

    /// Returns true if there are no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.meta.is_empty()
    }

    /// Returns the object's metadata.
    #[must_use]
    pub fn meta(&self, id: EntityId) -> Option<&MetaData> {
        self.meta.get(&id)
    }

    /// Returns the object's default display name.
    #[must_use]
    pub fn name(&self, id: EntityId) -> Option<&str> {
        self.meta.get(&id).map(|meta| meta.name.as_str())
    }

    /// Returns the object's stable identity.
    #[must_use]
    pub fn uuid(&self, id: EntityId) -> Option<Uuid> {
        self.meta.get(&id).map(|meta| meta.uuid)
    }

    /// Resolves a stable identity back to an object.
    #[must_use]
    pub fn by_uuid(&self, uuid: Uuid) -> Option<EntityId> {
        self.by_uuid.get(&uuid).copied()
    }

    /// Attaches (or replaces) a capability. Ignored for objects that don't exist.
    pub fn insert<C: Component>(&mut self, id: EntityId, component: C) {
        if !self.exists(id) {
            log::warn!("Tried to attach a component to missing object {id}");
            return;
        }
        C::storage_mut(&mut self.components).insert(id, component);
    }

    /// Detaches a capability and returns it.
    pub fn remove<C: Component>(&mut self, id: EntityId) -> Option<C> {
        C::storage_mut(&mut self.components).remove(&id)
    }

    /// Reads a capability.
    #[must_use]
    pub fn get<C: Component>(&self, id: EntityId) -> Option<&C> {
        C::storage(&self.components).get(&id)
    }

    /// Mutably reads a capability.
    pub fn get_mut<C: Component>(&mut self, id: EntityId) -> Option<&mut C> {
        C::storage_mut(&mut self.components).get_mut(&id)
    }

    /// Returns true if the object carries the capability.
    #[must_use]
    pub fn has<C: Component>(&self, id: EntityId) -> bool {
        C::storage(&self.components).contains_key(&id)
    }

    /// Every object carrying the capability, in no particular order.
    pub fn iter<C: Component>(&self) -> impl Iterator<Item = (EntityId, &C)> {
        C::storage(&self.components).iter().map(|(id, component)| (*id, component))
    }

    /// Pauses the object at `now`.
    pub fn pause(&mut self, id: EntityId, now: TimeSpan) {
        if let Some(meta) = self.meta.get_mut(&id) {
            meta.pause.pause(now);
        }
    }

    /// Unpauses the object at `now`.
    pub fn unpause(&mut self, id: EntityId, now: TimeSpan) {
        if let Some(meta) = self.meta.get_mut(&id) {
            meta.pause.unpause(now);
        }
    }

    /// Returns true while the object is paused.
    #[must_use]
    pub fn is_paused(&self, id: EntityId) -> bool {
        self.meta.get(&id).is_some_and(|meta| meta.pause.is_paused())
    }

    /// Total paused time of the object as of `now`. Zero for missing objects.
    #[must_use]
    pub fn pause_time(&self, id: EntityId, now: TimeSpan) -> TimeSpan {
        self.meta
            .get(&id)
            .map_or(TimeSpan::ZERO, |meta| meta.pause.pause_time(now))
    }
}
