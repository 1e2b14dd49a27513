//! Container bookkeeping.

use depot_registry::ObjectRegistry;
use depot_utils::{ContainerId, EntityId};
use rustc_hash::FxHashMap;

use super::{Container, ContainerChange, ContainerKey, Teardown};

/// Owns every container in the world and enforces single containment.
#[derive(Debug, Default)]
pub struct ContainerManager {
    containers: FxHashMap<ContainerKey, Container>,
    parents: FxHashMap<EntityId, ContainerKey>,
    changes: Vec<ContainerChange>,
}

impl ContainerManager {
    /// Creates an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the container `id` of `owner`, creating it if needed.
    ///
    /// Calling this again never touches the existing membership.
    pub fn ensure_container(&mut self, owner: EntityId, id: impl Into<ContainerId>) -> ContainerKey {
        let key = ContainerKey::new(owner, id);
        if !self.containers.contains_key(&key) {
            log::debug!("Creating container {key}");
            self.containers
                .insert(key.clone(), Container::new(key.clone()));
        }
        key
    }

    /// Looks up a container.
    #[must_use]
    pub fn get(&self, key: &ContainerKey) -> Option<&Container> {
        self.containers.get(key)
    }

    /// Limits how many members a container may hold.
    pub fn set_capacity(&mut self, key: &ContainerKey, capacity: Option<usize>) {
        if let Some(container) = self.containers.get_mut(key) {
            container.capacity = capacity;
        }
    }

    /// The container `entity` is in, if any.
    #[must_use]
    pub fn contained_by(&self, entity: EntityId) -> Option<&ContainerKey> {
        self.parents.get(&entity)
    }

    /// Returns true if `entity` is inside any container.
    #[must_use]
    pub fn is_contained(&self, entity: EntityId) -> bool {
        self.parents.contains_key(&entity)
    }

    /// Returns true if `ancestor` is `entity`'s container owner, directly or further up.
    #[must_use]
    pub fn is_inside(&self, entity: EntityId, ancestor: EntityId) -> bool {
        let mut current = entity;
        while let Some(parent) = self.parents.get(&current) {
            if parent.owner == ancestor {
                return true;
            }
            current = parent.owner;
        }
        false
    }

    /// Returns true if `entity` is a member of the container.
    #[must_use]
    pub fn contains_in(&self, key: &ContainerKey, entity: EntityId) -> bool {
        self.containers
            .get(key)
            .is_some_and(|container| container.contains(entity))
    }

    /// Contents of a container, empty if it doesn't exist.
    #[must_use]
    pub fn contents(&self, key: &ContainerKey) -> &[EntityId] {
        match self.containers.get(key) {
            Some(container) => container.contained_entities(),
            None => &[],
        }
    }

    /// Checks whether `entity` could be inserted into `key` right now.
    #[must_use]
    pub fn can_insert(&self, registry: &ObjectRegistry, entity: EntityId, key: &ContainerKey) -> bool {
        let Some(container) = self.containers.get(key) else {
            return false;
        };
        registry.exists(entity)
            && registry.exists(key.owner)
            && entity != key.owner
            && !self.parents.contains_key(&entity)
            // The owner can't end up inside the thing it contains
            && !self.is_inside(key.owner, entity)
            && !container.is_full()
    }

    /// Inserts `entity` into the container.
    ///
    /// Fails if the object is already contained anywhere, if it doesn't exist,
    /// or if the insert is structurally impossible.
    pub fn insert(&mut self, registry: &ObjectRegistry, entity: EntityId, key: &ContainerKey) -> bool {
        if !self.can_insert(registry, entity, key) {
            return false;
        }
        let Some(container) = self.containers.get_mut(key) else {
            return false;
        };
        container.contained.push(entity);
        self.parents.insert(entity, key.clone());
        self.changes.push(ContainerChange::Inserted {
            key: key.clone(),
            entity,
        });
        log::trace!("Inserted {entity} into {key}");
        true
    }

    /// Removes `entity` from the container. Fails if it is not a member.
    pub fn remove(&mut self, entity: EntityId, key: &ContainerKey) -> bool {
        let Some(container) = self.containers.get_mut(key) else {
            return false;
        };
        let Some(index) = container.contained.iter().position(|e| *e == entity) else {
            return false;
        };
        container.contained.remove(index);
        self.parents.remove(&entity);
        self.changes.push(ContainerChange::Removed {
            key: key.clone(),
            entity,
        });
        log::trace!("Removed {entity} from {key}");
        true
    }

    /// Takes `entity` out of whatever container it is in.
    pub fn remove_from_parent(&mut self, entity: EntityId) -> bool {
        let Some(key) = self.parents.get(&entity).cloned() else {
            return false;
        };
        self.remove(entity, &key)
    }

    /// Tears down every container of `owner`.
    ///
    /// Returns the objects that were released or deleted.
    pub fn shutdown_owner(
        &mut self,
        registry: &mut ObjectRegistry,
        owner: EntityId,
        teardown: Teardown,
    ) -> Vec<EntityId> {
        let keys: Vec<ContainerKey> = self
            .containers
            .keys()
            .filter(|key| key.owner == owner)
            .cloned()
            .collect();

        let mut affected = Vec::new();
        for key in keys {
            let members = self
                .containers
                .get(&key)
                .map(|c| c.contained.clone())
                .unwrap_or_default();
            for member in members {
                self.remove(member, &key);
                if teardown == Teardown::Delete {
                    affected.extend(self.shutdown_owner(registry, member, teardown));
                    registry.despawn(member);
                }
                affected.push(member);
            }
            self.containers.remove(&key);
            log::debug!("Shut down container {key} ({teardown:?})");
        }
        affected
    }

    /// Returns and clears the recorded membership changes.
    pub fn drain_changes(&mut self) -> Vec<ContainerChange> {
        std::mem::take(&mut self.changes)
    }
}
