//! Receptacle containers.
//!
//! A receptacle owns one [`Container`] per container id. Containers only hold
//! ids into the object registry; the [`ContainerManager`] is the single place
//! that mutates membership and it records every change so dependents (UI
//! refresh, disposal visuals) can react after the fact.

mod manager;

use std::fmt::{self, Display};

use depot_utils::{ContainerId, EntityId};

pub use manager::ContainerManager;

/// Identifies one container: the owning receptacle plus the container id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerKey {
    /// The receptacle owning the container.
    pub owner: EntityId,
    /// The container's id on its owner.
    pub id: ContainerId,
}

impl ContainerKey {
    /// Creates a key.
    #[must_use]
    pub fn new(owner: EntityId, id: impl Into<ContainerId>) -> Self {
        Self {
            owner,
            id: id.into(),
        }
    }
}

impl Display for ContainerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.id)
    }
}

/// The membership set of a receptacle.
///
/// Keeps insertion order, which is the iteration order every system uses.
#[derive(Debug, Clone)]
pub struct Container {
    key: ContainerKey,
    contained: Vec<EntityId>,
    capacity: Option<usize>,
}

impl Container {
    fn new(key: ContainerKey) -> Self {
        Self {
            key,
            contained: Vec::new(),
            capacity: None,
        }
    }

    /// The key of this container.
    #[must_use]
    pub fn key(&self) -> &ContainerKey {
        &self.key
    }

    /// Contained objects in insertion order.
    #[must_use]
    pub fn contained_entities(&self) -> &[EntityId] {
        &self.contained
    }

    /// Returns true if `entity` is a member.
    #[must_use]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.contained.contains(&entity)
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contained.len()
    }

    /// Returns true if there are no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contained.is_empty()
    }

    /// Maximum number of members, if limited.
    #[must_use]
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    fn is_full(&self) -> bool {
        self.capacity.is_some_and(|cap| self.contained.len() >= cap)
    }
}

/// A membership change, recorded for dependents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerChange {
    /// `entity` entered the container.
    Inserted {
        /// The container.
        key: ContainerKey,
        /// The new member.
        entity: EntityId,
    },
    /// `entity` left the container.
    Removed {
        /// The container.
        key: ContainerKey,
        /// The former member.
        entity: EntityId,
    },
}

impl ContainerChange {
    /// The container that changed.
    #[must_use]
    pub fn key(&self) -> &ContainerKey {
        match self {
            Self::Inserted { key, .. } | Self::Removed { key, .. } => key,
        }
    }
}

/// What happens to the members when their container is torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Teardown {
    /// Members stay in the world, no longer contained.
    Release,
    /// Members are deleted together with the container.
    #[default]
    Delete,
}
