//! Capabilities an object can carry.
//!
//! Each capability is stored in its own map inside [`Components`], keyed by
//! entity. The [`Component`] trait ties a type to its map so the registry can
//! offer `get::<T>()` style lookups without any runtime type information.

use depot_utils::{Coordinates, EntityId, FixedPoint2};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

/// A type that can be attached to an object in the registry.
pub trait Component: Sized + 'static {
    /// The map holding every instance of this component.
    #[doc(hidden)]
    fn storage(components: &Components) -> &FxHashMap<EntityId, Self>;

    /// Mutable access to the map holding every instance of this component.
    #[doc(hidden)]
    fn storage_mut(components: &mut Components) -> &mut FxHashMap<EntityId, Self>;
}

macro_rules! component_storage {
    ($($field:ident: $ty:ty),* $(,)?) => {
        /// Per-capability component maps.
        #[derive(Debug, Default)]
        pub struct Components {
            $($field: FxHashMap<EntityId, $ty>,)*
        }

        impl Components {
            /// Drops every component of `entity`.
            pub(crate) fn remove_all(&mut self, entity: EntityId) {
                $(self.$field.remove(&entity);)*
            }
        }

        $(
            impl Component for $ty {
                fn storage(components: &Components) -> &FxHashMap<EntityId, Self> {
                    &components.$field
                }

                fn storage_mut(components: &mut Components) -> &mut FxHashMap<EntityId, Self> {
                    &mut components.$field
                }
            }
        )*
    };
}

component_storage! {
    transforms: Transform,
    items: Item,
    physics: Physics,
    bodies: Body,
    hands: Hands,
    thrown: ThrownItem,
    categories: Category,
    labels: Label,
    volumes: Volume,
    damageables: Damageable,
    tags: Tags,
}

/// Where an object is and whether it is bolted down.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transform {
    /// Fixed in place.
    #[serde(default)]
    pub anchored: bool,
    /// Map position.
    #[serde(default)]
    pub coordinates: Coordinates,
}

/// The object can be picked up and carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Item;

/// The object has a physics body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Physics {
    /// Whether the body currently takes part in collisions.
    pub can_collide: bool,
}

impl Default for Physics {
    fn default() -> Self {
        Self { can_collide: true }
    }
}

/// The object is a mob with a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Body;

/// The object is currently flying after being thrown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ThrownItem;

/// Hands that can hold items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hands {
    /// How many hands there are.
    pub count: usize,
    /// Held items, at most `count` of them.
    #[serde(default)]
    pub held: Vec<EntityId>,
}

impl Default for Hands {
    fn default() -> Self {
        Self {
            count: 2,
            held: Vec::new(),
        }
    }
}

impl Hands {
    /// Returns true if at least one hand is empty.
    #[must_use]
    pub fn has_free_hand(&self) -> bool {
        self.held.len() < self.count
    }

    /// Returns true if `item` is in one of the hands.
    #[must_use]
    pub fn is_holding(&self, item: EntityId) -> bool {
        self.held.contains(&item)
    }

    /// Puts `item` into a free hand.
    pub fn put(&mut self, item: EntityId) -> bool {
        if !self.has_free_hand() || self.is_holding(item) {
            return false;
        }
        self.held.push(item);
        true
    }

    /// Takes `item` out of the hands.
    pub fn take(&mut self, item: EntityId) -> bool {
        let Some(index) = self.held.iter().position(|held| *held == item) else {
            return false;
        };
        self.held.remove(index);
        true
    }
}

/// Smart fridge grouping tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(pub String);

/// Player-written label that replaces the display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(pub String);

/// Solution compartments attached to the object.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Volume {
    /// Current volume of each compartment.
    #[serde(default)]
    pub compartments: Vec<FixedPoint2>,
}

impl Volume {
    /// Total volume over all compartments.
    #[must_use]
    pub fn total(&self) -> FixedPoint2 {
        self.compartments.iter().sum()
    }
}

/// The object can take damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Damageable {
    /// Accumulated damage.
    #[serde(default)]
    pub total: FixedPoint2,
}

/// Free-form tags, matched by whitelists and blacklists.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(pub FxHashSet<String>);

impl Tags {
    /// Returns true if `tag` is present.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hands_capacity() {
        let mut hands = Hands::default();
        assert!(hands.put(EntityId(1)));
        assert!(!hands.put(EntityId(1)));
        assert!(hands.put(EntityId(2)));
        assert!(!hands.put(EntityId(3)));
        assert!(hands.take(EntityId(1)));
        assert!(!hands.take(EntityId(1)));
        assert!(hands.has_free_hand());
    }

    #[test]
    fn test_volume_total() {
        let volume = Volume {
            compartments: vec![FixedPoint2::new(20), FixedPoint2::new(10)],
        };
        assert_eq!(volume.total(), FixedPoint2::new(30));
        assert_eq!(Volume::default().total(), FixedPoint2::ZERO);
    }
}
