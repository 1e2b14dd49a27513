//! Grouping a fridge's contents for display.
//!
//! Objects are grouped by their [`Category`]. Inside a group, objects with
//! the same display name and the same total volume are shown as a single
//! entry with a count. The volume comparison is exact on the two-decimal
//! fixed point value, so `30` and `30.00` merge while `30.01` doesn't.

use depot_registry::{Category, Label, Volume};
use depot_utils::{EntityId, FixedPoint2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::container::ContainerKey;
use crate::world::World;

/// One line of the fridge's inventory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InventoryEntry {
    /// Category the entry is listed under.
    pub group: String,
    /// Stable id of the first object that produced the entry, used for its icon.
    pub visual_reference: Uuid,
    /// Display name.
    pub item_name: String,
    /// Total volume of one object, [`FixedPoint2::NONE_SENTINEL`] if it has none.
    pub unit_count: FixedPoint2,
    /// How many objects the entry stands for.
    pub amount: u32,
}

/// All entries of one category, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InventoryGroup {
    /// The category.
    pub name: String,
    /// Its entries.
    pub items: Vec<InventoryEntry>,
}

impl InventoryGroup {
    fn new(name: String) -> Self {
        Self {
            name,
            items: Vec::new(),
        }
    }
}

/// How an object is listed: category, display name and unit count.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryKey<'a> {
    /// Category.
    pub group: &'a str,
    /// Display name, the label if there is one.
    pub name: &'a str,
    /// Total volume or [`FixedPoint2::NONE_SENTINEL`].
    pub unit_count: FixedPoint2,
}

impl EntryKey<'_> {
    /// Returns true if `entry` lists objects with this key.
    #[must_use]
    pub fn matches(&self, entry: &InventoryEntry) -> bool {
        self.group == entry.group && self.name == entry.item_name && self.unit_count == entry.unit_count
    }
}

/// Resolves how `entity` is listed, `None` if it isn't listed at all.
#[must_use]
pub fn entry_key(world: &World, entity: EntityId) -> Option<EntryKey<'_>> {
    let Category(group) = world.registry.get::<Category>(entity)?;
    let name = match world.registry.get::<Label>(entity) {
        Some(Label(label)) => label.as_str(),
        None => world.registry.name(entity)?,
    };
    let unit_count = world
        .registry
        .get::<Volume>(entity)
        .map_or(FixedPoint2::NONE_SENTINEL, Volume::total);
    Some(EntryKey {
        group: group.as_str(),
        name,
        unit_count,
    })
}

/// Groups the container's contents.
///
/// Groups come out in the order their category was first seen, entries in
/// the order their first object was seen.
#[must_use]
pub fn get_inventory(world: &World, container: &ContainerKey) -> Vec<InventoryGroup> {
    let mut groups: Vec<InventoryGroup> = Vec::new();

    for &entity in world.containers.contents(container) {
        let Some(key) = entry_key(world, entity) else {
            continue;
        };

        let index = match groups.iter().position(|group| group.name == key.group) {
            Some(index) => index,
            None => {
                groups.push(InventoryGroup::new(key.group.to_owned()));
                groups.len() - 1
            }
        };
        let group = &mut groups[index];

        if let Some(entry) = group.items.iter_mut().find(|entry| key.matches(entry)) {
            entry.amount += 1;
            continue;
        }

        let Some(visual_reference) = world.registry.uuid(entity) else {
            continue;
        };
        group.items.push(InventoryEntry {
            group: key.group.to_owned(),
            visual_reference,
            item_name: key.name.to_owned(),
            unit_count: key.unit_count,
            amount: 1,
        });
    }

    groups
}
