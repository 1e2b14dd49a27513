//! Smart fridges.
//!
//! A smart fridge stores items and lists them grouped by category. Users
//! pick an entry of the list and a count, and the fridge hands out matching
//! items. The list is recomputed from the container every time the contents
//! change and pushed to the fridge's user interface.

pub mod dispense;
pub mod inventory;
mod system;
pub mod view;

use depot_utils::{ContainerId, EntityId};
use serde::{Deserialize, Serialize};

use crate::container::ContainerKey;
use crate::insertion::{AfterInsertEvent, InsertionHook, TryInsertEvent};
use crate::world::World;

pub use dispense::DispenseRequest;
pub use inventory::{InventoryEntry, InventoryGroup};
pub use system::{
    after_insert, can_insert, dispense, get_inventory, init, insert_verb_available, publish_inventory,
    try_insert_held,
};
pub use view::SmartFridgeView;

/// Id of the container every smart fridge keeps its contents in.
pub const SMART_FRIDGE_CONTAINER: ContainerId = ContainerId::new_static("smartfridge");

/// Marks a receptacle as a smart fridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmartFridge {
    /// Where the contents are kept.
    pub container: ContainerKey,
}

/// Inventory pushed to a fridge's user interface.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SmartFridgeState {
    /// Groups in discovery order.
    pub inventory: Vec<InventoryGroup>,
}

/// Hook registered on every smart fridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmartFridgeHook;

impl InsertionHook for SmartFridgeHook {
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
