use depot_registry::Hands;
use depot_utils::EntityId;

use super::dispense::{DispenseRequest, dispense_from};
use super::inventory::{self, InventoryGroup};
use super::{SMART_FRIDGE_CONTAINER, SmartFridge, SmartFridgeHook, SmartFridgeState};
use crate::container::ContainerKey;
use crate::hands;
use crate::insertion;
use crate::ui::{BoundUiState, UiKey};
use crate::world::World;

/// Turns `fridge` into a smart fridge.
pub fn init(world: &mut World, fridge: EntityId) -> ContainerKey {
    let container = world.containers.ensure_container(fridge, SMART_FRIDGE_CONTAINER);
    world.smart_fridges.insert(
        fridge,
        SmartFridge {
            container: container.clone(),
        },
    );
    world.hooks.register(fridge, SmartFridgeHook);
    publish_inventory(world, fridge);
    container
}

fn container_of(world: &World, fridge: EntityId) -> Option<ContainerKey> {
    world
        .smart_fridges
        .get(&fridge)
        .map(|smart_fridge| smart_fridge.container.clone())
}

/// Whether `entity` may go into the fridge: it has to be anchored and the
/// object an item or something solid.
#[must_use]
pub fn can_insert(world: &World, fridge: EntityId, entity: EntityId) -> bool {
    world.smart_fridges.contains_key(&fridge) && insertion::structural_check(world, fridge, entity).is_ok()
}

/// Whether `user` should be offered to put `using` into the fridge.
#[must_use]
pub fn insert_verb_available(world: &World, fridge: EntityId, user: EntityId, using: Option<EntityId>) -> bool {
    let Some(using) = using else {
        return false;
    };
    world
        .registry
        .get::<Hands>(user)
        .is_some_and(|hands| hands.is_holding(using))
        && can_insert(world, fridge, using)
}

/// `user` puts the held item `used` into the fridge.
pub fn try_insert_held(world: &mut World, fridge: EntityId, user: EntityId, used: EntityId) -> bool {
    if !world.smart_fridges.contains_key(&fridge) {
        return false;
    }
    insertion::try_insert_held(world, fridge, &SMART_FRIDGE_CONTAINER, user, used)
}

/// Bookkeeping after `inserted` went into the fridge, inserting it first if
/// `do_insert` is set.
pub fn after_insert(
    world: &mut World,
    fridge: EntityId,
    inserted: EntityId,
    user: Option<EntityId>,
    do_insert: bool,
) -> bool {
    let Some(container) = container_of(world, fridge) else {
        return false;
    };
    if do_insert && !hands::try_move_into_container(world, inserted, &container) {
        log::debug!("Smart fridge {fridge} refused {inserted}");
        return false;
    }
    if let Some(user) = user {
        log::debug!("{} stocked {} with {}", world.describe(user), world.describe(fridge), world.describe(inserted));
    }
    publish_inventory(world, fridge);
    true
}

/// The fridge's current inventory.
#[must_use]
pub fn get_inventory(world: &World, fridge: EntityId) -> Vec<InventoryGroup> {
    match world.smart_fridges.get(&fridge) {
        Some(smart_fridge) => inventory::get_inventory(world, &smart_fridge.container),
        None => Vec::new(),
    }
}

/// Recomputes the inventory and pushes it to the fridge's interface.
pub fn publish_inventory(world: &mut World, fridge: EntityId) {
    if !world.smart_fridges.contains_key(&fridge) {
        return;
    }
    let state = SmartFridgeState {
        inventory: get_inventory(world, fridge),
    };
    world
        .ui
        .set_state(fridge, UiKey::SmartFridge, BoundUiState::SmartFridge(state));
}

/// Hands the requested items to `actor`, dropping them next to the fridge
/// when their hands are full.
///
/// Returns what left the fridge.
pub fn dispense(world: &mut World, fridge: EntityId, actor: EntityId, request: &DispenseRequest) -> Vec<EntityId> {
    let Some(container) = container_of(world, fridge) else {
        return Vec::new();
    };
    let dispensed = dispense_from(world, &container, fridge, actor, request);
    log::debug!(
        "{} dispensed {} '{}' to {}",
        world.describe(fridge),
        dispensed.len(),
        request.item.item_name,
        world.describe(actor)
    );
    publish_inventory(world, fridge);
    dispensed
}
