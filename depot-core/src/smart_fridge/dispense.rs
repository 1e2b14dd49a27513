//! Handing objects out of a fridge.

use depot_utils::EntityId;
use serde::{Deserialize, Serialize};

use super::inventory::{InventoryEntry, entry_key};
use crate::container::ContainerKey;
use crate::hands;
use crate::world::World;

/// A request to take `amount` objects matching `item` out of a fridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispenseRequest {
    /// The entry the objects must match.
    pub item: InventoryEntry,
    /// How many to take.
    pub amount: i32,
}

/// Up to `amount` contained objects listed exactly as `item`, in container order.
#[must_use]
pub fn select_matching(world: &World, container: &ContainerKey, item: &InventoryEntry, amount: usize) -> Vec<EntityId> {
    world
        .containers
        .contents(container)
        .iter()
        .copied()
        .filter(|entity| entry_key(world, *entity).is_some_and(|key| key.matches(item)))
        .take(amount)
        .collect()
}

/// Moves the objects matching the request to `actor`.
///
/// Objects go into a free hand if possible, otherwise they are dropped at
/// `drop_at`'s position. Fewer matches than requested is not an error.
/// Returns the objects that left the container.
pub fn dispense_from(
    world: &mut World,
    container: &ContainerKey,
    drop_at: EntityId,
    actor: EntityId,
    request: &DispenseRequest,
) -> Vec<EntityId> {
    let Ok(amount) = usize::try_from(request.amount) else {
        return Vec::new();
    };
    if amount == 0 {
        return Vec::new();
    }

    let selected = select_matching(world, container, &request.item, amount);
    if selected.len() < amount {
        log::debug!(
            "Only {} of {amount} '{}' available in {container}",
            selected.len(),
            request.item.item_name
        );
    }

    let coordinates = hands::coordinates_of(world, drop_at);
    let mut dispensed = Vec::with_capacity(selected.len());
    for entity in selected {
        if hands::try_pickup(world, actor, entity, container)
            || hands::try_drop_out(world, entity, container, coordinates)
        {
            dispensed.push(entity);
        } else {
            log::warn!("Failed to remove {entity} from {container} while dispensing");
        }
    }
    dispensed
}
