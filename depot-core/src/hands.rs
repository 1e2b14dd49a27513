//! Moving items between hands, containers and the floor.

use depot_registry::{Hands, Item, Transform};
use depot_utils::{Coordinates, EntityId};

use crate::container::ContainerKey;
use crate::world::World;

/// Moves `item` from `user`'s hands into the container.
///
/// The item goes back into the hand if the container refuses it.
pub fn try_drop_into_container(world: &mut World, user: EntityId, item: EntityId, key: &ContainerKey) -> bool {
    let Some(hands) = world.registry.get_mut::<Hands>(user) else {
        return false;
    };
    if !hands.take(item) {
        return false;
    }

    if world.containers.insert(&world.registry, item, key) {
        return true;
    }

    if let Some(hands) = world.registry.get_mut::<Hands>(user) {
        hands.put(item);
    }
    false
}

/// Takes `item` out of the container and puts it into a free hand of `actor`.
///
/// Should the hand refuse it after all, the item lands at `actor`'s feet.
pub fn try_pickup(world: &mut World, actor: EntityId, item: EntityId, from: &ContainerKey) -> bool {
    if !world.registry.has::<Item>(item) {
        return false;
    }
    let can_hold = world
        .registry
        .get::<Hands>(actor)
        .is_some_and(|hands| hands.has_free_hand() && !hands.is_holding(item));
    if !can_hold {
        return false;
    }
    if !world.containers.remove(item, from) {
        return false;
    }
    let held = world
        .registry
        .get_mut::<Hands>(actor)
        .is_some_and(|hands| hands.put(item));
    if !held {
        log::warn!("{actor} couldn't hold {item}, dropping it");
        let coordinates = coordinates_of(world, actor);
        place(world, item, coordinates);
    }
    true
}

/// Whoever is holding `item`.
#[must_use]
pub fn holder_of(world: &World, item: EntityId) -> Option<EntityId> {
    world
        .registry
        .iter::<Hands>()
        .find(|(_, hands)| hands.is_holding(item))
        .map(|(holder, _)| holder)
}

/// Moves `entity` into the container, out of whatever hand holds it.
///
/// The entity goes back into that hand if the container refuses it.
pub fn try_move_into_container(world: &mut World, entity: EntityId, key: &ContainerKey) -> bool {
    match holder_of(world, entity) {
        Some(holder) => try_drop_into_container(world, holder, entity, key),
        None => world.containers.insert(&world.registry, entity, key),
    }
}

/// Takes `item` out of the container and drops it at `coordinates`.
pub fn try_drop_out(world: &mut World, item: EntityId, from: &ContainerKey, coordinates: Coordinates) -> bool {
    if !world.containers.remove(item, from) {
        return false;
    }
    place(world, item, coordinates);
    true
}

/// Puts an uncontained object on the floor at `coordinates`.
pub fn place(world: &mut World, entity: EntityId, coordinates: Coordinates) {
    match world.registry.get_mut::<Transform>(entity) {
        Some(transform) => {
            transform.coordinates = coordinates;
            transform.anchored = false;
        }
        None => world.registry.insert(
            entity,
            Transform {
                anchored: false,
                coordinates,
            },
        ),
    }
}

/// Where an object is, falling back to the origin.
#[must_use]
pub fn coordinates_of(world: &World, entity: EntityId) -> Coordinates {
    world
        .registry
        .get::<Transform>(entity)
        .map(|transform| transform.coordinates)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DepotConfig;
    use crate::test_support::{anchored_receptacle, spawn_item};
    use depot_registry::EntityPrototype;

    fn chef(world: &mut World, count: usize) -> EntityId {
        world.spawn(&EntityPrototype {
            hands: Some(Hands {
                count,
                held: Vec::new(),
            }),
            ..EntityPrototype::named("chef")
        })
    }

    #[test]
    fn test_pickup_needs_a_free_hand() {
        let mut world = World::new(DepotConfig::default());
        let fridge = anchored_receptacle(&mut world, "fridge");
        let key = world.containers.ensure_container(fridge, "storage");
        let cola = spawn_item(&mut world, "Cola");
        let water = spawn_item(&mut world, "Water");
        world.containers.insert(&world.registry, cola, &key);
        world.containers.insert(&world.registry, water, &key);
        let chef = chef(&mut world, 1);

        assert!(try_pickup(&mut world, chef, cola, &key));
        assert!(!try_pickup(&mut world, chef, water, &key));
        assert!(world.containers.contains_in(&key, water));
    }

    #[test]
    fn test_refused_drop_returns_to_hand() {
        let mut world = World::new(DepotConfig::default());
        let fridge = anchored_receptacle(&mut world, "fridge");
        let key = world.containers.ensure_container(fridge, "storage");
        world.containers.set_capacity(&key, Some(0));
        let cola = spawn_item(&mut world, "Cola");
        let chef = chef(&mut world, 2);
        if let Some(hands) = world.registry.get_mut::<Hands>(chef) {
            hands.put(cola);
        }

        assert!(!try_drop_into_container(&mut world, chef, cola, &key));
        assert!(
            world
                .registry
                .get::<Hands>(chef)
                .is_some_and(|hands| hands.is_holding(cola))
        );
    }

    #[test]
    fn test_pickup_never_loses_the_item() {
        let mut world = World::new(DepotConfig::default());
        let fridge = anchored_receptacle(&mut world, "fridge");
        let key = world.containers.ensure_container(fridge, "storage");
        let cola = spawn_item(&mut world, "Cola");
        world.containers.insert(&world.registry, cola, &key);
        let chef = chef(&mut world, 2);
        // A stale entry for the contained item
        if let Some(hands) = world.registry.get_mut::<Hands>(chef) {
            hands.held.push(cola);
        }

        assert!(!try_pickup(&mut world, chef, cola, &key));
        assert!(world.containers.contains_in(&key, cola));
    }

    #[test]
    fn test_move_into_container_empties_the_hand() {
        let mut world = World::new(DepotConfig::default());
        let fridge = anchored_receptacle(&mut world, "fridge");
        let key = world.containers.ensure_container(fridge, "storage");
        let cola = spawn_item(&mut world, "Cola");
        let water = spawn_item(&mut world, "Water");
        let chef = chef(&mut world, 2);
        if let Some(hands) = world.registry.get_mut::<Hands>(chef) {
            hands.put(cola);
        }
        assert_eq!(holder_of(&world, cola), Some(chef));
        assert_eq!(holder_of(&world, water), None);

        assert!(try_move_into_container(&mut world, cola, &key));
        assert!(try_move_into_container(&mut world, water, &key));
        assert_eq!(holder_of(&world, cola), None);
        assert_eq!(world.containers.contents(&key).to_vec(), vec![cola, water]);

        // Refused, so it stays in hand
        let full = world.containers.ensure_container(fridge, "full");
        world.containers.set_capacity(&full, Some(0));
        let pie = spawn_item(&mut world, "pie");
        if let Some(hands) = world.registry.get_mut::<Hands>(chef) {
            hands.put(pie);
        }
        assert!(!try_move_into_container(&mut world, pie, &full));
        assert_eq!(holder_of(&world, pie), Some(chef));
    }

    #[test]
    fn test_drop_out_places_item() {
        let mut world = World::new(DepotConfig::default());
        let fridge = anchored_receptacle(&mut world, "fridge");
        let key = world.containers.ensure_container(fridge, "storage");
        let cola = spawn_item(&mut world, "Cola");
        world.containers.insert(&world.registry, cola, &key);

        let spot = Coordinates::new(3.0, 4.0);
        assert!(try_drop_out(&mut world, cola, &key, spot));
        assert_eq!(coordinates_of(&world, cola), spot);
        assert!(!try_drop_out(&mut world, cola, &key, spot));
    }
}
