//! Ad-hoc insert targets.
//!
//! Any anchored receptacle can accept held items by getting a
//! [`ClickToInsert`] component. Whether a specific item is accepted is left
//! entirely to the hooks registered on the receptacle.

use depot_registry::Hands;
use depot_utils::{ContainerId, EntityId};

use crate::container::ContainerKey;
use crate::world::World;

/// Marks a receptacle as accepting held items into `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickToInsert {
    /// Container id on the receptacle.
    pub target: ContainerId,
    /// The container, once initialized.
    pub container: ContainerKey,
}

/// Sets up the receptacle and its target container.
pub fn init(world: &mut World, receptacle: EntityId, target: impl Into<ContainerId>) -> ContainerKey {
    let target = target.into();
    log::debug!("Initialising container '{target}' on {receptacle}");
    let container = world.containers.ensure_container(receptacle, target.clone());
    world.click_to_insert.insert(
        receptacle,
        ClickToInsert {
            target,
            container: container.clone(),
        },
    );
    container
}

/// Returns true if `user` should be offered an "insert" interaction for `using`.
#[must_use]
pub fn insert_verb_available(world: &World, receptacle: EntityId, user: EntityId, using: Option<EntityId>) -> bool {
    let Some(using) = using else {
        return false;
    };
    if !world.click_to_insert.contains_key(&receptacle) {
        return false;
    }
    let can_drop = world
        .registry
        .get::<Hands>(user)
        .is_some_and(|hands| hands.is_holding(using));
    can_drop && super::can_insert(world, receptacle, using)
}

/// `user` uses the held item `used` on the receptacle.
pub fn interact_using(world: &mut World, receptacle: EntityId, user: EntityId, used: EntityId) -> bool {
    let Some(target) = world
        .click_to_insert
        .get(&receptacle)
        .map(|component| component.target.clone())
    else {
        return false;
    };
    super::try_insert_held(world, receptacle, &target, user, used)
}
