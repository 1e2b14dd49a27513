//! # Depot Core
//!
//! Receptacles: objects that take other objects in and later let them out.
//! This crate has the shared container bookkeeping, the insertion protocol
//! every receptacle goes through, disposal units with their pressure cycle
//! and smart fridges with their grouped inventory.
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    clippy::unwrap_used
)]
#![allow(
    clippy::single_call_fn,
    clippy::multiple_inherent_impl,
    clippy::shadow_unrelated,
    clippy::missing_errors_doc,
    clippy::struct_excessive_bools,
    clippy::module_name_repetitions
)]

pub mod config;
pub mod container;
pub mod disposal;
pub mod do_after;
pub mod hands;
pub mod insertion;
pub mod smart_fridge;
pub mod ui;
pub mod world;

pub use config::{ConfigError, DepotConfig, DisposalConfig};
pub use container::{ContainerChange, ContainerKey, ContainerManager, Teardown};
pub use world::World;

#[cfg(test)]
pub(crate) mod test_support {
    use depot_registry::{EntityPrototype, Transform};
    use depot_utils::EntityId;

    use crate::world::World;

    /// Spawns an anchored object at the origin.
    pub fn anchored_receptacle(world: &mut World, name: &str) -> EntityId {
        world.spawn(&EntityPrototype {
            transform: Some(Transform {
                anchored: true,
                ..Transform::default()
            }),
            ..EntityPrototype::named(name)
        })
    }

    /// Spawns a portable item.
    pub fn spawn_item(world: &mut World, name: &str) -> EntityId {
        world.spawn(&EntityPrototype {
            item: true,
            ..EntityPrototype::named(name)
        })
    }
}
