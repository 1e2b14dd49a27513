//! This module contains the `World` struct, which owns every piece of
//! simulation state and drives it one step at a time.

use depot_registry::{Damageable, EntityPrototype, ObjectRegistry, Transform};
use depot_utils::{Coordinates, EntityId, FixedPoint2, GameTiming, TimeSpan};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::DepotConfig;
use crate::container::{ContainerChange, ContainerManager, Teardown};
use crate::disposal::{self, DisposalUnit, FlushedContents};
use crate::do_after::{DoAfterEvent, DoAfterOutcome, DoAfterScheduler};
use crate::insertion::HookTable;
use crate::insertion::click_to_insert::ClickToInsert;
use crate::smart_fridge::{self, SmartFridge};
use crate::ui::UserInterfaceSystem;

/// A simulated world.
///
/// Everything runs on the thread that owns the world. Systems are free
/// functions taking the world, so its parts are public to allow borrowing
/// them independently.
#[derive(Debug)]
pub struct World {
    /// Every object and its capabilities.
    pub registry: ObjectRegistry,
    /// Every container.
    pub containers: ContainerManager,
    /// Insertion hooks per receptacle.
    pub hooks: HookTable,
    /// Running do-afters.
    pub do_afters: DoAfterScheduler,
    /// Published interface states.
    pub ui: UserInterfaceSystem,
    /// Disposal units by receptacle.
    pub disposals: FxHashMap<EntityId, DisposalUnit>,
    /// Smart fridges by receptacle.
    pub smart_fridges: FxHashMap<EntityId, SmartFridge>,
    /// Click-to-insert targets by receptacle.
    pub click_to_insert: FxHashMap<EntityId, ClickToInsert>,
    timing: GameTiming,
    flushed: Vec<FlushedContents>,
    config: DepotConfig,
}

impl World {
    /// Creates an empty world at time zero.
    #[must_use]
    pub fn new(config: DepotConfig) -> Self {
        Self {
            registry: ObjectRegistry::new(),
            containers: ContainerManager::new(),
            hooks: HookTable::default(),
            do_afters: DoAfterScheduler::new(),
            ui: UserInterfaceSystem::new(),
            disposals: FxHashMap::default(),
            smart_fridges: FxHashMap::default(),
            click_to_insert: FxHashMap::default(),
            timing: GameTiming::new(f64::from(config.tick_rate)),
            flushed: Vec::new(),
            config,
        }
    }

    /// The configuration the world was created with.
    #[must_use]
    pub const fn config(&self) -> &DepotConfig {
        &self.config
    }

    /// Current simulation time.
    #[must_use]
    pub const fn cur_time(&self) -> TimeSpan {
        self.timing.cur_time()
    }

    /// Number of steps taken.
    #[must_use]
    pub const fn cur_tick(&self) -> u64 {
        self.timing.cur_tick()
    }

    /// Total time `entity` has spent paused.
    #[must_use]
    pub fn pause_time(&self, entity: EntityId) -> TimeSpan {
        self.registry.pause_time(entity, self.cur_time())
    }

    /// Pauses `entity`'s timers.
    pub fn pause(&mut self, entity: EntityId) {
        let now = self.cur_time();
        self.registry.pause(entity, now);
    }

    /// Resumes `entity`'s timers.
    pub fn unpause(&mut self, entity: EntityId) {
        let now = self.cur_time();
        self.registry.unpause(entity, now);
    }

    /// Creates an object from a prototype.
    pub fn spawn(&mut self, prototype: &EntityPrototype) -> EntityId {
        self.registry.spawn_prototype(prototype)
    }

    /// Removes an object along with its containers, hooks and receptacle state.
    ///
    /// What was inside is released or deleted according to `teardown`.
    pub fn despawn(&mut self, entity: EntityId, teardown: Teardown) -> bool {
        if !self.registry.exists(entity) {
            return false;
        }
        self.containers.remove_from_parent(entity);
        let affected = self.containers.shutdown_owner(&mut self.registry, entity, teardown);

        // Deleted contents may have been receptacles themselves
        let mut gone = vec![entity];
        if teardown == Teardown::Delete {
            gone.extend(affected);
        }
        for id in gone {
            self.hooks.remove_receptacle(id);
            self.ui.remove_receptacle(id);
            self.disposals.remove(&id);
            self.smart_fridges.remove(&id);
            self.click_to_insert.remove(&id);
        }

        self.registry.despawn(entity);
        self.process_container_changes();
        true
    }

    /// Returns true if `entity` is fixed in place.
    #[must_use]
    pub fn is_anchored(&self, entity: EntityId) -> bool {
        self.registry
            .get::<Transform>(entity)
            .is_some_and(|transform| transform.anchored)
    }

    /// Moves `entity` without changing whether it is anchored.
    pub fn move_to(&mut self, entity: EntityId, coordinates: Coordinates) {
        match self.registry.get_mut::<Transform>(entity) {
            Some(transform) => transform.coordinates = coordinates,
            None => self.registry.insert(
                entity,
                Transform {
                    anchored: false,
                    coordinates,
                },
            ),
        }
    }

    /// Deals `amount` damage to `entity`, if it can take damage.
    pub fn damage(&mut self, entity: EntityId, amount: FixedPoint2) {
        if let Some(damageable) = self.registry.get_mut::<Damageable>(entity) {
            damageable.total += amount;
        }
    }

    /// Name and id of `entity` for log lines.
    #[must_use]
    pub fn describe(&self, entity: EntityId) -> String {
        match self.registry.name(entity) {
            Some(name) => format!("{name} ({entity})"),
            None => entity.to_string(),
        }
    }

    /// The disposal unit `entity`, if it is one.
    #[must_use]
    pub fn disposal(&self, entity: EntityId) -> Option<&DisposalUnit> {
        self.disposals.get(&entity)
    }

    /// The smart fridge `entity`, if it is one.
    #[must_use]
    pub fn smart_fridge(&self, entity: EntityId) -> Option<&SmartFridge> {
        self.smart_fridges.get(&entity)
    }

    pub(crate) fn push_flushed(&mut self, flushed: FlushedContents) {
        self.flushed.push(flushed);
    }

    /// Takes everything flushed since the last call.
    pub fn drain_flushed(&mut self) -> Vec<FlushedContents> {
        std::mem::take(&mut self.flushed)
    }

    /// Runs a single step.
    pub fn tick(&mut self) {
        self.timing.advance();
        let now = self.cur_time();

        for outcome in self.do_afters.update(&self.registry, now) {
            self.dispatch_do_after(outcome);
        }

        let mut units: Vec<EntityId> = self.disposals.keys().copied().collect();
        units.sort_unstable();
        for unit in units {
            disposal::update(self, unit);
        }

        self.process_container_changes();
    }

    /// Runs steps until at least `span` has passed.
    pub fn advance_by(&mut self, span: TimeSpan) {
        let target = self.cur_time() + span;
        while self.cur_time() < target {
            self.tick();
        }
    }

    fn dispatch_do_after(&mut self, outcome: DoAfterOutcome) {
        match outcome {
            DoAfterOutcome::Finished { args, .. } => match args.event {
                DoAfterEvent::DisposalInsert { unit } => {
                    if let Some(target) = args.target {
                        disposal::complete_insert(self, unit, target, args.user);
                    }
                }
            },
            DoAfterOutcome::Cancelled { id, args, reason } => {
                log::debug!("{} stopped {:?} ({id:?}): {reason:?}", self.describe(args.user), args.event);
            }
        }
    }

    /// Refreshes every receptacle whose contents changed since the last call.
    pub fn process_container_changes(&mut self) {
        let changes = self.containers.drain_changes();
        if changes.is_empty() {
            return;
        }

        let mut owners: Vec<EntityId> = changes
            .iter()
            .map(ContainerChange::key)
            .map(|key| key.owner)
            .collect::<FxHashSet<_>>()
            .into_iter()
            .collect();
        owners.sort_unstable();

        for owner in owners {
            if self.smart_fridges.contains_key(&owner) {
                smart_fridge::publish_inventory(self, owner);
            }
            if self.disposals.contains_key(&owner) {
                disposal::update_visual_state(self, owner);
            }
        }
    }
}
