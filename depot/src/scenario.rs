//! Scripted scenarios.
//!
//! A scenario file lists the objects to spawn, which of them are
//! receptacles, what happens at which point in time and what the world
//! should look like afterwards. [`ScenarioRun`] owns the world and advances
//! it one step at a time so the runner can drive it at any pace.

use std::{fmt, fs, io, path::Path};

use depot_core::container::ContainerKey;
use depot_core::disposal::{self, pressure::PressureState};
use depot_core::insertion::click_to_insert;
use depot_core::smart_fridge::{self, dispense::DispenseRequest};
use depot_core::{DepotConfig, World};
use depot_registry::{EntityPrototype, Hands};
use depot_utils::{Coordinates, EntityId, FixedPoint2, TimeSpan};
use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;

/// Errors while loading or building a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// The file couldn't be read.
    #[error("failed to read scenario: {0}")]
    Io(#[from] io::Error),
    /// The file isn't valid JSON5 or doesn't match the schema.
    #[error("failed to parse scenario: {0}")]
    Parse(#[from] serde_json5::Error),
    /// Two objects share a name.
    #[error("object '{0}' is defined twice")]
    DuplicateEntity(String),
    /// A step or expectation names an object that isn't defined.
    #[error("unknown object '{0}'")]
    UnknownEntity(String),
    /// The object has no container to put things in.
    #[error("'{0}' is not a receptacle")]
    NotAReceptacle(String),
    /// The object has no hands to hold things.
    #[error("'{0}' has no hands")]
    NoHands(String),
}

/// A scenario file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Shown in the log.
    #[serde(default)]
    pub name: String,
    /// Objects, spawned in order.
    pub entities: Vec<ScenarioEntity>,
    /// Actions, run once the clock reaches their time.
    #[serde(default)]
    pub steps: Vec<Step>,
    /// How long to simulate. Defaults to one second past the last step.
    #[serde(default)]
    pub duration: Option<TimeSpan>,
    /// Checked after the last step.
    #[serde(default)]
    pub expect: Vec<Expectation>,
}

/// One object of a scenario.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioEntity {
    /// Name used by steps and expectations.
    pub id: String,
    /// What the object starts with.
    #[serde(default)]
    pub prototype: EntityPrototype,
    /// Receptacle behaviour to attach.
    #[serde(default)]
    pub role: Option<Role>,
    /// Puts the object into the hands of another object.
    #[serde(default)]
    pub held_by: Option<String>,
    /// Puts the object into a receptacle defined earlier.
    #[serde(default)]
    pub inside: Option<String>,
}

/// Receptacle behaviour of an object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// A disposal unit.
    Disposal,
    /// A smart fridge.
    SmartFridge,
    /// Accepts held items into the named container.
    ClickToInsert {
        /// Container id on the receptacle.
        target: String,
    },
}

/// A timed action.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Step {
    /// Seconds since the start.
    pub at: TimeSpan,
    /// What happens.
    pub action: Action,
}

/// Something a step does.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Drag-drops `item` into a disposal unit, or throws it in without a `user`.
    Insert {
        /// The disposal unit.
        receptacle: String,
        /// What goes in.
        item: String,
        /// Who does it.
        #[serde(default)]
        user: Option<String>,
    },
    /// `user` uses the held `item` on a receptacle.
    InsertHeld {
        /// Any receptacle.
        receptacle: String,
        /// Who does it.
        user: String,
        /// The held item.
        item: String,
    },
    /// Asks a fridge for `amount` objects listed as `item`.
    Dispense {
        /// The fridge.
        fridge: String,
        /// Who gets the items.
        actor: String,
        /// Display name of the entry.
        item: String,
        /// Restricts the lookup to one category.
        #[serde(default)]
        group: Option<String>,
        /// How many to dispense.
        amount: i32,
    },
    /// Switches a disposal unit's power.
    SetPowered {
        /// The disposal unit.
        unit: String,
        /// New power state.
        powered: bool,
    },
    /// Pulls a disposal unit's handle.
    Engage {
        /// The disposal unit.
        unit: String,
    },
    /// Releases a disposal unit's handle.
    Disengage {
        /// The disposal unit.
        unit: String,
    },
    /// Disables a disposal unit's pressure requirement.
    Emag {
        /// The disposal unit.
        unit: String,
    },
    /// Empties a disposal unit onto the floor.
    Eject {
        /// The disposal unit.
        unit: String,
    },
    /// Lets `occupant` try to climb out of a disposal unit.
    Exit {
        /// The disposal unit.
        unit: String,
        /// Who climbs out.
        occupant: String,
    },
    /// Pauses an object's timers.
    Pause {
        /// The object.
        entity: String,
    },
    /// Resumes an object's timers.
    Unpause {
        /// The object.
        entity: String,
    },
    /// Moves an object.
    Move {
        /// The object.
        entity: String,
        /// Target x in tiles.
        x: f32,
        /// Target y in tiles.
        y: f32,
    },
    /// Hurts an object.
    Damage {
        /// The object.
        entity: String,
        /// Damage dealt.
        amount: FixedPoint2,
    },
}

/// A condition checked at the end of a run.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expectation {
    /// Number of objects in a receptacle.
    Contents {
        /// The receptacle.
        receptacle: String,
        /// Expected count.
        count: usize,
    },
    /// Number of objects flushed by all disposal units together.
    Flushed {
        /// Expected count.
        count: usize,
    },
    /// Pressure state of a disposal unit.
    PressureState {
        /// The disposal unit.
        unit: String,
        /// Expected state.
        state: PressureState,
    },
    /// Listed amount of a fridge entry. Zero means not listed.
    Inventory {
        /// The fridge.
        fridge: String,
        /// Display name of the entry.
        item: String,
        /// Expected amount over all matching entries.
        amount: u32,
    },
    /// Number of items in an object's hands.
    Held {
        /// The object with hands.
        actor: String,
        /// Expected count.
        count: usize,
    },
}

/// An expectation that didn't hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectationFailure {
    /// What was checked.
    pub what: String,
    /// Expected value.
    pub expected: String,
    /// Actual value.
    pub actual: String,
}

impl fmt::Display for ExpectationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: expected {}, got {}", self.what, self.expected, self.actual)
    }
}

impl Scenario {
    /// Reads a scenario file.
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let scenario_str = fs::read_to_string(path)?;
        Self::from_json5(&scenario_str)
    }

    /// Parses a scenario.
    pub fn from_json5(scenario_str: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json5::from_str(scenario_str)?)
    }

    /// Time at which the run is over.
    #[must_use]
    pub fn end_time(&self) -> TimeSpan {
        self.duration.unwrap_or_else(|| {
            self.steps
                .iter()
                .map(|step| step.at)
                .max()
                .unwrap_or(TimeSpan::ZERO)
                + TimeSpan::from_secs(1)
        })
    }
}

/// A scenario being simulated.
#[derive(Debug)]
pub struct ScenarioRun {
    world: World,
    names: FxHashMap<String, EntityId>,
    steps: Vec<Step>,
    next_step: usize,
    end_time: TimeSpan,
    expect: Vec<Expectation>,
    flushed: usize,
}

impl ScenarioRun {
    /// Spawns everything the scenario lists and checks every name it uses.
    pub fn new(config: DepotConfig, scenario: Scenario) -> Result<Self, ScenarioError> {
        let end_time = scenario.end_time();
        let mut run = Self {
            world: World::new(config),
            names: FxHashMap::default(),
            steps: Vec::new(),
            next_step: 0,
            end_time,
            expect: Vec::new(),
            flushed: 0,
        };

        for entity in &scenario.entities {
            run.spawn(entity)?;
        }

        for step in &scenario.steps {
            for name in step.action.names() {
                run.lookup(name)?;
            }
        }
        for expectation in &scenario.expect {
            for name in expectation.names() {
                run.lookup(name)?;
            }
        }

        let mut steps = scenario.steps;
        // Stable, so steps sharing a time keep file order
        steps.sort_by_key(|step| step.at);
        run.steps = steps;
        run.expect = scenario.expect;
        run.world.process_container_changes();
        Ok(run)
    }

    fn spawn(&mut self, definition: &ScenarioEntity) -> Result<(), ScenarioError> {
        if self.names.contains_key(&definition.id) {
            return Err(ScenarioError::DuplicateEntity(definition.id.clone()));
        }
        let entity = self.world.spawn(&definition.prototype);
        self.names.insert(definition.id.clone(), entity);

        match &definition.role {
            Some(Role::Disposal) => {
                disposal::init(&mut self.world, entity);
            }
            Some(Role::SmartFridge) => {
                smart_fridge::init(&mut self.world, entity);
            }
            Some(Role::ClickToInsert { target }) => {
                click_to_insert::init(&mut self.world, entity, target.clone());
            }
            None => {}
        }

        if let Some(holder) = &definition.held_by {
            let holder_id = self.lookup(holder)?;
            let held = self
                .world
                .registry
                .get_mut::<Hands>(holder_id)
                .is_some_and(|hands| hands.put(entity));
            if !held {
                return Err(ScenarioError::NoHands(holder.clone()));
            }
        }

        if let Some(receptacle) = &definition.inside {
            let key = self.container_of(receptacle)?;
            if !self.world.containers.insert(&self.world.registry, entity, &key) {
                log::warn!("'{}' doesn't fit into '{receptacle}'", definition.id);
            }
        }
        Ok(())
    }

    fn lookup(&self, name: &str) -> Result<EntityId, ScenarioError> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| ScenarioError::UnknownEntity(name.to_string()))
    }

    fn container_of(&self, name: &str) -> Result<ContainerKey, ScenarioError> {
        let receptacle = self.lookup(name)?;
        receptacle_container(&self.world, receptacle).ok_or_else(|| ScenarioError::NotAReceptacle(name.to_string()))
    }

    /// The simulated world.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the world, e.g. to attach a UI sink.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The object spawned under `name`.
    #[must_use]
    pub fn entity(&self, name: &str) -> Option<EntityId> {
        self.names.get(name).copied()
    }

    /// Total number of objects flushed so far.
    #[must_use]
    pub const fn flushed(&self) -> usize {
        self.flushed
    }

    /// Returns true once the clock has passed the end of the scenario.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.next_step >= self.steps.len() && self.world.cur_time() >= self.end_time
    }

    /// Runs every step that is due, then advances the world by one step.
    pub fn step(&mut self) {
        let now = self.world.cur_time();
        while let Some(step) = self.steps.get(self.next_step)
            && step.at <= now
        {
            let action = step.action.clone();
            self.next_step += 1;
            let span = tracing::info_span!("step", at = %step.at, action = action.label());
            let _enter = span.enter();
            self.apply(&action);
        }

        self.world.tick();
        for flushed in self.world.drain_flushed() {
            tracing::info!(unit = %flushed.unit, count = flushed.contents.len(), "flushed");
            self.flushed += flushed.contents.len();
        }
    }

    /// Steps until the scenario is over.
    pub fn run_to_end(&mut self) {
        while !self.is_finished() {
            self.step();
        }
    }

    fn id(&self, name: &str) -> EntityId {
        // Every name was resolved when the run was built
        self.names.get(name).copied().unwrap_or(EntityId(u32::MAX))
    }

    fn apply(&mut self, action: &Action) {
        let done = match action {
            Action::Insert { receptacle, item, user } => {
                let user = user.as_deref().map(|user| self.id(user));
                let (receptacle, item) = (self.id(receptacle), self.id(item));
                disposal::try_insert(&mut self.world, receptacle, item, user)
            }
            Action::InsertHeld { receptacle, user, item } => {
                let (receptacle, user, item) = (self.id(receptacle), self.id(user), self.id(item));
                insert_held(&mut self.world, receptacle, user, item)
            }
            Action::Dispense {
                fridge,
                actor,
                item,
                group,
                amount,
            } => {
                let (fridge, actor) = (self.id(fridge), self.id(actor));
                dispense(&mut self.world, fridge, actor, item, group.as_deref(), *amount)
            }
            Action::SetPowered { unit, powered } => {
                let unit = self.id(unit);
                disposal::set_powered(&mut self.world, unit, *powered);
                true
            }
            Action::Engage { unit } => {
                let unit = self.id(unit);
                disposal::set_engaged(&mut self.world, unit, true);
                true
            }
            Action::Disengage { unit } => {
                let unit = self.id(unit);
                disposal::set_engaged(&mut self.world, unit, false);
                true
            }
            Action::Emag { unit } => {
                let unit = self.id(unit);
                disposal::emag(&mut self.world, unit)
            }
            Action::Eject { unit } => {
                let unit = self.id(unit);
                disposal::try_eject_contents(&mut self.world, unit) > 0
            }
            Action::Exit { unit, occupant } => {
                let (unit, occupant) = (self.id(unit), self.id(occupant));
                disposal::try_exit(&mut self.world, unit, occupant)
            }
            Action::Pause { entity } => {
                let entity = self.id(entity);
                self.world.pause(entity);
                true
            }
            Action::Unpause { entity } => {
                let entity = self.id(entity);
                self.world.unpause(entity);
                true
            }
            Action::Move { entity, x, y } => {
                let entity = self.id(entity);
                self.world.move_to(entity, Coordinates::new(*x, *y));
                true
            }
            Action::Damage { entity, amount } => {
                let entity = self.id(entity);
                self.world.damage(entity, *amount);
                true
            }
        };
        if done {
            tracing::debug!("done");
        } else {
            tracing::info!("had no effect");
        }
    }

    /// Checks every expectation against the current world.
    #[must_use]
    pub fn check(&self) -> Vec<ExpectationFailure> {
        self.expect
            .iter()
            .filter_map(|expectation| self.check_one(expectation))
            .collect()
    }

    fn check_one(&self, expectation: &Expectation) -> Option<ExpectationFailure> {
        let (what, expected, actual) = match expectation {
            Expectation::Contents { receptacle, count } => {
                let actual = receptacle_container(&self.world, self.id(receptacle))
                    .map_or(0, |key| self.world.containers.contents(&key).len());
                (format!("contents of '{receptacle}'"), *count, actual)
            }
            Expectation::Flushed { count } => ("flushed objects".to_string(), *count, self.flushed),
            Expectation::PressureState { unit, state } => {
                let actual = disposal::state(&self.world, self.id(unit));
                if actual == Some(*state) {
                    return None;
                }
                return Some(ExpectationFailure {
                    what: format!("pressure state of '{unit}'"),
                    expected: format!("{state:?}"),
                    actual: actual.map_or_else(|| "no unit".to_string(), |actual| format!("{actual:?}")),
                });
            }
            Expectation::Inventory { fridge, item, amount } => {
                let actual: u32 = smart_fridge::get_inventory(&self.world, self.id(fridge))
                    .iter()
                    .flat_map(|group| &group.items)
                    .filter(|entry| entry.item_name == *item)
                    .map(|entry| entry.amount)
                    .sum();
                (format!("'{item}' listed in '{fridge}'"), *amount as usize, actual as usize)
            }
            Expectation::Held { actor, count } => {
                let actual = self
                    .world
                    .registry
                    .get::<Hands>(self.id(actor))
                    .map_or(0, |hands| hands.held.len());
                (format!("items held by '{actor}'"), *count, actual)
            }
        };
        (expected != actual).then(|| ExpectationFailure {
            what,
            expected: expected.to_string(),
            actual: actual.to_string(),
        })
    }
}

/// The container a receptacle of any kind puts things in.
fn receptacle_container(world: &World, receptacle: EntityId) -> Option<ContainerKey> {
    if let Some(unit) = world.disposal(receptacle) {
        return Some(unit.container.clone());
    }
    if let Some(fridge) = world.smart_fridge(receptacle) {
        return Some(fridge.container.clone());
    }
    world
        .click_to_insert
        .get(&receptacle)
        .map(|component| component.container.clone())
}

fn insert_held(world: &mut World, receptacle: EntityId, user: EntityId, item: EntityId) -> bool {
    if world.disposal(receptacle).is_some() {
        disposal::interact_using(world, receptacle, user, item)
    } else if world.smart_fridge(receptacle).is_some() {
        smart_fridge::try_insert_held(world, receptacle, user, item)
    } else {
        click_to_insert::interact_using(world, receptacle, user, item)
    }
}

fn dispense(
    world: &mut World,
    fridge: EntityId,
    actor: EntityId,
    item_name: &str,
    group: Option<&str>,
    amount: i32,
) -> bool {
    let entry = smart_fridge::get_inventory(world, fridge)
        .into_iter()
        .filter(|listed| group.is_none_or(|group| listed.name == group))
        .flat_map(|listed| listed.items)
        .find(|entry| entry.item_name == item_name);
    let Some(item) = entry else {
        tracing::info!("'{item_name}' isn't listed");
        return false;
    };
    let request = DispenseRequest { item, amount };
    !smart_fridge::dispense(world, fridge, actor, &request).is_empty()
}

impl Action {
    /// Short name for log lines.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Insert { .. } => "insert",
            Self::InsertHeld { .. } => "insert_held",
            Self::Dispense { .. } => "dispense",
            Self::SetPowered { .. } => "set_powered",
            Self::Engage { .. } => "engage",
            Self::Disengage { .. } => "disengage",
            Self::Emag { .. } => "emag",
            Self::Eject { .. } => "eject",
            Self::Exit { .. } => "exit",
            Self::Pause { .. } => "pause",
            Self::Unpause { .. } => "unpause",
            Self::Move { .. } => "move",
            Self::Damage { .. } => "damage",
        }
    }

    fn names(&self) -> Vec<&str> {
        match self {
            Self::Insert { receptacle, item, user } => {
                let mut names = vec![receptacle.as_str(), item.as_str()];
                names.extend(user.as_deref());
                names
            }
            Self::InsertHeld { receptacle, user, item } => vec![receptacle.as_str(), user.as_str(), item.as_str()],
            Self::Dispense { fridge, actor, .. } => vec![fridge.as_str(), actor.as_str()],
            Self::Exit { unit, occupant } => vec![unit.as_str(), occupant.as_str()],
            Self::SetPowered { unit, .. }
            | Self::Engage { unit }
            | Self::Disengage { unit }
            | Self::Emag { unit }
            | Self::Eject { unit } => vec![unit.as_str()],
            Self::Pause { entity }
            | Self::Unpause { entity }
            | Self::Move { entity, .. }
            | Self::Damage { entity, .. } => vec![entity.as_str()],
        }
    }
}

impl Expectation {
    fn names(&self) -> Vec<&str> {
        match self {
            Self::Contents { receptacle, .. } => vec![receptacle.as_str()],
            Self::Flushed { .. } => Vec::new(),
            Self::PressureState { unit, .. } => vec![unit.as_str()],
            Self::Inventory { fridge, .. } => vec![fridge.as_str()],
            Self::Held { actor, .. } => vec![actor.as_str()],
        }
    }
}
