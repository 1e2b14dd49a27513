use depot_registry::{Body, Hands, Item, Physics, Tags, ThrownItem};
use depot_utils::{EntityId, TimeSpan};

use super::pressure::{self, PressureState};
use super::{
    DISPOSAL_CONTAINER, DisposalUnit, DisposalUnitHook, DisposalUnitState, DisposalVisuals, EXIT_ATTEMPT_DELAY,
    FlushedContents,
};
use crate::container::ContainerKey;
use crate::do_after::{DoAfterArgs, DoAfterEvent};
use crate::hands;
use crate::insertion;
use crate::ui::{BoundUiState, UiKey};
use crate::world::World;

/// Turns `unit` into a disposal unit using the configured defaults.
///
/// Initializing an existing unit again keeps its state and contents.
pub fn init(world: &mut World, unit: EntityId) -> ContainerKey {
    let container = world.containers.ensure_container(unit, DISPOSAL_CONTAINER);
    if !world.disposals.contains_key(&unit) {
        let disposal = DisposalUnit::new(container.clone(), &world.config().disposal);
        world.disposals.insert(unit, disposal);
        log::debug!("Initialised disposal unit {unit}");
    }
    world.hooks.register(unit, DisposalUnitHook);
    update_visual_state(world, unit);
    container
}

/// Pressure state of the unit right now.
#[must_use]
pub fn state(world: &World, unit: EntityId) -> Option<PressureState> {
    let disposal = world.disposals.get(&unit)?;
    Some(pressure::pressure_state(
        disposal.next_pressurized,
        disposal.flush_delay,
        world.pause_time(unit),
        world.cur_time(),
    ))
}

/// Pressure of the unit right now, `0.0` for anything that isn't a unit.
#[must_use]
pub fn current_pressure(world: &World, unit: EntityId) -> f64 {
    world.disposals.get(&unit).map_or(0.0, |disposal| {
        pressure::pressure(disposal.next_pressurized, world.pause_time(unit), world.cur_time())
    })
}

/// Whether `entity` may go into the unit.
#[must_use]
pub fn can_insert(world: &World, unit: EntityId, entity: EntityId) -> bool {
    let Some(disposal) = world.disposals.get(&unit) else {
        return false;
    };
    if !world.is_anchored(unit) {
        return false;
    }

    let storable = world.registry.has::<Item>(entity);
    if !storable && !world.registry.has::<Body>(entity) {
        return false;
    }

    if !passes_tag_lists(world, disposal, entity) {
        return false;
    }

    storable
        || world
            .registry
            .get::<Physics>(entity)
            .is_some_and(|physics| physics.can_collide)
}

fn passes_tag_lists(world: &World, disposal: &DisposalUnit, entity: EntityId) -> bool {
    let tags = world.registry.get::<Tags>(entity);
    let has_any = |list: &[String]| tags.is_some_and(|tags| list.iter().any(|tag| tags.contains(tag)));

    let blacklisted = disposal.blacklist.as_deref().is_some_and(has_any);
    let whitelisted = disposal.whitelist.as_deref().is_none_or(has_any);
    !blacklisted && whitelisted
}

/// Whether `dragged` may be dropped onto the unit.
#[must_use]
pub fn can_drag_drop_on(world: &World, unit: EntityId, dragged: EntityId) -> bool {
    can_insert(world, unit, dragged)
}

/// Puts `to_insert` into the unit, on behalf of `user` if given.
///
/// Mobs climbing in on their own wait `entry_delay`, anything put in by
/// someone else waits `dragged_entry_delay`. Without a user or delay the
/// insert happens immediately, otherwise a do-after is started that breaks
/// when the user is hurt or moves.
pub fn try_insert(world: &mut World, unit: EntityId, to_insert: EntityId, user: Option<EntityId>) -> bool {
    let Some(disposal) = world.disposals.get(&unit) else {
        return false;
    };
    let (entry_delay, dragged_entry_delay) = (disposal.entry_delay, disposal.dragged_entry_delay);

    // Mobs without hands can still jump in themselves
    if let Some(user) = user
        && user != to_insert
        && !world.registry.has::<Hands>(user)
    {
        log::debug!("{} has no hands to put {to_insert} into {unit}", world.describe(user));
        return false;
    }

    if let Err(rejection) = insertion::check_insert(world, unit, to_insert) {
        log::debug!("Can't insert into disposal unit {unit}: {rejection}");
        return false;
    }

    let inserting_self = user == Some(to_insert);
    let delay = if inserting_self {
        entry_delay
    } else {
        dragged_entry_delay
    };

    let Some(user) = user.filter(|_| delay.is_positive()) else {
        return insertion::insert(world, unit, &DISPOSAL_CONTAINER, to_insert, user);
    };

    if !inserting_self {
        log::debug!("{} is being put into {unit}", world.describe(to_insert));
    }
    let args = DoAfterArgs {
        target: Some(to_insert),
        used: Some(unit),
        break_on_damage: true,
        break_on_move: true,
        ..DoAfterArgs::new(user, delay, DoAfterEvent::DisposalInsert { unit })
    };
    let now = world.cur_time();
    world.do_afters.start(&world.registry, now, args).is_some()
}

/// Finishes an insert started by [`try_insert`] once its do-after completed.
pub fn complete_insert(world: &mut World, unit: EntityId, to_insert: EntityId, user: EntityId) -> bool {
    // Things may have changed while the do-after ran
    if let Err(rejection) = insertion::check_insert(world, unit, to_insert) {
        log::debug!("{} can no longer go into {unit}: {rejection}", world.describe(to_insert));
        return false;
    }
    insertion::insert(world, unit, &DISPOSAL_CONTAINER, to_insert, Some(user))
}

/// `user` uses the held item `used` on the unit.
pub fn interact_using(world: &mut World, unit: EntityId, user: EntityId, used: EntityId) -> bool {
    if !world.disposals.contains_key(&unit) {
        return false;
    }
    insertion::try_insert_held(world, unit, &DISPOSAL_CONTAINER, user, used)
}

/// Bookkeeping after `inserted` went into the unit.
///
/// With `do_insert` the container insert is performed here as well, and a
/// failing insert stops everything else.
pub fn after_insert(
    world: &mut World,
    unit: EntityId,
    inserted: EntityId,
    user: Option<EntityId>,
    do_insert: bool,
) -> bool {
    let Some(container) = world.disposals.get(&unit).map(|d| d.container.clone()) else {
        return false;
    };

    if do_insert && !hands::try_move_into_container(world, inserted, &container) {
        log::debug!("Disposal unit {unit} refused {inserted}");
        return false;
    }

    if let Some(user) = user
        && user != inserted
    {
        log::info!(
            "{} inserted {} into {}",
            world.describe(user),
            world.describe(inserted),
            world.describe(unit)
        );
    }

    queue_automatic_engage(world, unit);
    world.ui.close(unit, UiKey::DisposalUnit, inserted);
    update_visual_state(world, unit);
    true
}

/// Schedules an automatic flush if the unit is set up for it.
///
/// An already scheduled flush is never pushed back.
pub fn queue_automatic_engage(world: &mut World, unit: EntityId) {
    let now = world.cur_time();
    let pause_time = world.pause_time(unit);
    let has_contents = match world.disposals.get(&unit) {
        Some(disposal) => !world.containers.contents(&disposal.container).is_empty(),
        None => return,
    };
    let Some(disposal) = world.disposals.get_mut(&unit) else {
        return;
    };
    if !disposal.automatic_engage || (!disposal.powered && !has_contents) {
        return;
    }

    let automatic_time = now + disposal.automatic_engage_time - pause_time;
    disposal.next_flush = Some(pressure::earliest_flush(disposal.next_flush, automatic_time));
    log::trace!("Disposal unit {unit} will flush at {:?}", disposal.next_flush);
}

/// Display projection of the unit.
#[must_use]
pub fn visuals(world: &World, unit: EntityId) -> Option<DisposalVisuals> {
    let disposal = world.disposals.get(&unit)?;
    let state = state(world, unit)?;
    Some(DisposalVisuals::compute(
        world.is_anchored(unit),
        state,
        disposal.engaged,
        disposal.powered,
        !world.containers.contents(&disposal.container).is_empty(),
    ))
}

/// Serializable snapshot of the unit.
#[must_use]
pub fn snapshot(world: &World, unit: EntityId) -> Option<DisposalUnitState> {
    let disposal = world.disposals.get(&unit)?;
    Some(DisposalUnitState {
        state: state(world, unit)?,
        next_pressurized: disposal.next_pressurized,
        automatic_engage_time: disposal.automatic_engage_time,
        next_flush: disposal.next_flush,
        powered: disposal.powered,
        engaged: disposal.engaged,
        recently_ejected: disposal
            .recently_ejected
            .iter()
            .filter_map(|entity| world.registry.uuid(*entity))
            .collect(),
        pressure: current_pressure(world, unit),
        visuals: visuals(world, unit)?,
    })
}

/// Recomputes the unit's appearance and publishes it.
pub fn update_visual_state(world: &mut World, unit: EntityId) {
    if let Some(snapshot) = snapshot(world, unit) {
        world
            .ui
            .set_state(unit, UiKey::DisposalUnit, BoundUiState::DisposalUnit(snapshot));
    }
}

/// Tampers with the unit so it flushes without pressure or power.
///
/// There is no way back.
pub fn emag(world: &mut World, unit: EntityId) -> bool {
    let Some(disposal) = world.disposals.get_mut(&unit) else {
        return false;
    };
    disposal.disable_pressure = true;
    log::info!("Disposal unit {unit} pressure checks disabled");
    update_visual_state(world, unit);
    true
}

/// Connects or disconnects the unit's power.
pub fn set_powered(world: &mut World, unit: EntityId, powered: bool) {
    let Some(disposal) = world.disposals.get_mut(&unit) else {
        return;
    };
    if disposal.powered == powered {
        return;
    }
    disposal.powered = powered;
    queue_automatic_engage(world, unit);
    update_visual_state(world, unit);
}

/// Pulls or releases the flush handle.
///
/// Pulling flushes right away when possible, otherwise the flush happens in
/// [`update`] once the unit is ready.
pub fn set_engaged(world: &mut World, unit: EntityId, engaged: bool) {
    let Some(disposal) = world.disposals.get_mut(&unit) else {
        return;
    };
    disposal.engaged = engaged;

    if engaged && can_flush(world, unit) {
        try_flush(world, unit);
        return;
    }
    queue_automatic_engage(world, unit);
    update_visual_state(world, unit);
}

/// Whether a flush would go through right now.
#[must_use]
pub fn can_flush(world: &World, unit: EntityId) -> bool {
    let Some(disposal) = world.disposals.get(&unit) else {
        return false;
    };
    if !world.is_anchored(unit) {
        return false;
    }
    disposal.disable_pressure || (disposal.powered && state(world, unit) == Some(PressureState::Ready))
}

/// Flushes everything in the unit into the pipe network.
///
/// The flushed objects are queued on the world, see
/// [`World::drain_flushed`](crate::world::World::drain_flushed).
pub fn try_flush(world: &mut World, unit: EntityId) -> bool {
    if !can_flush(world, unit) {
        return false;
    }
    let now = world.cur_time();
    let pause_time = world.pause_time(unit);
    let Some(container) = world.disposals.get(&unit).map(|d| d.container.clone()) else {
        return false;
    };

    let contents = world.containers.contents(&container).to_vec();
    for entity in &contents {
        world.containers.remove(*entity, &container);
    }

    if let Some(disposal) = world.disposals.get_mut(&unit) {
        let recharge = if disposal.disable_pressure {
            TimeSpan::ZERO
        } else {
            pressure::pressurize_time()
        };
        disposal.next_pressurized = now - pause_time + recharge;
        disposal.engaged = false;
        disposal.next_flush = None;
    }

    log::info!("{} flushed {} object(s)", world.describe(unit), contents.len());
    world.push_flushed(FlushedContents { unit, contents });
    update_visual_state(world, unit);
    true
}

/// Runs the unit for one step.
pub fn update(world: &mut World, unit: EntityId) {
    if world.registry.is_paused(unit) {
        return;
    }
    let now = world.cur_time();
    let pause_time = world.pause_time(unit);
    let Some(disposal) = world.disposals.get(&unit) else {
        return;
    };

    let flush_due = disposal
        .next_flush
        .is_some_and(|next_flush| next_flush + pause_time <= now);
    if (flush_due || disposal.engaged) && can_flush(world, unit) {
        try_flush(world, unit);
        return;
    }

    let published = match world.ui.state(unit, UiKey::DisposalUnit) {
        Some(BoundUiState::DisposalUnit(state)) => Some(state.visuals),
        _ => None,
    };
    if published != visuals(world, unit) {
        update_visual_state(world, unit);
    }
}

/// Throws everything out of the unit onto the floor around it.
///
/// Returns how many objects came out.
pub fn try_eject_contents(world: &mut World, unit: EntityId) -> usize {
    let Some(container) = world.disposals.get(&unit).map(|d| d.container.clone()) else {
        return 0;
    };
    let coordinates = hands::coordinates_of(world, unit);

    let mut ejected = Vec::new();
    for entity in world.containers.contents(&container).to_vec() {
        if hands::try_drop_out(world, entity, &container, coordinates) {
            ejected.push(entity);
        }
    }

    let count = ejected.len();
    if let Some(disposal) = world.disposals.get_mut(&unit) {
        disposal.recently_ejected.extend(ejected);
        if !disposal.automatic_engage {
            disposal.next_flush = None;
        }
    }
    log::debug!("Ejected {count} object(s) from {unit}");
    update_visual_state(world, unit);
    count
}

/// An occupant tries to climb out.
///
/// Attempts are throttled to one per [`EXIT_ATTEMPT_DELAY`].
pub fn try_exit(world: &mut World, unit: EntityId, occupant: EntityId) -> bool {
    let now = world.cur_time();
    let Some(disposal) = world.disposals.get_mut(&unit) else {
        return false;
    };
    if disposal
        .last_exit_attempt
        .is_some_and(|last| now < last + EXIT_ATTEMPT_DELAY)
    {
        return false;
    }
    disposal.last_exit_attempt = Some(now);
    let container = disposal.container.clone();

    let coordinates = hands::coordinates_of(world, unit);
    if !hands::try_drop_out(world, occupant, &container, coordinates) {
        return false;
    }
    if let Some(disposal) = world.disposals.get_mut(&unit) {
        disposal.recently_ejected.push(occupant);
    }
    log::debug!("{} climbed out of {unit}", world.describe(occupant));
    update_visual_state(world, unit);
    true
}

/// Whether the unit should let `other` pass through instead of colliding.
///
/// Dropped items and freshly ejected objects pass, thrown items don't.
#[must_use]
pub fn prevents_collision(world: &World, unit: EntityId, other: EntityId) -> bool {
    let Some(disposal) = world.disposals.get(&unit) else {
        return false;
    };
    if world.registry.has::<Item>(other) && !world.registry.has::<ThrownItem>(other) {
        return true;
    }
    disposal.recently_ejected.contains(&other)
}

/// `other` stopped touching the unit.
pub fn on_end_collide(world: &mut World, unit: EntityId, other: EntityId) {
    let Some(disposal) = world.disposals.get_mut(&unit) else {
        return;
    };
    let before = disposal.recently_ejected.len();
    disposal.recently_ejected.retain(|entity| *entity != other);
    if disposal.recently_ejected.len() != before {
        update_visual_state(world, unit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DepotConfig;
    use crate::insertion::{FilterMode, TagFilter};
    use crate::test_support::{anchored_receptacle, spawn_item};
    use depot_registry::{Damageable, EntityPrototype, Transform};
    use depot_utils::{Coordinates, FixedPoint2};

    /// Advances the world by whole seconds.
    fn run_for(world: &mut World, secs: i64) {
        let ticks = secs * i64::from(world.config().tick_rate);
        for _ in 0..ticks {
            world.tick();
        }
    }

    fn setup() -> (World, EntityId) {
        let mut world = World::new(DepotConfig::default());
        let unit = anchored_receptacle(&mut world, "disposal unit");
        init(&mut world, unit);
        (world, unit)
    }

    fn mob(world: &mut World, name: &str, hands: bool) -> EntityId {
        world.spawn(&EntityPrototype {
            transform: Some(Transform::default()),
            body: true,
            physics: Some(Physics { can_collide: true }),
            hands: hands.then(Hands::default),
            damageable: Some(Damageable::default()),
            ..EntityPrototype::named(name)
        })
    }

    fn contents(world: &World, unit: EntityId) -> Vec<EntityId> {
        let key = ContainerKey::new(unit, DISPOSAL_CONTAINER);
        world.containers.contents(&key).to_vec()
    }

    #[test]
    fn test_new_unit_is_ready() {
        let (world, unit) = setup();
        assert_eq!(state(&world, unit), Some(PressureState::Ready));
        // Unpowered
        assert!(!can_flush(&world, unit));
        assert_eq!(state(&world, EntityId(999)), None);
        assert!(current_pressure(&world, EntityId(999)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_can_insert_rules() {
        let (mut world, unit) = setup();
        let cola = spawn_item(&mut world, "Cola");
        let mouse = mob(&mut world, "mouse", false);
        let wall = world.spawn(&EntityPrototype {
            physics: Some(Physics { can_collide: true }),
            ..EntityPrototype::named("wall")
        });
        let ghost = world.spawn(&EntityPrototype {
            body: true,
            physics: Some(Physics { can_collide: false }),
            ..EntityPrototype::named("ghost")
        });

        assert!(can_insert(&world, unit, cola));
        assert!(can_insert(&world, unit, mouse));
        // Neither item nor body
        assert!(!can_insert(&world, unit, wall));
        // A body that doesn't collide
        assert!(!can_insert(&world, unit, ghost));

        if let Some(transform) = world.registry.get_mut::<Transform>(unit) {
            transform.anchored = false;
        }
        assert!(!can_insert(&world, unit, cola));
        assert!(!can_drag_drop_on(&world, unit, cola));
    }

    #[test]
    fn test_tag_lists() {
        let (mut world, unit) = setup();
        let pen = spawn_item(&mut world, "pen");
        let disk = spawn_item(&mut world, "nuke disk");
        world
            .registry
            .insert(disk, Tags(["high_value".to_string()].into_iter().collect()));

        if let Some(disposal) = world.disposals.get_mut(&unit) {
            disposal.blacklist = Some(vec!["high_value".to_string()]);
        }
        assert!(can_insert(&world, unit, pen));
        assert!(!can_insert(&world, unit, disk));

        if let Some(disposal) = world.disposals.get_mut(&unit) {
            disposal.blacklist = None;
            disposal.whitelist = Some(vec!["high_value".to_string()]);
        }
        assert!(!can_insert(&world, unit, pen));
        assert!(can_insert(&world, unit, disk));
    }

    #[test]
    fn test_immediate_insert_without_user() {
        let (mut world, unit) = setup();
        let cola = spawn_item(&mut world, "Cola");
        assert!(try_insert(&mut world, unit, cola, None));
        assert_eq!(contents(&world, unit), vec![cola]);
    }

    #[test]
    fn test_handless_user_can_only_insert_itself() {
        let (mut world, unit) = setup();
        let mouse = mob(&mut world, "mouse", false);
        let cola = spawn_item(&mut world, "Cola");

        assert!(!try_insert(&mut world, unit, cola, Some(mouse)));
        assert!(try_insert(&mut world, unit, mouse, Some(mouse)));
        assert_eq!(world.do_afters.len(), 1);

        run_for(&mut world, 2);
        assert_eq!(contents(&world, unit), vec![mouse]);
        // Bookkeeping ran through the unit's hook
        assert!(world.disposals.get(&unit).is_some_and(|d| d.next_flush.is_some()));
    }

    #[test]
    fn test_veto_during_do_after_stops_the_insert() {
        let (mut world, unit) = setup();
        world.hooks.register(
            unit,
            TagFilter {
                tag: "contraband".to_string(),
                mode: FilterMode::Deny,
            },
        );
        let janitor = mob(&mut world, "janitor", true);
        let clown = mob(&mut world, "clown", true);

        assert!(try_insert(&mut world, unit, clown, Some(janitor)));
        world
            .registry
            .insert(clown, Tags(["contraband".to_string()].into_iter().collect()));
        assert!(insertion::check_insert(&world, unit, clown).is_err());
        run_for(&mut world, 3);

        assert!(world.do_afters.is_empty());
        assert!(contents(&world, unit).is_empty());
        assert!(world.disposals.get(&unit).is_some_and(|d| d.next_flush.is_none()));
    }

    #[test]
    fn test_held_item_leaves_the_hand() {
        let (mut world, unit) = setup();
        set_powered(&mut world, unit, true);
        let chef = mob(&mut world, "chef", true);
        let janitor = mob(&mut world, "janitor", true);
        let cola = spawn_item(&mut world, "Cola");
        let water = spawn_item(&mut world, "Water");
        if let Some(hands) = world.registry.get_mut::<Hands>(chef) {
            hands.put(cola);
            hands.put(water);
        }

        // Thrown in straight from the chef's hand
        assert!(try_insert(&mut world, unit, cola, None));
        assert_eq!(hands::holder_of(&world, cola), None);

        // Snatched by the janitor
        assert!(try_insert(&mut world, unit, water, Some(janitor)));
        run_for(&mut world, 3);
        assert_eq!(hands::holder_of(&world, water), None);
        assert_eq!(contents(&world, unit), vec![cola, water]);

        set_engaged(&mut world, unit, true);
        assert!(contents(&world, unit).is_empty());
        assert!(
            world
                .registry
                .get::<Hands>(chef)
                .is_some_and(|hands| hands.held.is_empty())
        );
    }

    #[test]
    fn test_dragged_insert_breaks_on_move() {
        let (mut world, unit) = setup();
        let janitor = mob(&mut world, "janitor", true);
        let clown = mob(&mut world, "clown", true);

        assert!(try_insert(&mut world, unit, clown, Some(janitor)));
        world.tick();
        world.move_to(janitor, Coordinates::new(5.0, 5.0));
        run_for(&mut world, 3);

        assert!(contents(&world, unit).is_empty());
        assert!(world.do_afters.is_empty());
    }

    #[test]
    fn test_dragged_insert_breaks_on_damage() {
        let (mut world, unit) = setup();
        let janitor = mob(&mut world, "janitor", true);
        let clown = mob(&mut world, "clown", true);

        assert!(try_insert(&mut world, unit, clown, Some(janitor)));
        world.damage(janitor, FixedPoint2::new(10));
        run_for(&mut world, 3);
        assert!(contents(&world, unit).is_empty());
    }

    #[test]
    fn test_insert_queues_automatic_flush() {
        let (mut world, unit) = setup();
        let cola = spawn_item(&mut world, "Cola");
        assert!(try_insert(&mut world, unit, cola, None));
        let first = world.disposals.get(&unit).and_then(|d| d.next_flush);
        assert!(first.is_some());

        // A later insert never delays the pending flush
        run_for(&mut world, 1);
        let water = spawn_item(&mut world, "Water");
        assert!(try_insert(&mut world, unit, water, None));
        assert_eq!(world.disposals.get(&unit).and_then(|d| d.next_flush), first);
    }

    #[test]
    fn test_automatic_flush_waits_for_power() {
        let (mut world, unit) = setup();
        let automatic = world.config().disposal.automatic_engage_time;
        let cola = spawn_item(&mut world, "Cola");
        try_insert(&mut world, unit, cola, None);

        world.advance_by(automatic + TimeSpan::from_secs(1));
        assert_eq!(contents(&world, unit), vec![cola]);
        assert!(world.drain_flushed().is_empty());

        set_powered(&mut world, unit, true);
        world.tick();
        assert!(contents(&world, unit).is_empty());
        let flushed = world.drain_flushed();
        assert_eq!(
            flushed,
            vec![FlushedContents {
                unit,
                contents: vec![cola]
            }]
        );
        assert_eq!(state(&world, unit), Some(PressureState::Flushed));
        assert!(!can_flush(&world, unit));
    }

    #[test]
    fn test_engage_flushes_and_recharges() {
        let (mut world, unit) = setup();
        set_powered(&mut world, unit, true);
        let cola = spawn_item(&mut world, "Cola");
        try_insert(&mut world, unit, cola, None);

        set_engaged(&mut world, unit, true);
        assert!(contents(&world, unit).is_empty());
        let disposal = world.disposals.get(&unit).cloned();
        assert!(disposal.as_ref().is_some_and(|d| !d.engaged && d.next_flush.is_none()));

        // Engaging while charging waits for full pressure
        let water = spawn_item(&mut world, "Water");
        try_insert(&mut world, unit, water, None);
        set_engaged(&mut world, unit, true);
        assert_eq!(contents(&world, unit), vec![water]);
        run_for(&mut world, 10);
        assert_eq!(state(&world, unit), Some(PressureState::Pressurizing));
        assert_eq!(contents(&world, unit), vec![water]);
        run_for(&mut world, 11);
        assert!(contents(&world, unit).is_empty());
    }

    #[test]
    fn test_emag_is_one_way() {
        let (mut world, unit) = setup();
        assert!(emag(&mut world, unit));
        assert!(world.disposals.get(&unit).is_some_and(DisposalUnit::disable_pressure));

        // Unpowered and still charging, yet it flushes
        let cola = spawn_item(&mut world, "Cola");
        try_insert(&mut world, unit, cola, None);
        assert!(try_flush(&mut world, unit));
        assert!(try_flush(&mut world, unit));

        set_powered(&mut world, unit, true);
        set_powered(&mut world, unit, false);
        assert!(world.disposals.get(&unit).is_some_and(DisposalUnit::disable_pressure));
    }

    #[test]
    fn test_pause_delays_every_transition() {
        let (mut world, unit) = setup();
        set_powered(&mut world, unit, true);
        assert!(try_flush(&mut world, unit));

        world.pause(unit);
        run_for(&mut world, 5);
        world.unpause(unit);
        assert_eq!(state(&world, unit), Some(PressureState::Flushed));

        // Flushed for flush_delay of unpaused time
        let flush_delay = world.config().disposal.flush_delay;
        world.advance_by(flush_delay - TimeSpan::from_millis(100));
        assert_eq!(state(&world, unit), Some(PressureState::Flushed));
        world.advance_by(TimeSpan::from_millis(100));
        assert_eq!(state(&world, unit), Some(PressureState::Pressurizing));

        world.advance_by(pressure::pressurize_time() - flush_delay - TimeSpan::from_millis(100));
        assert_eq!(state(&world, unit), Some(PressureState::Pressurizing));
        world.advance_by(TimeSpan::from_millis(100));
        assert_eq!(state(&world, unit), Some(PressureState::Ready));
    }

    #[test]
    fn test_unanchored_unit_never_flushes() {
        let (mut world, unit) = setup();
        set_powered(&mut world, unit, true);
        emag(&mut world, unit);
        if let Some(transform) = world.registry.get_mut::<Transform>(unit) {
            transform.anchored = false;
        }
        assert!(!try_flush(&mut world, unit));
    }

    #[test]
    fn test_eject_and_collision() {
        let (mut world, unit) = setup();
        world.move_to(unit, Coordinates::new(2.0, 3.0));
        let cola = spawn_item(&mut world, "Cola");
        let mouse = mob(&mut world, "mouse", false);
        try_insert(&mut world, unit, cola, None);
        try_insert(&mut world, unit, mouse, None);

        assert_eq!(try_eject_contents(&mut world, unit), 2);
        assert!(contents(&world, unit).is_empty());
        assert_eq!(hands::coordinates_of(&world, mouse), Coordinates::new(2.0, 3.0));

        assert!(prevents_collision(&world, unit, cola));
        assert!(prevents_collision(&world, unit, mouse));
        on_end_collide(&mut world, unit, mouse);
        assert!(!prevents_collision(&world, unit, mouse));

        world.registry.insert(cola, ThrownItem);
        on_end_collide(&mut world, unit, cola);
        assert!(!prevents_collision(&world, unit, cola));
    }

    #[test]
    fn test_exit_is_throttled() {
        let (mut world, unit) = setup();
        let mouse = mob(&mut world, "mouse", false);
        let cat = mob(&mut world, "cat", false);
        try_insert(&mut world, unit, mouse, None);
        try_insert(&mut world, unit, cat, None);

        assert!(try_exit(&mut world, unit, mouse));
        assert!(!try_exit(&mut world, unit, cat));
        world.advance_by(EXIT_ATTEMPT_DELAY);
        assert!(try_exit(&mut world, unit, cat));
        assert!(contents(&world, unit).is_empty());
    }

    #[test]
    fn test_insert_closes_ui_of_inserted() {
        let (mut world, unit) = setup();
        let mouse = mob(&mut world, "mouse", false);
        world.ui.open(unit, UiKey::DisposalUnit, mouse);
        assert!(world.ui.is_open(unit, UiKey::DisposalUnit, mouse));

        try_insert(&mut world, unit, mouse, None);
        assert!(!world.ui.is_open(unit, UiKey::DisposalUnit, mouse));
    }

    #[test]
    fn test_snapshot_tracks_state() {
        let (mut world, unit) = setup();
        set_powered(&mut world, unit, true);
        let published = world.ui.state(unit, UiKey::DisposalUnit).cloned();
        let Some(BoundUiState::DisposalUnit(state)) = published else {
            panic!("disposal unit state should be published");
        };
        assert!(state.powered);
        assert_eq!(state.state, PressureState::Ready);
        assert_eq!(state.visuals.lights, crate::disposal::LightStates::READY);
    }

    #[test]
    fn test_held_item_goes_in_through_the_hook() {
        let (mut world, unit) = setup();
        let janitor = mob(&mut world, "janitor", true);
        let cola = spawn_item(&mut world, "Cola");
        if let Some(hands) = world.registry.get_mut::<Hands>(janitor) {
            hands.put(cola);
        }

        assert!(interact_using(&mut world, unit, janitor, cola));
        assert_eq!(contents(&world, unit), vec![cola]);
        // The hook's after-insert bookkeeping ran
        assert!(world.disposals.get(&unit).is_some_and(|d| d.next_flush.is_some()));
    }
}
