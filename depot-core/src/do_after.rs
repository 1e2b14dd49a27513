//! Delayed actions ("do-afters").
//!
//! A do-after is an action that only happens if its user keeps still and
//! unharmed for a while. The scheduler checks the cancel conditions once per
//! step and reports every do-after that finished or got cancelled; the world
//! then dispatches the finished [`DoAfterEvent`]s.

use depot_registry::{Damageable, ObjectRegistry, Transform};
use depot_utils::{Coordinates, EntityId, FixedPoint2, TimeSpan};

/// How far (in tiles) the user may drift before a move-sensitive do-after breaks.
pub const MOVEMENT_THRESHOLD: f32 = 0.1;

/// Identifies a running do-after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DoAfterId(pub u64);

/// What to do once a do-after finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DoAfterEvent {
    /// Insert the target into the disposal unit.
    DisposalInsert {
        /// The disposal unit.
        unit: EntityId,
    },
}

/// Parameters of a do-after.
#[derive(Debug, Clone, PartialEq)]
pub struct DoAfterArgs {
    /// Who performs the action.
    pub user: EntityId,
    /// How long the action takes.
    pub delay: TimeSpan,
    /// Dispatched on completion.
    pub event: DoAfterEvent,
    /// What the action is performed on.
    pub target: Option<EntityId>,
    /// The tool used, if any.
    pub used: Option<EntityId>,
    /// Cancel when the user takes damage.
    pub break_on_damage: bool,
    /// Cancel when the user moves.
    pub break_on_move: bool,
}

impl DoAfterArgs {
    /// Creates args that only break when a participant disappears.
    #[must_use]
    pub fn new(user: EntityId, delay: TimeSpan, event: DoAfterEvent) -> Self {
        Self {
            user,
            delay,
            event,
            target: None,
            used: None,
            break_on_damage: false,
            break_on_move: false,
        }
    }
}

/// Why a do-after was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The user took damage.
    Damaged,
    /// The user moved.
    Moved,
    /// A participant no longer exists.
    Missing,
    /// Cancelled by request.
    Interrupted,
}

/// Result of a do-after that is no longer running.
#[derive(Debug, Clone, PartialEq)]
pub enum DoAfterOutcome {
    /// The delay elapsed without interruption.
    Finished {
        /// The do-after.
        id: DoAfterId,
        /// Its arguments.
        args: DoAfterArgs,
    },
    /// One of the cancel conditions triggered.
    Cancelled {
        /// The do-after.
        id: DoAfterId,
        /// Its arguments.
        args: DoAfterArgs,
        /// What broke it.
        reason: CancelReason,
    },
}

#[derive(Debug, Clone)]
struct DoAfter {
    id: DoAfterId,
    args: DoAfterArgs,
    end_time: TimeSpan,
    user_position: Coordinates,
    user_damage: FixedPoint2,
}

/// Runs do-afters.
#[derive(Debug, Default)]
pub struct DoAfterScheduler {
    running: Vec<DoAfter>,
    next_id: u64,
}

impl DoAfterScheduler {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a do-after at `now`.
    ///
    /// Returns `None` if the same user is already doing the same thing to the
    /// same target.
    pub fn start(&mut self, registry: &ObjectRegistry, now: TimeSpan, args: DoAfterArgs) -> Option<DoAfterId> {
        let duplicate = self.running.iter().any(|running| {
            running.args.user == args.user
                && running.args.target == args.target
                && running.args.event == args.event
        });
        if duplicate {
            log::debug!("Ignoring duplicate do-after {:?} by {}", args.event, args.user);
            return None;
        }

        let id = DoAfterId(self.next_id);
        self.next_id += 1;
        let do_after = DoAfter {
            id,
            end_time: now + args.delay,
            user_position: position(registry, args.user),
            user_damage: damage(registry, args.user),
            args,
        };
        log::trace!(
            "Started do-after {id:?} for {} ending at {}",
            do_after.args.user,
            do_after.end_time
        );
        // Kept sorted by end time, earliest first
        let index = self
            .running
            .partition_point(|running| running.end_time <= do_after.end_time);
        self.running.insert(index, do_after);
        Some(id)
    }

    /// Cancels a running do-after.
    pub fn cancel(&mut self, id: DoAfterId) -> Option<DoAfterOutcome> {
        let index = self.running.iter().position(|running| running.id == id)?;
        let do_after = self.running.remove(index);
        Some(DoAfterOutcome::Cancelled {
            id,
            args: do_after.args,
            reason: CancelReason::Interrupted,
        })
    }

    /// Returns true if the do-after is still running.
    #[must_use]
    pub fn is_running(&self, id: DoAfterId) -> bool {
        self.running.iter().any(|running| running.id == id)
    }

    /// Number of running do-afters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.running.len()
    }

    /// Returns true if nothing is running.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }

    /// Checks every running do-after once and returns the ones that ended.
    pub fn update(&mut self, registry: &ObjectRegistry, now: TimeSpan) -> Vec<DoAfterOutcome> {
        let mut outcomes = Vec::new();
        self.running.retain(|do_after| {
            if let Some(reason) = cancel_reason(registry, do_after) {
                log::debug!("Do-after {:?} cancelled: {reason:?}", do_after.id);
                outcomes.push(DoAfterOutcome::Cancelled {
                    id: do_after.id,
                    args: do_after.args.clone(),
                    reason,
                });
                return false;
            }
            if do_after.end_time <= now {
                outcomes.push(DoAfterOutcome::Finished {
                    id: do_after.id,
                    args: do_after.args.clone(),
                });
                return false;
            }
            true
        });
        outcomes
    }
}

fn cancel_reason(registry: &ObjectRegistry, do_after: &DoAfter) -> Option<CancelReason> {
    let args = &do_after.args;
    let participants_exist = registry.exists(args.user)
        && args.target.is_none_or(|target| registry.exists(target))
        && args.used.is_none_or(|used| registry.exists(used));
    if !participants_exist {
        return Some(CancelReason::Missing);
    }
    if args.break_on_damage && damage(registry, args.user) > do_after.user_damage {
        return Some(CancelReason::Damaged);
    }
    if args.break_on_move {
        let moved = position(registry, args.user).distance_squared(&do_after.user_position);
        if moved > MOVEMENT_THRESHOLD * MOVEMENT_THRESHOLD {
            return Some(CancelReason::Moved);
        }
    }
    None
}

fn position(registry: &ObjectRegistry, entity: EntityId) -> Coordinates {
    registry
        .get::<Transform>(entity)
        .map(|transform| transform.coordinates)
        .unwrap_or_default()
}

fn damage(registry: &ObjectRegistry, entity: EntityId) -> FixedPoint2 {
    registry
        .get::<Damageable>(entity)
        .map_or(FixedPoint2::ZERO, |damageable| damageable.total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (ObjectRegistry, EntityId, EntityId) {
        let mut registry = ObjectRegistry::new();
        let user = registry.spawn("janitor");
        registry.insert(user, Transform::default());
        registry.insert(user, Damageable::default());
        let unit = registry.spawn("disposal unit");
        (registry, user, unit)
    }

    fn args(user: EntityId, unit: EntityId) -> DoAfterArgs {
        DoAfterArgs {
            target: Some(user),
            break_on_damage: true,
            break_on_move: true,
            ..DoAfterArgs::new(user, TimeSpan::from_secs(2), DoAfterEvent::DisposalInsert { unit })
        }
    }

    #[test]
    fn test_finishes_after_delay() {
        let (registry, user, unit) = setup();
        let mut scheduler = DoAfterScheduler::new();
        let id = scheduler
            .start(&registry, TimeSpan::ZERO, args(user, unit))
            .expect("first do-after starts");

        assert!(scheduler.update(&registry, TimeSpan::from_secs(1)).is_empty());
        let outcomes = scheduler.update(&registry, TimeSpan::from_secs(2));
        assert!(matches!(outcomes.as_slice(), [DoAfterOutcome::Finished { id: done, .. }] if *done == id));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_duplicates_are_ignored() {
        let (registry, user, unit) = setup();
        let mut scheduler = DoAfterScheduler::new();
        assert!(scheduler.start(&registry, TimeSpan::ZERO, args(user, unit)).is_some());
        assert!(scheduler.start(&registry, TimeSpan::ZERO, args(user, unit)).is_none());
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn test_damage_cancels() {
        let (mut registry, user, unit) = setup();
        let mut scheduler = DoAfterScheduler::new();
        scheduler.start(&registry, TimeSpan::ZERO, args(user, unit));

        if let Some(damageable) = registry.get_mut::<Damageable>(user) {
            damageable.total += FixedPoint2::new(5);
        }
        let outcomes = scheduler.update(&registry, TimeSpan::from_secs(1));
        assert!(matches!(
            outcomes.as_slice(),
            [DoAfterOutcome::Cancelled { reason: CancelReason::Damaged, .. }]
        ));
    }

    #[test]
    fn test_movement_cancels_but_jitter_does_not() {
        let (mut registry, user, unit) = setup();
        let mut scheduler = DoAfterScheduler::new();
        scheduler.start(&registry, TimeSpan::ZERO, args(user, unit));

        if let Some(transform) = registry.get_mut::<Transform>(user) {
            transform.coordinates = Coordinates::new(0.05, 0.0);
        }
        assert!(scheduler.update(&registry, TimeSpan::from_millis(500)).is_empty());

        if let Some(transform) = registry.get_mut::<Transform>(user) {
            transform.coordinates = Coordinates::new(1.0, 0.0);
        }
        let outcomes = scheduler.update(&registry, TimeSpan::from_secs(1));
        assert!(matches!(
            outcomes.as_slice(),
            [DoAfterOutcome::Cancelled { reason: CancelReason::Moved, .. }]
        ));
    }

    #[test]
    fn test_missing_user_cancels() {
        let (mut registry, user, unit) = setup();
        let mut scheduler = DoAfterScheduler::new();
        scheduler.start(&registry, TimeSpan::ZERO, args(user, unit));
        registry.despawn(user);

        let outcomes = scheduler.update(&registry, TimeSpan::from_secs(5));
        assert!(matches!(
            outcomes.as_slice(),
            [DoAfterOutcome::Cancelled { reason: CancelReason::Missing, .. }]
        ));
    }

    #[test]
    fn test_manual_cancel() {
        let (registry, user, unit) = setup();
        let mut scheduler = DoAfterScheduler::new();
        let id = scheduler
            .start(&registry, TimeSpan::ZERO, args(user, unit))
            .expect("first do-after starts");
        assert!(scheduler.is_running(id));
        assert!(scheduler.cancel(id).is_some());
        assert!(!scheduler.is_running(id));
        assert!(scheduler.cancel(id).is_none());
    }
}
