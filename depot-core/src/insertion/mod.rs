//! The insertion protocol shared by every receptacle kind.
//!
//! Inserting an object into a receptacle goes through four stages:
//!
//! 1. A structural precheck: the receptacle must be anchored and the subject
//!    must be an item or have a collidable body.
//! 2. A [`TryInsertEvent`] is broadcast to the receptacle's hooks. Any hook
//!    may veto, and a veto can't be undone by a later hook.
//! 3. The object is moved through the [`ContainerManager`](crate::container::ContainerManager).
//! 4. An [`AfterInsertEvent`] is broadcast to the same hooks.
//!
//! Rejections never surface as errors to callers, every public entry point
//! returns `false` and logs the [`InsertRejection`] at debug level.

pub mod click_to_insert;
mod hooks;

use depot_registry::{Item, Physics, Transform};
use depot_utils::{ContainerId, EntityId};
use thiserror::Error;

use crate::container::ContainerKey;
use crate::hands;
use crate::world::World;

pub use hooks::{FilterMode, HookTable, InsertionHook, ReceptacleHook, TagFilter};

/// Broadcast before an insert commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TryInsertEvent {
    /// The object about to be inserted.
    pub subject: EntityId,
    /// Set by the first hook that looked at the event.
    pub handled: bool,
    blocked: bool,
}

impl TryInsertEvent {
    /// Creates an unblocked, unhandled request.
    #[must_use]
    pub const fn new(subject: EntityId) -> Self {
        Self {
            subject,
            handled: false,
            blocked: false,
        }
    }

    /// Vetoes the insert.
    pub fn block(&mut self) {
        self.blocked = true;
    }

    /// Returns true if any hook vetoed.
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        self.blocked
    }
}

/// Broadcast after an insert committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AfterInsertEvent {
    /// The object that was inserted.
    pub inserted: EntityId,
    /// Who inserted it, if anyone.
    pub user: Option<EntityId>,
}

/// Why an insert didn't happen.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InsertRejection {
    /// The receptacle is missing or not anchored.
    #[error("receptacle {0} is not anchored")]
    NotAnchored(EntityId),
    /// The subject is neither an item nor collidable.
    #[error("{0} can't be inserted")]
    NotInsertable(EntityId),
    /// A hook or receptacle policy refused the subject.
    #[error("insertion of {0} was vetoed")]
    Vetoed(EntityId),
    /// The user has no hands to insert with.
    #[error("{0} has no hands")]
    NoHands(EntityId),
    /// The container refused the subject.
    #[error("container {key} refused {subject}")]
    CapacityFailure {
        /// The container.
        key: ContainerKey,
        /// The refused object.
        subject: EntityId,
    },
}

/// Receptacle-independent checks, run before any hook sees the request.
pub fn structural_check(world: &World, receptacle: EntityId, subject: EntityId) -> Result<(), InsertRejection> {
    let anchored = world
        .registry
        .get::<Transform>(receptacle)
        .is_some_and(|transform| transform.anchored);
    if !anchored {
        return Err(InsertRejection::NotAnchored(receptacle));
    }

    let storable = world.registry.has::<Item>(subject);
    let collidable = world
        .registry
        .get::<Physics>(subject)
        .is_some_and(|physics| physics.can_collide);
    if !(storable || collidable) {
        return Err(InsertRejection::NotInsertable(subject));
    }
    Ok(())
}

/// Runs every hook of `receptacle` against a fresh [`TryInsertEvent`].
#[must_use]
pub fn broadcast_try_insert(world: &World, receptacle: EntityId, subject: EntityId) -> TryInsertEvent {
    let mut event = TryInsertEvent::new(subject);
    for hook in world.hooks.hooks_for(receptacle) {
        hook.try_insert(world, receptacle, &mut event);
    }
    event
}

/// Runs every hook of `receptacle` with an [`AfterInsertEvent`].
pub fn broadcast_after_insert(
    world: &mut World,
    receptacle: EntityId,
    inserted: EntityId,
    user: Option<EntityId>,
) {
    let event = AfterInsertEvent { inserted, user };
    // Hooks get mutable access to the world, so work on a snapshot of the list
    let hooks = world.hooks.hooks_for(receptacle).to_vec();
    for hook in hooks {
        hook.after_insert(world, receptacle, &event);
    }
}

/// Structural precheck followed by the hook broadcast.
pub fn check_insert(world: &World, receptacle: EntityId, subject: EntityId) -> Result<(), InsertRejection> {
    structural_check(world, receptacle, subject)?;
    let event = broadcast_try_insert(world, receptacle, subject);
    if event.is_blocked() {
        return Err(InsertRejection::Vetoed(subject));
    }
    if !event.handled {
        log::debug!("No hook of {receptacle} looked at {subject}, accepting");
    }
    Ok(())
}

/// Returns true if `subject` may go into `receptacle`.
#[must_use]
pub fn can_insert(world: &World, receptacle: EntityId, subject: EntityId) -> bool {
    match check_insert(world, receptacle, subject) {
        Ok(()) => true,
        Err(rejection) => {
            log::debug!("Can't insert into {receptacle}: {rejection}");
            false
        }
    }
}

/// Checks, moves `subject` into the receptacle's `container` and notifies the hooks.
pub fn insert(
    world: &mut World,
    receptacle: EntityId,
    container: &ContainerId,
    subject: EntityId,
    user: Option<EntityId>,
) -> bool {
    let result = check_insert(world, receptacle, subject).and_then(|()| {
        let key = ContainerKey::new(receptacle, container.clone());
        if hands::try_move_into_container(world, subject, &key) {
            Ok(())
        } else {
            Err(InsertRejection::CapacityFailure { key, subject })
        }
    });
    finish(world, receptacle, subject, user, result)
}

/// Moves an item from `user`'s hands into the receptacle's `container`.
pub fn try_insert_held(
    world: &mut World,
    receptacle: EntityId,
    container: &ContainerId,
    user: EntityId,
    used: EntityId,
) -> bool {
    let result = if world.registry.has::<depot_registry::Hands>(user) {
        check_insert(world, receptacle, used).and_then(|()| {
            let key = ContainerKey::new(receptacle, container.clone());
            if hands::try_drop_into_container(world, user, used, &key) {
                Ok(())
            } else {
                Err(InsertRejection::CapacityFailure { key, subject: used })
            }
        })
    } else {
        Err(InsertRejection::NoHands(user))
    };
    finish(world, receptacle, used, Some(user), result)
}

fn finish(
    world: &mut World,
    receptacle: EntityId,
    subject: EntityId,
    user: Option<EntityId>,
    result: Result<(), InsertRejection>,
) -> bool {
    match result {
        Ok(()) => {
            log::debug!("Inserted {subject} into {receptacle}");
            broadcast_after_insert(world, receptacle, subject, user);
            true
        }
        Err(rejection) => {
            log::debug!("Insert into {receptacle} rejected: {rejection}");
            false
        }
    }
}
