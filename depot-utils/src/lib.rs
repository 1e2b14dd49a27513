//! # Depot Utils
//!
//! Small value types shared by every depot crate: simulation time, entity
//! identifiers and the quantized fixed-point number used for volumes.
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
    clippy::struct_excessive_bools
)]

pub mod fixed_point;
pub mod time;
pub mod types;

pub use fixed_point::FixedPoint2;
pub use time::{GameTiming, PauseState, TimeSpan};
pub use types::{ContainerId, Coordinates, EntityId};
