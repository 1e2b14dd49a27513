//! # Depot Registry
//!
//! The object registry: every simulated object, its metadata and the
//! capabilities (components) it carries. Systems never look at concrete
//! object types, they only ask "does this object have capability `T`" and
//! read the typed data when it does.
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

pub mod components;
pub mod prototype;
pub mod registry;

pub use components::{
    Body, Category, Component, Damageable, Hands, Item, Label, Physics, Tags, ThrownItem,
    Transform, Volume,
};
pub use prototype::EntityPrototype;
pub use registry::{MetaData, ObjectRegistry};
