//! # Depot
//!
//! Runs receptacle scenarios against the simulation in `depot-core`.
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
    clippy::needless_pass_by_value
)]

pub mod logger;
pub mod runner;
pub mod scenario;

pub use runner::{Pace, RunOutcome, drive};
pub use scenario::{Scenario, ScenarioError, ScenarioRun};
