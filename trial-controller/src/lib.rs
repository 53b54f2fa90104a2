//! Timed, open-loop motion trials.
//!
//! A [`TrialController`] sends one motion command on the first pose update,
//! keeps re-sending it on every tick, appends every pose it sees to a
//! [`TrialRecord`], and stops the robot once the kinematically expected
//! duration has elapsed. [`run_trial`] drives a controller from a
//! [`PoseStream`](trial_arci::PoseStream) on a single task.

mod config;
mod controller;
mod error;
mod profile;
mod record;
mod runner;

pub use config::*;
pub use controller::*;
pub use error::*;
pub use profile::*;
pub use record::*;
pub use runner::*;
