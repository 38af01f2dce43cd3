//! Snapshot reader, causal-consistency scheduler, and run configuration for
//! the Lightclock simulation.
//!
//! This crate owns the loop that advances agents through time and the
//! history they leave behind. A later reader can ask what the universe
//! looked like at any instant and get a merged snapshot back, even though
//! every agent's clock moves on its own.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `lightclock-config.yaml` into
//!   strongly-typed structs.
//! - [`history`] -- JSON persistence of the history and per-agent
//!   trajectories.
//! - [`scheduler`] -- The fixed-round [`Scheduler`] with its completeness
//!   gate.
//! - [`snapshot`] -- Point reads and last-write-wins merging.
//! - [`transition`] -- The [`Transition`] trait and [`UniformMotion`].
//!
//! [`Scheduler`]: scheduler::Scheduler
//! [`Transition`]: transition::Transition
//! [`UniformMotion`]: transition::UniformMotion

pub mod config;
pub mod history;
pub mod scheduler;
pub mod snapshot;
pub mod transition;
