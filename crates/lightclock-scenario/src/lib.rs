//! Reference scenarios for the Lightclock simulation.
//!
//! A scenario supplies the initial universe and the [`Transition`] that
//! moves its agents. The only one shipped is [`MirrorScenario`]: a light
//! pulse bouncing between the two ends of a moving rod, the textbook light
//! clock seen from the stationary frame.
//!
//! [`Transition`]: lightclock_core::transition::Transition

pub mod mirrors;

pub use mirrors::{END_A, END_B, LIGHT, MirrorScenario};
