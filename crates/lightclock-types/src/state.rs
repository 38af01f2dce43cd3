//! Per-agent kinematic state and the merged universe snapshot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::AgentId;

/// State of a single agent at the start of one of its steps.
///
/// `time` is the agent's private clock and `time_step` the fixed amount it
/// advances by on every propagation. Positions and velocities are in the
/// stationary frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct AgentState {
    /// The agent's local clock.
    pub time: f64,
    /// Fixed step the clock advances by per propagation.
    pub time_step: f64,
    /// Position along the direction of motion.
    pub x: f64,
    /// Second plot coordinate (the scenario uses it as elapsed time).
    pub y: f64,
    /// Velocity along `x`.
    pub vx: f64,
    /// Velocity along `y`.
    pub vy: f64,
}

impl AgentState {
    /// Time at which this state's step ends.
    pub const fn next_time(&self) -> f64 {
        self.time + self.time_step
    }

    /// Whether every field is a finite number.
    pub const fn is_finite(&self) -> bool {
        self.time.is_finite()
            && self.time_step.is_finite()
            && self.x.is_finite()
            && self.y.is_finite()
            && self.vx.is_finite()
            && self.vy.is_finite()
    }
}

/// Merged view of every agent's state valid at one instant.
///
/// Produced transiently by reading the history store; never stored itself.
/// Also the value type of each stored record, where it holds exactly one
/// entry (or one entry per agent for the bootstrap record).
pub type Snapshot = BTreeMap<AgentId, AgentState>;

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn sample() -> AgentState {
        AgentState {
            time: 2.0,
            time_step: 0.5,
            x: 1.0,
            y: 0.0,
            vx: 2.0,
            vy: 0.0,
        }
    }

    #[test]
    fn time_step_serializes_camel_case() {
        let json = serde_json::to_value(sample()).ok();
        let step = json
            .as_ref()
            .and_then(|v| v.get("timeStep"))
            .and_then(serde_json::Value::as_f64);
        assert_eq!(step, Some(0.5));
        assert!(json.as_ref().and_then(|v| v.get("time_step")).is_none());
    }

    #[test]
    fn next_time_adds_step() {
        assert_eq!(sample().next_time(), 2.5);
    }

    #[test]
    fn non_finite_fields_are_detected() {
        assert!(sample().is_finite());
        let nan_x = AgentState {
            x: f64::NAN,
            ..sample()
        };
        assert!(!nan_x.is_finite());
        let infinite_time = AgentState {
            time: f64::INFINITY,
            ..sample()
        };
        assert!(!infinite_time.is_finite());
    }

    #[test]
    fn snapshot_keys_are_agent_names() {
        let mut snapshot = Snapshot::new();
        snapshot.insert(AgentId::from("light"), sample());
        let json = serde_json::to_value(&snapshot).ok();
        assert!(json.as_ref().and_then(|v| v.get("light")).is_some());
    }
}
