//! Agent transition trait and a constant-velocity implementation.
//!
//! The scheduler hands each agent a complete [`Snapshot`] of the universe
//! just before its own clock and asks a [`Transition`] for the agent's next
//! state. The physics of a scenario lives entirely behind this trait.
//!
//! Implementations must be pure: replaying the same snapshot must give the
//! same state, and the returned `time` must be strictly greater than the
//! agent's current `time`. The history store is append-only, so a
//! non-deterministic transition would leave it inconsistent with a replay.

use lightclock_types::{AgentId, AgentState, Snapshot};

/// Errors a transition can report. Any of them ends the run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// The snapshot has no state for the agent being propagated.
    #[error("snapshot has no state for agent {agent_id}")]
    MissingAgent {
        /// The agent being propagated.
        agent_id: AgentId,
    },

    /// The transition has no rule for this agent.
    #[error("no transition rule for agent {agent_id}")]
    UnknownAgent {
        /// The unrecognised agent.
        agent_id: AgentId,
    },

    /// Any other failure inside the transition.
    #[error("transition error: {message}")]
    Internal {
        /// Description of the failure.
        message: String,
    },
}

/// A pluggable per-scenario rule computing an agent's next state.
pub trait Transition {
    /// Compute the next state of `agent_id` from the merged `snapshot`.
    ///
    /// The agent's own current state is `snapshot[agent_id]`.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] if the agent cannot be propagated.
    fn propagate(&self, agent_id: &AgentId, snapshot: &Snapshot)
    -> Result<AgentState, TransitionError>;
}

impl<F> Transition for F
where
    F: Fn(&AgentId, &Snapshot) -> Result<AgentState, TransitionError>,
{
    fn propagate(
        &self,
        agent_id: &AgentId,
        snapshot: &Snapshot,
    ) -> Result<AgentState, TransitionError> {
        self(agent_id, snapshot)
    }
}

/// Look up the agent's own state inside a snapshot.
///
/// # Errors
///
/// Returns [`TransitionError::MissingAgent`] if it is absent.
pub fn own_state<'a>(
    agent_id: &AgentId,
    snapshot: &'a Snapshot,
) -> Result<&'a AgentState, TransitionError> {
    snapshot
        .get(agent_id)
        .ok_or_else(|| TransitionError::MissingAgent {
            agent_id: agent_id.clone(),
        })
}

/// Moves every agent in a straight line at its current velocity.
///
/// Ignores the other agents entirely. Useful as a baseline scenario and for
/// exercising the scheduler without any physics.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformMotion;

impl UniformMotion {
    /// Create a new constant-velocity transition.
    pub const fn new() -> Self {
        Self
    }
}

impl Transition for UniformMotion {
    fn propagate(
        &self,
        agent_id: &AgentId,
        snapshot: &Snapshot,
    ) -> Result<AgentState, TransitionError> {
        let state = own_state(agent_id, snapshot)?;
        Ok(AgentState {
            time: state.next_time(),
            x: state.vx.mul_add(state.time_step, state.x),
            y: state.vy.mul_add(state.time_step, state.y),
            ..*state
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn moving(time: f64) -> AgentState {
        AgentState {
            time,
            time_step: 0.5,
            x: 1.0,
            y: 2.0,
            vx: 2.0,
            vy: -1.0,
        }
    }

    #[test]
    fn uniform_motion_advances_one_step() {
        let id = AgentId::from("probe");
        let mut snapshot = Snapshot::new();
        snapshot.insert(id.clone(), moving(3.0));

        let next = UniformMotion::new().propagate(&id, &snapshot).unwrap();
        assert_eq!(next.time, 3.5);
        assert_eq!(next.time_step, 0.5);
        assert_eq!(next.x, 2.0);
        assert_eq!(next.y, 1.5);
        assert_eq!(next.vx, 2.0);
    }

    #[test]
    fn missing_agent_is_reported() {
        let id = AgentId::from("ghost");
        let result = UniformMotion.propagate(&id, &Snapshot::new());
        assert_eq!(result, Err(TransitionError::MissingAgent { agent_id: id }));
    }

    #[test]
    fn closures_are_transitions() {
        let freeze_x = |id: &AgentId, snapshot: &Snapshot| -> Result<AgentState, TransitionError> {
            let state = own_state(id, snapshot)?;
            Ok(AgentState {
                time: state.next_time(),
                ..*state
            })
        };

        let id = AgentId::from("probe");
        let mut snapshot = Snapshot::new();
        snapshot.insert(id.clone(), moving(0.0));

        let next = freeze_x.propagate(&id, &snapshot).unwrap();
        assert_eq!(next.time, 0.5);
        assert_eq!(next.x, 1.0);
    }
}
