//! Light between translating mirrors.
//!
//! A rigid rod of length `L` moves at `v` through the stationary frame. Its
//! two ends are mirrors. A light pulse starts at end A moving at `c` and
//! reflects whenever it gets within one step's travel of an end:
//!
//! ```text
//!   t
//!   ^        /\
//!   |       /  \
//!   |  A   /    \   B
//!   |  |  /      \  |
//!   |  | /        \ |
//!   +--*-----------*------> x
//! ```
//!
//! Every agent plots `y` as elapsed time, so the recorded history draws the
//! world-lines of both mirrors and the zig-zag of the pulse between them.

use lightclock_core::config::SimulationConfig;
use lightclock_core::transition::{Transition, TransitionError, own_state};
use lightclock_types::{AgentId, AgentState, Snapshot};
use tracing::trace;

/// Id of the rod's leading-edge mirror at `x = 0`.
pub const END_A: &str = "end_A_in_stationary_system";
/// Id of the rod's far mirror at `x = L`.
pub const END_B: &str = "end_B_in_stationary_system";
/// Id of the light pulse.
pub const LIGHT: &str = "light_in_stationary_system";

/// Parameters of the rod and light pulse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MirrorScenario {
    /// Rod length `L`.
    pub rod_length: f64,
    /// Rod velocity `v`.
    pub rod_velocity: f64,
    /// Light speed `c`.
    pub light_speed: f64,
    /// Shared start time `t_0`.
    pub start_time: f64,
    /// Step size of every agent.
    pub delta_t: f64,
}

impl MirrorScenario {
    /// Build the scenario from a loaded configuration.
    pub const fn from_config(config: &SimulationConfig) -> Self {
        Self {
            rod_length: config.scenario.rod_length,
            rod_velocity: config.scenario.rod_velocity,
            light_speed: config.scenario.light_speed,
            start_time: config.simulation.start_time,
            delta_t: config.simulation.time_step,
        }
    }

    /// The agents this scenario knows, in visiting order.
    pub fn agent_ids() -> [AgentId; 3] {
        [
            AgentId::from(END_A),
            AgentId::from(END_B),
            AgentId::from(LIGHT),
        ]
    }

    /// Starting state of both mirrors and the pulse.
    pub fn initial_states(&self) -> Snapshot {
        let at = |x: f64, vx: f64| AgentState {
            time: self.start_time,
            time_step: self.delta_t,
            x,
            y: 0.0,
            vx,
            vy: 0.0,
        };

        Snapshot::from([
            (AgentId::from(END_A), at(0.0, self.rod_velocity)),
            (AgentId::from(END_B), at(self.rod_length, self.rod_velocity)),
            (AgentId::from(LIGHT), at(0.0, self.light_speed)),
        ])
    }

    /// Position of end A at absolute time `t`.
    pub const fn end_a_at(&self, t: f64) -> f64 {
        self.rod_velocity * (t - self.start_time)
    }

    /// Position of end B at absolute time `t`.
    // Kept unfused: mul_add rounds once and drifts from `x += v * dt`.
    #[allow(clippy::suboptimal_flops)]
    pub const fn end_b_at(&self, t: f64) -> f64 {
        self.rod_length + self.rod_velocity * (t - self.start_time)
    }

    /// Velocity of the pulse for the step starting from `state`.
    ///
    /// The pulse turns around when the mirror it is heading for will be
    /// closer than one step of light travel at the end of the step. End B
    /// is checked first.
    fn light_velocity(&self, state: &AgentState) -> f64 {
        let reach = self.light_speed * self.delta_t;
        let step_end = state.time + self.delta_t;

        if (state.x - self.end_b_at(step_end)).abs() < reach {
            -self.light_speed
        } else if (state.x - self.end_a_at(step_end)).abs() < reach {
            self.light_speed
        } else {
            state.vx
        }
    }
}

impl Transition for MirrorScenario {
    #[allow(clippy::suboptimal_flops)]
    fn propagate(
        &self,
        agent_id: &AgentId,
        snapshot: &Snapshot,
    ) -> Result<AgentState, TransitionError> {
        let state = own_state(agent_id, snapshot)?;

        let vx = match agent_id.as_str() {
            END_A | END_B => state.vx,
            LIGHT => self.light_velocity(state),
            _ => {
                return Err(TransitionError::UnknownAgent {
                    agent_id: agent_id.clone(),
                });
            }
        };

        let next = AgentState {
            time: state.next_time(),
            x: state.x + vx * state.time_step,
            y: state.y + self.delta_t,
            vx,
            ..*state
        };
        trace!(agent = %agent_id, time = next.time, x = next.x, vx, "propagated");
        Ok(next)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn scenario() -> MirrorScenario {
        MirrorScenario::from_config(&SimulationConfig::default())
    }

    fn step(scenario: &MirrorScenario, id: &str, state: AgentState) -> AgentState {
        let id = AgentId::from(id);
        let snapshot = Snapshot::from([(id.clone(), state)]);
        scenario.propagate(&id, &snapshot).unwrap()
    }

    #[test]
    fn initial_states_match_defaults() {
        let initial = scenario().initial_states();
        assert_eq!(initial.len(), 3);
        assert_eq!(initial[&AgentId::from(END_B)].x, 15.0);
        assert_eq!(initial[&AgentId::from(END_B)].vx, 1.0);
        assert_eq!(initial[&AgentId::from(LIGHT)].vx, 2.0);
        assert!(initial.values().all(|s| s.time == 0.0 && s.time_step == 1.0));
    }

    #[test]
    fn mirrors_move_at_rod_velocity() {
        let s = scenario();
        let a0 = s.initial_states()[&AgentId::from(END_A)];
        let a1 = step(&s, END_A, a0);
        assert_eq!(a1.time, 1.0);
        assert_eq!(a1.x, 1.0);
        assert_eq!(a1.y, 1.0);
        assert_eq!(a1.vx, 1.0);
    }

    #[test]
    fn light_reflects_off_end_b() {
        let s = scenario();
        // At t = 15 end B will be at 31 after the step; the pulse at 30 turns.
        let before = AgentState {
            time: 15.0,
            time_step: 1.0,
            x: 30.0,
            y: 15.0,
            vx: 2.0,
            vy: 0.0,
        };
        let after = step(&s, LIGHT, before);
        assert_eq!(after.vx, -2.0);
        assert_eq!(after.x, 28.0);
        assert_eq!(after.time, 16.0);
    }

    #[test]
    fn light_reflects_off_end_a() {
        let s = scenario();
        let before = AgentState {
            time: 20.0,
            time_step: 1.0,
            x: 20.0,
            y: 20.0,
            vx: -2.0,
            vy: 0.0,
        };
        let after = step(&s, LIGHT, before);
        assert_eq!(after.vx, 2.0);
        assert_eq!(after.x, 22.0);
    }

    #[test]
    fn light_keeps_course_mid_rod() {
        let s = scenario();
        let before = AgentState {
            time: 5.0,
            time_step: 1.0,
            x: 10.0,
            y: 5.0,
            vx: 2.0,
            vy: 0.0,
        };
        assert_eq!(step(&s, LIGHT, before).vx, 2.0);
    }

    #[test]
    fn unknown_agent_is_rejected() {
        let s = scenario();
        let id = AgentId::from("photon_2");
        let light = s.initial_states()[&AgentId::from(LIGHT)];
        let snapshot = Snapshot::from([(id.clone(), light)]);
        assert_eq!(
            s.propagate(&id, &snapshot),
            Err(TransitionError::UnknownAgent { agent_id: id })
        );
    }

    #[test]
    fn positions_accumulate_without_fused_rounding() {
        let s = MirrorScenario {
            rod_length: 1.3,
            rod_velocity: 0.3,
            light_speed: 0.7,
            start_time: 0.0,
            delta_t: 0.1,
        };
        let mut light = s.initial_states()[&AgentId::from(LIGHT)];
        for _ in 0..3 {
            light = step(&s, LIGHT, light);
        }
        // 0.7 * 0.1 rounds to 0.06999999999999999 before each addition.
        assert_eq!(light.x, 0.209_999_999_999_999_96);
        assert_eq!(s.end_b_at(0.2), 1.3 + 0.3 * 0.2);
    }

    #[test]
    fn agent_ids_are_in_visiting_order() {
        let ids = MirrorScenario::agent_ids();
        let initial = scenario().initial_states();
        assert!(initial.keys().eq(ids.iter()));
    }
}
