//! Causal-consistency scheduler: the fixed-round loop that drives a run.
//!
//! Each round visits every agent in a fixed order. For an agent whose clock
//! reads `t`, the scheduler:
//!
//! 1. Reads the merged snapshot at `t - epsilon`. Ranges are half-open on
//!    the right, so reading exactly at `t` would pick up the interval that
//!    *starts* at `t`; reading just before it lands in the one that ends
//!    there.
//! 2. Applies the **completeness gate**: unless every known agent appears in
//!    that snapshot, the agent is deferred to a later round and nothing is
//!    recorded.
//! 3. Otherwise asks the [`Transition`] for the next state and appends the
//!    record `[t, next.time) -> {agent: next}` to the history.
//!
//! The loop runs exactly the requested number of rounds. There is no
//! fixed-point detection; whether that is enough for a scenario's clocks to
//! interleave has to be checked per scenario.
//!
//! The scheduler owns the store and the clock map outright. One scheduler
//! drives one run.

use std::collections::BTreeMap;

use lightclock_store::{IntervalStore, StoreError};
use lightclock_types::{AgentId, AgentState, Snapshot};
use tracing::{debug, info};

use crate::config::SchedulerConfig;
use crate::snapshot::read_snapshot;
use crate::transition::{Transition, TransitionError};

/// Errors that can occur while building or running a scheduler.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchedulerError {
    /// The initial snapshot contains no agents.
    #[error("at least one agent is required")]
    NoAgents,

    /// `epsilon` is not positive or not below every agent's step.
    #[error("epsilon {epsilon} must be positive and below the smallest time step {min_time_step}")]
    InvalidEpsilon {
        /// Configured epsilon.
        epsilon: f64,
        /// Smallest initial `time_step` across agents.
        min_time_step: f64,
    },

    /// The bootstrap record would not end strictly after it starts.
    #[error("bootstrap floor {floor} must be below the start time {start_time}")]
    InvalidBootstrap {
        /// Configured lower bound of the bootstrap record.
        floor: f64,
        /// Shared start time.
        start_time: f64,
    },

    /// An initial state is not at the shared start time.
    #[error("agent {agent_id} starts at {time}, expected {start_time}")]
    StartTimeMismatch {
        /// The offending agent.
        agent_id: AgentId,
        /// The agent's initial clock.
        time: f64,
        /// Shared start time.
        start_time: f64,
    },

    /// A step was requested for an agent the scheduler does not know.
    #[error("unknown agent: {agent_id}")]
    UnknownAgent {
        /// The requested agent.
        agent_id: AgentId,
    },

    /// The history store rejected a record.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: StoreError,
    },

    /// The transition failed for an agent.
    #[error("transition error for {agent_id}: {source}")]
    Transition {
        /// The agent being propagated.
        agent_id: AgentId,
        /// The underlying transition error.
        source: TransitionError,
    },
}

/// Timing parameters for a scheduler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerParams {
    /// How far before an agent's clock the snapshot is read.
    pub epsilon: f64,
    /// Shared start time of every agent.
    pub start_time: f64,
    /// Lower bound of the bootstrap record.
    pub bootstrap_floor: f64,
}

impl From<&SchedulerConfig> for SchedulerParams {
    fn from(config: &SchedulerConfig) -> Self {
        Self {
            epsilon: config.epsilon,
            start_time: config.start_time,
            bootstrap_floor: config.bootstrap_floor,
        }
    }
}

/// What happened to one agent in one round.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// The agent advanced and a record `[from, to)` was appended.
    Advanced {
        /// Clock before the step.
        from: f64,
        /// Clock after the step.
        to: f64,
    },
    /// The snapshot was incomplete; the agent keeps its clock.
    Deferred {
        /// Agents absent from the snapshot.
        missing: Vec<AgentId>,
    },
}

/// Summary of a single round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSummary {
    /// One-based round number.
    pub round: u64,
    /// Agents that advanced, in visiting order.
    pub advanced: Vec<AgentId>,
    /// Agents held back by the completeness gate, in visiting order.
    pub deferred: Vec<AgentId>,
}

/// Summary of a whole run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Rounds executed by this call.
    pub rounds: u64,
    /// Total advances across those rounds.
    pub advanced: u64,
    /// Total deferrals across those rounds.
    pub deferred: u64,
    /// Every agent's clock at the end of the run.
    pub clocks: BTreeMap<AgentId, f64>,
}

/// Callback invoked after each round completes.
pub trait RoundCallback {
    /// Called with the round's summary and the history so far.
    fn on_round(&mut self, summary: &RoundSummary, store: &IntervalStore<Snapshot>);
}

/// A no-op round callback.
pub struct NoOpCallback;

impl RoundCallback for NoOpCallback {
    fn on_round(&mut self, _summary: &RoundSummary, _store: &IntervalStore<Snapshot>) {}
}

/// Drives agents forward while keeping every read causally complete.
#[derive(Debug)]
pub struct Scheduler<T> {
    /// Full history, starting with the bootstrap record.
    store: IntervalStore<Snapshot>,
    /// Each agent's current clock.
    clocks: BTreeMap<AgentId, f64>,
    /// Visiting order within a round.
    order: Vec<AgentId>,
    transition: T,
    params: SchedulerParams,
    /// Rounds completed so far.
    round: u64,
}

impl<T: Transition> Scheduler<T> {
    /// Create a scheduler whose history holds the bootstrap record
    /// `[bootstrap_floor, start_time) -> initial`.
    ///
    /// Agents are visited in the snapshot's key order.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::NoAgents`], [`SchedulerError::InvalidEpsilon`],
    /// [`SchedulerError::StartTimeMismatch`], or
    /// [`SchedulerError::InvalidBootstrap`] when the inputs are inconsistent.
    pub fn new(
        initial: Snapshot,
        transition: T,
        params: SchedulerParams,
    ) -> Result<Self, SchedulerError> {
        let min_time_step = initial
            .values()
            .map(|state| state.time_step)
            .reduce(f64::min)
            .ok_or(SchedulerError::NoAgents)?;

        if !(params.epsilon > 0.0 && params.epsilon < min_time_step) {
            return Err(SchedulerError::InvalidEpsilon {
                epsilon: params.epsilon,
                min_time_step,
            });
        }

        if let Some((agent_id, state)) = initial
            .iter()
            .find(|(_, state)| !same_instant(state.time, params.start_time))
        {
            return Err(SchedulerError::StartTimeMismatch {
                agent_id: agent_id.clone(),
                time: state.time,
                start_time: params.start_time,
            });
        }

        let mut store = IntervalStore::new();
        let order: Vec<AgentId> = initial.keys().cloned().collect();
        let clocks = order
            .iter()
            .map(|id| (id.clone(), params.start_time))
            .collect();

        store
            .insert(params.bootstrap_floor, params.start_time, initial)
            .map_err(|_invalid| SchedulerError::InvalidBootstrap {
                floor: params.bootstrap_floor,
                start_time: params.start_time,
            })?;

        Ok(Self {
            store,
            clocks,
            order,
            transition,
            params,
            round: 0,
        })
    }

    /// Try to advance one agent by one step.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::UnknownAgent`] for an unknown id,
    /// [`SchedulerError::Transition`] if propagation fails, or
    /// [`SchedulerError::Store`] if the new state does not move the agent's
    /// clock forward.
    pub fn step_agent(&mut self, agent_id: &AgentId) -> Result<StepOutcome, SchedulerError> {
        let t = self
            .clock(agent_id)
            .ok_or_else(|| SchedulerError::UnknownAgent {
                agent_id: agent_id.clone(),
            })?;

        let snapshot = read_snapshot(&self.store, t - self.params.epsilon);

        let missing = self.missing_from(&snapshot);
        if !missing.is_empty() || snapshot.len() != self.order.len() {
            debug!(
                agent = %agent_id,
                time = t,
                missing = missing.len(),
                "snapshot incomplete, deferring"
            );
            return Ok(StepOutcome::Deferred { missing });
        }

        let next = self
            .transition
            .propagate(agent_id, &snapshot)
            .map_err(|source| SchedulerError::Transition {
                agent_id: agent_id.clone(),
                source,
            })?;

        self.record(agent_id, t, next)?;

        debug!(agent = %agent_id, from = t, to = next.time, "agent advanced");
        Ok(StepOutcome::Advanced {
            from: t,
            to: next.time,
        })
    }

    /// Visit every agent once, in order.
    ///
    /// # Errors
    ///
    /// Propagates the first error from [`step_agent`](Self::step_agent).
    pub fn run_round(&mut self) -> Result<RoundSummary, SchedulerError> {
        let round = self.round.saturating_add(1);
        let mut summary = RoundSummary {
            round,
            advanced: Vec::new(),
            deferred: Vec::new(),
        };

        for agent_id in self.order.clone() {
            match self.step_agent(&agent_id)? {
                StepOutcome::Advanced { .. } => summary.advanced.push(agent_id),
                StepOutcome::Deferred { .. } => summary.deferred.push(agent_id),
            }
        }

        self.round = round;
        Ok(summary)
    }

    /// Run exactly `rounds` rounds, calling `callback` after each one.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first [`SchedulerError`].
    pub fn run(
        &mut self,
        rounds: u32,
        callback: &mut dyn RoundCallback,
    ) -> Result<RunSummary, SchedulerError> {
        info!(
            rounds,
            agents = self.order.len(),
            epsilon = self.params.epsilon,
            start_time = self.params.start_time,
            "Simulation starting"
        );

        let mut advanced: u64 = 0;
        let mut deferred: u64 = 0;

        for _ in 0..rounds {
            let summary = self.run_round()?;
            advanced = advanced.saturating_add(summary.advanced.len() as u64);
            deferred = deferred.saturating_add(summary.deferred.len() as u64);
            callback.on_round(&summary, &self.store);
        }

        info!(
            rounds,
            advanced,
            deferred,
            records = self.store.len(),
            "Simulation finished"
        );

        Ok(RunSummary {
            rounds: u64::from(rounds),
            advanced,
            deferred,
            clocks: self.clocks.clone(),
        })
    }

    /// The merged universe recorded at `point`.
    pub fn snapshot_at(&self, point: f64) -> Snapshot {
        read_snapshot(&self.store, point)
    }

    /// An agent's current clock.
    pub fn clock(&self, agent_id: &AgentId) -> Option<f64> {
        self.clocks.get(agent_id).copied()
    }

    /// Every agent's current clock.
    pub const fn clocks(&self) -> &BTreeMap<AgentId, f64> {
        &self.clocks
    }

    /// Agents in visiting order.
    pub fn agents(&self) -> &[AgentId] {
        &self.order
    }

    /// Rounds completed so far.
    pub const fn rounds_completed(&self) -> u64 {
        self.round
    }

    /// The recorded history.
    pub const fn store(&self) -> &IntervalStore<Snapshot> {
        &self.store
    }

    /// Consume the scheduler and keep its history.
    pub fn into_store(self) -> IntervalStore<Snapshot> {
        self.store
    }

    /// Agents in visiting order that `snapshot` lacks.
    fn missing_from(&self, snapshot: &Snapshot) -> Vec<AgentId> {
        self.order
            .iter()
            .filter(|id| !snapshot.contains_key(*id))
            .cloned()
            .collect()
    }

    /// Append `[from, next.time) -> {agent: next}` and move the clock.
    fn record(
        &mut self,
        agent_id: &AgentId,
        from: f64,
        next: AgentState,
    ) -> Result<(), SchedulerError> {
        let mut value = Snapshot::new();
        value.insert(agent_id.clone(), next);
        self.store.insert(from, next.time, value)?;
        self.clocks.insert(agent_id.clone(), next.time);
        Ok(())
    }
}

/// Exact equality of two clock readings without a float `==`.
const fn same_instant(a: f64, b: f64) -> bool {
    a <= b && a >= b
}
