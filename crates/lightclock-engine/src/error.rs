//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode of a run so that `main` can
//! propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: lightclock_core::config::ConfigError,
    },

    /// The scheduler rejected its inputs or a step failed.
    #[error("scheduler error: {source}")]
    Scheduler {
        /// The underlying scheduler error.
        #[from]
        source: lightclock_core::scheduler::SchedulerError,
    },

    /// Writing the history file failed.
    #[error("history error: {source}")]
    History {
        /// The underlying history error.
        #[from]
        source: lightclock_core::history::HistoryError,
    },
}
