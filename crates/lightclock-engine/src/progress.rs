//! Round callback that reports progress through `tracing`.

use lightclock_core::scheduler::{RoundCallback, RoundSummary};
use lightclock_store::IntervalStore;
use lightclock_types::Snapshot;
use tracing::{debug, info};

/// Logs every round at debug level and every `every`-th round at info.
pub struct ProgressCallback {
    every: u64,
}

impl ProgressCallback {
    /// Create a callback that reports at info level every `every` rounds.
    pub const fn new(every: u64) -> Self {
        Self { every }
    }
}

impl RoundCallback for ProgressCallback {
    fn on_round(&mut self, summary: &RoundSummary, store: &IntervalStore<Snapshot>) {
        debug!(
            round = summary.round,
            advanced = summary.advanced.len(),
            deferred = summary.deferred.len(),
            "Round complete"
        );

        if summary.round.checked_rem(self.every) == Some(0) {
            info!(round = summary.round, records = store.len(), "Progress");
        }
    }
}
