//! Reading a merged universe snapshot out of the history store.
//!
//! Each stored record holds the state of one agent (or of every agent, for
//! the bootstrap record). A point query returns all records alive at that
//! instant; merging them gives the universe as it was at that moment.

use lightclock_store::{IntervalStore, PointNotFound};
use lightclock_types::Snapshot;
use tracing::trace;

/// Merge per-agent mappings into one snapshot.
///
/// Later mappings win: when two inputs carry the same agent, the one that
/// comes last in iteration order is kept.
pub fn merge_snapshots<'a, I>(parts: I) -> Snapshot
where
    I: IntoIterator<Item = &'a Snapshot>,
{
    let mut merged = Snapshot::new();
    for part in parts {
        for (agent_id, state) in part {
            merged.insert(agent_id.clone(), *state);
        }
    }
    merged
}

/// Read the universe as recorded at `point`.
///
/// Returns an empty snapshot when nothing is recorded at `point`; that is
/// the normal state before any data exists for an instant.
pub fn read_snapshot(store: &IntervalStore<Snapshot>, point: f64) -> Snapshot {
    match store.query(point) {
        Ok(parts) => merge_snapshots(parts),
        Err(PointNotFound { .. }) => {
            trace!(point, "no records at point, empty snapshot");
            Snapshot::new()
        }
    }
}
