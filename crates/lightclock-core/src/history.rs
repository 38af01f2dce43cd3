//! Persisting a run's history and reading world-lines out of it.
//!
//! The history file is the only externally visible artifact of a run: a
//! JSON array of `[low, high, {agent: state}]` triples in insertion order,
//! indented with four spaces. Every step of a run is deterministic, so the
//! same configuration always produces the same bytes.

use std::collections::BTreeMap;
use std::path::Path;

use lightclock_store::{IntervalStore, Record};
use lightclock_types::{AgentId, AgentState, Snapshot};
use serde::Serialize;
use tracing::info;

/// Indentation of the persisted JSON.
const INDENT: &[u8] = b"    ";

/// Errors that can occur reading or writing a history file.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// Reading, writing, or creating directories failed.
    #[error("history I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The history could not be encoded or decoded.
    ///
    /// Decoding also fails here when a stored range is invalid.
    #[error("history JSON error: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// A record holds an infinite or NaN number, which JSON cannot carry.
    #[error("record [{low}, {high}) holds a non-finite number")]
    NonFinite {
        /// Lower bound of the offending record.
        low: f64,
        /// Upper bound of the offending record.
        high: f64,
    },
}

/// Encode a history as pretty-printed JSON triples.
///
/// # Errors
///
/// Returns [`HistoryError::NonFinite`] if any bound or state field is not
/// finite, or [`HistoryError::Json`] if serialization fails.
pub fn encode(store: &IntervalStore<Snapshot>) -> Result<Vec<u8>, HistoryError> {
    if let Some(record) = store.records().find(|record| !is_finite(record)) {
        return Err(HistoryError::NonFinite {
            low: record.low(),
            high: record.high(),
        });
    }

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    store.serialize(&mut serializer)?;
    Ok(buf)
}

/// Whether a record would survive a JSON round trip.
fn is_finite(record: &Record<Snapshot>) -> bool {
    record.low().is_finite()
        && record.high().is_finite()
        && record.value().values().all(AgentState::is_finite)
}

/// Decode a history previously produced by [`encode`].
///
/// # Errors
///
/// Returns [`HistoryError::Json`] if the bytes are not a valid history.
pub fn decode(bytes: &[u8]) -> Result<IntervalStore<Snapshot>, HistoryError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Write a history to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`HistoryError`] if encoding or any filesystem step fails.
pub fn write_history(path: &Path, store: &IntervalStore<Snapshot>) -> Result<(), HistoryError> {
    let bytes = encode(store)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, &bytes)?;
    info!(
        path = %path.display(),
        records = store.len(),
        bytes = bytes.len(),
        "History written"
    );
    Ok(())
}

/// Read a history file written by [`write_history`].
///
/// # Errors
///
/// Returns [`HistoryError`] if the file cannot be read or decoded.
pub fn read_history(path: &Path) -> Result<IntervalStore<Snapshot>, HistoryError> {
    let bytes = std::fs::read(path)?;
    decode(&bytes)
}

/// One agent's plotted world-line.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Trajectory {
    /// Recorded `x` positions, oldest first.
    pub x: Vec<f64>,
    /// Recorded `y` values, paired with `x`.
    pub y: Vec<f64>,
}

impl Trajectory {
    /// Number of recorded points.
    pub const fn len(&self) -> usize {
        self.x.len()
    }

    /// Whether nothing was recorded.
    pub const fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// The most recent `(x, y)` point.
    pub fn last(&self) -> Option<(f64, f64)> {
        self.x.last().copied().zip(self.y.last().copied())
    }
}

/// Collect every agent's `(x, y)` points in record order.
///
/// The bootstrap record contributes each agent's starting point.
pub fn trajectories(store: &IntervalStore<Snapshot>) -> BTreeMap<AgentId, Trajectory> {
    let mut lines: BTreeMap<AgentId, Trajectory> = BTreeMap::new();
    for record in store.records() {
        for (agent_id, state) in record.value() {
            let line = lines.entry(agent_id.clone()).or_default();
            line.x.push(state.x);
            line.y.push(state.y);
        }
    }
    lines
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn state(time: f64, x: f64, y: f64) -> AgentState {
        AgentState {
            time,
            time_step: 1.0,
            x,
            y,
            vx: 1.0,
            vy: 0.0,
        }
    }

    fn sample() -> IntervalStore<Snapshot> {
        let a = AgentId::from("a");
        let b = AgentId::from("b");

        let mut bootstrap = Snapshot::new();
        bootstrap.insert(a.clone(), state(0.0, 0.0, 0.0));
        bootstrap.insert(b.clone(), state(0.0, 5.0, 0.0));

        let mut store = IntervalStore::new();
        store.insert(-10.0, 0.0, bootstrap).unwrap();
        store
            .insert(0.0, 1.0, Snapshot::from([(a, state(1.0, 1.0, 1.0))]))
            .unwrap();
        store
            .insert(0.0, 1.0, Snapshot::from([(b, state(1.0, 6.0, 1.0))]))
            .unwrap();
        store
    }

    #[test]
    fn encodes_four_space_triples() {
        let mut store = IntervalStore::new();
        store
            .insert(0.0, 1.0, Snapshot::from([(AgentId::from("a"), state(1.0, 2.0, 3.0))]))
            .unwrap();

        let text = String::from_utf8(encode(&store).unwrap()).unwrap();
        let expected = "[\n    [\n        0.0,\n        1.0,\n        {\n            \"a\": {\n                \"time\": 1.0,\n                \"timeStep\": 1.0,\n                \"x\": 2.0,\n                \"y\": 3.0,\n                \"vx\": 1.0,\n                \"vy\": 0.0\n            }\n        }\n    ]\n]";
        assert_eq!(text, expected);
    }

    #[test]
    fn encoding_is_deterministic() {
        assert_eq!(encode(&sample()).unwrap(), encode(&sample()).unwrap());
    }

    #[test]
    fn decode_restores_store() {
        let store = sample();
        let restored = decode(&encode(&store).unwrap()).unwrap();
        assert_eq!(restored, store);
    }

    #[test]
    fn decode_rejects_inverted_range() {
        let bytes = br#"[[2.0, 1.0, {}]]"#;
        assert!(matches!(decode(bytes), Err(HistoryError::Json { .. })));
    }

    #[test]
    fn write_then_read_from_disk() {
        let dir = std::env::temp_dir().join(format!("lightclock-history-{}", std::process::id()));
        let path = dir.join("nested").join("data.json");

        write_history(&path, &sample()).unwrap();
        let restored = read_history(&path).unwrap();
        assert_eq!(restored, sample());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn non_finite_records_are_not_written() {
        let mut open_ended = IntervalStore::new();
        open_ended
            .insert(
                f64::NEG_INFINITY,
                0.0,
                Snapshot::from([(AgentId::from("a"), state(0.0, 0.0, 0.0))]),
            )
            .unwrap();
        assert!(matches!(
            encode(&open_ended),
            Err(HistoryError::NonFinite { low, high }) if low == f64::NEG_INFINITY && high == 0.0
        ));

        let mut nan_state = sample();
        nan_state
            .insert(1.0, 2.0, Snapshot::from([(AgentId::from("a"), state(2.0, f64::NAN, 2.0))]))
            .unwrap();
        assert!(matches!(
            encode(&nan_state),
            Err(HistoryError::NonFinite { low, .. }) if low == 1.0
        ));

        let dir = std::env::temp_dir().join(format!("lightclock-nonfinite-{}", std::process::id()));
        let path = dir.join("data.json");
        assert!(write_history(&path, &open_ended).is_err());
        assert!(!dir.exists());
    }

    #[test]
    fn trajectories_follow_record_order() {
        let lines = trajectories(&sample());
        assert_eq!(lines.len(), 2);

        let a = &lines[&AgentId::from("a")];
        assert_eq!(a.x, vec![0.0, 1.0]);
        assert_eq!(a.y, vec![0.0, 1.0]);
        assert_eq!(a.last(), Some((1.0, 1.0)));

        let b = &lines[&AgentId::from("b")];
        assert_eq!(b.x, vec![5.0, 6.0]);
        assert_eq!(b.len(), 2);
    }

    #[test]
    fn empty_history_has_no_trajectories() {
        assert!(trajectories(&IntervalStore::new()).is_empty());
    }
}
