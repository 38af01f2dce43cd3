//! The append-only interval store.
//!
//! # Design
//!
//! - **Append-only**: records are never modified or removed.
//! - **Overlaps allowed**: each agent advances with its own step, so one
//!   instant usually falls inside several records at once.
//! - **Linear scan**: record counts are small; queries walk every record
//!   in insertion order.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::interval::{Interval, Record};
use crate::{PointNotFound, StoreError};

/// Key-value store mapping half-open ranges `[low, high)` to values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntervalStore<V> {
    /// All records, in insertion order.
    records: Vec<Record<V>>,
}

impl<V> IntervalStore<V> {
    /// Create an empty store.
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Rebuild a store from `(low, high, value)` triples, validating each.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidRange`] on the first invalid triple.
    pub fn from_records<I>(triples: I) -> Result<Self, StoreError>
    where
        I: IntoIterator<Item = (f64, f64, V)>,
    {
        let mut store = Self::new();
        for (low, high, value) in triples {
            store.insert(low, high, value)?;
        }
        Ok(store)
    }

    /// Append `value` under the range `[low, high)`.
    ///
    /// No deduplication or merging of overlapping ranges is performed. On
    /// failure the store is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidRange`] unless `low < high`.
    pub fn insert(&mut self, low: f64, high: f64, value: V) -> Result<(), StoreError> {
        let interval = Interval::new(low, high)?;
        self.records.push(Record::new(interval, value));
        trace!(low, high, records = self.records.len(), "record appended");
        Ok(())
    }

    /// Every value whose range contains `point`, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`PointNotFound`] if no range contains `point`.
    pub fn query(&self, point: f64) -> Result<Vec<&V>, PointNotFound> {
        let found: Vec<&V> = self
            .records
            .iter()
            .filter(|record| record.contains(point))
            .map(Record::value)
            .collect();

        if found.is_empty() {
            Err(PointNotFound { point })
        } else {
            Ok(found)
        }
    }

    /// All records, in insertion order.
    pub fn records(&self) -> impl Iterator<Item = &Record<V>> {
        self.records.iter()
    }

    /// Number of stored records.
    pub const fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<V> Default for IntervalStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// The layout from the crate docs:
    ///
    /// ```text
    /// 0  1  2  3  4  5  6  7  8  9
    /// [A      )[B)            [E)
    /// [C   )[D   )
    /// ```
    fn sample_store() -> IntervalStore<&'static str> {
        let mut store = IntervalStore::new();
        store.insert(0.0, 3.0, "Record A").unwrap();
        store.insert(3.0, 4.0, "Record B").unwrap();
        store.insert(0.0, 2.0, "Record C").unwrap();
        store.insert(2.0, 4.0, "Record D").unwrap();
        store.insert(8.0, 9.0, "Record E").unwrap();
        store
    }

    #[test]
    fn inverted_range_is_rejected_without_mutation() {
        let mut store = sample_store();
        let before = store.clone();

        let result = store.insert(2.0, 0.0, "Record F");
        assert_eq!(
            result,
            Err(StoreError::InvalidRange {
                low: 2.0,
                high: 0.0
            })
        );
        assert_eq!(store, before);
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn empty_range_is_rejected() {
        let mut store = IntervalStore::new();
        assert!(store.insert(1.0, 1.0, ()).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn overlapping_ranges_return_in_insertion_order() {
        let store = sample_store();
        assert_eq!(store.query(2.1).unwrap(), vec![&"Record A", &"Record D"]);
        assert_eq!(store.query(8.0).unwrap(), vec![&"Record E"]);
        assert_eq!(
            store.query(0.0).unwrap(),
            vec![&"Record A", &"Record C"]
        );
    }

    #[test]
    fn upper_bound_is_exclusive() {
        let store = sample_store();
        assert_eq!(store.query(9.0), Err(PointNotFound { point: 9.0 }));
        assert_eq!(store.query(3.0).unwrap(), vec![&"Record B", &"Record D"]);
    }

    #[test]
    fn gap_is_not_found() {
        let store = sample_store();
        assert_eq!(store.query(5.0), Err(PointNotFound { point: 5.0 }));
    }

    #[test]
    fn containment_matches_bounds_for_every_record() {
        let store = sample_store();
        let points = [-1.0, 0.0, 0.5, 1.99, 2.0, 2.99, 3.0, 3.5, 4.0, 7.9, 8.0, 8.5, 9.0];
        for point in points {
            let expected: Vec<&&str> = store
                .records()
                .filter(|r| r.low() <= point && point < r.high())
                .map(Record::value)
                .collect();
            let result = store.query(point);
            assert_eq!(result.is_err(), expected.is_empty(), "point {point}");
            assert_eq!(result.unwrap_or_default(), expected, "point {point}");
        }
    }

    #[test]
    fn miss_converts_into_store_error() {
        let store: IntervalStore<u8> = IntervalStore::new();
        let miss = store.query(1.5).unwrap_err();
        assert_eq!(StoreError::from(miss), StoreError::NotFound { point: 1.5 });
    }

    #[test]
    fn same_range_may_be_stored_twice() {
        let mut store = IntervalStore::new();
        store.insert(0.0, 1.0, 'a').unwrap();
        store.insert(0.0, 1.0, 'b').unwrap();
        assert_eq!(store.query(0.5).unwrap(), vec![&'a', &'b']);
    }

    #[test]
    fn from_records_stops_at_first_invalid_triple() {
        let ok = IntervalStore::from_records(vec![(0.0, 1.0, 1_u8), (1.0, 2.0, 2)]);
        assert_eq!(ok.map(|s| s.len()), Ok(2));

        let bad = IntervalStore::from_records(vec![(0.0, 1.0, 1_u8), (5.0, 5.0, 2)]);
        assert!(matches!(bad, Err(StoreError::InvalidRange { .. })));
    }

    #[test]
    fn serializes_as_array_of_triples() {
        let mut store = IntervalStore::new();
        store.insert(-999_999_999.0, 0.0, 7_u32).unwrap();
        store.insert(0.0, 1.0, 8).unwrap();
        let json = serde_json::to_string(&store).unwrap();
        assert_eq!(json, "[[-999999999.0,0.0,7],[0.0,1.0,8]]");

        let restored: IntervalStore<u32> = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, store);
    }
}
