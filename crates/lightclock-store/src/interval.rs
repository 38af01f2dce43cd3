//! Half-open time ranges and the records keyed by them.

use core::cmp::Ordering;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::StoreError;

/// A validated half-open range `[low, high)` with `low < high`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    low: f64,
    high: f64,
}

impl Interval {
    /// Build an interval, rejecting empty, inverted, and NaN bounds.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidRange`] unless `low < high`.
    pub fn new(low: f64, high: f64) -> Result<Self, StoreError> {
        match low.partial_cmp(&high) {
            Some(Ordering::Less) => Ok(Self { low, high }),
            _ => Err(StoreError::InvalidRange { low, high }),
        }
    }

    /// Inclusive lower bound.
    pub const fn low(&self) -> f64 {
        self.low
    }

    /// Exclusive upper bound.
    pub const fn high(&self) -> f64 {
        self.high
    }

    /// Whether `low <= point < high`.
    pub const fn contains(&self, point: f64) -> bool {
        self.low <= point && point < self.high
    }
}

/// An immutable `(low, high, value)` triple.
///
/// Serializes as the JSON array `[low, high, value]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<V> {
    interval: Interval,
    value: V,
}

impl<V> Record<V> {
    /// Pair a validated interval with its value.
    pub const fn new(interval: Interval, value: V) -> Self {
        Self { interval, value }
    }

    /// The range this record covers.
    pub const fn interval(&self) -> Interval {
        self.interval
    }

    /// Inclusive lower bound.
    pub const fn low(&self) -> f64 {
        self.interval.low
    }

    /// Exclusive upper bound.
    pub const fn high(&self) -> f64 {
        self.interval.high
    }

    /// The stored value.
    pub const fn value(&self) -> &V {
        &self.value
    }

    /// Whether this record's range contains `point`.
    pub const fn contains(&self, point: f64) -> bool {
        self.interval.contains(point)
    }
}

impl<V: Serialize> Serialize for Record<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.interval.low, self.interval.high, &self.value).serialize(serializer)
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for Record<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (low, high, value) = <(f64, f64, V)>::deserialize(deserializer)?;
        let interval = Interval::new(low, high).map_err(D::Error::custom)?;
        Ok(Self { interval, value })
    }
}
