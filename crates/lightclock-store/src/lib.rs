//! Interval-indexed history store for the Lightclock simulation.
//!
//! The store maps half-open time ranges `[low, high)` to values. Reading
//! from it at a point returns every value whose range contains that point,
//! so overlapping per-agent histories can be merged by the caller.
//!
//! ```text
//! 0  1  2  3  4  5  6  7  8  9
//! [A      )[B)            [E)
//! [C   )[D   )
//!        ^       ^        ^  ^
//! ```
//!
//! Querying `2.1` yields `A, D`; `8` yields `E`; `5` and `9` yield nothing.
//!
//! # Modules
//!
//! - [`interval`] -- [`Interval`] bounds and the immutable [`Record`] triple.
//! - [`store`] -- The append-only [`IntervalStore`].
//!
//! # Usage
//!
//! ```
//! use lightclock_store::{IntervalStore, PointNotFound, StoreError};
//!
//! let mut store = IntervalStore::new();
//! store.insert(0.0, 3.0, "A").ok();
//! store.insert(2.0, 4.0, "D").ok();
//!
//! assert_eq!(store.query(2.1).ok(), Some(vec![&"A", &"D"]));
//! assert_eq!(store.query(5.0), Err(PointNotFound { point: 5.0 }));
//! assert!(matches!(store.insert(2.0, 0.0, "F"), Err(StoreError::InvalidRange { .. })));
//! ```

pub mod interval;
pub mod store;

pub use interval::{Interval, Record};
pub use store::IntervalStore;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors returned by store operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// The range is empty, inverted, or has a NaN bound.
    ///
    /// Always a caller bug: a transition produced a non-advancing step.
    #[error("invalid range [{low}, {high}): low must be strictly less than high")]
    InvalidRange {
        /// Requested lower bound.
        low: f64,
        /// Requested upper bound.
        high: f64,
    },

    /// No stored range contains the queried point.
    #[error("no record contains point {point}")]
    NotFound {
        /// The queried point.
        point: f64,
    },
}

/// A point query that matched no record.
///
/// The only way [`IntervalStore::query`] can fail. Converts into
/// [`StoreError::NotFound`] for callers that propagate store errors.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("no record contains point {point}")]
pub struct PointNotFound {
    /// The queried point.
    pub point: f64,
}

impl From<PointNotFound> for StoreError {
    fn from(miss: PointNotFound) -> Self {
        Self::NotFound { point: miss.point }
    }
}
