#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of points a series window holds unless configured otherwise.
pub const DEFAULT_SERIES_CAPACITY: usize = 100;

/// One sample of a real-time series.
///
/// `sequence` is assigned at insertion and is unique within a series until
/// the series is cleared.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SeriesPoint {
    pub sequence: u64,
    pub value: f64,
}
