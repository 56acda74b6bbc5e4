//! Closed timestamp intervals used by coverage tracking.

use crate::domain::TimeSec;
use serde::{Deserialize, Serialize};

/// A closed interval `[start, end]` of whole-second timestamps, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: i64,
    pub end: i64,
}

impl Interval {
    /// Create an interval, normalizing a reversed pair.
    pub fn new(start: i64, end: i64) -> Self {
        if start <= end {
            Interval { start, end }
        } else {
            Interval { start: end, end: start }
        }
    }

    /// True when `t` lies inside the closed interval.
    pub fn contains(&self, t: TimeSec) -> bool {
        self.start <= t.as_i64() && t.as_i64() <= self.end
    }

    /// True when `other` overlaps or is adjacent to this interval
    /// (gap of at most one timestamp unit).
    pub fn touches(&self, other: &Interval) -> bool {
        other.start <= self.end.saturating_add(1) && self.start <= other.end.saturating_add(1)
    }
}
