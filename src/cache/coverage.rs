//! Coverage tracking: which timestamp ranges have been fully fetched.
//!
//! The set is kept as disjoint, merged, closed intervals in ascending order.
//! Two intervals merge when the gap between them is at most one timestamp
//! unit (adjacent or overlapping). Coverage only grows by union; it shrinks
//! only on a full cache clear.

use crate::domain::Interval;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoverageSet {
    intervals: Vec<Interval>,
}

impl CoverageSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The normalized intervals, ascending and non-touching.
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// Union `[a, b]` into the set and re-normalize.
    pub fn extend(&mut self, a: i64, b: i64) {
        self.intervals.push(Interval::new(a, b));
        self.normalize();
    }

    /// Empty the set. Only a full cache clear does this.
    pub fn clear(&mut self) {
        self.intervals.clear();
    }

    /// The minimal ascending set of closed sub-intervals of
    /// `[requested_from, requested_to]` not yet covered.
    ///
    /// A request fully inside one covered interval yields nothing, which is
    /// the zero-network-calls guarantee; a fully uncovered request yields
    /// exactly the request itself.
    pub fn missing(&self, requested_from: i64, requested_to: i64) -> Vec<Interval> {
        let request = Interval::new(requested_from, requested_to);
        let mut gaps = Vec::new();
        let mut cursor = request.start;

        for iv in &self.intervals {
            if iv.end < request.start {
                continue;
            }
            if iv.start > request.end {
                break;
            }
            if iv.start > cursor {
                gaps.push(Interval::new(cursor, iv.start - 1));
            }
            cursor = cursor.max(iv.end.saturating_add(1));
            if cursor > request.end {
                break;
            }
        }

        if cursor <= request.end {
            gaps.push(Interval::new(cursor, request.end));
        }
        gaps
    }

    /// True when `[from, to]` lies entirely inside coverage.
    pub fn covers(&self, from: i64, to: i64) -> bool {
        self.missing(from, to).is_empty()
    }

    /// Sort by start and left-to-right merge anything touching
    /// (start <= previous end + 1).
    fn normalize(&mut self) {
        if self.intervals.len() < 2 {
            return;
        }
        self.intervals.sort_by_key(|iv| (iv.start, iv.end));

        let mut merged: Vec<Interval> = Vec::with_capacity(self.intervals.len());
        for iv in self.intervals.drain(..) {
            match merged.last_mut() {
                Some(prev) if iv.start <= prev.end.saturating_add(1) => {
                    prev.end = prev.end.max(iv.end);
                }
                _ => merged.push(iv),
            }
        }
        self.intervals = merged;
    }
}
