//! Deduplicated, timestamp-indexed store of raw log events.

use crate::domain::{Event, LogId, TimeSec};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Id-keyed event collection with an ascending `(timestamp, id)` index.
///
/// Invariant: every id in `ids_asc` exists in `by_id` and vice versa. The
/// `(timestamp, id)` ordering keeps replay deterministic when timestamps tie.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogStore {
    by_id: HashMap<String, Event>,
    ids_asc: Vec<LogId>,
}

impl LogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ids_asc.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids_asc.is_empty()
    }

    pub fn contains(&self, id: &LogId) -> bool {
        self.by_id.contains_key(id.as_str())
    }

    pub fn get(&self, id: &LogId) -> Option<&Event> {
        self.by_id.get(id.as_str())
    }

    /// Insert events, skipping ids already present. Returns how many were new.
    pub fn insert_batch(&mut self, events: &[Event]) -> usize {
        let mut added = 0;
        for event in events {
            if self.by_id.contains_key(event.id.as_str()) {
                continue;
            }
            self.ids_asc.push(event.id.clone());
            self.by_id.insert(event.id.as_str().to_string(), event.clone());
            added += 1;
        }
        if added > 0 {
            self.resort_index();
        }
        added
    }

    /// Evict oldest entries (index order) until the store is at or under `cap`.
    /// Returns the evicted ids.
    pub fn evict_to_cap(&mut self, cap: usize) -> Vec<LogId> {
        if self.ids_asc.len() <= cap {
            return Vec::new();
        }
        let overflow = self.ids_asc.len() - cap;
        let evicted: Vec<LogId> = self.ids_asc.drain(..overflow).collect();
        for id in &evicted {
            self.by_id.remove(id.as_str());
        }
        evicted
    }

    /// Events with `from <= timestamp <= to`, ascending by `(timestamp, id)`.
    pub fn events_in(&self, from: TimeSec, to: TimeSec) -> Vec<&Event> {
        self.iter_asc()
            .skip_while(|e| e.timestamp < from)
            .take_while(|e| e.timestamp <= to)
            .collect()
    }

    /// Events with `timestamp < before`, ascending. These seed opening lots.
    pub fn events_before(&self, before: TimeSec) -> Vec<&Event> {
        self.iter_asc()
            .take_while(|e| e.timestamp < before)
            .collect()
    }

    fn iter_asc(&self) -> impl Iterator<Item = &Event> {
        self.ids_asc.iter().filter_map(|id| self.by_id.get(id.as_str()))
    }

    fn resort_index(&mut self) {
        let by_id = &self.by_id;
        self.ids_asc.sort_by(|a, b| {
            let ta = by_id.get(a.as_str()).map(|e| e.timestamp);
            let tb = by_id.get(b.as_str()).map(|e| e.timestamp);
            ta.cmp(&tb).then_with(|| a.cmp(b))
        });
    }
}
