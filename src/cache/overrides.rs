//! Manual buy-price overrides for orphan sells.

use crate::domain::{LogId, TimeSec};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A user-supplied buy price for one sell event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualOverride {
    pub buy_price: f64,
    pub set_at: TimeSec,
}

/// Event id -> manual buy price. Consulted read-only by the ledger; changing
/// an entry never touches the log store or coverage, it only makes the next
/// replay resolve differently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ManualOverrides {
    by_id: HashMap<String, ManualOverride>,
}

impl ManualOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn get(&self, id: &LogId) -> Option<&ManualOverride> {
        self.by_id.get(id.as_str())
    }

    /// Set the override for `id`. A non-finite or non-positive price is not
    /// an error: it clears any existing override instead.
    pub fn set(&mut self, id: &LogId, buy_price: f64, set_at: TimeSec) {
        if !buy_price.is_finite() || buy_price <= 0.0 {
            self.by_id.remove(id.as_str());
            return;
        }
        self.by_id
            .insert(id.as_str().to_string(), ManualOverride { buy_price, set_at });
    }

    /// Remove the override for `id`, if any. Returns whether one existed.
    pub fn clear(&mut self, id: &LogId) -> bool {
        self.by_id.remove(id.as_str()).is_some()
    }

    /// Remove every override.
    pub fn clear_all(&mut self) {
        self.by_id.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> LogId {
        LogId::new(s.to_string())
    }

    #[test]
    fn test_set_and_get() {
        let mut map = ManualOverrides::new();
        map.set(&id("sell1"), 5.0, TimeSec::new(100));
        let o = map.get(&id("sell1")).unwrap();
        assert_eq!(o.buy_price, 5.0);
        assert_eq!(o.set_at, TimeSec::new(100));
    }

    #[test]
    fn test_nonpositive_price_clears() {
        let mut map = ManualOverrides::new();
        map.set(&id("sell1"), 5.0, TimeSec::new(100));
        map.set(&id("sell1"), 0.0, TimeSec::new(200));
        assert!(map.get(&id("sell1")).is_none());
    }

    #[test]
    fn test_nonfinite_price_clears() {
        let mut map = ManualOverrides::new();
        map.set(&id("sell1"), 5.0, TimeSec::new(100));
        map.set(&id("sell1"), f64::NAN, TimeSec::new(200));
        assert!(map.get(&id("sell1")).is_none());
        map.set(&id("sell2"), f64::INFINITY, TimeSec::new(200));
        assert!(map.get(&id("sell2")).is_none());
    }

    #[test]
    fn test_negative_price_on_empty_map_is_noop() {
        let mut map = ManualOverrides::new();
        map.set(&id("sell1"), -3.0, TimeSec::new(100));
        assert!(map.is_empty());
    }

    #[test]
    fn test_clear_and_clear_all() {
        let mut map = ManualOverrides::new();
        map.set(&id("a"), 1.0, TimeSec::new(1));
        map.set(&id("b"), 2.0, TimeSec::new(2));
        assert!(map.clear(&id("a")));
        assert!(!map.clear(&id("a")));
        map.clear_all();
        assert!(map.is_empty());
    }

    #[test]
    fn test_serde_shape_is_flat_map() {
        let mut map = ManualOverrides::new();
        map.set(&id("sell1"), 5.5, TimeSec::new(9));
        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json["sell1"]["buyPrice"], 5.5);
    }
}
