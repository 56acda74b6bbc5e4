//! Raw log event records and trade-field reconciliation.

use crate::domain::{InstrumentId, Kind, LogId, TimeSec};
use serde::{Deserialize, Serialize};

/// A single raw record from the remote event log.
///
/// Immutable once stored; the log store only ever adds or evicts events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique, opaque record id assigned by the remote log.
    pub id: LogId,
    /// Record time in seconds since Unix epoch.
    pub timestamp: TimeSec,
    /// Free-form category string from the remote log.
    pub category: String,
    /// Derived kind; only Buy and Sell matter to the ledger.
    pub kind: Kind,
    /// Instrument traded, when the record carries one.
    pub instrument: Option<InstrumentId>,
    /// Shares traded.
    pub shares: Option<f64>,
    /// Per-share price.
    pub price: Option<f64>,
    /// Gross (buys) or net (sells) currency amount reported by the remote log.
    pub gross: Option<f64>,
}

/// Reconciled numeric fields of a trade event, ready for ledger replay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeFields {
    pub shares: f64,
    pub price: f64,
    pub gross: f64,
}

impl Event {
    /// Parse one `(id, payload)` entry of the remote log response.
    ///
    /// Returns `None` when the payload lacks a timestamp; anything else is
    /// retained, with non-trade records mapped to `Kind::Other`.
    pub fn from_remote_entry(id: &str, payload: &serde_json::Value) -> Option<Self> {
        let timestamp = payload.get("timestamp").and_then(|v| v.as_i64())?;
        let type_code = payload.get("log").and_then(value_as_i64);
        let category = payload
            .get("category")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let data = payload.get("data");
        let instrument = data
            .and_then(|d| d.get("stock"))
            .and_then(value_as_display_string)
            .map(InstrumentId::new);
        let shares = data.and_then(|d| d.get("amount")).and_then(|v| v.as_f64());
        let gross = data.and_then(|d| d.get("worth")).and_then(|v| v.as_f64());
        let price = data.and_then(|d| d.get("price")).and_then(value_as_f64);

        Some(Event {
            id: LogId::new(id.to_string()),
            timestamp: TimeSec::new(timestamp),
            category,
            kind: Kind::from_type_code(type_code),
            instrument,
            shares,
            price,
            gross,
        })
    }

    /// Reconcile this event's numeric fields for ledger use.
    ///
    /// A missing price is derived from gross/shares and a missing gross from
    /// shares*price. Returns `None` for non-trade events, events without an
    /// instrument, or events whose fields cannot be reconciled; such events
    /// are dropped from ledger consideration by policy (the source feed is a
    /// general-purpose log and most entries are unrelated to trading).
    pub fn trade_fields(&self) -> Option<(InstrumentId, TradeFields)> {
        if !self.kind.is_trade() {
            return None;
        }
        let instrument = self.instrument.clone()?;

        let shares = self.shares.filter(|s| s.is_finite())?;
        let mut price = self.price.filter(|p| p.is_finite());
        let mut gross = self.gross.filter(|g| g.is_finite());

        if price.is_none() {
            if let Some(g) = gross {
                if shares > 0.0 {
                    price = Some(g / shares);
                }
            }
        }
        if gross.is_none() {
            if let Some(p) = price {
                gross = Some(shares * p);
            }
        }

        match (price, gross) {
            (Some(price), Some(gross)) => Some((instrument, TradeFields { shares, price, gross })),
            _ => None,
        }
    }
}

/// Accept both numeric and numeric-string type codes, as the remote log mixes them.
fn value_as_i64(v: &serde_json::Value) -> Option<i64> {
    match v {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.parse::<i64>().ok(),
        _ => None,
    }
}

fn value_as_f64(v: &serde_json::Value) -> Option<f64> {
    match v {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn value_as_display_string(v: &serde_json::Value) -> Option<String> {
    match v {
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::String(s) => Some(s.clone()),
        _ => None,
    }
}
