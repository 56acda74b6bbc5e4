//! Ledger rows: the derived, per-trade display records emitted by replay.

use crate::domain::{InstrumentId, Kind, LogId, TimeSec};
use serde::{Deserialize, Serialize};

/// One display row per BUY or SELL event in a queried window.
///
/// Derived on every replay, never persisted. Currency figures for sells are
/// in whole currency units after the platform's rounding rules; `net` is
/// `None` for buys (not applicable, distinct from a numeric zero) and
/// `cost_basis`/`profit` are `None` while a sell still needs manual input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRow {
    pub id: LogId,
    pub timestamp: TimeSec,
    /// Human-readable UTC time, precomputed for display layers.
    pub when: String,
    pub action: Kind,
    pub instrument: InstrumentId,
    pub shares: f64,
    /// Average or override buy price backing the cost basis, when resolved.
    pub buy_price: Option<f64>,
    pub sell_price: Option<f64>,
    /// Displayed gross for sells, re-derived as `net + fee`.
    pub gross: Option<i64>,
    /// Platform fee in whole currency units (zero for buys by definition).
    pub fee: i64,
    /// Net proceeds for sells; not applicable to buys.
    pub net: Option<i64>,
    pub cost_basis: Option<f64>,
    pub profit: Option<f64>,
    pub manual_override_used: bool,
    pub needs_manual_input: bool,
}

/// Aggregate totals over the SELL rows of a window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowSummary {
    pub total_buy: f64,
    pub total_sell: i64,
    pub total_fees: i64,
    pub total_profit: f64,
}

impl WindowSummary {
    /// Sum sell-side figures across rows, skipping unresolved entries.
    pub fn from_rows(rows: &[LedgerRow]) -> Self {
        let mut summary = WindowSummary::default();
        for row in rows.iter().filter(|r| r.action == Kind::Sell) {
            summary.total_buy += row.cost_basis.unwrap_or(0.0);
            summary.total_sell += row.net.unwrap_or(0);
            summary.total_fees += row.fee;
            summary.total_profit += row.profit.unwrap_or(0.0);
        }
        summary
    }
}
