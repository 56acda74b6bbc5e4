//! Average-cost ledger replay.
//!
//! Replays a chronologically ascending event stream into per-instrument lots
//! and emits one display row per BUY/SELL inside the queried window. Lots are
//! transient: they are rebuilt from scratch on every replay, which keeps the
//! output deterministic regardless of how the cache was filled.

use crate::cache::ManualOverrides;
use crate::domain::{Event, Kind, LedgerRow, TradeFields};
use std::collections::HashMap;

/// Running position for one instrument: total shares held and their total
/// cost. Average cost is `cost / shares` while shares are positive.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Lot {
    pub shares: f64,
    pub cost: f64,
}

impl Lot {
    /// Weighted-average cost per share, undefined on an empty lot.
    pub fn avg_cost(&self) -> Option<f64> {
        if self.shares > 0.0 {
            Some(self.cost / self.shares)
        } else {
            None
        }
    }

    fn apply_buy(&mut self, fields: &TradeFields) {
        self.shares += fields.shares;
        self.cost += fields.gross;
    }

    /// Reduce the lot by a sale of `shares` at the current average cost.
    /// Returns the cost removed, or `None` if the lot was empty. Both fields
    /// clamp at zero so float rounding can never drive them negative.
    fn apply_sell(&mut self, shares: f64) -> Option<f64> {
        let avg = self.avg_cost()?;
        let removed = avg * shares;
        self.shares = (self.shares - shares).max(0.0);
        self.cost = (self.cost - removed).max(0.0);
        Some(removed)
    }
}

/// Sell-side money figures after the platform's cent-accurate rounding.
///
/// The fee (0.10%) always rounds up in whole currency units; net proceeds
/// round down; the displayed gross is re-derived as `net + fee` so the three
/// figures stay mutually consistent despite independent rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SellProceeds {
    pub gross: i64,
    pub fee: i64,
    pub net: i64,
}

pub fn sell_proceeds(price: f64, shares: f64) -> SellProceeds {
    let price_cents = (price * 100.0).round();
    let gross_cents = price_cents * shares;
    let gross = gross_cents / 100.0;
    let fee = (gross * 0.001).ceil() as i64;
    let net = (gross - fee as f64).floor() as i64;
    SellProceeds {
        gross: net + fee,
        fee,
        net,
    }
}

/// Replay `context` events (silently, to seed opening lots) followed by
/// `window` events (emitting one row each), both ascending by time.
///
/// Cost basis for a sell resolves in order: current lot average, then a
/// manual override for the event id, else the row is marked as needing
/// manual input, which is a valid terminal state rather than an error.
/// Rows come back newest-first.
pub fn replay(
    context: &[&Event],
    window: &[&Event],
    overrides: &ManualOverrides,
) -> Vec<LedgerRow> {
    let mut lots: HashMap<String, Lot> = HashMap::new();

    for event in context {
        let Some((instrument, fields)) = event.trade_fields() else {
            continue;
        };
        let lot = lots.entry(instrument.as_str().to_string()).or_default();
        match event.kind {
            Kind::Buy => lot.apply_buy(&fields),
            Kind::Sell => {
                lot.apply_sell(fields.shares);
            }
            Kind::Other => unreachable!("trade_fields filters non-trades"),
        }
    }

    let mut rows = Vec::new();
    for event in window {
        let Some((instrument, fields)) = event.trade_fields() else {
            continue;
        };
        let lot = lots.entry(instrument.as_str().to_string()).or_default();

        let row = match event.kind {
            Kind::Buy => {
                lot.apply_buy(&fields);
                LedgerRow {
                    id: event.id.clone(),
                    timestamp: event.timestamp,
                    when: event.timestamp.as_display_date(),
                    action: Kind::Buy,
                    instrument,
                    shares: fields.shares,
                    buy_price: Some(fields.price),
                    sell_price: None,
                    gross: None,
                    fee: 0,
                    net: None,
                    cost_basis: Some(fields.gross),
                    profit: None,
                    manual_override_used: false,
                    needs_manual_input: false,
                }
            }
            Kind::Sell => {
                let proceeds = sell_proceeds(fields.price, fields.shares);
                let avg_before = lot.avg_cost();

                let mut buy_price = avg_before;
                let mut cost_basis = None;
                let mut profit = None;
                let mut manual_override_used = false;
                let mut needs_manual_input = false;

                if let Some(removed) = lot.apply_sell(fields.shares) {
                    cost_basis = Some(removed);
                    profit = Some(proceeds.net as f64 - removed);
                } else if let Some(o) = overrides.get(&event.id) {
                    buy_price = Some(o.buy_price);
                    cost_basis = Some(o.buy_price * fields.shares);
                    profit = Some(proceeds.net as f64 - o.buy_price * fields.shares);
                    manual_override_used = true;
                } else {
                    needs_manual_input = true;
                }

                LedgerRow {
                    id: event.id.clone(),
                    timestamp: event.timestamp,
                    when: event.timestamp.as_display_date(),
                    action: Kind::Sell,
                    instrument,
                    shares: fields.shares,
                    buy_price,
                    sell_price: Some(fields.price),
                    gross: Some(proceeds.gross),
                    fee: proceeds.fee,
                    net: Some(proceeds.net),
                    cost_basis,
                    profit,
                    manual_override_used,
                    needs_manual_input,
                }
            }
            Kind::Other => unreachable!("trade_fields filters non-trades"),
        };
        rows.push(row);
    }

    rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| b.id.cmp(&a.id)));
    rows
}
