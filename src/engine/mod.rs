//! Derived-state computation over cached events.

pub mod ledger;

pub use ledger::{replay, sell_proceeds, Lot, SellProceeds};
