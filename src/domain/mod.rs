//! Domain types shared across the crate.

pub mod event;
pub mod interval;
pub mod primitives;
pub mod row;

pub use event::{Event, TradeFields};
pub use interval::Interval;
pub use primitives::{InstrumentId, Kind, LogId, TimeSec};
pub use row::{LedgerRow, WindowSummary};
