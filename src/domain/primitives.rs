//! Domain primitives: TimeSec, LogId, InstrumentId, Kind.

use serde::{Deserialize, Serialize};

/// Time in whole seconds since Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeSec(pub i64);

impl TimeSec {
    /// Create a TimeSec from seconds.
    pub fn new(secs: i64) -> Self {
        TimeSec(secs)
    }

    /// Current wall-clock time.
    pub fn now() -> Self {
        TimeSec(chrono::Utc::now().timestamp())
    }

    /// Get the underlying seconds value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }

    /// Format as a human-readable UTC date string.
    pub fn as_display_date(&self) -> String {
        match chrono::DateTime::from_timestamp(self.0, 0) {
            Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
            None => self.0.to_string(),
        }
    }
}

/// Opaque unique identifier of a raw log record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LogId(pub String);

impl LogId {
    /// Create a LogId from a string.
    pub fn new(id: String) -> Self {
        LogId(id)
    }

    /// Get the id as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LogId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Instrument identifier (the remote log keys instruments numerically; kept opaque).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstrumentId(pub String);

impl InstrumentId {
    /// Create an InstrumentId from a string.
    pub fn new(id: String) -> Self {
        InstrumentId(id)
    }

    /// Get the instrument id as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Event kind derived from the remote type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Kind {
    /// Share purchase.
    Buy,
    /// Share sale.
    Sell,
    /// Anything else in the general-purpose log; ignored by the ledger.
    Other,
}

impl Kind {
    /// Remote type code for a buy record.
    pub const BUY_CODE: i64 = 5510;
    /// Remote type code for a sell record.
    pub const SELL_CODE: i64 = 5511;

    /// Derive the kind from a remote type code.
    pub fn from_type_code(code: Option<i64>) -> Self {
        match code {
            Some(Self::BUY_CODE) => Kind::Buy,
            Some(Self::SELL_CODE) => Kind::Sell,
            _ => Kind::Other,
        }
    }

    /// True for Buy and Sell, the only kinds the ledger retains.
    pub fn is_trade(&self) -> bool {
        matches!(self, Kind::Buy | Kind::Sell)
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Kind::Buy => write!(f, "BUY"),
            Kind::Sell => write!(f, "SELL"),
            Kind::Other => write!(f, "OTHER"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_type_code() {
        assert_eq!(Kind::from_type_code(Some(5510)), Kind::Buy);
        assert_eq!(Kind::from_type_code(Some(5511)), Kind::Sell);
        assert_eq!(Kind::from_type_code(Some(1234)), Kind::Other);
        assert_eq!(Kind::from_type_code(None), Kind::Other);
    }

    #[test]
    fn test_kind_is_trade() {
        assert!(Kind::Buy.is_trade());
        assert!(Kind::Sell.is_trade());
        assert!(!Kind::Other.is_trade());
    }

    #[test]
    fn test_kind_serialization() {
        assert_eq!(serde_json::to_string(&Kind::Buy).unwrap(), "\"BUY\"");
        assert_eq!(serde_json::to_string(&Kind::Sell).unwrap(), "\"SELL\"");
    }

    #[test]
    fn test_timesec_ordering() {
        assert!(TimeSec::new(1000) < TimeSec::new(2000));
    }

    #[test]
    fn test_timesec_display_date() {
        let t = TimeSec::new(0);
        assert_eq!(t.as_display_date(), "1970-01-01 00:00");
    }

    #[test]
    fn test_instrument_display() {
        let id = InstrumentId::new("25".to_string());
        assert_eq!(id.to_string(), "25");
    }
}
