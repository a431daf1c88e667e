//! Quote and search models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A normalized market quote. Ephemeral - fetched per request and never
/// persisted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Quote {
    /// Uppercased ticker symbol
    pub symbol: String,

    /// Company or instrument name, when the provider supplies one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Last traded / regular market price
    pub price: Decimal,

    /// Absolute change versus the previous close
    pub change: Decimal,

    /// Percent change versus the previous close
    pub change_percent: Decimal,

    /// Trading volume, when available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<u64>,

    /// Quote currency
    pub currency: String,

    /// When the quote was taken
    pub as_of: DateTime<Utc>,
}

/// A symbol search hit.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchResult {
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<String>,
}
