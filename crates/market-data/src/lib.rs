//! Stockdash Market Data Crate
//!
//! Provider-agnostic quote fetching for the Stockdash dashboard.
//!
//! The adapter is deliberately thin: a provider is queried once per symbol,
//! with no caching, retry, or backoff. A failure for one symbol never fails
//! a batch; callers receive the quotes that succeeded plus the symbols that
//! did not.
//!
//! # Core Types
//!
//! - [`Quote`] - a normalized quote (price, change, volume, as-of time)
//! - [`SearchResult`] - a symbol search hit
//! - [`MarketDataProvider`] - trait implemented by concrete quote sources
//! - [`MarketDataService`] - fail-soft batch fetching over one provider

pub mod errors;
pub mod models;
pub mod provider;
pub mod service;

pub use errors::MarketDataError;
pub use models::{Quote, SearchResult};
pub use provider::yahoo::YahooProvider;
pub use provider::MarketDataProvider;
pub use service::{BatchQuotes, MarketDataService, POPULAR_SYMBOLS};
