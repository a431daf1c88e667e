//! Market data provider trait definition.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{Quote, SearchResult};

/// Trait for market data providers.
///
/// Implement this trait to add support for a new quote source. A provider
/// makes exactly one attempt per call; retry and failure policy belong to
/// the caller.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Unique identifier for this provider, e.g. "YAHOO".
    /// Used for logging and error attribution.
    fn id(&self) -> &'static str;

    /// Fetch the latest quote for a symbol.
    async fn get_quote(&self, symbol: &str) -> Result<Quote, MarketDataError>;

    /// Search for symbols matching the query.
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, MarketDataError>;
}
