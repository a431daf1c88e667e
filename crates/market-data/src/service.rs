//! Market data service: batch quote fetching and symbol search on top of a
//! provider.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tracing::warn;

use crate::errors::MarketDataError;
use crate::models::{Quote, SearchResult};
use crate::provider::MarketDataProvider;

/// Symbols shown on the dashboard when the user has not asked for anything
/// specific.
pub const POPULAR_SYMBOLS: &[&str] = &["AAPL", "GOOGL", "MSFT", "TSLA", "AMZN"];

/// Result of a batch quote fetch. A symbol the provider could not price ends
/// up in `unavailable` instead of failing the whole batch.
#[derive(Debug, Clone)]
pub struct BatchQuotes {
    pub quotes: Vec<Quote>,
    pub unavailable: Vec<String>,
}

impl BatchQuotes {
    /// Index the priced quotes by symbol.
    pub fn by_symbol(&self) -> HashMap<String, Quote> {
        self.quotes
            .iter()
            .map(|q| (q.symbol.clone(), q.clone()))
            .collect()
    }
}

pub struct MarketDataService {
    provider: Arc<dyn MarketDataProvider>,
}

impl MarketDataService {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self { provider }
    }

    /// Fetch a single quote. Errors propagate to the caller.
    pub async fn get_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        self.provider.get_quote(symbol).await
    }

    /// Fetch quotes for several symbols concurrently.
    ///
    /// Fail-soft: one symbol failing does not suppress the others. Failed
    /// symbols are reported back in `BatchQuotes::unavailable`, normalized to
    /// uppercase, in the order requested.
    pub async fn get_quotes(&self, symbols: &[String]) -> BatchQuotes {
        let futures = symbols.iter().map(|symbol| {
            let provider = Arc::clone(&self.provider);
            async move {
                let result = provider.get_quote(symbol).await;
                (symbol.trim().to_uppercase(), result)
            }
        });

        let mut quotes = Vec::with_capacity(symbols.len());
        let mut unavailable = Vec::new();

        for (symbol, result) in join_all(futures).await {
            match result {
                Ok(quote) => quotes.push(quote),
                Err(e) => {
                    warn!(
                        provider = self.provider.id(),
                        symbol = %symbol,
                        "Failed to fetch quote: {}",
                        e
                    );
                    unavailable.push(symbol);
                }
            }
        }

        BatchQuotes {
            quotes,
            unavailable,
        }
    }

    /// Quotes for the popular dashboard symbols.
    pub async fn get_popular_quotes(&self) -> BatchQuotes {
        let symbols: Vec<String> = POPULAR_SYMBOLS.iter().map(|s| s.to_string()).collect();
        self.get_quotes(&symbols).await
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, MarketDataError> {
        self.provider.search(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    /// Prices every symbol at 100 except those listed as failing.
    struct StubProvider {
        failing: Vec<&'static str>,
    }

    #[async_trait]
    impl MarketDataProvider for StubProvider {
        fn id(&self) -> &'static str {
            "STUB"
        }

        async fn get_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
            let symbol = symbol.to_uppercase();
            if self.failing.contains(&symbol.as_str()) {
                return Err(MarketDataError::SymbolNotFound(symbol));
            }
            Ok(Quote {
                symbol,
                name: None,
                price: dec!(100),
                change: dec!(1),
                change_percent: dec!(1),
                volume: None,
                currency: "USD".to_string(),
                as_of: Utc::now(),
            })
        }

        async fn search(&self, _query: &str) -> Result<Vec<SearchResult>, MarketDataError> {
            Ok(vec![])
        }
    }

    fn service(failing: Vec<&'static str>) -> MarketDataService {
        MarketDataService::new(Arc::new(StubProvider { failing }))
    }

    #[tokio::test]
    async fn one_failure_does_not_suppress_the_rest() {
        let symbols: Vec<String> = ["AAPL", "GOOGL", "BAD", "MSFT", "TSLA"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let batch = service(vec!["BAD"]).get_quotes(&symbols).await;

        assert_eq!(batch.quotes.len(), 4);
        assert_eq!(batch.unavailable, vec!["BAD".to_string()]);
        assert!(batch.quotes.iter().all(|q| q.symbol != "BAD"));
    }

    #[tokio::test]
    async fn all_symbols_unavailable_is_not_an_error() {
        let symbols = vec!["X".to_string(), "Y".to_string()];
        let batch = service(vec!["X", "Y"]).get_quotes(&symbols).await;

        assert!(batch.quotes.is_empty());
        assert_eq!(batch.unavailable, vec!["X".to_string(), "Y".to_string()]);
    }

    #[tokio::test]
    async fn symbols_are_normalized_to_uppercase() {
        let symbols = vec!["aapl".to_string()];
        let batch = service(vec![]).get_quotes(&symbols).await;

        assert_eq!(batch.quotes[0].symbol, "AAPL");
    }

    #[tokio::test]
    async fn popular_quotes_cover_the_dashboard_list() {
        let batch = service(vec![]).get_popular_quotes().await;

        assert_eq!(batch.quotes.len(), POPULAR_SYMBOLS.len());
        assert!(batch.unavailable.is_empty());
    }

    #[tokio::test]
    async fn by_symbol_indexes_quotes() {
        let symbols = vec!["AAPL".to_string(), "MSFT".to_string()];
        let map = service(vec![]).get_quotes(&symbols).await.by_symbol();

        assert_eq!(map.len(), 2);
        assert_eq!(map["AAPL"].price, dec!(100));
    }
}
