//! Yahoo Finance market data provider implementation.
//!
//! Quotes come from the public chart endpoint (one daily candle request per
//! symbol, only the meta block is read); search uses the finance search
//! endpoint. No API key is required.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use num_traits::FromPrimitive;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::errors::MarketDataError;
use crate::models::{Quote, SearchResult};
use crate::provider::MarketDataProvider;

const BASE_URL: &str = "https://query1.finance.yahoo.com";
const PROVIDER_ID: &str = "YAHOO";

// ============================================================================
// API Response Structures
// ============================================================================

/// Response from /v8/finance/chart/{symbol}
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartPayload,
}

#[derive(Debug, Deserialize)]
struct ChartPayload {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    symbol: String,
    currency: Option<String>,
    /// Last traded price
    regular_market_price: Option<f64>,
    /// Previous session close, used to derive change figures
    chart_previous_close: Option<f64>,
    regular_market_volume: Option<u64>,
    /// Unix seconds of the last trade
    regular_market_time: Option<i64>,
    long_name: Option<String>,
    short_name: Option<String>,
}

/// Response from /v1/finance/search
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    quotes: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    symbol: Option<String>,
    shortname: Option<String>,
    longname: Option<String>,
    exchange: Option<String>,
    #[serde(rename = "quoteType")]
    quote_type: Option<String>,
}

// ============================================================================
// YahooProvider
// ============================================================================

/// Yahoo Finance market data provider. One attempt per call, no caching.
pub struct YahooProvider {
    client: Client,
}

impl YahooProvider {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent("Mozilla/5.0 (compatible; stockdash/0.1)")
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }

    /// Make a GET request to the Yahoo API and decode the JSON body.
    async fn fetch<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, MarketDataError> {
        let url = format!("{}{}", BASE_URL, path);
        debug!("Yahoo request: {} with {} params", path, params.len());

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MarketDataError::Timeout {
                        provider: PROVIDER_ID.to_string(),
                    }
                } else {
                    MarketDataError::Network(e)
                }
            })?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(MarketDataError::SymbolNotFound(path.to_string()));
        }

        if !status.is_success() {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to decode response: {}", e),
            })
    }
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn decimal_from(value: f64, field: &str) -> Result<Decimal, MarketDataError> {
    Decimal::from_f64(value).ok_or_else(|| MarketDataError::ProviderError {
        provider: PROVIDER_ID.to_string(),
        message: format!("Non-finite {} value: {}", field, value),
    })
}

/// Derives the normalized quote from the chart meta block.
fn quote_from_meta(meta: ChartMeta) -> Result<Quote, MarketDataError> {
    let symbol = meta.symbol.to_uppercase();

    let price_raw = meta
        .regular_market_price
        .ok_or_else(|| MarketDataError::SymbolNotFound(symbol.clone()))?;
    let price = decimal_from(price_raw, "price")?;

    let previous_close = meta
        .chart_previous_close
        .map(|p| decimal_from(p, "previous close"))
        .transpose()?;

    let (change, change_percent) = match previous_close {
        Some(prev) if !prev.is_zero() => {
            let change = price - prev;
            (change, change / prev * Decimal::ONE_HUNDRED)
        }
        _ => (Decimal::ZERO, Decimal::ZERO),
    };

    let as_of = meta
        .regular_market_time
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .unwrap_or_else(Utc::now);

    Ok(Quote {
        symbol,
        name: meta.long_name.or(meta.short_name),
        price,
        change: change.round_dp(4),
        change_percent: change_percent.round_dp(4),
        volume: meta.regular_market_volume,
        currency: meta.currency.unwrap_or_else(|| "USD".to_string()),
        as_of,
    })
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn get_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        let symbol = symbol.trim().to_uppercase();
        let path = format!("/v8/finance/chart/{}", symbol);
        let response: ChartResponse = self
            .fetch(&path, &[("range", "1d"), ("interval", "1d")])
            .await
            .map_err(|e| match e {
                // The chart endpoint answers 404 for unknown symbols.
                MarketDataError::SymbolNotFound(_) => {
                    MarketDataError::SymbolNotFound(symbol.clone())
                }
                other => other,
            })?;

        if let Some(error) = response.chart.error {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: error
                    .description
                    .unwrap_or_else(|| "unknown chart error".to_string()),
            });
        }

        let result = response
            .chart
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .ok_or_else(|| MarketDataError::SymbolNotFound(symbol.clone()))?;

        quote_from_meta(result.meta)
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, MarketDataError> {
        let response: SearchResponse = self
            .fetch(
                "/v1/finance/search",
                &[("q", query), ("quotesCount", "10"), ("newsCount", "0")],
            )
            .await?;

        let results = response
            .quotes
            .into_iter()
            .filter_map(|item| {
                let symbol = item.symbol?;
                Some(SearchResult {
                    symbol,
                    name: item.longname.or(item.shortname),
                    exchange: item.exchange,
                    asset_type: item.quote_type,
                })
            })
            .collect();

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn meta(price: Option<f64>, prev_close: Option<f64>) -> ChartMeta {
        ChartMeta {
            symbol: "aapl".to_string(),
            currency: Some("USD".to_string()),
            regular_market_price: price,
            chart_previous_close: prev_close,
            regular_market_volume: Some(1_000_000),
            regular_market_time: Some(1_700_000_000),
            long_name: Some("Apple Inc.".to_string()),
            short_name: Some("Apple".to_string()),
        }
    }

    #[test]
    fn derives_change_from_previous_close() {
        let quote = quote_from_meta(meta(Some(110.0), Some(100.0))).unwrap();
        assert_eq!(quote.symbol, "AAPL");
        assert_eq!(quote.price, dec!(110));
        assert_eq!(quote.change, dec!(10));
        assert_eq!(quote.change_percent, dec!(10));
        assert_eq!(quote.name.as_deref(), Some("Apple Inc."));
    }

    #[test]
    fn missing_price_is_symbol_not_found() {
        let err = quote_from_meta(meta(None, Some(100.0))).unwrap_err();
        assert!(matches!(err, MarketDataError::SymbolNotFound(s) if s == "AAPL"));
    }

    #[test]
    fn zero_previous_close_yields_zero_change() {
        let quote = quote_from_meta(meta(Some(50.0), Some(0.0))).unwrap();
        assert_eq!(quote.change, Decimal::ZERO);
        assert_eq!(quote.change_percent, Decimal::ZERO);
    }

    #[test]
    fn chart_response_decodes() {
        let body = r#"{
            "chart": {
                "result": [{"meta": {
                    "symbol": "MSFT",
                    "currency": "USD",
                    "regularMarketPrice": 420.5,
                    "chartPreviousClose": 418.0,
                    "regularMarketVolume": 12345,
                    "regularMarketTime": 1700000000
                }}],
                "error": null
            }
        }"#;
        let parsed: ChartResponse = serde_json::from_str(body).unwrap();
        let result = parsed.chart.result.unwrap();
        assert_eq!(result[0].meta.symbol, "MSFT");
        assert_eq!(result[0].meta.regular_market_price, Some(420.5));
    }
}
