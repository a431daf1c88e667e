//! Market data provider implementations.

mod traits;
pub mod yahoo;

pub use traits::MarketDataProvider;
