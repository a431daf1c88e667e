use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stockdash_market_data::Quote;

use super::holdings_model::{Holding, HoldingError, HoldingUpdate, NewHolding};
use super::holdings_traits::{HoldingRepositoryTrait, HoldingsServiceTrait};
use super::pnl::{compute_pnl, HoldingPnl};
use crate::errors::{DatabaseError, Error, Result};

/// One holding priced against a live quote. `pnl` is `None` when the quote
/// was unavailable - the position still appears, unpriced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub holding: Holding,
    pub pnl: Option<HoldingPnl>,
}

/// Aggregate figures across priced positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// Sum of market values over priced positions.
    pub net_value: Decimal,
    /// Sum of cost bases (quantity x entry price) over priced positions.
    pub total_cost: Decimal,
    /// Sum of unrealized P&L over priced positions.
    pub total_pnl: Decimal,
    /// True when at least one holding had no quote; the totals above then
    /// cover only a subset of the portfolio.
    pub partial: bool,
}

/// A user's portfolio view: positions plus the aggregated summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portfolio {
    pub positions: Vec<Position>,
    pub summary: PortfolioSummary,
}

/// Service for managing the portfolio ledger.
pub struct HoldingsService {
    repository: Arc<dyn HoldingRepositoryTrait>,
}

impl HoldingsService {
    pub fn new(repository: Arc<dyn HoldingRepositoryTrait>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl HoldingsServiceTrait for HoldingsService {
    async fn add_holding(&self, owner_id: &str, new_holding: NewHolding) -> Result<Holding> {
        new_holding.validate()?;
        let symbol = new_holding.symbol.trim().to_uppercase();
        debug!("Adding holding {} for user {}", symbol, owner_id);

        match self.repository.create(owner_id, new_holding).await {
            Err(Error::Database(DatabaseError::UniqueViolation(_))) => {
                Err(HoldingError::DuplicateSymbol(symbol).into())
            }
            other => other,
        }
    }

    async fn update_holding(
        &self,
        owner_id: &str,
        holding_id: &str,
        update: HoldingUpdate,
    ) -> Result<Holding> {
        update.validate()?;
        self.repository.update(owner_id, holding_id, update).await
    }

    async fn remove_holding(&self, owner_id: &str, holding_id: &str) -> Result<()> {
        self.repository.delete(owner_id, holding_id).await
    }

    fn list_holdings(&self, owner_id: &str) -> Result<Vec<Holding>> {
        self.repository.list(owner_id)
    }

    fn build_portfolio(
        &self,
        holdings: Vec<Holding>,
        quotes: &HashMap<String, Quote>,
    ) -> Portfolio {
        build_portfolio(holdings, quotes)
    }
}

/// Prices holdings against quotes and aggregates the summary. Pure; kept
/// free-standing so it is testable without a repository.
pub(crate) fn build_portfolio(
    holdings: Vec<Holding>,
    quotes: &HashMap<String, Quote>,
) -> Portfolio {
    let mut net_value = Decimal::ZERO;
    let mut total_cost = Decimal::ZERO;
    let mut total_pnl = Decimal::ZERO;
    let mut partial = false;

    let positions: Vec<Position> = holdings
        .into_iter()
        .map(|holding| {
            let pnl = match quotes.get(&holding.symbol) {
                Some(quote) => {
                    let pnl = compute_pnl(holding.quantity, holding.entry_price, quote.price);
                    net_value += pnl.market_value;
                    total_cost += holding.quantity * holding.entry_price;
                    total_pnl += pnl.unrealized_pnl;
                    Some(pnl)
                }
                None => {
                    partial = true;
                    None
                }
            };
            Position { holding, pnl }
        })
        .collect();

    Portfolio {
        positions,
        summary: PortfolioSummary {
            net_value,
            total_cost,
            total_pnl,
            partial,
        },
    }
}
