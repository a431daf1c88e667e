//! Holding repository and service traits.

use std::collections::HashMap;

use async_trait::async_trait;
use stockdash_market_data::Quote;

use super::holdings_model::{Holding, HoldingUpdate, NewHolding};
use super::holdings_service::Portfolio;
use crate::errors::Result;

/// Contract for portfolio-ledger persistence. Every operation is scoped to
/// an owner; a holding is invisible to any other user.
#[async_trait]
pub trait HoldingRepositoryTrait: Send + Sync {
    /// Inserts a new holding for the owner.
    async fn create(&self, owner_id: &str, new_holding: NewHolding) -> Result<Holding>;

    /// Applies a partial update to an owner's holding.
    async fn update(
        &self,
        owner_id: &str,
        holding_id: &str,
        update: HoldingUpdate,
    ) -> Result<Holding>;

    /// Deletes an owner's holding; not-found when absent or owned by
    /// someone else.
    async fn delete(&self, owner_id: &str, holding_id: &str) -> Result<()>;

    /// Lists an owner's holdings, newest first.
    fn list(&self, owner_id: &str) -> Result<Vec<Holding>>;
}

/// Contract for portfolio-ledger business operations.
#[async_trait]
pub trait HoldingsServiceTrait: Send + Sync {
    /// Records a holding after validating positivity and symbol uniqueness.
    async fn add_holding(&self, owner_id: &str, new_holding: NewHolding) -> Result<Holding>;

    /// Edits quantity, entry price or purchase date of an owner's holding.
    async fn update_holding(
        &self,
        owner_id: &str,
        holding_id: &str,
        update: HoldingUpdate,
    ) -> Result<Holding>;

    /// Removes an owner's holding.
    async fn remove_holding(&self, owner_id: &str, holding_id: &str) -> Result<()>;

    /// Lists an owner's holdings, newest first.
    fn list_holdings(&self, owner_id: &str) -> Result<Vec<Holding>>;

    /// Prices holdings against the given quotes and aggregates the summary.
    /// Holdings without a quote are carried as unpriced, never dropped.
    fn build_portfolio(&self, holdings: Vec<Holding>, quotes: &HashMap<String, Quote>)
        -> Portfolio;
}
