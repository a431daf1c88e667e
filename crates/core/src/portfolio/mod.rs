//! Portfolio module - holdings ledger and derived P&L.

mod holdings_model;
mod holdings_repository;
mod holdings_service;
mod holdings_traits;
mod pnl;

pub use holdings_model::{Holding, HoldingError, HoldingUpdate, NewHolding};
pub use holdings_repository::HoldingRepository;
pub use holdings_service::{HoldingsService, Portfolio, PortfolioSummary, Position};
pub use holdings_traits::{HoldingRepositoryTrait, HoldingsServiceTrait};
pub use pnl::{compute_pnl, HoldingPnl};
