//! Stockdash Core - domain entities, services, and storage.
//!
//! This crate contains the business logic for the Stockdash backend:
//! the credential store (users), the portfolio ledger (holdings and
//! derived P&L), and the sqlite storage layer they share.

pub mod db;
pub mod errors;
pub mod portfolio;
pub mod schema;
pub mod users;

pub use errors::Error;
pub use errors::Result;
