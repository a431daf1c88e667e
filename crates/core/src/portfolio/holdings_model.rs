//! Holding domain and database models.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::Result;

/// Domain errors for portfolio-ledger operations.
#[derive(Error, Debug)]
pub enum HoldingError {
    #[error("Invalid holding: {0}")]
    InvalidHolding(String),

    #[error("Holding not found")]
    NotFound,

    #[error("Symbol {0} already exists in portfolio")]
    DuplicateSymbol(String),
}

/// A user's recorded position in a symbol.
///
/// P&L is never stored on this record; it is derived against a live quote
/// at read time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holding {
    pub id: String,
    pub user_id: String,
    pub symbol: String,
    pub quantity: Decimal,
    pub entry_price: Decimal,
    pub purchased_at: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for recording a new holding.
#[derive(Debug, Clone, Deserialize)]
pub struct NewHolding {
    pub symbol: String,
    pub quantity: Decimal,
    pub entry_price: Decimal,
    pub purchased_at: Option<NaiveDate>,
}

impl NewHolding {
    pub fn validate(&self) -> Result<()> {
        if self.symbol.trim().is_empty() {
            return Err(HoldingError::InvalidHolding("symbol cannot be empty".to_string()).into());
        }
        if self.quantity <= Decimal::ZERO {
            return Err(HoldingError::InvalidHolding(
                "quantity must be positive".to_string(),
            )
            .into());
        }
        if self.entry_price <= Decimal::ZERO {
            return Err(HoldingError::InvalidHolding(
                "entry price must be positive".to_string(),
            )
            .into());
        }
        Ok(())
    }
}

/// Partial update for an existing holding. Only quantity, entry price and
/// purchase date are editable; symbol and owner are fixed at creation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HoldingUpdate {
    pub quantity: Option<Decimal>,
    pub entry_price: Option<Decimal>,
    pub purchased_at: Option<NaiveDate>,
}

impl HoldingUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(quantity) = self.quantity {
            if quantity <= Decimal::ZERO {
                return Err(HoldingError::InvalidHolding(
                    "quantity must be positive".to_string(),
                )
                .into());
            }
        }
        if let Some(entry_price) = self.entry_price {
            if entry_price <= Decimal::ZERO {
                return Err(HoldingError::InvalidHolding(
                    "entry price must be positive".to_string(),
                )
                .into());
            }
        }
        Ok(())
    }
}

/// Parses a TEXT decimal column, falling back to zero on malformed data.
fn parse_decimal_tolerant(value_str: &str, field_name: &str, record_id: &str) -> Decimal {
    Decimal::from_str(value_str).unwrap_or_else(|e| {
        warn!(
            "Failed to parse {} '{}' for holding {}: {}. Falling back to ZERO.",
            field_name, value_str, record_id, e
        );
        Decimal::ZERO
    })
}

/// Database model for holdings. Decimals are stored as TEXT.
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::holdings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct HoldingDb {
    pub id: String,
    pub user_id: String,
    pub symbol: String,
    pub quantity: String,
    pub entry_price: String,
    pub purchased_at: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<HoldingDb> for Holding {
    fn from(db: HoldingDb) -> Self {
        let quantity = parse_decimal_tolerant(&db.quantity, "quantity", &db.id);
        let entry_price = parse_decimal_tolerant(&db.entry_price, "entry_price", &db.id);
        Self {
            id: db.id,
            user_id: db.user_id,
            symbol: db.symbol,
            quantity,
            entry_price,
            purchased_at: db.purchased_at,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl HoldingDb {
    /// Builds a fresh DB record for the given owner. Symbols are stored
    /// uppercased so one symbol cannot appear twice under different casing.
    pub fn from_new(owner_id: &str, new: NewHolding) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: owner_id.to_string(),
            symbol: new.symbol.trim().to_uppercase(),
            quantity: new.quantity.to_string(),
            entry_price: new.entry_price.to_string(),
            purchased_at: new.purchased_at,
            created_at: now,
            updated_at: now,
        }
    }
}
