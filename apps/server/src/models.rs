use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use stockdash_core::portfolio as core_portfolio;
use stockdash_core::users as core_users;
use stockdash_market_data::{BatchQuotes, Quote, SearchResult};

// ===================== Auth =====================

#[derive(Deserialize, ToSchema, Debug, Clone)]
pub struct SignupRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    /// Defaults to STAFF when omitted.
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub role: Option<core_users::UserRole>,
}

#[derive(Deserialize, ToSchema, Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

#[derive(Deserialize, ToSchema, Debug, Clone)]
pub struct SetActiveRequest {
    pub is_active: bool,
}

#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    #[schema(value_type = String)]
    pub role: core_users::UserRole,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

impl From<core_users::User> for UserResponse {
    fn from(u: core_users::User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            role: u.role,
            is_active: u.is_active,
            created_at: u.created_at,
        }
    }
}

// ===================== Market data =====================

#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct QuoteResponse {
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[schema(value_type = f64)]
    pub price: Decimal,
    #[schema(value_type = f64)]
    pub change: Decimal,
    #[schema(value_type = f64)]
    pub change_percent: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<u64>,
    pub currency: String,
    pub as_of: DateTime<Utc>,
}

impl From<Quote> for QuoteResponse {
    fn from(q: Quote) -> Self {
        Self {
            symbol: q.symbol,
            name: q.name,
            price: q.price,
            change: q.change,
            change_percent: q.change_percent,
            volume: q.volume,
            currency: q.currency,
            as_of: q.as_of,
        }
    }
}

/// Batch of quotes; symbols the provider could not price are listed
/// separately instead of failing the response.
#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct QuotesResponse {
    pub quotes: Vec<QuoteResponse>,
    pub unavailable: Vec<String>,
}

impl From<BatchQuotes> for QuotesResponse {
    fn from(batch: BatchQuotes) -> Self {
        Self {
            quotes: batch.quotes.into_iter().map(QuoteResponse::from).collect(),
            unavailable: batch.unavailable,
        }
    }
}

#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct SearchResultResponse {
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<String>,
}

impl From<SearchResult> for SearchResultResponse {
    fn from(r: SearchResult) -> Self {
        Self {
            symbol: r.symbol,
            name: r.name,
            exchange: r.exchange,
            asset_type: r.asset_type,
        }
    }
}

// ===================== Portfolio =====================

#[derive(Deserialize, ToSchema, Debug, Clone)]
pub struct CreateHoldingRequest {
    pub symbol: String,
    #[schema(value_type = f64)]
    pub quantity: Decimal,
    #[schema(value_type = f64)]
    pub entry_price: Decimal,
    #[serde(default)]
    pub purchased_at: Option<NaiveDate>,
}

impl From<CreateHoldingRequest> for core_portfolio::NewHolding {
    fn from(r: CreateHoldingRequest) -> Self {
        Self {
            symbol: r.symbol,
            quantity: r.quantity,
            entry_price: r.entry_price,
            purchased_at: r.purchased_at,
        }
    }
}

#[derive(Deserialize, ToSchema, Debug, Clone)]
pub struct UpdateHoldingRequest {
    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub quantity: Option<Decimal>,
    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub entry_price: Option<Decimal>,
    #[serde(default)]
    pub purchased_at: Option<NaiveDate>,
}

impl From<UpdateHoldingRequest> for core_portfolio::HoldingUpdate {
    fn from(r: UpdateHoldingRequest) -> Self {
        Self {
            quantity: r.quantity,
            entry_price: r.entry_price,
            purchased_at: r.purchased_at,
        }
    }
}

#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct HoldingResponse {
    pub id: String,
    pub symbol: String,
    #[schema(value_type = f64)]
    pub quantity: Decimal,
    #[schema(value_type = f64)]
    pub entry_price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchased_at: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<core_portfolio::Holding> for HoldingResponse {
    fn from(h: core_portfolio::Holding) -> Self {
        Self {
            id: h.id,
            symbol: h.symbol,
            quantity: h.quantity,
            entry_price: h.entry_price,
            purchased_at: h.purchased_at,
            created_at: h.created_at,
            updated_at: h.updated_at,
        }
    }
}

/// One holding priced against the latest quote. The pricing fields are
/// absent when no quote was available for the symbol.
#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct PositionResponse {
    #[serde(flatten)]
    pub holding: HoldingResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<f64>)]
    pub current_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<f64>)]
    pub market_value: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<f64>)]
    pub unrealized_pnl: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<f64>)]
    pub pnl_percent: Option<Decimal>,
}

impl From<core_portfolio::Position> for PositionResponse {
    fn from(p: core_portfolio::Position) -> Self {
        let (current_price, market_value, unrealized_pnl, pnl_percent) = match p.pnl {
            Some(pnl) => (
                Some(pnl.current_price),
                Some(pnl.market_value),
                Some(pnl.unrealized_pnl),
                pnl.pnl_percent,
            ),
            None => (None, None, None, None),
        };
        Self {
            holding: p.holding.into(),
            current_price,
            market_value,
            unrealized_pnl,
            pnl_percent,
        }
    }
}

#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct PortfolioSummaryResponse {
    #[schema(value_type = f64)]
    pub net_value: Decimal,
    #[schema(value_type = f64)]
    pub total_cost: Decimal,
    #[schema(value_type = f64)]
    pub total_pnl: Decimal,
    /// True when at least one holding had no quote and the totals cover
    /// only the priced subset.
    pub partial: bool,
}

impl From<core_portfolio::PortfolioSummary> for PortfolioSummaryResponse {
    fn from(s: core_portfolio::PortfolioSummary) -> Self {
        Self {
            net_value: s.net_value,
            total_cost: s.total_cost,
            total_pnl: s.total_pnl,
            partial: s.partial,
        }
    }
}

#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct PortfolioResponse {
    pub positions: Vec<PositionResponse>,
    pub summary: PortfolioSummaryResponse,
}

impl From<core_portfolio::Portfolio> for PortfolioResponse {
    fn from(p: core_portfolio::Portfolio) -> Self {
        Self {
            positions: p.positions.into_iter().map(PositionResponse::from).collect(),
            summary: p.summary.into(),
        }
    }
}
