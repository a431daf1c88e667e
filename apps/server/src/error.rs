use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use stockdash_core::errors::{DatabaseError, Error as CoreError};
use stockdash_core::portfolio::HoldingError;
use stockdash_core::users::UserError;
use stockdash_market_data::MarketDataError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    /// Unknown symbol or upstream quote failure; the two are not
    /// distinguished on the wire.
    #[error("Stock symbol '{0}' not found or data unavailable")]
    QuoteUnavailable(String),
    #[error("Not found")]
    NotFound,
    #[error("{0}")]
    BadRequest(String),
    #[error("Incorrect email or password")]
    InvalidCredentials,
    #[error("Token has expired")]
    TokenExpired,
    #[error("Could not validate credentials")]
    TokenInvalid,
    #[error("Admin privileges required")]
    Forbidden,
    #[error("{0}")]
    Internal(String),
}

/// Wire error body, `{"detail": "..."}`.
#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            ApiError::Core(e) => match e {
                CoreError::User(user_err) => match user_err {
                    UserError::DuplicateEmail | UserError::WeakPassword => {
                        (StatusCode::BAD_REQUEST, e.to_string())
                    }
                    UserError::Inactive => (StatusCode::FORBIDDEN, e.to_string()),
                    UserError::NotFound => (StatusCode::NOT_FOUND, e.to_string()),
                },
                CoreError::Holding(holding_err) => match holding_err {
                    HoldingError::NotFound => (StatusCode::NOT_FOUND, e.to_string()),
                    HoldingError::InvalidHolding(_) | HoldingError::DuplicateSymbol(_) => {
                        (StatusCode::BAD_REQUEST, e.to_string())
                    }
                },
                CoreError::Validation(_) => (StatusCode::BAD_REQUEST, e.to_string()),
                CoreError::Database(DatabaseError::NotFound(_)) => {
                    (StatusCode::NOT_FOUND, "Not found".to_string())
                }
                _ => {
                    tracing::error!("Internal error: {e}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                    )
                }
            },
            ApiError::QuoteUnavailable(_) | ApiError::NotFound => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::InvalidCredentials
            | ApiError::TokenExpired
            | ApiError::TokenInvalid => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
            ApiError::Internal(reason) => {
                tracing::error!("Internal error: {reason}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        let body = Json(ErrorBody { detail });
        (status, body).into_response()
    }
}

/// An unknown symbol and a provider failure both surface as 404; the
/// distinction never reaches the wire.
impl From<MarketDataError> for ApiError {
    fn from(err: MarketDataError) -> Self {
        match err {
            MarketDataError::SymbolNotFound(symbol) => ApiError::QuoteUnavailable(symbol),
            other => {
                tracing::warn!("Market data request failed: {other}");
                ApiError::NotFound
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn unknown_symbol_maps_to_not_found() {
        let err = ApiError::from(MarketDataError::SymbolNotFound("NOPE".to_string()));
        assert_eq!(status_of(err), StatusCode::NOT_FOUND);
    }

    #[test]
    fn upstream_failures_map_to_not_found_never_bad_request() {
        for err in [
            MarketDataError::Timeout {
                provider: "YAHOO".to_string(),
            },
            MarketDataError::RateLimited {
                provider: "YAHOO".to_string(),
            },
            MarketDataError::ProviderError {
                provider: "YAHOO".to_string(),
                message: "HTTP 502".to_string(),
            },
        ] {
            assert_eq!(status_of(ApiError::from(err)), StatusCode::NOT_FOUND);
        }
    }

    #[test]
    fn inactive_account_maps_to_forbidden() {
        let err = ApiError::Core(UserError::Inactive.into());
        assert_eq!(status_of(err), StatusCode::FORBIDDEN);
    }

    #[test]
    fn missing_user_maps_to_not_found() {
        let err = ApiError::Core(UserError::NotFound.into());
        assert_eq!(status_of(err), StatusCode::NOT_FOUND);
    }
}
