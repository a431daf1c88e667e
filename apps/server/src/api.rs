use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    middleware,
    routing::get,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;

use stockdash_core::users::{NewUser, UserError, MIN_PASSWORD_LEN};

use crate::{
    auth::{ensure_admin, require_auth, CurrentUser},
    config::Config,
    error::{ApiError, ApiResult},
    main_lib::AppState,
    models::{
        CreateHoldingRequest, HoldingResponse, LoginRequest, PortfolioResponse,
        PortfolioSummaryResponse, PositionResponse, QuoteResponse, QuotesResponse,
        SearchResultResponse, SetActiveRequest, SignupRequest, TokenResponse, UpdateHoldingRequest,
        UserResponse,
    },
};

#[utoipa::path(get, path = "/api/v1/healthz", responses((status = 200, description = "Health")))]
pub async fn healthz() -> &'static str {
    "ok"
}

#[utoipa::path(get, path = "/api/v1/readyz", responses((status = 200, description = "Ready")))]
pub async fn readyz() -> &'static str {
    "ok"
}

// ===================== Auth =====================

#[utoipa::path(post, path = "/api/v1/auth/signup", request_body = SignupRequest,
    responses((status = 201, body = UserResponse)))]
async fn signup(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SignupRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    if payload.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::Core(UserError::WeakPassword.into()));
    }
    let password_hash = state.auth.hash_password(&payload.password)?;
    let user = state
        .user_service
        .create_user(NewUser {
            email: payload.email,
            name: payload.name,
            password_hash,
            role: payload.role.unwrap_or_default(),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[utoipa::path(post, path = "/api/v1/auth/login", request_body = LoginRequest,
    responses((status = 200, body = TokenResponse)))]
async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let user = match state.user_service.find_by_email(&payload.email)? {
        Some(user) => user,
        // Same cost and same body as a wrong password.
        None => return Err(state.auth.verify_dummy()),
    };
    state
        .auth
        .verify_password(&payload.password, &user.password_hash)?;
    if !user.is_active {
        return Err(ApiError::Core(UserError::Inactive.into()));
    }
    let token = state.auth.issue_token(&user)?;
    Ok(Json(TokenResponse::bearer(token)))
}

#[utoipa::path(get, path = "/api/v1/auth/me", responses((status = 200, body = UserResponse)))]
async fn me(Extension(current): Extension<CurrentUser>) -> Json<UserResponse> {
    Json((*current.0).clone().into())
}

#[utoipa::path(get, path = "/api/v1/users", responses((status = 200, body = [UserResponse])))]
async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    ensure_admin(current.0.as_ref())?;
    let users = state.user_service.list_users()?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[utoipa::path(put, path = "/api/v1/users/{id}/active", request_body = SetActiveRequest,
    responses((status = 200, body = UserResponse), (status = 404, description = "Unknown user")))]
async fn set_user_active(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<SetActiveRequest>,
) -> ApiResult<Json<UserResponse>> {
    ensure_admin(current.0.as_ref())?;
    let user = state
        .user_service
        .set_user_active(&id, payload.is_active)
        .await?;
    Ok(Json(user.into()))
}

// ===================== Stocks =====================

#[utoipa::path(get, path = "/api/v1/stocks/quote/{symbol}",
    responses((status = 200, body = QuoteResponse), (status = 404, description = "Unknown or unavailable symbol")))]
async fn get_quote(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> ApiResult<Json<QuoteResponse>> {
    // Provider failures degrade to the same 404 as an unknown symbol.
    let quote = state
        .market_data
        .get_quote(&symbol)
        .await
        .map_err(|err| match err {
            stockdash_market_data::MarketDataError::SymbolNotFound(s) => {
                ApiError::QuoteUnavailable(s)
            }
            other => {
                tracing::warn!("Quote fetch for {symbol} failed: {other}");
                ApiError::QuoteUnavailable(symbol.trim().to_uppercase())
            }
        })?;
    Ok(Json(quote.into()))
}

#[utoipa::path(get, path = "/api/v1/stocks/popular", responses((status = 200, body = QuotesResponse)))]
async fn popular_quotes(State(state): State<Arc<AppState>>) -> Json<QuotesResponse> {
    Json(state.market_data.get_popular_quotes().await.into())
}

#[derive(Deserialize)]
struct SearchQuery {
    q: String,
}

#[utoipa::path(get, path = "/api/v1/stocks/search",
    params(("q" = String, Query, description = "Search text")),
    responses((status = 200, body = [SearchResultResponse])))]
async fn search_symbols(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<SearchResultResponse>>> {
    let query = query.q.trim();
    if query.is_empty() {
        return Err(ApiError::BadRequest("Search query cannot be empty".into()));
    }
    let results = state.market_data.search(query).await?;
    Ok(Json(
        results.into_iter().map(SearchResultResponse::from).collect(),
    ))
}

// ===================== Portfolio =====================

#[utoipa::path(get, path = "/api/v1/portfolio", responses((status = 200, body = PortfolioResponse)))]
async fn get_portfolio(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<PortfolioResponse>> {
    let holdings = state.holdings_service.list_holdings(&current.0.id)?;
    let symbols: Vec<String> = holdings.iter().map(|h| h.symbol.clone()).collect();
    let quotes = state.market_data.get_quotes(&symbols).await.by_symbol();
    let portfolio = state.holdings_service.build_portfolio(holdings, &quotes);
    Ok(Json(portfolio.into()))
}

#[utoipa::path(post, path = "/api/v1/portfolio", request_body = CreateHoldingRequest,
    responses((status = 201, body = HoldingResponse)))]
async fn add_holding(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<CreateHoldingRequest>,
) -> ApiResult<(StatusCode, Json<HoldingResponse>)> {
    let holding = state
        .holdings_service
        .add_holding(&current.0.id, payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(holding.into())))
}

#[utoipa::path(put, path = "/api/v1/portfolio/{id}", request_body = UpdateHoldingRequest,
    responses((status = 200, body = HoldingResponse), (status = 404, description = "Not owned or missing")))]
async fn update_holding(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateHoldingRequest>,
) -> ApiResult<Json<HoldingResponse>> {
    let holding = state
        .holdings_service
        .update_holding(&current.0.id, &id, payload.into())
        .await?;
    Ok(Json(holding.into()))
}

#[utoipa::path(delete, path = "/api/v1/portfolio/{id}",
    responses((status = 204), (status = 404, description = "Not owned or missing")))]
async fn delete_holding(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .holdings_service
        .remove_holding(&current.0.id, &id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ===================== Router =====================

#[derive(OpenApi)]
#[openapi(
    paths(
        healthz, readyz, signup, login, me, list_users, set_user_active,
        get_quote, popular_quotes, search_symbols,
        get_portfolio, add_holding, update_holding, delete_holding
    ),
    components(schemas(
        SignupRequest, LoginRequest, TokenResponse, UserResponse, SetActiveRequest,
        QuoteResponse, QuotesResponse, SearchResultResponse,
        CreateHoldingRequest, UpdateHoldingRequest, HoldingResponse,
        PortfolioResponse, PositionResponse, PortfolioSummaryResponse
    )),
    tags((name = "stockdash"))
)]
pub struct ApiDoc;

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let cors = if config.cors_allow.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = config
            .cors_allow
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect::<Vec<_>>();
        CorsLayer::new().allow_origin(origins)
    };

    let openapi = ApiDoc::openapi();

    let public = Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login));

    let protected = Router::new()
        .route("/auth/me", get(me))
        .route("/users", get(list_users))
        .route("/users/{id}/active", axum::routing::put(set_user_active))
        .route("/stocks/quote/{symbol}", get(get_quote))
        .route("/stocks/popular", get(popular_quotes))
        .route("/stocks/search", get(search_symbols))
        .route("/portfolio", get(get_portfolio).post(add_holding))
        .route(
            "/portfolio/{id}",
            axum::routing::put(update_holding).delete(delete_holding),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .nest("/api/v1", public.merge(protected))
        .route("/openapi.json", get(|| async { Json(openapi) }))
        .with_state(state)
        .layer(cors)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
}
