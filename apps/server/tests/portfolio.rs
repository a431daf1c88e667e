use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

use stockdash_server::{api::app_router, build_state, config::Config};

async fn test_app() -> (Router, TempDir) {
    let tmp = tempdir().unwrap();
    let config = Config {
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        db_path: tmp.path().join("test.db").to_string_lossy().to_string(),
        cors_allow: vec!["*".to_string()],
        request_timeout: Duration::from_secs(30),
        jwt_secret: vec![7u8; 32],
        token_ttl: Duration::from_secs(3600),
    };
    let state = build_state(&config).await.unwrap();
    (app_router(state, &config), tmp)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Signs up a user and returns a bearer token for them.
async fn authed_user(app: &Router, email: &str) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/signup")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({"email": email, "name": "Test", "password": "hunter2-longer"})
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/login")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({"email": email, "password": "hunter2-longer"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["access_token"]
        .as_str()
        .unwrap()
        .to_string()
}

fn authed(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json");
    match body {
        Some(value) => builder.body(Body::from(value.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn holding_body(symbol: &str) -> Value {
    json!({"symbol": symbol, "quantity": "10", "entry_price": "150.50"})
}

#[tokio::test]
async fn add_and_list_holdings() {
    let (app, _tmp) = test_app().await;
    let token = authed_user(&app, "alice@example.com").await;

    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            "/api/v1/portfolio",
            &token,
            Some(holding_body("aapl")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    // Symbols are stored uppercased.
    assert_eq!(created["symbol"], "AAPL");
    assert_eq!(created["quantity"], 10.0);

    let response = app
        .clone()
        .oneshot(authed("GET", "/api/v1/portfolio", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let portfolio = body_json(response).await;
    let positions = portfolio["positions"].as_array().unwrap();
    assert_eq!(positions.len(), 1);
    assert_eq!(positions[0]["symbol"], "AAPL");
    // The summary is present whether or not quotes were available.
    assert!(portfolio["summary"]["partial"].is_boolean());
}

#[tokio::test]
async fn duplicate_symbol_is_rejected() {
    let (app, _tmp) = test_app().await;
    let token = authed_user(&app, "bob@example.com").await;

    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            "/api/v1/portfolio",
            &token,
            Some(holding_body("TSLA")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Same symbol in a different case is still a duplicate.
    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            "/api/v1/portfolio",
            &token,
            Some(holding_body("tsla")),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn non_positive_quantities_are_rejected() {
    let (app, _tmp) = test_app().await;
    let token = authed_user(&app, "carol@example.com").await;

    for body in [
        json!({"symbol": "AAPL", "quantity": "0", "entry_price": "10"}),
        json!({"symbol": "AAPL", "quantity": "-1", "entry_price": "10"}),
        json!({"symbol": "AAPL", "quantity": "5", "entry_price": "0"}),
        json!({"symbol": "", "quantity": "5", "entry_price": "10"}),
    ] {
        let response = app
            .clone()
            .oneshot(authed("POST", "/api/v1/portfolio", &token, Some(body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn update_holding_changes_fields() {
    let (app, _tmp) = test_app().await;
    let token = authed_user(&app, "dave@example.com").await;

    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            "/api/v1/portfolio",
            &token,
            Some(holding_body("MSFT")),
        ))
        .await
        .unwrap();
    let id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(authed(
            "PUT",
            &format!("/api/v1/portfolio/{id}"),
            &token,
            Some(json!({"quantity": "25"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["quantity"], 25.0);
    // Untouched fields survive a partial update.
    assert_eq!(updated["entry_price"], 150.5);
}

#[tokio::test]
async fn holdings_are_scoped_to_their_owner() {
    let (app, _tmp) = test_app().await;
    let owner = authed_user(&app, "erin@example.com").await;
    let intruder = authed_user(&app, "mallory@example.com").await;

    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            "/api/v1/portfolio",
            &owner,
            Some(holding_body("GOOGL")),
        ))
        .await
        .unwrap();
    let id = body_json(response).await["id"].as_str().unwrap().to_string();

    // Another user cannot see or remove it.
    let response = app
        .clone()
        .oneshot(authed("GET", "/api/v1/portfolio", &intruder, None))
        .await
        .unwrap();
    let portfolio = body_json(response).await;
    assert!(portfolio["positions"].as_array().unwrap().is_empty());

    let response = app
        .clone()
        .oneshot(authed(
            "DELETE",
            &format!("/api/v1/portfolio/{id}"),
            &intruder,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The owner still can.
    let response = app
        .clone()
        .oneshot(authed(
            "DELETE",
            &format!("/api/v1/portfolio/{id}"),
            &owner,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .clone()
        .oneshot(authed("GET", "/api/v1/portfolio", &owner, None))
        .await
        .unwrap();
    let portfolio = body_json(response).await;
    assert!(portfolio["positions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn portfolio_requires_a_token() {
    let (app, _tmp) = test_app().await;
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/portfolio")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
