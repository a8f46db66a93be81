mod common;

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use shop_api::database::models::{CATALOG_COLLECTION, USER_COLLECTION};
use shop_api::filter::Filter;
use shop_api::state::AppState;

async fn send(app: &Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = response.into_body().collect().await?.to_bytes();
    Ok((status, serde_json::from_slice(&bytes)?))
}

fn json_request(method: Method, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

fn setup() -> (AppState, Router) {
    let state = common::test_state();
    let app = shop_api::app(state.clone());
    (state, app)
}

#[tokio::test]
async fn unknown_path_is_a_bad_request() -> Result<()> {
    let (_, app) = setup();
    let (status, body) = send(&app, get("/nowhere")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Unknow route" }));
    Ok(())
}

#[tokio::test]
async fn unbound_method_is_an_unknown_route() -> Result<()> {
    let (_, app) = setup();
    let (status, body) = send(&app, json_request(Method::PUT, "/catalog", "{}")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Unknow route" }));
    Ok(())
}

#[tokio::test]
async fn non_json_payload_is_rejected() -> Result<()> {
    let (_, app) = setup();
    let (status, body) = send(&app, json_request(Method::POST, "/auth/login", "user=a")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "A JSON payload was expected" }));

    let (status, _) = send(&app, json_request(Method::POST, "/auth/login", "")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn schema_violation_never_reaches_handler() -> Result<()> {
    let (state, app) = setup();
    let payload = json!({ "user": "a@b.com", "password": "pw123", "admin": true }).to_string();

    let (status, body) = send(&app, json_request(Method::POST, "/auth/login", &payload)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap_or_default()
        .starts_with("Schema violation for API: /auth/login"));

    let users = state.db.find_all(USER_COLLECTION, &Filter::all()).await;
    assert_eq!(users, Some(vec![]));
    Ok(())
}

#[tokio::test]
async fn payload_is_validated_before_authentication() -> Result<()> {
    let (_, app) = setup();
    let (status, body) = send(&app, json_request(Method::POST, "/cart/items", "{\"cart_items\": 5}")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap_or_default().starts_with("Schema violation"));

    let (status, body) = send(&app, json_request(Method::POST, "/cart/items", "{\"cart_items\": []}")).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Token was not found in request headers" }));
    Ok(())
}

#[tokio::test]
async fn bare_text_results_are_wrapped() -> Result<()> {
    let (state, app) = setup();
    let token = state.gateway.issue_token("a@b.com")?;

    let mut request = json_request(Method::POST, "/cart/items", "{\"cart_items\": []}");
    request
        .headers_mut()
        .insert(header::AUTHORIZATION, format!("Bearer {}", token).parse()?);

    let (status, body) = send(&app, request).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "cart successfully created" }));
    Ok(())
}

#[tokio::test]
async fn fractional_price_is_a_schema_violation() -> Result<()> {
    let (state, app) = setup();
    let token = state.gateway.issue_token("a@b.com")?;

    for price in ["1.0", "1e20", "10000000000000000000"] {
        let payload = format!("{{\"items\": [{{\"item_name\": \"guitar\", \"price\": {}}}]}}", price);
        let mut request = json_request(Method::POST, "/catalog", &payload);
        request
            .headers_mut()
            .insert(header::AUTHORIZATION, format!("Bearer {}", token).parse()?);

        let (status, body) = send(&app, request).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "price {}", price);
        let error = body["error"].as_str().unwrap_or_default();
        assert!(error.starts_with("Schema violation for API: /catalog"), "{}", error);
        assert!(error.contains("/items/0/price"), "{}", error);
    }

    let catalog = state.db.find_all(CATALOG_COLLECTION, &Filter::all()).await;
    assert_eq!(catalog, Some(vec![]));
    Ok(())
}

#[tokio::test]
async fn health_reports_storage_backend() -> Result<()> {
    let (_, app) = setup();
    let (status, body) = send(&app, get("/health")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "memory");
    Ok(())
}
