#![allow(dead_code)]

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use garage_api::db::{self, AppState};
use garage_api::handlers;

pub const PASSWORD: &str = "password123";

/// Fresh in-process app over an empty in-memory store. Each test gets its
/// own database, so tests never observe each other's rows.
pub async fn app() -> Result<Router> {
    let pool = db::connect("sqlite::memory:").await?;
    db::init_schema(&pool).await?;
    Ok(handlers::router(AppState { pool }))
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await.context("request failed")?;
    let status = response.status();
    let bytes = response.into_body().collect().await?.to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).context("response body was not JSON")?
    };
    Ok((status, body))
}

pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
    send(app, Method::GET, uri, token, None).await
}

pub async fn post(
    app: &Router,
    uri: &str,
    token: Option<&str>,
    body: Value,
) -> Result<(StatusCode, Value)> {
    send(app, Method::POST, uri, token, Some(body)).await
}

pub async fn put(
    app: &Router,
    uri: &str,
    token: Option<&str>,
    body: Value,
) -> Result<(StatusCode, Value)> {
    send(app, Method::PUT, uri, token, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
    send(app, Method::DELETE, uri, token, None).await
}

/// Register an account and return its user id.
pub async fn register(app: &Router, email: &str, role: &str) -> Result<i64> {
    let (status, body) = post(
        app,
        "/users/register",
        None,
        json!({"email": email, "password": PASSWORD, "role": role}),
    )
    .await?;
    anyhow::ensure!(status == StatusCode::CREATED, "register {email} failed: {status} {body}");
    body["id"].as_i64().context("register response missing id")
}

pub async fn login(app: &Router, email: &str) -> Result<String> {
    let (status, body) =
        post(app, "/users/login", None, json!({"email": email, "password": PASSWORD})).await?;
    anyhow::ensure!(status == StatusCode::OK, "login {email} failed: {status} {body}");
    body["token"].as_str().map(str::to_string).context("login response missing token")
}

pub async fn admin_token(app: &Router) -> Result<String> {
    register(app, "admin@shop.test", "admin").await?;
    login(app, "admin@shop.test").await
}

pub async fn mechanic_token(app: &Router) -> Result<String> {
    register(app, "wrench@shop.test", "mechanic").await?;
    login(app, "wrench@shop.test").await
}

pub async fn customer_token(app: &Router) -> Result<String> {
    register(app, "driver@shop.test", "customer").await?;
    login(app, "driver@shop.test").await
}

fn created_id(status: StatusCode, body: &Value) -> Result<i64> {
    anyhow::ensure!(status == StatusCode::CREATED, "seed failed: {status} {body}");
    body["id"].as_i64().context("create response missing id")
}

pub async fn seed_customer(app: &Router, token: &str, email: &str) -> Result<i64> {
    let (status, body) = post(
        app,
        "/customers",
        Some(token),
        json!({"name": "Pat Doe", "email": email, "phone": "555-0100"}),
    )
    .await?;
    created_id(status, &body)
}

pub async fn seed_vehicle(app: &Router, token: &str, vin: &str, customer_id: i64) -> Result<i64> {
    let (status, body) = post(
        app,
        "/vehicles",
        Some(token),
        json!({
            "vin": vin,
            "make": "Honda",
            "model": "Civic",
            "year": 2019,
            "customer_id": customer_id,
        }),
    )
    .await?;
    created_id(status, &body)
}

pub async fn seed_ticket(app: &Router, token: &str, vehicle_id: i64) -> Result<i64> {
    let (status, body) = post(
        app,
        "/tickets",
        Some(token),
        json!({
            "vehicle_id": vehicle_id,
            "date": "2026-03-01",
            "description": "Brake inspection",
            "status": "open",
            "cost": "120.00",
        }),
    )
    .await?;
    created_id(status, &body)
}

pub async fn seed_mechanic(app: &Router, token: &str, email: &str) -> Result<i64> {
    let (status, body) = post(
        app,
        "/mechanics",
        Some(token),
        json!({"name": "Sam Torque", "email": email, "salary": "52000.00"}),
    )
    .await?;
    created_id(status, &body)
}

pub async fn seed_part(app: &Router, token: &str, name: &str) -> Result<i64> {
    let (status, body) = post(
        app,
        "/inventory",
        Some(token),
        json!({"name": name, "price": "19.99", "quantity": 8}),
    )
    .await?;
    created_id(status, &body)
}
