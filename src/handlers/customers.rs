use axum::extract::{Extension, Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db::models::{Customer, ServiceTicket};
use crate::db::AppState;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::customers;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    10
}

/// GET /customers - public, paginated.
pub async fn list(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Vec<Customer>> {
    let customers = customers::list(&state.pool, page.page, page.per_page).await?;
    Ok(ApiResponse::ok(customers))
}

/// POST /customers - admin or mechanic.
pub async fn create(State(state): State<AppState>, Json(payload): Json<Value>) -> ApiResult<Customer> {
    Ok(ApiResponse::created(customers::create(&state.pool, &payload).await?))
}

/// GET /customers/:id - public.
pub async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Customer> {
    Ok(ApiResponse::ok(customers::get(&state.pool, id).await?))
}

/// PUT /customers/:id - admin or mechanic.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<Value>,
) -> ApiResult<Customer> {
    Ok(ApiResponse::ok(customers::update(&state.pool, id, &payload).await?))
}

/// DELETE /customers/:id - admin only.
pub async fn remove(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Value> {
    customers::delete(&state.pool, id).await?;
    Ok(ApiResponse::ok(json!({
        "message": format!("Customer {id} deleted successfully"),
    })))
}

/// GET /customers/my-tickets - any authenticated principal; the token's
/// subject id is the acting customer id.
pub async fn my_tickets(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
) -> ApiResult<Vec<ServiceTicket>> {
    Ok(ApiResponse::ok(customers::my_tickets(&state.pool, caller.id).await?))
}
