use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

use crate::db::models::InventoryItem;
use crate::db::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::inventory;

/// GET /inventory - admin or mechanic.
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<InventoryItem>> {
    Ok(ApiResponse::ok(inventory::list(&state.pool).await?))
}

/// POST /inventory - admin only.
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> ApiResult<InventoryItem> {
    Ok(ApiResponse::created(inventory::create(&state.pool, &payload).await?))
}

/// GET /inventory/:id - admin or mechanic.
pub async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<InventoryItem> {
    Ok(ApiResponse::ok(inventory::get(&state.pool, id).await?))
}

/// PUT /inventory/:id - admin only.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<Value>,
) -> ApiResult<InventoryItem> {
    Ok(ApiResponse::ok(inventory::update(&state.pool, id, &payload).await?))
}

/// DELETE /inventory/:id - admin only.
pub async fn remove(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Value> {
    inventory::delete(&state.pool, id).await?;
    Ok(ApiResponse::ok(json!({
        "message": format!("Inventory item {id} deleted"),
    })))
}
