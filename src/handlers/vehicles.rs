use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

use crate::db::models::Vehicle;
use crate::db::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::vehicles;

/// GET /vehicles - public.
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Vehicle>> {
    Ok(ApiResponse::ok(vehicles::list(&state.pool).await?))
}

/// POST /vehicles - admin or mechanic.
pub async fn create(State(state): State<AppState>, Json(payload): Json<Value>) -> ApiResult<Vehicle> {
    Ok(ApiResponse::created(vehicles::create(&state.pool, &payload).await?))
}

/// GET /vehicles/:id - public.
pub async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Vehicle> {
    Ok(ApiResponse::ok(vehicles::get(&state.pool, id).await?))
}

/// PUT /vehicles/:id - admin or mechanic.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<Value>,
) -> ApiResult<Vehicle> {
    Ok(ApiResponse::ok(vehicles::update(&state.pool, id, &payload).await?))
}

/// DELETE /vehicles/:id - admin only.
pub async fn remove(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Value> {
    vehicles::delete(&state.pool, id).await?;
    Ok(ApiResponse::ok(json!({
        "message": format!("Vehicle {id} deleted successfully"),
    })))
}
