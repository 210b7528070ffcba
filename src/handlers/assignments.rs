use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

use crate::db::models::ServiceAssignment;
use crate::db::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::relationships;

/// GET /assignments - public.
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<ServiceAssignment>> {
    Ok(ApiResponse::ok(relationships::list_assignments(&state.pool).await?))
}

/// POST /assignments - admin or mechanic; strict (404 missing reference,
/// 409 duplicate pair).
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> ApiResult<ServiceAssignment> {
    Ok(ApiResponse::created(relationships::create_assignment(&state.pool, &payload).await?))
}

/// GET /assignments/:id - public.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<ServiceAssignment> {
    Ok(ApiResponse::ok(relationships::get_assignment(&state.pool, id).await?))
}

/// PUT /assignments/:id - admin or mechanic.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<Value>,
) -> ApiResult<ServiceAssignment> {
    Ok(ApiResponse::ok(relationships::update_assignment(&state.pool, id, &payload).await?))
}

/// DELETE /assignments/:id - admin only.
pub async fn remove(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Value> {
    relationships::delete_assignment(&state.pool, id).await?;
    Ok(ApiResponse::ok(json!({
        "message": format!("Service assignment {id} deleted successfully"),
    })))
}
