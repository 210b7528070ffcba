use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

use crate::db::models::{Mechanic, RankedMechanic};
use crate::db::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::mechanics;

/// GET /mechanics - public.
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Mechanic>> {
    Ok(ApiResponse::ok(mechanics::list(&state.pool).await?))
}

/// GET /mechanics/ranked - public; ordered by descending assignment count.
pub async fn ranked(State(state): State<AppState>) -> ApiResult<Vec<RankedMechanic>> {
    Ok(ApiResponse::ok(mechanics::ranked(&state.pool).await?))
}

/// POST /mechanics - admin or mechanic.
pub async fn create(State(state): State<AppState>, Json(payload): Json<Value>) -> ApiResult<Mechanic> {
    Ok(ApiResponse::created(mechanics::create(&state.pool, &payload).await?))
}

/// GET /mechanics/:id - public.
pub async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Mechanic> {
    Ok(ApiResponse::ok(mechanics::get(&state.pool, id).await?))
}

/// PUT /mechanics/:id - admin or mechanic.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<Value>,
) -> ApiResult<Mechanic> {
    Ok(ApiResponse::ok(mechanics::update(&state.pool, id, &payload).await?))
}

/// DELETE /mechanics/:id - admin only.
pub async fn remove(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Value> {
    mechanics::delete(&state.pool, id).await?;
    Ok(ApiResponse::ok(json!({
        "message": format!("Mechanic {id} deleted successfully"),
    })))
}
