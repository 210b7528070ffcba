use axum::extract::{Path, State};
use axum::Json;
use axum_extra::extract::Query;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db::models::{InventoryItem, ServiceTicket};
use crate::db::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{relationships, tickets};

/// GET /tickets - public.
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<ServiceTicket>> {
    Ok(ApiResponse::ok(tickets::list(&state.pool).await?))
}

/// POST /tickets - admin or mechanic.
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> ApiResult<ServiceTicket> {
    Ok(ApiResponse::created(tickets::create(&state.pool, &payload).await?))
}

/// GET /tickets/:id - public.
pub async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<ServiceTicket> {
    Ok(ApiResponse::ok(tickets::get(&state.pool, id).await?))
}

/// PUT /tickets/:id - admin or mechanic.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<Value>,
) -> ApiResult<ServiceTicket> {
    Ok(ApiResponse::ok(tickets::update(&state.pool, id, &payload).await?))
}

/// DELETE /tickets/:id - admin only.
pub async fn remove(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Value> {
    tickets::delete(&state.pool, id).await?;
    Ok(ApiResponse::ok(json!({
        "message": format!("Service ticket {id} deleted successfully"),
    })))
}

/// Repeated `add_ids=…&remove_ids=…` query parameters; both optional.
#[derive(Debug, Deserialize)]
pub struct EditQuery {
    #[serde(default)]
    pub add_ids: Vec<i64>,
    #[serde(default)]
    pub remove_ids: Vec<i64>,
}

/// PUT /tickets/:id/edit - admin or mechanic; lenient bulk assignment edit.
pub async fn edit_assignments(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(edit): Query<EditQuery>,
) -> ApiResult<Value> {
    let assignments =
        relationships::bulk_edit_assignments(&state.pool, id, &edit.add_ids, &edit.remove_ids)
            .await?;
    Ok(ApiResponse::ok(json!({
        "message": format!("Assignments updated for ticket {id}"),
        "assignments": assignments,
    })))
}

/// POST /tickets/:id/add_part - admin or mechanic; idempotent attach.
pub async fn add_part(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<Value>,
) -> ApiResult<Vec<InventoryItem>> {
    Ok(ApiResponse::ok(relationships::add_part(&state.pool, id, &payload).await?))
}
