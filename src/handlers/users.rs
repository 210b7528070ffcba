use axum::extract::{Extension, Path, State};
use axum::Json;
use serde_json::{json, Value};

use crate::db::models::User;
use crate::db::AppState;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::users;

/// POST /users/register - public; idempotent on email.
pub async fn register(State(state): State<AppState>, Json(payload): Json<Value>) -> ApiResult<User> {
    let registration = users::register(&state.pool, &payload).await?;
    if registration.created {
        Ok(ApiResponse::created(registration.user))
    } else {
        Ok(ApiResponse::ok(registration.user))
    }
}

/// POST /users/login - public; returns token + role.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> ApiResult<users::LoginResponse> {
    let response = users::login(&state.pool, &payload).await?;
    Ok(ApiResponse::ok(response))
}

/// GET /users - admin only.
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<User>> {
    Ok(ApiResponse::ok(users::list(&state.pool).await?))
}

/// GET /users/:id - admin or mechanic.
pub async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<User> {
    Ok(ApiResponse::ok(users::get(&state.pool, id).await?))
}

/// PUT /users/:id - admin only.
pub async fn update(
    State(state): State<AppState>,
    Extension(requester): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(payload): Json<Value>,
) -> ApiResult<Value> {
    let user = users::update(&state.pool, id, &payload).await?;
    Ok(ApiResponse::ok(json!({
        "message": format!("User {} updated by {} (user {})", id, requester.role, requester.id),
        "user": user,
    })))
}

/// DELETE /users/:id - admin only.
pub async fn remove(
    State(state): State<AppState>,
    Extension(requester): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<Value> {
    users::delete(&state.pool, id).await?;
    Ok(ApiResponse::ok(json!({
        "message": format!("User {} deleted by {} (user {})", id, requester.role, requester.id),
    })))
}
