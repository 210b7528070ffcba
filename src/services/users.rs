use serde::Serialize;
use serde_json::Value;
use sqlx::SqlitePool;
use std::str::FromStr;

use crate::auth::{self, password, Role};
use crate::db::models::User;
use crate::error::ApiError;

use super::payload::PayloadParser;
use super::validate;

const NOT_FOUND: &str = "User not found";
const INVALID_ROLE: &str = "Invalid role";

pub struct Registration {
    pub user: User,
    /// False when an existing account was returned idempotently.
    pub created: bool,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
}

struct NewUser {
    email: String,
    password: String,
    role: Role,
}

impl NewUser {
    fn parse(payload: &Value) -> Result<Self, ApiError> {
        let mut p = PayloadParser::new(payload)?;
        let email = p.require_str("email");
        let password = p.require_str("password");
        let role = p.require_str("role");
        p.finish()?;

        let (email, password, role) = match (email, password, role) {
            (Some(e), Some(p), Some(r)) => (e, p, r),
            _ => return Err(ApiError::bad_request("Missing required fields")),
        };
        let role = Role::from_str(&role).map_err(|_| ApiError::bad_request(INVALID_ROLE))?;
        Ok(Self { email, password, role })
    }
}

/// Self-registration, idempotent on email: once the payload passes
/// validation, an already-registered email returns the existing account
/// instead of a conflict.
pub async fn register(pool: &SqlitePool, payload: &Value) -> Result<Registration, ApiError> {
    let new = NewUser::parse(payload)?;

    let mut tx = pool.begin().await?;
    let existing: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(&new.email)
        .fetch_optional(&mut *tx)
        .await?;
    if let Some(user) = existing {
        return Ok(Registration { user, created: false });
    }

    let password_hash = password::hash(&new.password)?;
    let result = sqlx::query("INSERT INTO users (email, password_hash, role) VALUES (?, ?, ?)")
        .bind(&new.email)
        .bind(&password_hash)
        .bind(new.role)
        .execute(&mut *tx)
        .await?;

    let user = fetch(&mut tx, result.last_insert_rowid()).await?;
    tx.commit().await?;
    Ok(Registration { user, created: true })
}

/// A single generic 401 for unknown email and bad password alike, so the
/// endpoint cannot be used for account enumeration.
pub async fn login(pool: &SqlitePool, payload: &Value) -> Result<LoginResponse, ApiError> {
    let mut p = PayloadParser::new(payload)?;
    let email = p.require_str("email");
    let pass = p.require_str("password");
    p.finish()?;

    let (email, pass) = match (email, pass) {
        (Some(e), Some(p)) => (e, p),
        _ => return Err(ApiError::bad_request("Missing required fields")),
    };

    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(&email)
        .fetch_optional(pool)
        .await?;

    let user = match user {
        Some(u) if password::verify(&pass, &u.password_hash) => u,
        _ => return Err(ApiError::unauthorized("Invalid credentials")),
    };

    let token = auth::issue(user.id, user.role)?;
    Ok(LoginResponse { token, role: user.role })
}

pub async fn list(pool: &SqlitePool) -> Result<Vec<User>, ApiError> {
    let users = sqlx::query_as("SELECT * FROM users ORDER BY id").fetch_all(pool).await?;
    Ok(users)
}

pub async fn get(pool: &SqlitePool, id: i64) -> Result<User, ApiError> {
    sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))
}

pub async fn update(pool: &SqlitePool, id: i64, payload: &Value) -> Result<User, ApiError> {
    let mut p = PayloadParser::new(payload)?;
    let email = p.opt_str("email");
    let role = p.opt_str("role");
    let pass = p.opt_str("password");
    p.finish()?;

    let role = match role {
        Some(r) => {
            Some(Role::from_str(&r).map_err(|_| ApiError::bad_request(INVALID_ROLE))?)
        }
        None => None,
    };

    let mut tx = pool.begin().await?;
    let mut user = fetch(&mut tx, id).await?;

    if let Some(ref email) = email {
        if *email != user.email
            && validate::unique_conflict(&mut tx, "users", "email", email, Some(id)).await?
        {
            return Err(ApiError::conflict("Email already exists"));
        }
    }

    if let Some(email) = email {
        user.email = email;
    }
    if let Some(role) = role {
        user.role = role;
    }
    if let Some(pass) = pass {
        user.password_hash = password::hash(&pass)?;
    }

    sqlx::query("UPDATE users SET email = ?, password_hash = ?, role = ? WHERE id = ?")
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(user)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> Result<(), ApiError> {
    let mut tx = pool.begin().await?;
    fetch(&mut tx, id).await?;
    sqlx::query("DELETE FROM users WHERE id = ?").bind(id).execute(&mut *tx).await?;
    tx.commit().await?;
    Ok(())
}

async fn fetch(tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>, id: i64) -> Result<User, ApiError> {
    sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))
}
