use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::SqlitePool;

use crate::db::models::{Mechanic, RankedMechanic};
use crate::error::ApiError;

use super::payload::PayloadParser;
use super::validate;

const NOT_FOUND: &str = "Mechanic not found.";

struct NewMechanic {
    name: String,
    email: String,
    phone: Option<String>,
    address: Option<String>,
    salary: Decimal,
}

impl NewMechanic {
    fn parse(payload: &Value) -> Result<Self, ApiError> {
        let mut p = PayloadParser::new(payload)?;
        let name = p.require_str("name");
        let email = p.require_str("email");
        let phone = p.opt_str("phone");
        let address = p.opt_str("address");
        let salary = p.require_decimal("salary");
        p.finish()?;
        match (name, email, salary) {
            (Some(name), Some(email), Some(salary)) => {
                Ok(Self { name, email, phone, address, salary })
            }
            _ => Err(ApiError::bad_request("Invalid request payload")),
        }
    }
}

pub async fn create(pool: &SqlitePool, payload: &Value) -> Result<Mechanic, ApiError> {
    let new = NewMechanic::parse(payload)?;

    let mut tx = pool.begin().await?;
    if validate::unique_conflict(&mut tx, "mechanics", "email", &new.email, None).await? {
        return Err(ApiError::conflict("Email already associated with an existing mechanic"));
    }

    let result = sqlx::query(
        "INSERT INTO mechanics (name, email, phone, address, salary) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&new.name)
    .bind(&new.email)
    .bind(&new.phone)
    .bind(&new.address)
    .bind(new.salary.to_string())
    .execute(&mut *tx)
    .await?;

    let mechanic = fetch(&mut tx, result.last_insert_rowid()).await?;
    tx.commit().await?;
    Ok(mechanic)
}

pub async fn list(pool: &SqlitePool) -> Result<Vec<Mechanic>, ApiError> {
    let mechanics = sqlx::query_as("SELECT * FROM mechanics ORDER BY id").fetch_all(pool).await?;
    Ok(mechanics)
}

/// Mechanics ordered by descending assignment count; ties fall back to id so
/// the order is stable.
pub async fn ranked(pool: &SqlitePool) -> Result<Vec<RankedMechanic>, ApiError> {
    let ranked = sqlx::query_as(
        "SELECT m.*, COUNT(a.id) AS assignment_count \
         FROM mechanics m \
         LEFT JOIN service_assignments a ON a.mechanic_id = m.id \
         GROUP BY m.id \
         ORDER BY assignment_count DESC, m.id",
    )
    .fetch_all(pool)
    .await?;
    Ok(ranked)
}

pub async fn get(pool: &SqlitePool, id: i64) -> Result<Mechanic, ApiError> {
    sqlx::query_as("SELECT * FROM mechanics WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))
}

pub async fn update(pool: &SqlitePool, id: i64, payload: &Value) -> Result<Mechanic, ApiError> {
    let mut p = PayloadParser::new(payload)?;
    let name = p.opt_str("name");
    let email = p.opt_str("email");
    let phone = p.opt_str("phone");
    let address = p.opt_str("address");
    let salary = p.opt_decimal("salary");
    p.finish()?;

    let mut tx = pool.begin().await?;
    let mut mechanic = fetch(&mut tx, id).await?;

    if let Some(ref email) = email {
        if *email != mechanic.email
            && validate::unique_conflict(&mut tx, "mechanics", "email", email, Some(id)).await?
        {
            return Err(ApiError::conflict("Email already associated with another mechanic"));
        }
    }

    if let Some(name) = name {
        mechanic.name = name;
    }
    if let Some(email) = email {
        mechanic.email = email;
    }
    if let Some(phone) = phone {
        mechanic.phone = Some(phone);
    }
    if let Some(address) = address {
        mechanic.address = Some(address);
    }
    if let Some(salary) = salary {
        mechanic.salary = salary;
    }

    sqlx::query(
        "UPDATE mechanics SET name = ?, email = ?, phone = ?, address = ?, salary = ? WHERE id = ?",
    )
    .bind(&mechanic.name)
    .bind(&mechanic.email)
    .bind(&mechanic.phone)
    .bind(&mechanic.address)
    .bind(mechanic.salary.to_string())
    .bind(id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(mechanic)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> Result<(), ApiError> {
    let mut tx = pool.begin().await?;
    fetch(&mut tx, id).await?;
    sqlx::query("DELETE FROM mechanics WHERE id = ?").bind(id).execute(&mut *tx).await?;
    tx.commit().await?;
    Ok(())
}

async fn fetch(tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>, id: i64) -> Result<Mechanic, ApiError> {
    sqlx::query_as("SELECT * FROM mechanics WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))
}
