use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::SqlitePool;

use crate::db::models::ServiceTicket;
use crate::error::ApiError;

use super::payload::PayloadParser;
use super::validate;

pub(crate) const NOT_FOUND: &str = "Service ticket not found.";

struct NewTicket {
    vehicle_id: i64,
    date: NaiveDate,
    description: Option<String>,
    status: String,
    cost: Decimal,
}

impl NewTicket {
    fn parse(payload: &Value) -> Result<Self, ApiError> {
        let mut p = PayloadParser::new(payload)?;
        let vehicle_id = p.require_i64("vehicle_id");
        let date = p.require_date("date");
        let description = p.opt_str("description");
        let status = p.require_str("status");
        let cost = p.require_decimal("cost");
        p.finish()?;
        match (vehicle_id, date, status, cost) {
            (Some(vehicle_id), Some(date), Some(status), Some(cost)) => {
                Ok(Self { vehicle_id, date, description, status, cost })
            }
            _ => Err(ApiError::bad_request("Invalid request payload")),
        }
    }
}

pub async fn create(pool: &SqlitePool, payload: &Value) -> Result<ServiceTicket, ApiError> {
    let new = NewTicket::parse(payload)?;

    let mut tx = pool.begin().await?;
    if !validate::exists(&mut tx, "vehicles", new.vehicle_id).await? {
        return Err(ApiError::not_found(format!("Vehicle ID {} not found.", new.vehicle_id)));
    }

    let result = sqlx::query(
        "INSERT INTO service_tickets (vehicle_id, date, description, status, cost) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(new.vehicle_id)
    .bind(new.date)
    .bind(&new.description)
    .bind(&new.status)
    .bind(new.cost.to_string())
    .execute(&mut *tx)
    .await?;

    let ticket = fetch(&mut tx, result.last_insert_rowid()).await?;
    tx.commit().await?;
    Ok(ticket)
}

pub async fn list(pool: &SqlitePool) -> Result<Vec<ServiceTicket>, ApiError> {
    let tickets =
        sqlx::query_as("SELECT * FROM service_tickets ORDER BY id").fetch_all(pool).await?;
    Ok(tickets)
}

pub async fn get(pool: &SqlitePool, id: i64) -> Result<ServiceTicket, ApiError> {
    sqlx::query_as("SELECT * FROM service_tickets WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))
}

pub async fn update(pool: &SqlitePool, id: i64, payload: &Value) -> Result<ServiceTicket, ApiError> {
    let mut p = PayloadParser::new(payload)?;
    let vehicle_id = p.opt_i64("vehicle_id");
    let date = p.opt_date("date");
    let description = p.opt_str("description");
    let status = p.opt_str("status");
    let cost = p.opt_decimal("cost");
    p.finish()?;

    let mut tx = pool.begin().await?;
    let mut ticket = fetch(&mut tx, id).await?;

    if let Some(vehicle_id) = vehicle_id {
        if !validate::exists(&mut tx, "vehicles", vehicle_id).await? {
            return Err(ApiError::not_found(format!("Vehicle ID {vehicle_id} not found.")));
        }
        ticket.vehicle_id = vehicle_id;
    }
    if let Some(date) = date {
        ticket.date = date;
    }
    if let Some(description) = description {
        ticket.description = Some(description);
    }
    if let Some(status) = status {
        ticket.status = status;
    }
    if let Some(cost) = cost {
        ticket.cost = cost;
    }

    sqlx::query(
        "UPDATE service_tickets SET vehicle_id = ?, date = ?, description = ?, status = ?, \
         cost = ? WHERE id = ?",
    )
    .bind(ticket.vehicle_id)
    .bind(ticket.date)
    .bind(&ticket.description)
    .bind(&ticket.status)
    .bind(ticket.cost.to_string())
    .bind(id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(ticket)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> Result<(), ApiError> {
    let mut tx = pool.begin().await?;
    fetch(&mut tx, id).await?;
    sqlx::query("DELETE FROM service_tickets WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

pub(crate) async fn fetch(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    id: i64,
) -> Result<ServiceTicket, ApiError> {
    sqlx::query_as("SELECT * FROM service_tickets WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))
}
