use serde_json::Value;
use sqlx::SqlitePool;

use crate::db::models::Vehicle;
use crate::error::ApiError;

use super::payload::PayloadParser;
use super::validate;

const NOT_FOUND: &str = "Vehicle not found.";

struct NewVehicle {
    vin: String,
    make: String,
    model: String,
    year: i64,
    customer_id: i64,
}

impl NewVehicle {
    fn parse(payload: &Value) -> Result<Self, ApiError> {
        let mut p = PayloadParser::new(payload)?;
        let vin = p.require_str("vin");
        let make = p.require_str("make");
        let model = p.require_str("model");
        let year = p.require_i64("year");
        let customer_id = p.require_i64("customer_id");
        p.finish()?;
        match (vin, make, model, year, customer_id) {
            (Some(vin), Some(make), Some(model), Some(year), Some(customer_id)) => {
                Ok(Self { vin, make, model, year, customer_id })
            }
            _ => Err(ApiError::bad_request("Invalid request payload")),
        }
    }
}

pub async fn create(pool: &SqlitePool, payload: &Value) -> Result<Vehicle, ApiError> {
    let new = NewVehicle::parse(payload)?;

    let mut tx = pool.begin().await?;
    if validate::unique_conflict(&mut tx, "vehicles", "vin", &new.vin, None).await? {
        return Err(ApiError::conflict("VIN already registered."));
    }
    if !validate::exists(&mut tx, "customers", new.customer_id).await? {
        return Err(ApiError::not_found(format!(
            "Customer ID {} not found.",
            new.customer_id
        )));
    }

    let result = sqlx::query(
        "INSERT INTO vehicles (vin, make, model, year, customer_id) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&new.vin)
    .bind(&new.make)
    .bind(&new.model)
    .bind(new.year)
    .bind(new.customer_id)
    .execute(&mut *tx)
    .await?;

    let vehicle = fetch(&mut tx, result.last_insert_rowid()).await?;
    tx.commit().await?;
    Ok(vehicle)
}

pub async fn list(pool: &SqlitePool) -> Result<Vec<Vehicle>, ApiError> {
    let vehicles = sqlx::query_as("SELECT * FROM vehicles ORDER BY id").fetch_all(pool).await?;
    Ok(vehicles)
}

pub async fn get(pool: &SqlitePool, id: i64) -> Result<Vehicle, ApiError> {
    sqlx::query_as("SELECT * FROM vehicles WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))
}

pub async fn update(pool: &SqlitePool, id: i64, payload: &Value) -> Result<Vehicle, ApiError> {
    let mut p = PayloadParser::new(payload)?;
    let vin = p.opt_str("vin");
    let make = p.opt_str("make");
    let model = p.opt_str("model");
    let year = p.opt_i64("year");
    let customer_id = p.opt_i64("customer_id");
    p.finish()?;

    let mut tx = pool.begin().await?;
    let mut vehicle = fetch(&mut tx, id).await?;

    if let Some(ref vin) = vin {
        if *vin != vehicle.vin
            && validate::unique_conflict(&mut tx, "vehicles", "vin", vin, Some(id)).await?
        {
            return Err(ApiError::conflict("VIN already associated with another vehicle"));
        }
    }
    if let Some(customer_id) = customer_id {
        if !validate::exists(&mut tx, "customers", customer_id).await? {
            return Err(ApiError::not_found(format!("Customer ID {customer_id} not found.")));
        }
        vehicle.customer_id = customer_id;
    }

    if let Some(vin) = vin {
        vehicle.vin = vin;
    }
    if let Some(make) = make {
        vehicle.make = make;
    }
    if let Some(model) = model {
        vehicle.model = model;
    }
    if let Some(year) = year {
        vehicle.year = year;
    }

    sqlx::query(
        "UPDATE vehicles SET vin = ?, make = ?, model = ?, year = ?, customer_id = ? WHERE id = ?",
    )
    .bind(&vehicle.vin)
    .bind(&vehicle.make)
    .bind(&vehicle.model)
    .bind(vehicle.year)
    .bind(vehicle.customer_id)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(vehicle)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> Result<(), ApiError> {
    let mut tx = pool.begin().await?;
    fetch(&mut tx, id).await?;
    sqlx::query("DELETE FROM vehicles WHERE id = ?").bind(id).execute(&mut *tx).await?;
    tx.commit().await?;
    Ok(())
}

async fn fetch(tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>, id: i64) -> Result<Vehicle, ApiError> {
    sqlx::query_as("SELECT * FROM vehicles WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))
}
