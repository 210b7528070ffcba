use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::SqlitePool;

use crate::db::models::InventoryItem;
use crate::error::ApiError;

use super::payload::PayloadParser;

pub(crate) const NOT_FOUND: &str = "Item not found";

struct NewItem {
    name: String,
    price: Decimal,
    quantity: i64,
}

impl NewItem {
    fn parse(payload: &Value) -> Result<Self, ApiError> {
        let mut p = PayloadParser::new(payload)?;
        let name = p.require_str("name");
        let price = p.require_decimal("price");
        let quantity = p.opt_i64("quantity");
        p.finish()?;

        let quantity = quantity.unwrap_or(0);
        if quantity < 0 {
            return Err(ApiError::bad_request("Quantity must be non-negative"));
        }
        match (name, price) {
            (Some(name), Some(price)) => Ok(Self { name, price, quantity }),
            _ => Err(ApiError::bad_request("Invalid request payload")),
        }
    }
}

pub async fn create(pool: &SqlitePool, payload: &Value) -> Result<InventoryItem, ApiError> {
    let new = NewItem::parse(payload)?;

    let mut tx = pool.begin().await?;
    let result = sqlx::query("INSERT INTO inventory (name, price, quantity) VALUES (?, ?, ?)")
        .bind(&new.name)
        .bind(new.price.to_string())
        .bind(new.quantity)
        .execute(&mut *tx)
        .await?;

    let item = fetch(&mut tx, result.last_insert_rowid()).await?;
    tx.commit().await?;
    Ok(item)
}

pub async fn list(pool: &SqlitePool) -> Result<Vec<InventoryItem>, ApiError> {
    let items = sqlx::query_as("SELECT * FROM inventory ORDER BY id").fetch_all(pool).await?;
    Ok(items)
}

pub async fn get(pool: &SqlitePool, id: i64) -> Result<InventoryItem, ApiError> {
    sqlx::query_as("SELECT * FROM inventory WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))
}

pub async fn update(pool: &SqlitePool, id: i64, payload: &Value) -> Result<InventoryItem, ApiError> {
    let mut p = PayloadParser::new(payload)?;
    let name = p.opt_str("name");
    let price = p.opt_decimal("price");
    let quantity = p.opt_i64("quantity");
    p.finish()?;

    if matches!(quantity, Some(q) if q < 0) {
        return Err(ApiError::bad_request("Quantity must be non-negative"));
    }

    let mut tx = pool.begin().await?;
    let mut item = fetch(&mut tx, id).await?;

    if let Some(name) = name {
        item.name = name;
    }
    if let Some(price) = price {
        item.price = price;
    }
    if let Some(quantity) = quantity {
        item.quantity = quantity;
    }

    sqlx::query("UPDATE inventory SET name = ?, price = ?, quantity = ? WHERE id = ?")
        .bind(&item.name)
        .bind(item.price.to_string())
        .bind(item.quantity)
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(item)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> Result<(), ApiError> {
    let mut tx = pool.begin().await?;
    fetch(&mut tx, id).await?;
    sqlx::query("DELETE FROM inventory WHERE id = ?").bind(id).execute(&mut *tx).await?;
    tx.commit().await?;
    Ok(())
}

async fn fetch(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    id: i64,
) -> Result<InventoryItem, ApiError> {
    sqlx::query_as("SELECT * FROM inventory WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))
}
