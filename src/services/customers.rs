use serde_json::Value;
use sqlx::SqlitePool;

use crate::db::models::{Customer, ServiceTicket};
use crate::error::ApiError;

use super::payload::PayloadParser;
use super::validate;

const NOT_FOUND: &str = "Customer not found.";

struct NewCustomer {
    name: String,
    email: String,
    phone: Option<String>,
    address: Option<String>,
}

impl NewCustomer {
    fn parse(payload: &Value) -> Result<Self, ApiError> {
        let mut p = PayloadParser::new(payload)?;
        let name = p.require_str("name");
        let email = p.require_str("email");
        let phone = p.opt_str("phone");
        let address = p.opt_str("address");
        p.finish()?;
        match (name, email) {
            (Some(name), Some(email)) => Ok(Self { name, email, phone, address }),
            _ => Err(ApiError::bad_request("Invalid request payload")),
        }
    }
}

#[derive(Default)]
struct CustomerPatch {
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
}

impl CustomerPatch {
    fn parse(payload: &Value) -> Result<Self, ApiError> {
        let mut p = PayloadParser::new(payload)?;
        let patch = Self {
            name: p.opt_str("name"),
            email: p.opt_str("email"),
            phone: p.opt_str("phone"),
            address: p.opt_str("address"),
        };
        p.finish()?;
        Ok(patch)
    }
}

pub async fn create(pool: &SqlitePool, payload: &Value) -> Result<Customer, ApiError> {
    let new = NewCustomer::parse(payload)?;

    let mut tx = pool.begin().await?;
    if validate::unique_conflict(&mut tx, "customers", "email", &new.email, None).await? {
        return Err(ApiError::conflict("Email already associated with an account"));
    }

    let result =
        sqlx::query("INSERT INTO customers (name, email, phone, address) VALUES (?, ?, ?, ?)")
            .bind(&new.name)
            .bind(&new.email)
            .bind(&new.phone)
            .bind(&new.address)
            .execute(&mut *tx)
            .await?;

    let customer = fetch(&mut tx, result.last_insert_rowid()).await?;
    tx.commit().await?;
    Ok(customer)
}

/// 1-indexed pagination; out-of-range pages come back as an empty slice.
pub async fn list(pool: &SqlitePool, page: i64, per_page: i64) -> Result<Vec<Customer>, ApiError> {
    let page = page.max(1);
    let per_page = per_page.max(1);
    let offset = (page - 1) * per_page;

    let customers = sqlx::query_as("SELECT * FROM customers ORDER BY id LIMIT ? OFFSET ?")
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool)
        .await?;
    Ok(customers)
}

pub async fn get(pool: &SqlitePool, id: i64) -> Result<Customer, ApiError> {
    sqlx::query_as("SELECT * FROM customers WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))
}

pub async fn update(pool: &SqlitePool, id: i64, payload: &Value) -> Result<Customer, ApiError> {
    let patch = CustomerPatch::parse(payload)?;

    let mut tx = pool.begin().await?;
    let mut customer = fetch(&mut tx, id).await?;

    if let Some(ref email) = patch.email {
        if *email != customer.email
            && validate::unique_conflict(&mut tx, "customers", "email", email, Some(id)).await?
        {
            return Err(ApiError::conflict("Email already associated with another account"));
        }
    }

    if let Some(name) = patch.name {
        customer.name = name;
    }
    if let Some(email) = patch.email {
        customer.email = email;
    }
    if let Some(phone) = patch.phone {
        customer.phone = Some(phone);
    }
    if let Some(address) = patch.address {
        customer.address = Some(address);
    }

    sqlx::query("UPDATE customers SET name = ?, email = ?, phone = ?, address = ? WHERE id = ?")
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(customer)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> Result<(), ApiError> {
    let mut tx = pool.begin().await?;
    fetch(&mut tx, id).await?;
    sqlx::query("DELETE FROM customers WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

/// Tickets on vehicles owned by the acting customer (subject-scoped).
pub async fn my_tickets(pool: &SqlitePool, customer_id: i64) -> Result<Vec<ServiceTicket>, ApiError> {
    let tickets = sqlx::query_as(
        "SELECT t.* FROM service_tickets t \
         JOIN vehicles v ON t.vehicle_id = v.id \
         WHERE v.customer_id = ? ORDER BY t.id",
    )
    .bind(customer_id)
    .fetch_all(pool)
    .await?;
    Ok(tickets)
}

async fn fetch(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    id: i64,
) -> Result<Customer, ApiError> {
    sqlx::query_as("SELECT * FROM customers WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))
}
