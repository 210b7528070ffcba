use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};
use std::str::FromStr;

use crate::auth::Role;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    /// Salted hash; never present in any serialized representation.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Vehicle {
    pub id: i64,
    pub vin: String,
    pub make: String,
    pub model: String,
    pub year: i64,
    pub customer_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceTicket {
    pub id: i64,
    pub vehicle_id: i64,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub status: String,
    pub cost: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct Mechanic {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub salary: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ServiceAssignment {
    pub id: i64,
    pub service_ticket_id: i64,
    pub mechanic_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct InventoryItem {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub quantity: i64,
}

/// A mechanic together with their assignment count, for the ranking query.
#[derive(Debug, Clone, Serialize)]
pub struct RankedMechanic {
    #[serde(flatten)]
    pub mechanic: Mechanic,
    pub assignment_count: i64,
}

// Money columns are stored as TEXT; SQLite has no native fixed-point type.
fn decimal_column(row: &SqliteRow, column: &str) -> Result<Decimal, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    Decimal::from_str(&raw).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

impl FromRow<'_, SqliteRow> for ServiceTicket {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            vehicle_id: row.try_get("vehicle_id")?,
            date: row.try_get("date")?,
            description: row.try_get("description")?,
            status: row.try_get("status")?,
            cost: decimal_column(row, "cost")?,
        })
    }
}

impl FromRow<'_, SqliteRow> for Mechanic {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            address: row.try_get("address")?,
            salary: decimal_column(row, "salary")?,
        })
    }
}

impl FromRow<'_, SqliteRow> for InventoryItem {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            price: decimal_column(row, "price")?,
            quantity: row.try_get("quantity")?,
        })
    }
}

impl FromRow<'_, SqliteRow> for RankedMechanic {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            mechanic: Mechanic::from_row(row)?,
            assignment_count: row.try_get("assignment_count")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_serialization_omits_password_hash() {
        let user = User {
            id: 1,
            email: "a@b.com".to_string(),
            password_hash: "secret-hash".to_string(),
            role: Role::Admin,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "admin");
    }
}
