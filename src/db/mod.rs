use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::config;

pub mod models;

/// Shared application state: the pool is the sole cross-request resource.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
}

/// Open a pool against `url`, enforcing foreign keys on every connection so
/// the store backs the service-level referential checks.
pub async fn connect(url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);

    // An in-memory database exists per connection; a multi-connection pool
    // would hand each request a different empty store.
    let max_connections = if url.contains(":memory:") {
        1
    } else {
        config::config().database.max_connections
    };

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
}

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS customers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        phone TEXT,
        address TEXT
    )",
    "CREATE TABLE IF NOT EXISTS vehicles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        vin TEXT NOT NULL UNIQUE,
        make TEXT NOT NULL,
        model TEXT NOT NULL,
        year INTEGER NOT NULL,
        customer_id INTEGER NOT NULL REFERENCES customers(id) ON DELETE CASCADE
    )",
    "CREATE TABLE IF NOT EXISTS service_tickets (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        vehicle_id INTEGER NOT NULL REFERENCES vehicles(id) ON DELETE CASCADE,
        date TEXT NOT NULL,
        description TEXT,
        status TEXT NOT NULL,
        cost TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS mechanics (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        phone TEXT,
        address TEXT,
        salary TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS service_assignments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        service_ticket_id INTEGER NOT NULL REFERENCES service_tickets(id) ON DELETE CASCADE,
        mechanic_id INTEGER NOT NULL REFERENCES mechanics(id) ON DELETE CASCADE,
        UNIQUE (service_ticket_id, mechanic_id)
    )",
    "CREATE TABLE IF NOT EXISTS inventory (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        price TEXT NOT NULL,
        quantity INTEGER NOT NULL DEFAULT 0 CHECK (quantity >= 0)
    )",
    "CREATE TABLE IF NOT EXISTS ticket_parts (
        service_ticket_id INTEGER NOT NULL REFERENCES service_tickets(id) ON DELETE CASCADE,
        inventory_id INTEGER NOT NULL REFERENCES inventory(id) ON DELETE CASCADE,
        PRIMARY KEY (service_ticket_id, inventory_id)
    )",
];

pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

pub async fn health_check(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_schema_initializes_on_memory_database() {
        let pool = connect("sqlite::memory:").await.unwrap();
        init_schema(&pool).await.unwrap();
        health_check(&pool).await.unwrap();
        // Second run must be a no-op.
        init_schema(&pool).await.unwrap();
    }
}
