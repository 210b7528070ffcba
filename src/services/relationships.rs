//! Relationship manager for the two many-to-many edges: ticket↔mechanic
//! (materialized as service_assignments rows) and ticket↔inventory (the
//! ticket_parts join, no payload).
//!
//! Direct assignment creation is strict (404 for a missing reference, 409
//! for a duplicate pair); the ticket-centric bulk edit deliberately skips the
//! same conditions silently. The asymmetry is observed behavior, kept as-is.

use serde_json::Value;
use sqlx::{SqliteConnection, SqlitePool};

use crate::db::models::{InventoryItem, ServiceAssignment};
use crate::error::ApiError;

use super::payload::PayloadParser;
use super::validate;
use super::{inventory, tickets};

const NOT_FOUND: &str = "Service assignment not found.";
const PAIR_TAKEN: &str = "This service ticket is already assigned to this mechanic.";

struct NewAssignment {
    service_ticket_id: i64,
    mechanic_id: i64,
}

impl NewAssignment {
    fn parse(payload: &Value) -> Result<Self, ApiError> {
        let mut p = PayloadParser::new(payload)?;
        let service_ticket_id = p.require_i64("service_ticket_id");
        let mechanic_id = p.require_i64("mechanic_id");
        p.finish()?;
        match (service_ticket_id, mechanic_id) {
            (Some(service_ticket_id), Some(mechanic_id)) => {
                Ok(Self { service_ticket_id, mechanic_id })
            }
            _ => Err(ApiError::bad_request("Invalid request payload")),
        }
    }
}

/// True when some assignment other than `exclude_id` already links the pair.
async fn pair_conflict(
    conn: &mut SqliteConnection,
    ticket_id: i64,
    mechanic_id: i64,
    exclude_id: Option<i64>,
) -> Result<bool, sqlx::Error> {
    let existing: Option<(i64,)> = sqlx::query_as(
        "SELECT id FROM service_assignments WHERE service_ticket_id = ? AND mechanic_id = ? LIMIT 1",
    )
    .bind(ticket_id)
    .bind(mechanic_id)
    .fetch_optional(conn)
    .await?;

    Ok(match existing {
        Some((id,)) => exclude_id != Some(id),
        None => false,
    })
}

/// Strict single-edge creation; behaviorally identical whether reached via
/// POST /assignments or any other path creating this edge.
pub async fn create_assignment(
    pool: &SqlitePool,
    payload: &Value,
) -> Result<ServiceAssignment, ApiError> {
    let new = NewAssignment::parse(payload)?;

    let mut tx = pool.begin().await?;
    if !validate::exists(&mut tx, "service_tickets", new.service_ticket_id).await? {
        return Err(ApiError::not_found(format!(
            "ServiceTicket ID {} not found.",
            new.service_ticket_id
        )));
    }
    if !validate::exists(&mut tx, "mechanics", new.mechanic_id).await? {
        return Err(ApiError::not_found(format!("Mechanic ID {} not found.", new.mechanic_id)));
    }
    if pair_conflict(&mut tx, new.service_ticket_id, new.mechanic_id, None).await? {
        return Err(ApiError::conflict(PAIR_TAKEN));
    }

    let result = sqlx::query(
        "INSERT INTO service_assignments (service_ticket_id, mechanic_id) VALUES (?, ?)",
    )
    .bind(new.service_ticket_id)
    .bind(new.mechanic_id)
    .execute(&mut *tx)
    .await?;

    let assignment = fetch(&mut tx, result.last_insert_rowid()).await?;
    tx.commit().await?;
    Ok(assignment)
}

pub async fn list_assignments(pool: &SqlitePool) -> Result<Vec<ServiceAssignment>, ApiError> {
    let assignments =
        sqlx::query_as("SELECT * FROM service_assignments ORDER BY id").fetch_all(pool).await?;
    Ok(assignments)
}

pub async fn get_assignment(pool: &SqlitePool, id: i64) -> Result<ServiceAssignment, ApiError> {
    sqlx::query_as("SELECT * FROM service_assignments WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))
}

pub async fn update_assignment(
    pool: &SqlitePool,
    id: i64,
    payload: &Value,
) -> Result<ServiceAssignment, ApiError> {
    let mut p = PayloadParser::new(payload)?;
    let service_ticket_id = p.opt_i64("service_ticket_id");
    let mechanic_id = p.opt_i64("mechanic_id");
    p.finish()?;

    let mut tx = pool.begin().await?;
    let mut assignment = fetch(&mut tx, id).await?;

    if let Some(ticket_id) = service_ticket_id {
        assignment.service_ticket_id = ticket_id;
    }
    if let Some(mechanic_id) = mechanic_id {
        assignment.mechanic_id = mechanic_id;
    }

    if !validate::exists(&mut tx, "service_tickets", assignment.service_ticket_id).await? {
        return Err(ApiError::not_found(format!(
            "ServiceTicket ID {} not found.",
            assignment.service_ticket_id
        )));
    }
    if !validate::exists(&mut tx, "mechanics", assignment.mechanic_id).await? {
        return Err(ApiError::not_found(format!(
            "Mechanic ID {} not found.",
            assignment.mechanic_id
        )));
    }
    if pair_conflict(&mut tx, assignment.service_ticket_id, assignment.mechanic_id, Some(id))
        .await?
    {
        return Err(ApiError::conflict(
            "This combination of ticket and mechanic is already assigned.",
        ));
    }

    sqlx::query("UPDATE service_assignments SET service_ticket_id = ?, mechanic_id = ? WHERE id = ?")
        .bind(assignment.service_ticket_id)
        .bind(assignment.mechanic_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(assignment)
}

pub async fn delete_assignment(pool: &SqlitePool, id: i64) -> Result<(), ApiError> {
    let mut tx = pool.begin().await?;
    fetch(&mut tx, id).await?;
    sqlx::query("DELETE FROM service_assignments WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

/// Ticket-centric bulk edit: add ids that don't resolve to a mechanic or
/// would duplicate a pair are skipped without error, as are remove ids with
/// no matching assignment. All changes commit as one unit.
pub async fn bulk_edit_assignments(
    pool: &SqlitePool,
    ticket_id: i64,
    add_ids: &[i64],
    remove_ids: &[i64],
) -> Result<Vec<ServiceAssignment>, ApiError> {
    let mut tx = pool.begin().await?;
    tickets::fetch(&mut tx, ticket_id).await?;

    for &mechanic_id in add_ids {
        if !validate::exists(&mut tx, "mechanics", mechanic_id).await? {
            tracing::debug!("bulk edit: skipping unknown mechanic {}", mechanic_id);
            continue;
        }
        if pair_conflict(&mut tx, ticket_id, mechanic_id, None).await? {
            continue;
        }
        sqlx::query("INSERT INTO service_assignments (service_ticket_id, mechanic_id) VALUES (?, ?)")
            .bind(ticket_id)
            .bind(mechanic_id)
            .execute(&mut *tx)
            .await?;
    }

    for &mechanic_id in remove_ids {
        sqlx::query(
            "DELETE FROM service_assignments WHERE service_ticket_id = ? AND mechanic_id = ?",
        )
        .bind(ticket_id)
        .bind(mechanic_id)
        .execute(&mut *tx)
        .await?;
    }

    let assignments = sqlx::query_as(
        "SELECT * FROM service_assignments WHERE service_ticket_id = ? ORDER BY id",
    )
    .bind(ticket_id)
    .fetch_all(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(assignments)
}

/// Attach an inventory part to a ticket; a no-op when already attached.
pub async fn add_part(
    pool: &SqlitePool,
    ticket_id: i64,
    payload: &Value,
) -> Result<Vec<InventoryItem>, ApiError> {
    let mut p = PayloadParser::new(payload)?;
    let part_id = p.require_i64("part_id");
    p.finish()?;
    let part_id = part_id.ok_or_else(|| ApiError::bad_request("Invalid request payload"))?;

    let mut tx = pool.begin().await?;
    tickets::fetch(&mut tx, ticket_id).await?;
    if !validate::exists(&mut tx, "inventory", part_id).await? {
        return Err(ApiError::not_found(inventory::NOT_FOUND));
    }

    sqlx::query(
        "INSERT OR IGNORE INTO ticket_parts (service_ticket_id, inventory_id) VALUES (?, ?)",
    )
    .bind(ticket_id)
    .bind(part_id)
    .execute(&mut *tx)
    .await?;

    let parts = sqlx::query_as(
        "SELECT i.* FROM inventory i \
         JOIN ticket_parts tp ON tp.inventory_id = i.id \
         WHERE tp.service_ticket_id = ? ORDER BY i.id",
    )
    .bind(ticket_id)
    .fetch_all(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(parts)
}

async fn fetch(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    id: i64,
) -> Result<ServiceAssignment, ApiError> {
    sqlx::query_as("SELECT * FROM service_assignments WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))
}
