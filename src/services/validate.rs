//! Conflict validator: the uniqueness and referential checks shared by every
//! entity service. Each uniqueness domain (customer email, mechanic email,
//! user email, vehicle VIN) runs through the same generic check.

use sqlx::SqliteConnection;

/// True when a row other than `exclude_id` already holds `value` in
/// `table.column`.
///
/// `exclude_id` exists so an update can re-submit a field's current value
/// without tripping the check while still colliding with a different row.
/// Table and column names are compile-time constants at every call site;
/// only the candidate value is bound.
pub async fn unique_conflict(
    conn: &mut SqliteConnection,
    table: &str,
    column: &str,
    value: &str,
    exclude_id: Option<i64>,
) -> Result<bool, sqlx::Error> {
    let sql = format!("SELECT id FROM {table} WHERE {column} = ? LIMIT 1");
    let existing: Option<(i64,)> = sqlx::query_as(&sql).bind(value).fetch_optional(conn).await?;

    Ok(match existing {
        Some((id,)) => exclude_id != Some(id),
        None => false,
    })
}

/// Referenced-entity existence. Absence is a "referenced entity not found"
/// condition, surfaced by callers as 404 rather than 400.
pub async fn exists(
    conn: &mut SqliteConnection,
    table: &str,
    id: i64,
) -> Result<bool, sqlx::Error> {
    let sql = format!("SELECT 1 FROM {table} WHERE id = ? LIMIT 1");
    let row: Option<(i64,)> = sqlx::query_as(&sql).bind(id).fetch_optional(conn).await?;
    Ok(row.is_some())
}
