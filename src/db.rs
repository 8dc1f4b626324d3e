use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use crate::error::ApiError;

/// Type alias for the PostgreSQL connection pool
pub type DbPool = PgPool;

/// Creates and configures a PostgreSQL connection pool
///
/// # Arguments
/// * `database_url` - PostgreSQL connection string
///
/// # Returns
/// * `Result<DbPool>` - Configured connection pool or error
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    tracing::debug!("Creating database connection pool");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect(database_url)
        .await?;

    tracing::info!("Database connection pool created successfully");
    Ok(pool)
}

/// Check if a slot with the given label already exists
///
/// # Arguments
/// * `pool` - Database connection pool
/// * `label` - Slot label to check for duplicates
///
/// # Returns
/// * `Result<bool, ApiError>` - True if duplicate exists, false otherwise
pub async fn check_duplicate_slot_label(
    pool: &PgPool,
    label: &str,
) -> Result<bool, ApiError> {
    tracing::debug!("Checking for duplicate slot label: {}", label);

    let exists: Option<bool> = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM slots WHERE label = $1)"
    )
    .bind(label)
    .fetch_one(pool)
    .await?;

    let is_duplicate = exists.unwrap_or(false);
    if is_duplicate {
        tracing::debug!("Duplicate slot label found: {}", label);
    }

    Ok(is_duplicate)
}

/// Check if a slot with the given label already exists, excluding a specific ID
/// Used for update operations to allow keeping the same label
pub async fn check_duplicate_slot_label_excluding_id(
    pool: &PgPool,
    label: &str,
    exclude_id: i32,
) -> Result<bool, ApiError> {
    let exists: Option<bool> = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM slots WHERE label = $1 AND id != $2)"
    )
    .bind(label)
    .bind(exclude_id)
    .fetch_one(pool)
    .await?;

    Ok(exists.unwrap_or(false))
}

/// Check whether any active booking still holds the given slot
///
/// A referenced slot definition must not be deleted; the foreign key enforces
/// this at the storage layer, this check exists to return a friendly conflict
/// before hitting it.
pub async fn slot_is_referenced(
    pool: &PgPool,
    slot_id: i32,
) -> Result<bool, ApiError> {
    let exists: Option<bool> = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM booking_slots WHERE slot_id = $1)"
    )
    .bind(slot_id)
    .fetch_one(pool)
    .await?;

    Ok(exists.unwrap_or(false))
}
