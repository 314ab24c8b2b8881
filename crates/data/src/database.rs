//! Database pool construction and schema bootstrap.

use anyhow::Result;
use drivewise_core::DatabaseConfig;
use sqlx::{postgres::PgPoolOptions, PgPool};

const SCHEMA: &str = include_str!("../../../migrations/schema.sql");

/// Connects to the configured `PostgreSQL` database.
///
/// # Errors
/// Returns an error if the database connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await?;
    Ok(pool)
}

/// Applies the schema file. Every statement is idempotent, so this is safe
/// to run on startup.
///
/// # Errors
/// Returns an error if any schema statement fails.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    tracing::debug!("database schema ensured");
    Ok(())
}
