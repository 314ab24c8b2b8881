//! Traffic-sign repository.

use anyhow::Result;
use sqlx::PgPool;

use crate::models::TrafficSignRecord;

/// Repository for detected traffic signs.
#[derive(Debug, Clone)]
pub struct TrafficSignRepository {
    pool: PgPool,
}

impl TrafficSignRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a new sign and returns the generated ID.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn insert(&self, record: &TrafficSignRecord) -> Result<i32> {
        let row: (i32,) = sqlx::query_as(
            r"
            INSERT INTO traffic_signs (sign_type, sign_value, detected_at, location, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            ",
        )
        .bind(&record.sign_type)
        .bind(&record.sign_value)
        .bind(record.detected_at)
        .bind(&record.location)
        .bind(record.is_active)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.0)
    }

    /// Gets a sign by ID.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn get_by_id(&self, id: i32) -> Result<Option<TrafficSignRecord>> {
        let record = sqlx::query_as::<_, TrafficSignRecord>(
            r"
            SELECT id, sign_type, sign_value, detected_at, location, is_active
            FROM traffic_signs
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_new() {
        // Verify the repository struct compiles correctly
        assert!(std::mem::size_of::<TrafficSignRepository>() > 0);
    }
}
