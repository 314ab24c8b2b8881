//! Vehicle repository.

use anyhow::Result;
use sqlx::PgPool;

use crate::models::VehicleRecord;

/// Repository for vehicle identity operations.
#[derive(Debug, Clone)]
pub struct VehicleRepository {
    pool: PgPool,
}

impl VehicleRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a vehicle by its external id.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn get(&self, vehicle_id: &str) -> Result<Option<VehicleRecord>> {
        let record = sqlx::query_as::<_, VehicleRecord>(
            r"
            SELECT id, vehicle_id, vehicle_type, registration_number, owner_name, created_at
            FROM vehicles
            WHERE vehicle_id = $1
            ",
        )
        .bind(vehicle_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Gets a vehicle, creating it with the given defaults when absent.
    ///
    /// The insert races benignly with concurrent ingests of the same
    /// vehicle: the conflict clause turns the second insert into a read.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn get_or_create(&self, record: &VehicleRecord) -> Result<VehicleRecord> {
        let row = sqlx::query_as::<_, VehicleRecord>(
            r"
            INSERT INTO vehicles (vehicle_id, vehicle_type, registration_number, owner_name, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (vehicle_id) DO UPDATE SET vehicle_id = EXCLUDED.vehicle_id
            RETURNING id, vehicle_id, vehicle_type, registration_number, owner_name, created_at
            ",
        )
        .bind(&record.vehicle_id)
        .bind(&record.vehicle_type)
        .bind(&record.registration_number)
        .bind(&record.owner_name)
        .bind(record.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Lists every vehicle, ordered by vehicle id.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn list_all(&self) -> Result<Vec<VehicleRecord>> {
        let records = sqlx::query_as::<_, VehicleRecord>(
            r"
            SELECT id, vehicle_id, vehicle_type, registration_number, owner_name, created_at
            FROM vehicles
            ORDER BY vehicle_id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Lists vehicles with at least `min_records` compliance records,
    /// ordered by vehicle id for deterministic iteration.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn list_qualifying(&self, min_records: i64) -> Result<Vec<VehicleRecord>> {
        let records = sqlx::query_as::<_, VehicleRecord>(
            r"
            SELECT id, vehicle_id, vehicle_type, registration_number, owner_name, created_at
            FROM vehicles
            WHERE vehicle_id IN (
                SELECT vehicle_id FROM compliance_records
                GROUP BY vehicle_id
                HAVING COUNT(*) >= $1
            )
            ORDER BY vehicle_id ASC
            ",
        )
        .bind(min_records)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Counts vehicles meeting the qualification threshold.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn count_qualifying(&self, min_records: i64) -> Result<i64> {
        let row: (i64,) = sqlx::query_as(
            r"
            SELECT COUNT(*) FROM (
                SELECT vehicle_id FROM compliance_records
                GROUP BY vehicle_id
                HAVING COUNT(*) >= $1
            ) AS qualified
            ",
        )
        .bind(min_records)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.0)
    }
}
