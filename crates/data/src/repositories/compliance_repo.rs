//! Compliance record repository.

use anyhow::Result;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::ComplianceRecord;

/// Repository for compliance record operations.
#[derive(Debug, Clone)]
pub struct ComplianceRepository {
    pool: PgPool,
}

impl ComplianceRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a record inside the caller's transaction and returns the
    /// generated ID. The caller is expected to have rescored the record
    /// just before this call.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn insert_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        record: &ComplianceRecord,
    ) -> Result<i32> {
        let row: (i32,) = sqlx::query_as(
            r"
            INSERT INTO compliance_records
                (vehicle_id, traffic_sign_id, session_id, speed_limit, actual_speed,
                 no_horn_zone, horn_applied, seatbelt_required, seatbelt_worn,
                 violation_type, severity, violation_description, compliance_score, recorded_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING id
            ",
        )
        .bind(&record.vehicle_id)
        .bind(record.traffic_sign_id)
        .bind(&record.session_id)
        .bind(record.speed_limit)
        .bind(record.actual_speed)
        .bind(record.no_horn_zone)
        .bind(record.horn_applied)
        .bind(record.seatbelt_required)
        .bind(record.seatbelt_worn)
        .bind(&record.violation_type)
        .bind(&record.severity)
        .bind(&record.violation_description)
        .bind(record.compliance_score)
        .bind(record.recorded_at)
        .fetch_one(&mut **tx)
        .await?;

        Ok(row.0)
    }

    /// Queries a vehicle's full history, newest first.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn query_by_vehicle(&self, vehicle_id: &str) -> Result<Vec<ComplianceRecord>> {
        let records = sqlx::query_as::<_, ComplianceRecord>(
            r"
            SELECT id, vehicle_id, traffic_sign_id, session_id, speed_limit, actual_speed,
                   no_horn_zone, horn_applied, seatbelt_required, seatbelt_worn,
                   violation_type, severity, violation_description, compliance_score, recorded_at
            FROM compliance_records
            WHERE vehicle_id = $1
            ORDER BY recorded_at DESC, id DESC
            ",
        )
        .bind(vehicle_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Queries a vehicle's most recent records, newest first.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn query_recent(&self, vehicle_id: &str, limit: i64) -> Result<Vec<ComplianceRecord>> {
        let records = sqlx::query_as::<_, ComplianceRecord>(
            r"
            SELECT id, vehicle_id, traffic_sign_id, session_id, speed_limit, actual_speed,
                   no_horn_zone, horn_applied, seatbelt_required, seatbelt_worn,
                   violation_type, severity, violation_description, compliance_score, recorded_at
            FROM compliance_records
            WHERE vehicle_id = $1
            ORDER BY recorded_at DESC, id DESC
            LIMIT $2
            ",
        )
        .bind(vehicle_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Counts a vehicle's records.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn count_by_vehicle(&self, vehicle_id: &str) -> Result<i64> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM compliance_records WHERE vehicle_id = $1")
                .bind(vehicle_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(row.0)
    }
}
