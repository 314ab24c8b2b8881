//! Leaderboard repository.
//!
//! The leaderboard table is a materialized view owned by the ranker: stats
//! are upserted per vehicle, then ranks are written in a second pass over
//! the sorted entries.

use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::models::LeaderboardRecord;

/// A leaderboard entry joined with its vehicle's identity, for display.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RankedVehicleRow {
    pub rank: i32,
    pub vehicle_id: String,
    pub vehicle_type: String,
    pub owner_name: Option<String>,
    pub total_trips: i64,
    pub total_violations: i64,
    pub compliance_rate: Decimal,
    pub average_compliance_score: Decimal,
    pub total_tokens_earned: i64,
    pub last_updated: DateTime<Utc>,
}

/// Repository for leaderboard entries.
#[derive(Debug, Clone)]
pub struct LeaderboardRepository {
    pool: PgPool,
}

impl LeaderboardRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upserts an entry's cached stats, leaving its rank untouched. A new
    /// entry starts at rank 0 until the same ranking pass assigns one.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn upsert_stats(&self, entry: &LeaderboardRecord) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO leaderboard
                (vehicle_id, rank, total_trips, total_violations, compliance_rate,
                 average_compliance_score, total_tokens_earned, last_updated)
            VALUES ($1, 0, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (vehicle_id) DO UPDATE
                SET total_trips = EXCLUDED.total_trips,
                    total_violations = EXCLUDED.total_violations,
                    compliance_rate = EXCLUDED.compliance_rate,
                    average_compliance_score = EXCLUDED.average_compliance_score,
                    total_tokens_earned = EXCLUDED.total_tokens_earned,
                    last_updated = EXCLUDED.last_updated
            ",
        )
        .bind(&entry.vehicle_id)
        .bind(entry.total_trips)
        .bind(entry.total_violations)
        .bind(entry.compliance_rate)
        .bind(entry.average_compliance_score)
        .bind(entry.total_tokens_earned)
        .bind(entry.last_updated)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Writes a vehicle's rank.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn set_rank(&self, vehicle_id: &str, rank: i32) -> Result<()> {
        sqlx::query("UPDATE leaderboard SET rank = $2 WHERE vehicle_id = $1")
            .bind(vehicle_id)
            .bind(rank)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Lists every entry, unordered. The ranker sorts in process so the
    /// composite ordering lives in exactly one place.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn list_all(&self) -> Result<Vec<LeaderboardRecord>> {
        let records = sqlx::query_as::<_, LeaderboardRecord>(
            r"
            SELECT vehicle_id, rank, total_trips, total_violations, compliance_rate,
                   average_compliance_score, total_tokens_earned, last_updated
            FROM leaderboard
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Gets the entry for one vehicle.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn get_by_vehicle(&self, vehicle_id: &str) -> Result<Option<LeaderboardRecord>> {
        let record = sqlx::query_as::<_, LeaderboardRecord>(
            r"
            SELECT vehicle_id, rank, total_trips, total_violations, compliance_rate,
                   average_compliance_score, total_tokens_earned, last_updated
            FROM leaderboard
            WHERE vehicle_id = $1
            ",
        )
        .bind(vehicle_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Lists the top entries by rank, joined with vehicle identity.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn list_ranked(&self, limit: i64) -> Result<Vec<RankedVehicleRow>> {
        let rows = sqlx::query_as::<_, RankedVehicleRow>(
            r"
            SELECT l.rank, l.vehicle_id, v.vehicle_type, v.owner_name,
                   l.total_trips, l.total_violations, l.compliance_rate,
                   l.average_compliance_score, l.total_tokens_earned, l.last_updated
            FROM leaderboard l
            JOIN vehicles v ON v.vehicle_id = l.vehicle_id
            ORDER BY l.rank ASC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
