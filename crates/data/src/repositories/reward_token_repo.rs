//! Reward-token ledger repository.
//!
//! The spend path is a single conditional UPDATE so two concurrent spends
//! can never both pass a stale balance check.

use anyhow::Result;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::RewardTokenRecord;

/// Repository for the per-vehicle token ledger.
#[derive(Debug, Clone)]
pub struct RewardTokenRepository {
    pool: PgPool,
}

impl RewardTokenRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Adds an award to the ledger inside the caller's transaction,
    /// creating the ledger with `tokens_earned = delta` when absent.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn award_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        vehicle_id: &str,
        delta: i64,
    ) -> Result<RewardTokenRecord> {
        let record = sqlx::query_as::<_, RewardTokenRecord>(
            r"
            INSERT INTO reward_tokens (vehicle_id, tokens_earned, tokens_spent, last_updated)
            VALUES ($1, $2, 0, now())
            ON CONFLICT (vehicle_id) DO UPDATE
                SET tokens_earned = reward_tokens.tokens_earned + EXCLUDED.tokens_earned,
                    last_updated = now()
            RETURNING vehicle_id, tokens_earned, tokens_spent, last_updated
            ",
        )
        .bind(vehicle_id)
        .bind(delta)
        .fetch_one(&mut **tx)
        .await?;

        Ok(record)
    }

    /// Gets a vehicle's ledger.
    ///
    /// # Errors
    /// Returns an error if the database query fails.
    pub async fn get(&self, vehicle_id: &str) -> Result<Option<RewardTokenRecord>> {
        let record = sqlx::query_as::<_, RewardTokenRecord>(
            r"
            SELECT vehicle_id, tokens_earned, tokens_spent, last_updated
            FROM reward_tokens
            WHERE vehicle_id = $1
            ",
        )
        .bind(vehicle_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Gets a vehicle's ledger, creating an empty one when absent.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn get_or_create(&self, vehicle_id: &str) -> Result<RewardTokenRecord> {
        let record = sqlx::query_as::<_, RewardTokenRecord>(
            r"
            INSERT INTO reward_tokens (vehicle_id, tokens_earned, tokens_spent, last_updated)
            VALUES ($1, 0, 0, now())
            ON CONFLICT (vehicle_id) DO UPDATE SET vehicle_id = EXCLUDED.vehicle_id
            RETURNING vehicle_id, tokens_earned, tokens_spent, last_updated
            ",
        )
        .bind(vehicle_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    /// Attempts to spend `amount` tokens. The balance check and the update
    /// are one atomic statement; `None` means the balance was insufficient
    /// and nothing changed.
    ///
    /// # Errors
    /// Returns an error if the database operation fails.
    pub async fn try_spend(
        &self,
        vehicle_id: &str,
        amount: i64,
    ) -> Result<Option<RewardTokenRecord>> {
        let record = sqlx::query_as::<_, RewardTokenRecord>(
            r"
            UPDATE reward_tokens
            SET tokens_spent = tokens_spent + $2,
                last_updated = now()
            WHERE vehicle_id = $1
              AND tokens_earned - tokens_spent >= $2
            RETURNING vehicle_id, tokens_earned, tokens_spent, last_updated
            ",
        )
        .bind(vehicle_id)
        .bind(amount)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }
}
