//! Reward-token ledger model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-vehicle earned/spent counters. Both counters only ever grow; the
/// spendable balance is their difference.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RewardTokenRecord {
    pub vehicle_id: String,
    pub tokens_earned: i64,
    pub tokens_spent: i64,
    pub last_updated: DateTime<Utc>,
}

impl RewardTokenRecord {
    /// An empty ledger for a vehicle that has not earned yet.
    #[must_use]
    pub fn empty(vehicle_id: String, last_updated: DateTime<Utc>) -> Self {
        Self {
            vehicle_id,
            tokens_earned: 0,
            tokens_spent: 0,
            last_updated,
        }
    }

    /// Spendable balance.
    #[must_use]
    pub fn tokens_available(&self) -> i64 {
        self.tokens_earned - self.tokens_spent
    }
}
