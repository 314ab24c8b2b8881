//! Leaderboard entry model.

use chrono::{DateTime, Utc};
use drivewise_core::VehicleAggregate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Cached ranking snapshot for one qualifying vehicle.
///
/// A materialized view over the vehicle's records and ledger, owned entirely
/// by the ranker. A rank of 0 only exists transiently between the stats
/// upsert and the rank assignment of the same ranking pass.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LeaderboardRecord {
    pub vehicle_id: String,
    pub rank: i32,
    pub total_trips: i64,
    pub total_violations: i64,
    pub compliance_rate: Decimal,
    pub average_compliance_score: Decimal,
    pub total_tokens_earned: i64,
    pub last_updated: DateTime<Utc>,
}

impl LeaderboardRecord {
    /// Builds an unranked entry from a freshly computed aggregate.
    #[must_use]
    pub fn from_aggregate(
        vehicle_id: String,
        aggregate: &VehicleAggregate,
        total_tokens_earned: i64,
        last_updated: DateTime<Utc>,
    ) -> Self {
        Self {
            vehicle_id,
            rank: 0,
            total_trips: aggregate.total_trips,
            total_violations: aggregate.total_violations,
            compliance_rate: aggregate.compliance_rate,
            average_compliance_score: aggregate.average_compliance_score,
            total_tokens_earned,
            last_updated,
        }
    }
}
