//! Per-vehicle statistics derived from compliance history.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::scoring::ViolationType;

/// Minimum compliance records before a vehicle is ranked.
pub const MIN_LEADERBOARD_TRIPS: i64 = 3;

/// Aggregate view over a vehicle's full compliance history.
///
/// Pure derivation: the same history always produces the same aggregate.
/// Stop-sign violations are tracked on records but excluded from
/// `total_violations`, so they lower the average score without lowering the
/// compliance rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleAggregate {
    pub total_trips: i64,
    pub total_violations: i64,
    /// Share of violation-free trips, in percent, rounded to 2 decimals.
    pub compliance_rate: Decimal,
    /// Mean compliance score, rounded to 2 decimals.
    pub average_compliance_score: Decimal,
}

impl VehicleAggregate {
    /// Derives the aggregate from `(violation_type, compliance_score)` pairs.
    #[must_use]
    pub fn from_history<I>(history: I) -> Self
    where
        I: IntoIterator<Item = (ViolationType, i32)>,
    {
        let mut total_trips: i64 = 0;
        let mut total_violations: i64 = 0;
        let mut score_sum: i64 = 0;

        for (violation, score) in history {
            total_trips += 1;
            score_sum += i64::from(score);
            if violation.counts_toward_total() {
                total_violations += 1;
            }
        }

        let compliance_rate = if total_trips == 0 {
            Decimal::ONE_HUNDRED
        } else {
            (Decimal::from(total_trips - total_violations) / Decimal::from(total_trips)
                * Decimal::ONE_HUNDRED)
                .round_dp(2)
        };

        let average_compliance_score = if total_trips == 0 {
            Decimal::ONE_HUNDRED
        } else {
            (Decimal::from(score_sum) / Decimal::from(total_trips)).round_dp(2)
        };

        Self {
            total_trips,
            total_violations,
            compliance_rate,
            average_compliance_score,
        }
    }

    /// An empty history: perfect rate and score, zero trips.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_history(std::iter::empty())
    }

    /// Whether the vehicle has enough records to be ranked.
    #[must_use]
    pub fn qualifies_for_leaderboard(&self) -> bool {
        self.total_trips >= MIN_LEADERBOARD_TRIPS
    }

    /// Records still needed before the vehicle qualifies.
    #[must_use]
    pub fn entries_needed(&self) -> i64 {
        (MIN_LEADERBOARD_TRIPS - self.total_trips).max(0)
    }

    /// Human-readable qualification status for API payloads.
    #[must_use]
    pub fn qualification_status(&self) -> String {
        if self.qualifies_for_leaderboard() {
            "Qualified".to_string()
        } else {
            format!("Needs {} more entries", self.entries_needed())
        }
    }
}
