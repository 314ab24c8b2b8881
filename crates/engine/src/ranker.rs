//! Leaderboard ranking.
//!
//! Ranking is a full recompute over every qualifying vehicle: stats are
//! rebuilt from the source tables, entries upserted, then dense ranks
//! assigned over one global sort. The pass is idempotent and serialized so
//! two concurrent invocations cannot interleave rank writes.

use std::cmp::Ordering;

use anyhow::Result;
use chrono::Utc;
use drivewise_core::{VehicleAggregate, ViolationType, MIN_LEADERBOARD_TRIPS};
use drivewise_data::{LeaderboardRecord, Repositories};
use tokio::sync::Mutex;

/// The composite leaderboard order: most trips first, then fewest
/// violations, then highest compliance rate, then vehicle id ascending as
/// the deterministic final tiebreak.
#[must_use]
pub fn ranking_order(a: &LeaderboardRecord, b: &LeaderboardRecord) -> Ordering {
    b.total_trips
        .cmp(&a.total_trips)
        .then_with(|| a.total_violations.cmp(&b.total_violations))
        .then_with(|| b.compliance_rate.cmp(&a.compliance_rate))
        .then_with(|| a.vehicle_id.cmp(&b.vehicle_id))
}

/// Sorts entries into leaderboard order and assigns dense ranks 1..N.
pub fn assign_ranks(entries: &mut [LeaderboardRecord]) {
    entries.sort_by(ranking_order);
    for (index, entry) in entries.iter_mut().enumerate() {
        entry.rank = i32::try_from(index + 1).unwrap_or(i32::MAX);
    }
}

/// Batch recompute of the leaderboard.
pub struct LeaderboardRanker {
    repos: Repositories,
    pass_lock: Mutex<()>,
}

impl LeaderboardRanker {
    /// Creates a new ranker over the given repositories.
    #[must_use]
    pub fn new(repos: Repositories) -> Self {
        Self {
            repos,
            pass_lock: Mutex::new(()),
        }
    }

    /// Recomputes stats and ranks for every qualifying vehicle and returns
    /// the number of ranked entries. Safe to call repeatedly; a pass with
    /// no intervening writes produces identical ranks.
    ///
    /// # Errors
    /// Returns an error if any database operation fails.
    pub async fn update_all_rankings(&self) -> Result<usize> {
        let _guard = self.pass_lock.lock().await;

        let vehicles = self
            .repos
            .vehicles
            .list_qualifying(MIN_LEADERBOARD_TRIPS)
            .await?;

        for vehicle in &vehicles {
            let history = self
                .repos
                .compliance
                .query_by_vehicle(&vehicle.vehicle_id)
                .await?;
            let aggregate = VehicleAggregate::from_history(history.iter().map(|record| {
                (
                    record
                        .parsed_violation_type()
                        .unwrap_or(ViolationType::NoViolation),
                    record.compliance_score,
                )
            }));
            let tokens_earned = self
                .repos
                .tokens
                .get(&vehicle.vehicle_id)
                .await?
                .map_or(0, |ledger| ledger.tokens_earned);

            let entry = LeaderboardRecord::from_aggregate(
                vehicle.vehicle_id.clone(),
                &aggregate,
                tokens_earned,
                Utc::now(),
            );
            self.repos.leaderboard.upsert_stats(&entry).await?;
        }

        let mut entries = self.repos.leaderboard.list_all().await?;
        assign_ranks(&mut entries);
        for entry in &entries {
            self.repos
                .leaderboard
                .set_rank(&entry.vehicle_id, entry.rank)
                .await?;
        }

        tracing::debug!(ranked = entries.len(), "leaderboard rankings updated");
        Ok(entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn entry(
        vehicle_id: &str,
        trips: i64,
        violations: i64,
        rate: Decimal,
    ) -> LeaderboardRecord {
        LeaderboardRecord {
            vehicle_id: vehicle_id.to_string(),
            rank: 0,
            total_trips: trips,
            total_violations: violations,
            compliance_rate: rate,
            average_compliance_score: dec!(90.00),
            total_tokens_earned: 0,
            last_updated: Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap(),
        }
    }

    fn ranked_ids(entries: &[LeaderboardRecord]) -> Vec<(&str, i32)> {
        entries
            .iter()
            .map(|e| (e.vehicle_id.as_str(), e.rank))
            .collect()
    }

    // =========================================================================
    // Ordering Tests
    // =========================================================================

    #[test]
    fn test_more_trips_outranks_better_rate() {
        let mut entries = vec![
            entry("clean", 3, 0, dec!(100.00)),
            entry("busy", 10, 4, dec!(60.00)),
        ];
        assign_ranks(&mut entries);
        assert_eq!(ranked_ids(&entries), vec![("busy", 1), ("clean", 2)]);
    }

    #[test]
    fn test_equal_trips_fewer_violations_first() {
        let mut entries = vec![
            entry("worse", 5, 3, dec!(40.00)),
            entry("better", 5, 1, dec!(80.00)),
        ];
        assign_ranks(&mut entries);
        assert_eq!(ranked_ids(&entries), vec![("better", 1), ("worse", 2)]);
    }

    #[test]
    fn test_equal_trips_and_violations_higher_rate_first() {
        let a = entry("a", 5, 2, dec!(60.00));
        let b = entry("b", 5, 2, dec!(80.00));
        assert_eq!(ranking_order(&b, &a), std::cmp::Ordering::Less);
        assert_eq!(ranking_order(&a, &b), std::cmp::Ordering::Greater);

        let mut entries = vec![a, b];
        assign_ranks(&mut entries);
        assert_eq!(ranked_ids(&entries), vec![("b", 1), ("a", 2)]);
    }

    #[test]
    fn test_full_tie_breaks_by_vehicle_id() {
        let mut entries = vec![
            entry("veh-b", 4, 1, dec!(75.00)),
            entry("veh-a", 4, 1, dec!(75.00)),
        ];
        assign_ranks(&mut entries);
        assert_eq!(ranked_ids(&entries), vec![("veh-a", 1), ("veh-b", 2)]);
    }

    // =========================================================================
    // Rank Assignment Tests
    // =========================================================================

    #[test]
    fn test_ranks_are_dense_from_one() {
        let mut entries = vec![
            entry("a", 9, 0, dec!(100.00)),
            entry("b", 7, 2, dec!(71.43)),
            entry("c", 7, 1, dec!(85.71)),
            entry("d", 3, 3, dec!(0.00)),
        ];
        assign_ranks(&mut entries);
        let ranks: Vec<i32> = entries.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
        assert_eq!(entries[1].vehicle_id, "c");
        assert_eq!(entries[2].vehicle_id, "b");
    }

    #[test]
    fn test_ranking_is_idempotent() {
        let mut first = vec![
            entry("a", 5, 1, dec!(80.00)),
            entry("b", 5, 1, dec!(80.00)),
            entry("c", 8, 0, dec!(100.00)),
        ];
        assign_ranks(&mut first);

        // Feed the already-ranked output back in shuffled order.
        let mut second = vec![first[2].clone(), first[0].clone(), first[1].clone()];
        assign_ranks(&mut second);

        assert_eq!(ranked_ids(&first), ranked_ids(&second));
    }

    #[test]
    fn test_empty_leaderboard_ranks_nothing() {
        let mut entries: Vec<LeaderboardRecord> = Vec::new();
        assign_ranks(&mut entries);
        assert!(entries.is_empty());
    }
}
