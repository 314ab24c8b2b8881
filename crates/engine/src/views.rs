//! Output payloads produced for the request-handling layer.

use chrono::{DateTime, Utc};
use drivewise_core::{ComplianceOutcome, VehicleType, MIN_LEADERBOARD_TRIPS};
use drivewise_data::{ComplianceRecord, RankedVehicleRow};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Result of processing one sensor event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceResult {
    pub status: String,
    pub message: String,
    pub violation_detected: bool,
    /// The primary violation, absent when the event was fully compliant.
    pub violation_type: Option<String>,
    pub severity: String,
    pub compliance_score: i32,
    pub violation_description: Option<String>,
    pub tokens_earned: i64,
    pub total_trips: i64,
    pub qualification_status: String,
    pub current_rank: Option<i32>,
}

impl ComplianceResult {
    /// Assembles the result from the scored outcome and post-commit state.
    #[must_use]
    pub fn from_outcome(
        outcome: &ComplianceOutcome,
        tokens_earned: i64,
        total_trips: i64,
        current_rank: Option<i32>,
    ) -> Self {
        let violation_detected = outcome.is_violation();
        Self {
            status: "success".to_string(),
            message: "Sensor data processed successfully".to_string(),
            violation_detected,
            violation_type: violation_detected
                .then(|| outcome.violation_type.as_str().to_string()),
            severity: outcome.severity.as_str().to_string(),
            compliance_score: outcome.compliance_score,
            violation_description: outcome.description.clone(),
            tokens_earned,
            total_trips,
            qualification_status: qualification_status(total_trips, current_rank),
            current_rank,
        }
    }
}

/// One row of the public leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntryView {
    pub rank: i32,
    pub vehicle_id: String,
    pub vehicle_type: String,
    pub owner_name: String,
    pub total_trips: i64,
    pub total_violations: i64,
    pub compliance_rate: Decimal,
    pub average_compliance_score: Decimal,
    pub total_tokens_earned: i64,
    pub last_updated: DateTime<Utc>,
}

impl From<RankedVehicleRow> for LeaderboardEntryView {
    fn from(row: RankedVehicleRow) -> Self {
        let vehicle_type = VehicleType::parse(&row.vehicle_type)
            .map_or_else(|| row.vehicle_type.clone(), |t| t.display_name().to_string());
        Self {
            rank: row.rank,
            vehicle_id: row.vehicle_id,
            vehicle_type,
            owner_name: row.owner_name.unwrap_or_else(|| "Unknown".to_string()),
            total_trips: row.total_trips,
            total_violations: row.total_violations,
            compliance_rate: row.compliance_rate,
            average_compliance_score: row.average_compliance_score,
            total_tokens_earned: row.total_tokens_earned,
            last_updated: row.last_updated,
        }
    }
}

/// The ranked leaderboard with its fixed criteria description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardView {
    pub leaderboard: Vec<LeaderboardEntryView>,
    pub total_qualified_vehicles: i64,
    pub minimum_entries_required: i64,
    pub ranking_criteria: Vec<String>,
    pub blockchain_connected: bool,
    pub last_updated: DateTime<Utc>,
}

/// The fixed ranking-criteria description shown with every leaderboard.
#[must_use]
pub fn ranking_criteria() -> Vec<String> {
    vec![
        "1. Maximum number of entries (highest first)".to_string(),
        "2. Minimum violations (lowest first)".to_string(),
        "3. Compliance rate (highest first)".to_string(),
    ]
}

/// A single vehicle's rank and cached stats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleRanking {
    pub vehicle_id: String,
    pub rank: i32,
    pub total_trips: i64,
    pub total_violations: i64,
    pub compliance_rate: Decimal,
    pub average_compliance_score: Decimal,
    pub total_tokens_earned: i64,
}

/// A vehicle's compliance history with aggregate stats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceHistory {
    pub vehicle_id: String,
    pub total_records: i64,
    pub compliance_rate: Decimal,
    pub total_violations: i64,
    pub records: Vec<ComplianceRecord>,
}

/// Per-vehicle dashboard statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    pub vehicle_id: String,
    pub total_trips: i64,
    pub total_violations: i64,
    pub compliance_rate: Decimal,
    pub average_compliance_score: Decimal,
    pub qualification_status: String,
    pub current_rank: Option<i32>,
    pub tokens_earned: i64,
    pub tokens_available: i64,
    pub recent_records: Vec<ComplianceRecord>,
}

/// Receipt for a successful token spend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendReceipt {
    pub status: String,
    pub message: String,
    pub tokens_available: i64,
}

/// Counts reported by a full blockchain sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSummary {
    pub vehicles_synced: usize,
    pub records_synced: usize,
}

/// Qualification status string for API payloads: ranked vehicles are
/// "Qualified", qualified-but-unranked vehicles are called out, and the
/// rest see how many entries they still need.
#[must_use]
pub fn qualification_status(total_trips: i64, current_rank: Option<i32>) -> String {
    if total_trips >= MIN_LEADERBOARD_TRIPS {
        if current_rank.is_some() {
            "Qualified".to_string()
        } else {
            "Qualified (Not Ranked)".to_string()
        }
    } else {
        let needed = MIN_LEADERBOARD_TRIPS - total_trips;
        format!("Needs {needed} more entries")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use drivewise_core::{Severity, ViolationType};
    use rust_decimal_macros::dec;

    fn sample_row() -> RankedVehicleRow {
        RankedVehicleRow {
            rank: 1,
            vehicle_id: "KA01AB1234".to_string(),
            vehicle_type: "four_wheeler".to_string(),
            owner_name: None,
            total_trips: 5,
            total_violations: 1,
            compliance_rate: dec!(80.00),
            average_compliance_score: dec!(88.00),
            total_tokens_earned: 22,
            last_updated: Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_entry_view_displays_type_and_defaults_owner() {
        let view = LeaderboardEntryView::from(sample_row());
        assert_eq!(view.vehicle_type, "Four Wheeler");
        assert_eq!(view.owner_name, "Unknown");
        assert_eq!(view.rank, 1);
    }

    #[test]
    fn test_qualification_status_strings() {
        assert_eq!(qualification_status(0, None), "Needs 3 more entries");
        assert_eq!(qualification_status(2, None), "Needs 1 more entries");
        assert_eq!(qualification_status(3, None), "Qualified (Not Ranked)");
        assert_eq!(qualification_status(3, Some(2)), "Qualified");
        assert_eq!(qualification_status(10, Some(1)), "Qualified");
    }

    #[test]
    fn test_compliance_result_from_violating_outcome() {
        let outcome = ComplianceOutcome {
            compliance_score: 70,
            violation_type: ViolationType::SpeedViolation,
            severity: Severity::High,
            description: Some("Speed limit of 40 km/h exceeded at 65 km/h".to_string()),
        };
        let result = ComplianceResult::from_outcome(&outcome, 5, 4, Some(3));
        assert!(result.violation_detected);
        assert_eq!(result.violation_type.as_deref(), Some("speed_violation"));
        assert_eq!(result.compliance_score, 70);
        assert_eq!(result.tokens_earned, 5);
        assert_eq!(result.qualification_status, "Qualified");
        assert_eq!(result.current_rank, Some(3));
    }

    #[test]
    fn test_compliance_result_omits_violation_type_when_clean() {
        let outcome = ComplianceOutcome {
            compliance_score: 100,
            violation_type: ViolationType::NoViolation,
            severity: Severity::Low,
            description: None,
        };
        let result = ComplianceResult::from_outcome(&outcome, 10, 1, None);
        assert!(!result.violation_detected);
        assert_eq!(result.violation_type, None);
        assert_eq!(result.qualification_status, "Needs 2 more entries");
    }

    #[test]
    fn test_ranking_criteria_is_fixed() {
        let criteria = ranking_criteria();
        assert_eq!(criteria.len(), 3);
        assert!(criteria[0].contains("Maximum number of entries"));
    }
}
