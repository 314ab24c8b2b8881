pub mod processor;
pub mod ranker;
pub mod views;

pub use processor::ComplianceEngine;
pub use ranker::{assign_ranks, ranking_order, LeaderboardRanker};
pub use views::{
    qualification_status, ranking_criteria, ComplianceHistory, ComplianceResult, DashboardStats,
    LeaderboardEntryView, LeaderboardView, SpendReceipt, SyncSummary, VehicleRanking,
};
