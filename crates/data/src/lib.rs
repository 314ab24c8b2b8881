pub mod database;
pub mod models;
pub mod repositories;

pub use database::{connect, ensure_schema};
pub use models::{
    ComplianceRecord, LeaderboardRecord, RewardTokenRecord, TrafficSignRecord, VehicleRecord,
};
pub use repositories::{
    ComplianceRepository, LeaderboardRepository, RankedVehicleRow, Repositories,
    RewardTokenRepository, TrafficSignRepository, VehicleRepository,
};
