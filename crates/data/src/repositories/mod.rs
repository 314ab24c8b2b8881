//! Database repositories for the compliance engine.
//!
//! Each repository provides typed access to a specific table. Operations
//! that belong to one logical unit of work take a transaction handle so the
//! engine can commit or roll back the whole unit.

pub mod compliance_repo;
pub mod leaderboard_repo;
pub mod reward_token_repo;
pub mod traffic_sign_repo;
pub mod vehicle_repo;

pub use compliance_repo::ComplianceRepository;
pub use leaderboard_repo::{LeaderboardRepository, RankedVehicleRow};
pub use reward_token_repo::RewardTokenRepository;
pub use traffic_sign_repo::TrafficSignRepository;
pub use vehicle_repo::VehicleRepository;

use sqlx::PgPool;

/// Creates all repositories from a single database pool.
#[derive(Debug, Clone)]
pub struct Repositories {
    pool: PgPool,
    pub vehicles: VehicleRepository,
    pub traffic_signs: TrafficSignRepository,
    pub compliance: ComplianceRepository,
    pub tokens: RewardTokenRepository,
    pub leaderboard: LeaderboardRepository,
}

impl Repositories {
    /// Creates a new set of repositories from a database pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            vehicles: VehicleRepository::new(pool.clone()),
            traffic_signs: TrafficSignRepository::new(pool.clone()),
            compliance: ComplianceRepository::new(pool.clone()),
            tokens: RewardTokenRepository::new(pool.clone()),
            leaderboard: LeaderboardRepository::new(pool.clone()),
            pool,
        }
    }

    /// The shared pool, for multi-repository transactions.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
