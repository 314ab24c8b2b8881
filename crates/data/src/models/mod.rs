//! Data models for the compliance engine.
//!
//! Enumerated domain fields are stored as their string forms and re-parsed
//! through the core enums. Rates use `rust_decimal::Decimal` so the stored
//! two-decimal values survive round trips exactly. Models derive
//! `sqlx::FromRow` for database compatibility.

pub mod compliance;
pub mod leaderboard;
pub mod reward_token;
pub mod traffic_sign;
pub mod vehicle;

pub use compliance::ComplianceRecord;
pub use leaderboard::LeaderboardRecord;
pub use reward_token::RewardTokenRecord;
pub use traffic_sign::TrafficSignRecord;
pub use vehicle::VehicleRecord;
