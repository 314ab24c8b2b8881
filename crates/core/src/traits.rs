//! Capability seams for external collaborators.

use crate::events::VehicleType;
use crate::scoring::{Severity, ViolationType};
use anyhow::Result;
use async_trait::async_trait;

/// Best-effort sync of compliance state to an external chain.
///
/// Every call is fire-and-forget from the engine's point of view: a failing
/// implementation must never abort a scoring or ranking operation. The
/// engine logs and continues.
#[async_trait]
pub trait BlockchainSync: Send + Sync {
    /// Whether the backing chain is reachable and configured.
    fn is_connected(&self) -> bool;

    async fn sync_vehicle(
        &self,
        vehicle_id: &str,
        vehicle_type: VehicleType,
        owner_name: &str,
    ) -> Result<()>;

    async fn sync_record(
        &self,
        vehicle_id: &str,
        violation_type: ViolationType,
        severity: Severity,
        compliance_score: i32,
    ) -> Result<()>;

    async fn update_leaderboard(&self) -> Result<()>;

    async fn claim_reward(&self, vehicle_id: &str, reward_type: &str, amount: i64) -> Result<()>;
}
