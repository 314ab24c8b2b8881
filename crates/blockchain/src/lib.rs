//! Blockchain sync implementations.
//!
//! The engine treats on-chain sync as a best-effort side channel behind the
//! [`BlockchainSync`] trait. Two implementations ship here: a disconnected
//! no-op used by default, and a logging stub that stands in for a real
//! chain client when sync is enabled in configuration. Neither performs any
//! on-chain work.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use drivewise_core::{BlockchainConfig, BlockchainSync, Severity, VehicleType, ViolationType};

/// All-zero placeholder addresses count as unconfigured.
fn is_placeholder(address: &str) -> bool {
    address.is_empty() || address.trim_start_matches("0x").chars().all(|c| c == '0')
}

/// Builds the sync capability for the given configuration.
#[must_use]
pub fn from_config(config: &BlockchainConfig) -> Arc<dyn BlockchainSync> {
    if config.enabled && !is_placeholder(&config.contract_address) {
        Arc::new(LoggingBlockchainSync::new(
            config.network_url.clone(),
            config.contract_address.clone(),
        ))
    } else {
        Arc::new(NoopBlockchainSync)
    }
}

/// Disconnected default: every call succeeds without doing anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopBlockchainSync;

#[async_trait]
impl BlockchainSync for NoopBlockchainSync {
    fn is_connected(&self) -> bool {
        false
    }

    async fn sync_vehicle(
        &self,
        vehicle_id: &str,
        _vehicle_type: VehicleType,
        _owner_name: &str,
    ) -> Result<()> {
        tracing::debug!(vehicle_id, "blockchain disabled, skipping vehicle sync");
        Ok(())
    }

    async fn sync_record(
        &self,
        vehicle_id: &str,
        _violation_type: ViolationType,
        _severity: Severity,
        _compliance_score: i32,
    ) -> Result<()> {
        tracing::debug!(vehicle_id, "blockchain disabled, skipping record sync");
        Ok(())
    }

    async fn update_leaderboard(&self) -> Result<()> {
        tracing::debug!("blockchain disabled, skipping leaderboard update");
        Ok(())
    }

    async fn claim_reward(&self, vehicle_id: &str, _reward_type: &str, _amount: i64) -> Result<()> {
        tracing::debug!(vehicle_id, "blockchain disabled, skipping reward claim");
        Ok(())
    }
}

/// Connected stub: records every call in the log where a real client would
/// submit a transaction.
#[derive(Debug, Clone)]
pub struct LoggingBlockchainSync {
    network_url: String,
    contract_address: String,
}

impl LoggingBlockchainSync {
    #[must_use]
    pub fn new(network_url: String, contract_address: String) -> Self {
        Self {
            network_url,
            contract_address,
        }
    }
}

#[async_trait]
impl BlockchainSync for LoggingBlockchainSync {
    fn is_connected(&self) -> bool {
        true
    }

    async fn sync_vehicle(
        &self,
        vehicle_id: &str,
        vehicle_type: VehicleType,
        owner_name: &str,
    ) -> Result<()> {
        tracing::info!(
            vehicle_id,
            vehicle_type = vehicle_type.as_str(),
            owner_name,
            contract = %self.contract_address,
            network = %self.network_url,
            "syncing vehicle registration"
        );
        Ok(())
    }

    async fn sync_record(
        &self,
        vehicle_id: &str,
        violation_type: ViolationType,
        severity: Severity,
        compliance_score: i32,
    ) -> Result<()> {
        tracing::info!(
            vehicle_id,
            violation_type = violation_type.as_str(),
            severity = severity.as_str(),
            compliance_score,
            contract = %self.contract_address,
            "syncing compliance record"
        );
        Ok(())
    }

    async fn update_leaderboard(&self) -> Result<()> {
        tracing::info!(contract = %self.contract_address, "updating on-chain leaderboard");
        Ok(())
    }

    async fn claim_reward(&self, vehicle_id: &str, reward_type: &str, amount: i64) -> Result<()> {
        tracing::info!(
            vehicle_id,
            reward_type,
            amount,
            contract = %self.contract_address,
            "claiming reward"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> BlockchainConfig {
        BlockchainConfig {
            enabled: true,
            network_url: "http://localhost:8545".to_string(),
            contract_address: "0xabc123".to_string(),
        }
    }

    #[test]
    fn test_disabled_config_yields_disconnected_sync() {
        let mut config = configured();
        config.enabled = false;
        assert!(!from_config(&config).is_connected());
    }

    #[test]
    fn test_placeholder_address_yields_disconnected_sync() {
        let mut config = configured();
        config.contract_address = "0x0000000000000000000000000000000000000000".to_string();
        assert!(!from_config(&config).is_connected());

        config.contract_address = String::new();
        assert!(!from_config(&config).is_connected());
    }

    #[test]
    fn test_configured_address_yields_connected_sync() {
        assert!(from_config(&configured()).is_connected());
    }

    #[tokio::test]
    async fn test_noop_calls_always_succeed() {
        let sync = NoopBlockchainSync;
        assert!(sync
            .sync_vehicle("V1", VehicleType::FourWheeler, "Unknown")
            .await
            .is_ok());
        assert!(sync
            .sync_record("V1", ViolationType::NoViolation, Severity::Low, 100)
            .await
            .is_ok());
        assert!(sync.update_leaderboard().await.is_ok());
        assert!(sync.claim_reward("V1", "fuel", 5).await.is_ok());
    }
}
