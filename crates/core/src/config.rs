use serde::{Deserialize, Serialize};

use crate::tokens::{TokenPolicy, TokenTier};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub blockchain: BlockchainConfig,
    pub scoring: ScoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockchainConfig {
    pub enabled: bool,
    pub network_url: String,
    pub contract_address: String,
}

/// Scoring knobs: the active token award table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub token_tiers: Vec<TokenTier>,
}

impl ScoringConfig {
    /// Builds the award policy from the configured tiers.
    #[must_use]
    pub fn token_policy(&self) -> TokenPolicy {
        TokenPolicy::new(self.token_tiers.clone())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            blockchain: BlockchainConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/drivewise".to_string(),
            max_connections: 10,
        }
    }
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            network_url: "http://localhost:8545".to_string(),
            contract_address: String::new(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            token_tiers: TokenPolicy::standard().tiers().to_vec(),
        }
    }
}
