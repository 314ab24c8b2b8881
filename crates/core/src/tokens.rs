//! Reward-token award policy.
//!
//! The score-to-token mapping is a tier table checked from the highest
//! threshold down, so the active table can be swapped through configuration
//! instead of editing a branch.

use serde::{Deserialize, Serialize};

/// One row of the award table: scores at or above `min_score` earn `tokens`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenTier {
    pub min_score: i32,
    pub tokens: i64,
}

/// Ordered score-to-token table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPolicy {
    tiers: Vec<TokenTier>,
}

impl TokenPolicy {
    /// Creates a policy from an arbitrary tier list. Tiers are re-sorted by
    /// threshold descending so lookup order never depends on input order.
    #[must_use]
    pub fn new(mut tiers: Vec<TokenTier>) -> Self {
        tiers.sort_by(|a, b| b.min_score.cmp(&a.min_score));
        Self { tiers }
    }

    /// The standard table: 90+ earns 10, 70+ earns 5, 50+ earns 2.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(vec![
            TokenTier { min_score: 90, tokens: 10 },
            TokenTier { min_score: 70, tokens: 5 },
            TokenTier { min_score: 50, tokens: 2 },
        ])
    }

    /// The conservative table: 90+ earns 5, 80+ earns 3, 70+ earns 1.
    #[must_use]
    pub fn conservative() -> Self {
        Self::new(vec![
            TokenTier { min_score: 90, tokens: 5 },
            TokenTier { min_score: 80, tokens: 3 },
            TokenTier { min_score: 70, tokens: 1 },
        ])
    }

    /// Tokens earned for a compliance score.
    #[must_use]
    pub fn award(&self, score: i32) -> i64 {
        self.tiers
            .iter()
            .find(|tier| score >= tier.min_score)
            .map_or(0, |tier| tier.tokens)
    }

    /// The tiers, highest threshold first.
    #[must_use]
    pub fn tiers(&self) -> &[TokenTier] {
        &self.tiers
    }
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self::standard()
    }
}
