//! Typed errors surfaced by engine operations.

use thiserror::Error;

/// Error kinds a caller can act on.
///
/// Validation and balance errors are local and non-retryable; storage errors
/// wrap whatever the persistence layer reported for the whole unit of work.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid sensor data: {0}")]
    Validation(String),

    #[error("insufficient tokens: requested {requested}, {available} available")]
    InsufficientBalance { available: i64, requested: i64 },

    #[error("{0} not found")]
    NotFound(String),

    #[error("vehicle does not meet minimum requirements: {total_trips} trips, {needed} more needed")]
    NotQualified { total_trips: i64, needed: i64 },

    #[error("blockchain not connected")]
    BlockchainUnavailable,

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<anyhow::Error> for EngineError {
    fn from(err: anyhow::Error) -> Self {
        Self::Storage(format!("{err:#}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages_carry_correction_detail() {
        let err = EngineError::InsufficientBalance {
            available: 3,
            requested: 10,
        };
        assert_eq!(
            err.to_string(),
            "insufficient tokens: requested 10, 3 available"
        );

        let err = EngineError::NotQualified {
            total_trips: 1,
            needed: 2,
        };
        assert!(err.to_string().contains("2 more needed"));
    }

    #[test]
    fn test_anyhow_conversion_preserves_chain() {
        let inner = anyhow::anyhow!("connection refused").context("inserting record");
        let err = EngineError::from(inner);
        let msg = err.to_string();
        assert!(msg.contains("inserting record"));
        assert!(msg.contains("connection refused"));
    }
}
