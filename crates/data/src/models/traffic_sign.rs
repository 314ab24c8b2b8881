//! Detected traffic-sign model.

use chrono::{DateTime, Utc};
use drivewise_core::{SignType, SignValue};
use serde::{Deserialize, Serialize};

/// One real-world regulatory observation. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TrafficSignRecord {
    /// Auto-generated row ID.
    pub id: i32,
    pub sign_type: String,
    /// Storage form of the regulatory value, e.g. "40" or "yes".
    pub sign_value: Option<String>,
    pub detected_at: DateTime<Utc>,
    pub location: Option<String>,
    pub is_active: bool,
}

impl TrafficSignRecord {
    /// Creates a new sign record (pre-insert).
    #[must_use]
    pub fn new(
        sign_type: SignType,
        sign_value: Option<SignValue>,
        location: Option<String>,
        detected_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: 0, // Will be set by database
            sign_type: sign_type.as_str().to_string(),
            sign_value: sign_value.map(|v| v.as_storage_string()),
            detected_at,
            location,
            is_active: true,
        }
    }

    /// Returns the parsed sign type.
    #[must_use]
    pub fn parsed_type(&self) -> Option<SignType> {
        SignType::parse(&self.sign_type)
    }
}
