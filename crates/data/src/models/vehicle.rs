//! Vehicle identity model.

use chrono::{DateTime, Utc};
use drivewise_core::VehicleType;
use serde::{Deserialize, Serialize};

/// A registered vehicle. `vehicle_id` is the external identity and is
/// globally unique.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct VehicleRecord {
    /// Auto-generated row ID.
    pub id: i32,
    pub vehicle_id: String,
    /// Vehicle category: "two_wheeler", "four_wheeler", "commercial".
    pub vehicle_type: String,
    pub registration_number: Option<String>,
    pub owner_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl VehicleRecord {
    /// Creates a new vehicle record (pre-insert).
    #[must_use]
    pub fn new(
        vehicle_id: String,
        vehicle_type: VehicleType,
        owner_name: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: 0, // Will be set by database
            vehicle_id,
            vehicle_type: vehicle_type.as_str().to_string(),
            registration_number: None,
            owner_name,
            created_at,
        }
    }

    /// Returns the parsed vehicle type. Rows written by this crate always
    /// parse; unknown strings fall back to `None`.
    #[must_use]
    pub fn parsed_type(&self) -> Option<VehicleType> {
        VehicleType::parse(&self.vehicle_type)
    }

    /// Owner name for display, defaulting to "Unknown".
    #[must_use]
    pub fn owner_display(&self) -> &str {
        self.owner_name.as_deref().unwrap_or("Unknown")
    }

    /// Whether seatbelt rules apply to this vehicle.
    #[must_use]
    pub fn seatbelt_required(&self) -> bool {
        self.parsed_type()
            .is_some_and(|t| t.seatbelt_required())
    }
}
