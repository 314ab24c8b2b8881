//! Compliance record model.
//!
//! A record's score and classification are always derived from its observed
//! values. The constructor scores the observation itself and [`rescore`]
//! re-derives everything from the stored fields, so a record is never
//! persisted with a caller-supplied score.
//!
//! [`rescore`]: ComplianceRecord::rescore

use chrono::{DateTime, Utc};
use drivewise_core::{ComplianceOutcome, Severity, SignObservation, ViolationType};
use serde::{Deserialize, Serialize};

/// Compliance data for one traffic-sign encounter.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ComplianceRecord {
    /// Auto-generated row ID.
    pub id: i32,
    pub vehicle_id: String,
    pub traffic_sign_id: i32,
    /// Optional driving-session grouping.
    pub session_id: Option<String>,
    // Observed values per axis.
    pub speed_limit: Option<i32>,
    pub actual_speed: Option<i32>,
    pub no_horn_zone: bool,
    pub horn_applied: bool,
    pub seatbelt_required: bool,
    pub seatbelt_worn: bool,
    // Derived classification.
    pub violation_type: String,
    pub severity: String,
    pub violation_description: Option<String>,
    /// Derived score in [0, 100].
    pub compliance_score: i32,
    pub recorded_at: DateTime<Utc>,
}

impl ComplianceRecord {
    /// Creates a scored record from an observation (pre-insert).
    #[must_use]
    pub fn from_observation(
        vehicle_id: String,
        traffic_sign_id: i32,
        session_id: Option<String>,
        observation: &SignObservation,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        let outcome = observation.evaluate();
        Self {
            id: 0, // Will be set by database
            vehicle_id,
            traffic_sign_id,
            session_id,
            speed_limit: observation.speed_limit,
            actual_speed: observation.actual_speed,
            no_horn_zone: observation.no_horn_zone,
            horn_applied: observation.horn_applied,
            seatbelt_required: observation.seatbelt_required,
            seatbelt_worn: observation.seatbelt_worn,
            violation_type: outcome.violation_type.as_str().to_string(),
            severity: outcome.severity.as_str().to_string(),
            violation_description: outcome.description,
            compliance_score: outcome.compliance_score,
            recorded_at,
        }
    }

    /// Rebuilds the observation from the stored per-axis values.
    #[must_use]
    pub fn observation(&self) -> SignObservation {
        SignObservation {
            speed_limit: self.speed_limit,
            actual_speed: self.actual_speed,
            no_horn_zone: self.no_horn_zone,
            horn_applied: self.horn_applied,
            seatbelt_required: self.seatbelt_required,
            seatbelt_worn: self.seatbelt_worn,
        }
    }

    /// Re-derives score and classification from the observed values,
    /// overwriting whatever the fields currently hold. Run immediately
    /// before every persistence.
    pub fn rescore(&mut self) -> ComplianceOutcome {
        let outcome = self.observation().evaluate();
        self.compliance_score = outcome.compliance_score;
        self.violation_type = outcome.violation_type.as_str().to_string();
        self.severity = outcome.severity.as_str().to_string();
        self.violation_description = outcome.description.clone();
        outcome
    }

    /// Returns the parsed violation classification.
    #[must_use]
    pub fn parsed_violation_type(&self) -> Option<ViolationType> {
        ViolationType::parse(&self.violation_type)
    }

    /// Returns the parsed severity.
    #[must_use]
    pub fn parsed_severity(&self) -> Option<Severity> {
        Severity::parse(&self.severity)
    }

    /// True when any rule was broken in this record.
    #[must_use]
    pub fn is_violation(&self) -> bool {
        self.parsed_violation_type()
            .is_some_and(|v| v.is_violation())
    }
}
