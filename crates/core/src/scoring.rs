//! Compliance scoring rules.
//!
//! Scoring is deterministic: every observation starts at 100 and loses a
//! fixed penalty per broken rule, floored at zero. The primary violation is
//! classified in penalty-magnitude order (speed, then horn, then seatbelt).

use serde::{Deserialize, Serialize};

use crate::events::{SensorEvent, SignType, SignValue, VehicleType};

/// Perfect score for a fully compliant observation.
pub const MAX_SCORE: i32 = 100;

/// Penalty for exceeding a posted speed limit.
pub const SPEED_PENALTY: i32 = 20;
/// Additional penalty once the excess goes beyond [`EXCESSIVE_SPEED_MARGIN`].
pub const EXCESSIVE_SPEED_PENALTY: i32 = 10;
/// Excess over the limit, in km/h, at which speeding becomes excessive.
pub const EXCESSIVE_SPEED_MARGIN: i32 = 20;
/// Penalty for sounding the horn inside a no-horn zone.
pub const HORN_PENALTY: i32 = 15;
/// Penalty for an unbelted occupant in a vehicle that requires one.
pub const SEATBELT_PENALTY: i32 = 25;

/// Classification of the rule broken in a given observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationType {
    SpeedViolation,
    HornViolation,
    SeatbeltViolation,
    /// Tracked on historical records; the scorer itself never emits it.
    StopViolation,
    NoViolation,
}

impl ViolationType {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SpeedViolation => "speed_violation",
            Self::HornViolation => "horn_violation",
            Self::SeatbeltViolation => "seatbelt_violation",
            Self::StopViolation => "stop_violation",
            Self::NoViolation => "no_violation",
        }
    }

    /// Parses from string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "speed_violation" => Some(Self::SpeedViolation),
            "horn_violation" => Some(Self::HornViolation),
            "seatbelt_violation" => Some(Self::SeatbeltViolation),
            "stop_violation" => Some(Self::StopViolation),
            "no_violation" => Some(Self::NoViolation),
            _ => None,
        }
    }

    /// True for every classification other than [`Self::NoViolation`].
    #[must_use]
    pub fn is_violation(&self) -> bool {
        !matches!(self, Self::NoViolation)
    }

    /// Whether this classification counts toward a vehicle's violation
    /// total. Stop-sign violations are tracked but excluded from the count.
    #[must_use]
    pub fn counts_toward_total(&self) -> bool {
        matches!(
            self,
            Self::SpeedViolation | Self::HornViolation | Self::SeatbeltViolation
        )
    }
}

/// Severity of the primary violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Parses from string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

/// The observed driving values relevant to one sign encounter.
///
/// An axis only participates in scoring when its inputs are present: a
/// missing or zero speed limit disables the speed axis, and the seatbelt
/// axis requires both applicability (vehicle type) and an observed flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignObservation {
    pub speed_limit: Option<i32>,
    pub actual_speed: Option<i32>,
    pub no_horn_zone: bool,
    pub horn_applied: bool,
    pub seatbelt_required: bool,
    pub seatbelt_worn: bool,
}

impl SignObservation {
    /// Builds the observation for a validated sensor event.
    ///
    /// The seatbelt axis engages when the vehicle type requires a belt and
    /// the event actually observed one (seatbelt signs, or any event with an
    /// explicit `seatbelt_worn` flag). The horn axis engages on no-horn
    /// signs whose zone flag is in force.
    #[must_use]
    pub fn from_event(
        event: &SensorEvent,
        sign_value: Option<SignValue>,
        vehicle_type: VehicleType,
    ) -> Self {
        let mut obs = Self::default();

        match event.sign_type {
            SignType::SpeedLimit => {
                if let Some(SignValue::Limit(limit)) = sign_value {
                    obs.speed_limit = Some(limit);
                }
                obs.actual_speed = event.drive_value.and_then(|v| i32::try_from(v).ok());
            }
            SignType::NoHorn => {
                obs.no_horn_zone = matches!(sign_value, Some(SignValue::Flag(true)));
                obs.horn_applied = event.horn_observed();
            }
            _ => {}
        }

        if let Some(worn) = event.seatbelt_observed() {
            obs.seatbelt_required = vehicle_type.seatbelt_required();
            obs.seatbelt_worn = worn;
        }

        obs
    }

    fn speed_excess(&self) -> Option<i32> {
        match (self.speed_limit, self.actual_speed) {
            (Some(limit), Some(actual)) if limit > 0 && actual > 0 && actual > limit => {
                Some(actual - limit)
            }
            _ => None,
        }
    }

    fn horn_violated(&self) -> bool {
        self.no_horn_zone && self.horn_applied
    }

    fn seatbelt_violated(&self) -> bool {
        self.seatbelt_required && !self.seatbelt_worn
    }

    /// Scores the observation and classifies the primary violation.
    #[must_use]
    pub fn evaluate(&self) -> ComplianceOutcome {
        let mut score = MAX_SCORE;
        let mut parts: Vec<String> = Vec::new();

        let mut violation_type = ViolationType::NoViolation;
        let mut severity = Severity::Low;

        if let Some(excess) = self.speed_excess() {
            score -= SPEED_PENALTY;
            let excessive = excess > EXCESSIVE_SPEED_MARGIN;
            if excessive {
                score -= EXCESSIVE_SPEED_PENALTY;
            }
            violation_type = ViolationType::SpeedViolation;
            severity = if excessive {
                Severity::High
            } else {
                Severity::Medium
            };
            parts.push(format!(
                "Speed limit of {} km/h exceeded at {} km/h",
                self.speed_limit.unwrap_or(0),
                self.actual_speed.unwrap_or(0),
            ));
        }

        if self.horn_violated() {
            score -= HORN_PENALTY;
            if violation_type == ViolationType::NoViolation {
                violation_type = ViolationType::HornViolation;
                severity = Severity::Low;
            }
            parts.push("Horn used inside a no-horn zone".to_string());
        }

        if self.seatbelt_violated() {
            score -= SEATBELT_PENALTY;
            if violation_type == ViolationType::NoViolation {
                violation_type = ViolationType::SeatbeltViolation;
                severity = Severity::High;
            }
            parts.push("Seatbelt not worn".to_string());
        }

        ComplianceOutcome {
            compliance_score: score.max(0),
            violation_type,
            severity,
            description: if parts.is_empty() {
                None
            } else {
                Some(parts.join("; "))
            },
        }
    }
}

/// Result of scoring one observation, ready to be written to a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceOutcome {
    pub compliance_score: i32,
    pub violation_type: ViolationType,
    pub severity: Severity,
    pub description: Option<String>,
}

impl ComplianceOutcome {
    /// True when any rule was broken.
    #[must_use]
    pub fn is_violation(&self) -> bool {
        self.violation_type.is_violation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn speed_obs(limit: i32, actual: i32) -> SignObservation {
        SignObservation {
            speed_limit: Some(limit),
            actual_speed: Some(actual),
            ..SignObservation::default()
        }
    }

    // =========================================================================
    // Speed Axis Tests
    // =========================================================================

    #[test]
    fn test_compliant_speed_scores_perfect() {
        let outcome = speed_obs(40, 40).evaluate();
        assert_eq!(outcome.compliance_score, 100);
        assert_eq!(outcome.violation_type, ViolationType::NoViolation);
        assert!(outcome.description.is_none());
    }

    #[test]
    fn test_moderate_speeding_scores_eighty() {
        // Any excess in (0, 20] costs exactly 20 points.
        for actual in [41, 50, 60] {
            let outcome = speed_obs(40, actual).evaluate();
            assert_eq!(outcome.compliance_score, 80, "actual={actual}");
            assert_eq!(outcome.violation_type, ViolationType::SpeedViolation);
            assert_eq!(outcome.severity, Severity::Medium);
        }
    }

    #[test]
    fn test_excessive_speeding_scores_seventy() {
        // speed_limit=40, actual=65: 20 + 10 off.
        let outcome = speed_obs(40, 65).evaluate();
        assert_eq!(outcome.compliance_score, 70);
        assert_eq!(outcome.violation_type, ViolationType::SpeedViolation);
        assert_eq!(outcome.severity, Severity::High);
    }

    #[test]
    fn test_excessive_margin_boundary() {
        // Exactly 20 over is still the moderate tier.
        assert_eq!(speed_obs(40, 60).evaluate().compliance_score, 80);
        assert_eq!(speed_obs(40, 61).evaluate().compliance_score, 70);
    }

    #[test]
    fn test_missing_or_zero_speed_inputs_are_not_applicable() {
        let no_limit = SignObservation {
            actual_speed: Some(80),
            ..SignObservation::default()
        };
        assert_eq!(no_limit.evaluate().compliance_score, 100);

        let zero_limit = speed_obs(0, 80);
        assert_eq!(zero_limit.evaluate().compliance_score, 100);

        let zero_speed = speed_obs(40, 0);
        assert_eq!(zero_speed.evaluate().compliance_score, 100);
    }

    // =========================================================================
    // Horn Axis Tests
    // =========================================================================

    #[test]
    fn test_horn_in_no_horn_zone() {
        let obs = SignObservation {
            no_horn_zone: true,
            horn_applied: true,
            ..SignObservation::default()
        };
        let outcome = obs.evaluate();
        assert_eq!(outcome.compliance_score, 85);
        assert_eq!(outcome.violation_type, ViolationType::HornViolation);
        assert_eq!(outcome.severity, Severity::Low);
    }

    #[test]
    fn test_horn_outside_zone_is_compliant() {
        let obs = SignObservation {
            no_horn_zone: false,
            horn_applied: true,
            ..SignObservation::default()
        };
        assert_eq!(obs.evaluate().compliance_score, 100);
    }

    // =========================================================================
    // Seatbelt Axis Tests
    // =========================================================================

    #[test]
    fn test_seatbelt_not_worn_costs_twenty_five() {
        let obs = SignObservation {
            seatbelt_required: true,
            seatbelt_worn: false,
            ..SignObservation::default()
        };
        let outcome = obs.evaluate();
        assert_eq!(outcome.compliance_score, 75);
        assert_eq!(outcome.violation_type, ViolationType::SeatbeltViolation);
        assert_eq!(outcome.severity, Severity::High);
    }

    #[test]
    fn test_seatbelt_not_required_is_compliant() {
        let obs = SignObservation {
            seatbelt_required: false,
            seatbelt_worn: false,
            ..SignObservation::default()
        };
        assert_eq!(obs.evaluate().compliance_score, 100);
    }

    // =========================================================================
    // Stacking and Classification Tests
    // =========================================================================

    #[test]
    fn test_penalties_stack_across_axes() {
        // Excessive speeding plus no seatbelt: 100 - 30 - 25.
        let obs = SignObservation {
            seatbelt_required: true,
            seatbelt_worn: false,
            ..speed_obs(40, 65)
        };
        let outcome = obs.evaluate();
        assert_eq!(outcome.compliance_score, 45);
    }

    #[test]
    fn test_primary_violation_prefers_speed_over_others() {
        let obs = SignObservation {
            no_horn_zone: true,
            horn_applied: true,
            seatbelt_required: true,
            seatbelt_worn: false,
            ..speed_obs(40, 45)
        };
        let outcome = obs.evaluate();
        assert_eq!(outcome.violation_type, ViolationType::SpeedViolation);
        // 100 - 20 - 15 - 25
        assert_eq!(outcome.compliance_score, 40);
    }

    #[test]
    fn test_primary_violation_prefers_horn_over_seatbelt() {
        let obs = SignObservation {
            no_horn_zone: true,
            horn_applied: true,
            seatbelt_required: true,
            seatbelt_worn: false,
            ..SignObservation::default()
        };
        assert_eq!(
            obs.evaluate().violation_type,
            ViolationType::HornViolation
        );
    }

    #[test]
    fn test_seatbelt_axis_costs_exactly_twenty_five_regardless_of_others() {
        let with_belt = SignObservation {
            seatbelt_required: true,
            seatbelt_worn: true,
            ..speed_obs(40, 65)
        };
        let without_belt = SignObservation {
            seatbelt_worn: false,
            ..with_belt
        };
        assert_eq!(
            with_belt.evaluate().compliance_score
                - without_belt.evaluate().compliance_score,
            SEATBELT_PENALTY
        );
    }

    #[test]
    fn test_score_never_negative_and_never_above_max() {
        let worst = SignObservation {
            no_horn_zone: true,
            horn_applied: true,
            seatbelt_required: true,
            seatbelt_worn: false,
            ..speed_obs(40, 120)
        };
        let outcome = worst.evaluate();
        assert!(outcome.compliance_score >= 0);
        assert!(outcome.compliance_score <= MAX_SCORE);
        // 100 - 30 - 15 - 25 = 30, still positive here.
        assert_eq!(outcome.compliance_score, 30);

        let perfect = SignObservation::default();
        assert_eq!(perfect.evaluate().compliance_score, MAX_SCORE);
    }

    #[test]
    fn test_description_lists_every_broken_rule() {
        let obs = SignObservation {
            seatbelt_required: true,
            seatbelt_worn: false,
            ..speed_obs(40, 65)
        };
        let description = obs.evaluate().description.unwrap();
        assert!(description.contains("Speed limit of 40 km/h exceeded at 65 km/h"));
        assert!(description.contains("Seatbelt not worn"));
    }

    // =========================================================================
    // Observation Construction Tests
    // =========================================================================

    #[test]
    fn test_from_event_speed_sign() {
        use crate::events::{RawSignValue, SensorEvent};

        let event = SensorEvent {
            vehicle_id: "V1".to_string(),
            sign_type: SignType::SpeedLimit,
            sign_value: Some(RawSignValue::Number(40)),
            drive_value: Some(65),
            location: None,
            horn_applied: None,
            seatbelt_worn: None,
            session_id: None,
        };
        let value = SignValue::resolve(event.sign_type, event.sign_value.as_ref()).unwrap();
        let obs = SignObservation::from_event(&event, value, VehicleType::TwoWheeler);

        assert_eq!(obs.speed_limit, Some(40));
        assert_eq!(obs.actual_speed, Some(65));
        assert!(!obs.seatbelt_required);
    }

    #[test]
    fn test_from_event_seatbelt_sign_engages_axis_for_four_wheeler() {
        use crate::events::SensorEvent;

        let event = SensorEvent {
            vehicle_id: "V1".to_string(),
            sign_type: SignType::Seatbelt,
            sign_value: None,
            drive_value: Some(0),
            location: None,
            horn_applied: None,
            seatbelt_worn: None,
            session_id: None,
        };
        let value = SignValue::resolve(event.sign_type, event.sign_value.as_ref()).unwrap();

        let four = SignObservation::from_event(&event, value, VehicleType::FourWheeler);
        assert!(four.seatbelt_required);
        assert!(!four.seatbelt_worn);
        assert_eq!(four.evaluate().compliance_score, 75);

        let two = SignObservation::from_event(&event, value, VehicleType::TwoWheeler);
        assert!(!two.seatbelt_required);
        assert_eq!(two.evaluate().compliance_score, 100);
    }

    #[test]
    fn test_from_event_stop_sign_falls_through_with_no_penalty() {
        use crate::events::SensorEvent;

        let event = SensorEvent {
            vehicle_id: "V1".to_string(),
            sign_type: SignType::Stop,
            sign_value: None,
            drive_value: Some(1),
            location: None,
            horn_applied: None,
            seatbelt_worn: None,
            session_id: None,
        };
        let obs = SignObservation::from_event(&event, None, VehicleType::FourWheeler);
        assert_eq!(obs.evaluate().compliance_score, 100);
    }
}
