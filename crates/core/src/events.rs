//! Inbound sensor events and the traffic-sign vocabulary.
//!
//! A [`SensorEvent`] is the plain record handed over by the request-handling
//! layer. Sign values arrive loosely typed (`"40"`, `40`, `"Yes"`, `true`)
//! and are resolved into a [`SignValue`] before scoring.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Type of a detected traffic sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignType {
    SpeedLimit,
    NoHorn,
    FourWheeler,
    Seatbelt,
    Stop,
    Yield,
    OneWay,
    NoParking,
    Other,
}

impl SignType {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SpeedLimit => "speed_limit",
            Self::NoHorn => "no_horn",
            Self::FourWheeler => "four_wheeler",
            Self::Seatbelt => "seatbelt",
            Self::Stop => "stop",
            Self::Yield => "yield",
            Self::OneWay => "one_way",
            Self::NoParking => "no_parking",
            Self::Other => "other",
        }
    }

    /// Parses from string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "speed_limit" => Some(Self::SpeedLimit),
            "no_horn" => Some(Self::NoHorn),
            "four_wheeler" => Some(Self::FourWheeler),
            "seatbelt" => Some(Self::Seatbelt),
            "stop" => Some(Self::Stop),
            "yield" => Some(Self::Yield),
            "one_way" => Some(Self::OneWay),
            "no_parking" => Some(Self::NoParking),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Vehicle category. Determines seatbelt applicability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    TwoWheeler,
    FourWheeler,
    Commercial,
}

impl VehicleType {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TwoWheeler => "two_wheeler",
            Self::FourWheeler => "four_wheeler",
            Self::Commercial => "commercial",
        }
    }

    /// Parses from string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "two_wheeler" => Some(Self::TwoWheeler),
            "four_wheeler" => Some(Self::FourWheeler),
            "commercial" => Some(Self::Commercial),
            _ => None,
        }
    }

    /// Display label, e.g. for leaderboard output.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::TwoWheeler => "Two Wheeler",
            Self::FourWheeler => "Four Wheeler",
            Self::Commercial => "Commercial Vehicle",
        }
    }

    /// Seatbelt rules apply to four-wheelers only.
    #[must_use]
    pub fn seatbelt_required(&self) -> bool {
        matches!(self, Self::FourWheeler)
    }
}

/// A sign value as it arrives on the wire, before type resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawSignValue {
    Number(i64),
    Flag(bool),
    Text(String),
}

/// The resolved regulatory value of a sign: a numeric threshold for speed
/// limits, a boolean flag for zone-style signs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignValue {
    Limit(i32),
    Flag(bool),
}

impl SignValue {
    /// Resolves a raw wire value against the sign type.
    ///
    /// Speed-limit signs require a numeric value. Zone-style signs accept
    /// yes/no, true/false, or 0/1; a posted sign with no value is in force.
    /// Sign types with no regulatory value resolve to `None`.
    ///
    /// # Errors
    /// Returns [`EngineError::Validation`] when a speed-limit sign carries a
    /// missing or non-numeric value.
    pub fn resolve(
        sign_type: SignType,
        raw: Option<&RawSignValue>,
    ) -> Result<Option<Self>, EngineError> {
        match sign_type {
            SignType::SpeedLimit => {
                let limit = match raw {
                    Some(RawSignValue::Number(n)) => i32::try_from(*n).ok(),
                    Some(RawSignValue::Text(s)) => s.trim().parse::<i32>().ok(),
                    _ => None,
                }
                .ok_or_else(|| {
                    EngineError::Validation(
                        "speed limit signs require a numeric sign value".to_string(),
                    )
                })?;
                if limit < 0 {
                    return Err(EngineError::Validation(
                        "speed limit must not be negative".to_string(),
                    ));
                }
                Ok(Some(Self::Limit(limit)))
            }
            SignType::NoHorn | SignType::FourWheeler | SignType::Seatbelt => {
                let flag = match raw {
                    Some(RawSignValue::Flag(b)) => *b,
                    Some(RawSignValue::Number(n)) => *n != 0,
                    Some(RawSignValue::Text(s)) => {
                        matches!(s.trim().to_lowercase().as_str(), "yes" | "true" | "1")
                    }
                    None => true,
                };
                Ok(Some(Self::Flag(flag)))
            }
            _ => Ok(None),
        }
    }

    /// Storage form of the value.
    #[must_use]
    pub fn as_storage_string(&self) -> String {
        match self {
            Self::Limit(n) => n.to_string(),
            Self::Flag(true) => "yes".to_string(),
            Self::Flag(false) => "no".to_string(),
        }
    }
}

/// One traffic-sign observation reported by a vehicle sensor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorEvent {
    pub vehicle_id: String,
    pub sign_type: SignType,
    #[serde(default)]
    pub sign_value: Option<RawSignValue>,
    /// Observed driving value: actual speed for speed signs, 0/1 for
    /// flag-style signs.
    #[serde(default)]
    pub drive_value: Option<i64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub horn_applied: Option<bool>,
    #[serde(default)]
    pub seatbelt_worn: Option<bool>,
    /// Optional driving-session grouping.
    #[serde(default)]
    pub session_id: Option<String>,
}

impl SensorEvent {
    /// Validates required fields before scoring.
    ///
    /// # Errors
    /// Returns [`EngineError::Validation`] on a blank vehicle id, a
    /// speed-limit sign without a usable numeric value, or a negative
    /// observed speed.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.vehicle_id.trim().is_empty() {
            return Err(EngineError::Validation(
                "vehicle_id must not be empty".to_string(),
            ));
        }
        if self.sign_type == SignType::SpeedLimit {
            SignValue::resolve(self.sign_type, self.sign_value.as_ref())?;
            match self.drive_value {
                None => {
                    return Err(EngineError::Validation(
                        "speed limit events require a drive value".to_string(),
                    ))
                }
                Some(v) if v < 0 => {
                    return Err(EngineError::Validation(
                        "observed speed must not be negative".to_string(),
                    ))
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Observed horn usage: the explicit flag wins, else `drive_value == 1`.
    #[must_use]
    pub fn horn_observed(&self) -> bool {
        self.horn_applied
            .unwrap_or_else(|| self.drive_value == Some(1))
    }

    /// Observed seatbelt usage, if the event carries it.
    ///
    /// On seatbelt signs the drive value doubles as the worn flag.
    #[must_use]
    pub fn seatbelt_observed(&self) -> Option<bool> {
        if self.seatbelt_worn.is_some() {
            return self.seatbelt_worn;
        }
        if self.sign_type == SignType::Seatbelt {
            return Some(self.drive_value == Some(1));
        }
        None
    }
}

/// A request to redeem tokens for a reward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendRequest {
    pub amount: i64,
    #[serde(default = "default_reward_type")]
    pub reward_type: String,
}

fn default_reward_type() -> String {
    "unknown".to_string()
}

impl SpendRequest {
    /// # Errors
    /// Returns [`EngineError::Validation`] for a negative amount.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.amount < 0 {
            return Err(EngineError::Validation(
                "spend amount must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn speed_event(limit: RawSignValue, drive: Option<i64>) -> SensorEvent {
        SensorEvent {
            vehicle_id: "KA01AB1234".to_string(),
            sign_type: SignType::SpeedLimit,
            sign_value: Some(limit),
            drive_value: drive,
            location: Some("MG Road".to_string()),
            horn_applied: None,
            seatbelt_worn: None,
            session_id: None,
        }
    }

    // =========================================================================
    // SignType / VehicleType Tests
    // =========================================================================

    #[test]
    fn test_sign_type_roundtrip() {
        for sign in [
            SignType::SpeedLimit,
            SignType::NoHorn,
            SignType::FourWheeler,
            SignType::Seatbelt,
            SignType::Stop,
            SignType::Yield,
            SignType::OneWay,
            SignType::NoParking,
            SignType::Other,
        ] {
            assert_eq!(SignType::parse(sign.as_str()), Some(sign));
        }
        assert_eq!(SignType::parse("roundabout"), None);
    }

    #[test]
    fn test_vehicle_type_seatbelt_applicability() {
        assert!(VehicleType::FourWheeler.seatbelt_required());
        assert!(!VehicleType::TwoWheeler.seatbelt_required());
        assert!(!VehicleType::Commercial.seatbelt_required());
    }

    #[test]
    fn test_vehicle_type_parse_case_insensitive() {
        assert_eq!(
            VehicleType::parse("FOUR_WHEELER"),
            Some(VehicleType::FourWheeler)
        );
        assert_eq!(VehicleType::parse("tractor"), None);
    }

    // =========================================================================
    // SignValue Resolution Tests
    // =========================================================================

    #[test]
    fn test_resolve_speed_limit_from_number() {
        let value = SignValue::resolve(
            SignType::SpeedLimit,
            Some(&RawSignValue::Number(40)),
        )
        .unwrap();
        assert_eq!(value, Some(SignValue::Limit(40)));
    }

    #[test]
    fn test_resolve_speed_limit_from_text() {
        let value = SignValue::resolve(
            SignType::SpeedLimit,
            Some(&RawSignValue::Text(" 60 ".to_string())),
        )
        .unwrap();
        assert_eq!(value, Some(SignValue::Limit(60)));
    }

    #[test]
    fn test_resolve_speed_limit_rejects_missing_value() {
        let err = SignValue::resolve(SignType::SpeedLimit, None).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn test_resolve_speed_limit_rejects_non_numeric() {
        let err = SignValue::resolve(
            SignType::SpeedLimit,
            Some(&RawSignValue::Text("fast".to_string())),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn test_resolve_zone_sign_defaults_to_in_force() {
        let value = SignValue::resolve(SignType::NoHorn, None).unwrap();
        assert_eq!(value, Some(SignValue::Flag(true)));
    }

    #[test]
    fn test_resolve_zone_sign_from_yes_no_text() {
        let yes = SignValue::resolve(
            SignType::NoHorn,
            Some(&RawSignValue::Text("Yes".to_string())),
        )
        .unwrap();
        let no = SignValue::resolve(
            SignType::NoHorn,
            Some(&RawSignValue::Text("No".to_string())),
        )
        .unwrap();
        assert_eq!(yes, Some(SignValue::Flag(true)));
        assert_eq!(no, Some(SignValue::Flag(false)));
    }

    #[test]
    fn test_resolve_unhandled_sign_has_no_value() {
        assert_eq!(SignValue::resolve(SignType::Stop, None).unwrap(), None);
        assert_eq!(
            SignValue::resolve(SignType::Other, Some(&RawSignValue::Number(7))).unwrap(),
            None
        );
    }

    // =========================================================================
    // SensorEvent Validation Tests
    // =========================================================================

    #[test]
    fn test_validate_accepts_complete_speed_event() {
        let event = speed_event(RawSignValue::Number(40), Some(55));
        assert!(event.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_vehicle_id() {
        let mut event = speed_event(RawSignValue::Number(40), Some(55));
        event.vehicle_id = "   ".to_string();
        assert!(matches!(
            event.validate(),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_rejects_speed_event_without_drive_value() {
        let event = speed_event(RawSignValue::Number(40), None);
        assert!(matches!(
            event.validate(),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_rejects_negative_speed() {
        let event = speed_event(RawSignValue::Number(40), Some(-5));
        assert!(matches!(
            event.validate(),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn test_horn_observed_prefers_explicit_flag() {
        let mut event = speed_event(RawSignValue::Number(40), Some(1));
        event.sign_type = SignType::NoHorn;
        assert!(event.horn_observed());

        event.horn_applied = Some(false);
        assert!(!event.horn_observed());
    }

    #[test]
    fn test_seatbelt_observed_from_drive_value_on_seatbelt_sign() {
        let event = SensorEvent {
            vehicle_id: "KA01AB1234".to_string(),
            sign_type: SignType::Seatbelt,
            sign_value: None,
            drive_value: Some(0),
            location: None,
            horn_applied: None,
            seatbelt_worn: None,
            session_id: None,
        };
        assert_eq!(event.seatbelt_observed(), Some(false));
    }

    #[test]
    fn test_seatbelt_observed_absent_on_unrelated_sign() {
        let event = speed_event(RawSignValue::Number(40), Some(55));
        assert_eq!(event.seatbelt_observed(), None);
    }

    // =========================================================================
    // Serialization Tests
    // =========================================================================

    #[test]
    fn test_sensor_event_deserializes_loose_sign_values() {
        let from_number: SensorEvent = serde_json::from_str(
            r#"{"vehicle_id":"V1","sign_type":"speed_limit","sign_value":40,"drive_value":55}"#,
        )
        .unwrap();
        assert_eq!(from_number.sign_value, Some(RawSignValue::Number(40)));

        let from_text: SensorEvent = serde_json::from_str(
            r#"{"vehicle_id":"V1","sign_type":"no_horn","sign_value":"Yes","drive_value":1}"#,
        )
        .unwrap();
        assert_eq!(
            from_text.sign_value,
            Some(RawSignValue::Text("Yes".to_string()))
        );
    }

    #[test]
    fn test_spend_request_defaults_reward_type() {
        let req: SpendRequest = serde_json::from_str(r#"{"amount":5}"#).unwrap();
        assert_eq!(req.reward_type, "unknown");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_spend_request_rejects_negative_amount() {
        let req = SpendRequest {
            amount: -1,
            reward_type: "fuel".to_string(),
        };
        assert!(matches!(req.validate(), Err(EngineError::Validation(_))));
    }
}
