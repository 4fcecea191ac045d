//! Shot tuning settings loaded from config

use bevy::log::warn;
use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::ShotError;
use crate::shooting::GapMissPolicy;

fn default_flight_time() -> f32 {
    SHOT_FLIGHT_TIME
}
fn default_bank_assist_flight_time() -> f32 {
    BANK_ASSIST_FLIGHT_TIME
}
fn default_gravity() -> f32 {
    GRAVITY
}
fn default_ground_reset_y() -> f32 {
    GROUND_RESET_Y
}
fn default_charge_timeout() -> f32 {
    CHARGE_TIMEOUT
}
fn default_screen_range_max_power() -> f32 {
    SCREEN_RANGE_MAX_POWER
}
fn default_perfect_width() -> f32 {
    PERFECT_ZONE_WIDTH
}
fn default_bank_width() -> f32 {
    BANK_ZONE_WIDTH
}

/// Path to the shot tuning config
pub const SHOT_TUNING_FILE: &str = "config/shot_tuning.toml";

/// Tuning values for the shot engine. Missing keys fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Resource)]
pub struct ShotTuning {
    /// Seconds from release to the target point
    #[serde(default = "default_flight_time")]
    pub flight_time: f32,
    /// Seconds from the backboard to the hoop after a bank assist
    #[serde(default = "default_bank_assist_flight_time")]
    pub bank_assist_flight_time: f32,
    #[serde(default = "default_gravity")]
    pub gravity: f32,
    /// Height at which a launched ball counts as grounded
    #[serde(default = "default_ground_reset_y")]
    pub ground_reset_y: f32,
    /// Longest a swipe may charge before it releases on its own (seconds)
    #[serde(default = "default_charge_timeout")]
    pub charge_timeout: f32,
    /// Fraction of the screen height that maps to full power
    #[serde(default = "default_screen_range_max_power")]
    pub screen_range_max_power: f32,
    #[serde(default = "default_perfect_width")]
    pub perfect_width: f32,
    #[serde(default = "default_bank_width")]
    pub bank_width: f32,
    #[serde(default)]
    pub gap_policy: GapMissPolicy,
}

impl Default for ShotTuning {
    fn default() -> Self {
        Self {
            flight_time: default_flight_time(),
            bank_assist_flight_time: default_bank_assist_flight_time(),
            gravity: default_gravity(),
            ground_reset_y: default_ground_reset_y(),
            charge_timeout: default_charge_timeout(),
            screen_range_max_power: default_screen_range_max_power(),
            perfect_width: default_perfect_width(),
            bank_width: default_bank_width(),
            gap_policy: GapMissPolicy::default(),
        }
    }
}

impl ShotTuning {
    /// Reject values the solver or zone assignment cannot work with
    pub fn validate(&self) -> Result<(), ShotError> {
        for flight_time in [self.flight_time, self.bank_assist_flight_time] {
            if !flight_time.is_finite() || flight_time <= 0.0 {
                return Err(ShotError::InvalidFlightTime { flight_time });
            }
        }
        if !self.gravity.is_finite() || self.gravity < 0.0 {
            return Err(ShotError::InvalidGravity {
                gravity: self.gravity,
            });
        }
        let widths_ok = (PERFECT_WIDTH_RANGE.0..=PERFECT_WIDTH_RANGE.1)
            .contains(&self.perfect_width)
            && (BANK_WIDTH_RANGE.0..=BANK_WIDTH_RANGE.1).contains(&self.bank_width);
        if !widths_ok {
            return Err(ShotError::InvalidZoneWidths {
                perfect_width: self.perfect_width,
                bank_width: self.bank_width,
            });
        }
        if !self.charge_timeout.is_finite() || self.charge_timeout <= 0.0 {
            return Err(ShotError::Config(format!(
                "charge_timeout must be positive (got {})",
                self.charge_timeout
            )));
        }
        if !(SCREEN_RANGE_MIN..=SCREEN_RANGE_MAX).contains(&self.screen_range_max_power) {
            return Err(ShotError::Config(format!(
                "screen_range_max_power must be in {}..={} (got {})",
                SCREEN_RANGE_MIN, SCREEN_RANGE_MAX, self.screen_range_max_power
            )));
        }
        if !self.ground_reset_y.is_finite() {
            return Err(ShotError::Config("ground_reset_y must be finite".to_string()));
        }
        Ok(())
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ShotError> {
        let tuning: ShotTuning =
            toml::from_str(content).map_err(|e| ShotError::Config(e.to_string()))?;
        tuning.validate()?;
        Ok(tuning)
    }
}

pub fn load_shot_tuning_from_file(path: &str) -> Result<ShotTuning, String> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path, e))?;
    ShotTuning::from_toml_str(&contents).map_err(|e| format!("Failed to load {}: {}", path, e))
}

/// Load tuning from `path`, warning and using defaults on any failure
pub fn load_or_default(path: &str) -> ShotTuning {
    match load_shot_tuning_from_file(path) {
        Ok(tuning) => tuning,
        Err(err) => {
            warn!("{}, using default shot tuning", err);
            ShotTuning::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ShotTuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let tuning = ShotTuning::from_toml_str("flight_time = 1.0\ngap_policy = \"distance_interpolated\"\n")
            .unwrap();
        assert_eq!(tuning.flight_time, 1.0);
        assert_eq!(tuning.gap_policy, GapMissPolicy::DistanceInterpolated);
        assert_eq!(tuning.gravity, GRAVITY);
        assert_eq!(tuning.charge_timeout, CHARGE_TIMEOUT);
    }

    #[test]
    fn test_rejects_zero_flight_time() {
        let err = ShotTuning::from_toml_str("flight_time = 0.0\n").unwrap_err();
        assert!(matches!(err, ShotError::InvalidFlightTime { .. }));
    }

    #[test]
    fn test_rejects_bad_widths() {
        let err = ShotTuning::from_toml_str("perfect_width = 0.5\n").unwrap_err();
        assert!(matches!(err, ShotError::InvalidZoneWidths { .. }));
    }

    #[test]
    fn test_rejects_unparseable() {
        assert!(matches!(
            ShotTuning::from_toml_str("flight_time = \"slow\""),
            Err(ShotError::Config(_))
        ));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let tuning = load_or_default("config/does_not_exist.toml");
        assert_eq!(tuning, ShotTuning::default());
    }
}
