use crate::agent::SpacecraftInfo;
use crate::error::ConfigError;
use crate::subsystems::payload::PayloadKind;
use serde::{Deserialize, Serialize};
use static_assertions::const_assert;

// Charging hysteresis band (battery percent)
pub const DEFAULT_LOWER_THRESHOLD: f64 = 30.0; // Enter solar charging below this
pub const DEFAULT_UPPER_THRESHOLD: f64 = 95.0; // Leave solar charging at or above this
pub const FULL_CHARGE: f64 = 100.0;

// Background rates in percent per simulated minute
const DEFAULT_PASSIVE_DRAIN_RATE: f64 = 0.5;
const DEFAULT_PASSIVE_CHARGE_RATE: f64 = 0.1;

// Telemetry costs in percent per transmitted character
const DEFAULT_PER_CHAR_COST: f64 = 0.005;
const DEFAULT_SUMMARY_PER_CHAR_COST: f64 = 0.0005;
const DEFAULT_FLUSH_THRESHOLD: usize = 4;

// Consumer cost constants
const DEFAULT_ALTITUDE_COST_PER_KM: f64 = 0.1;
const DEFAULT_DEGREES_PER_PERCENT: f64 = 10.0;
const DEFAULT_PAYLOAD_ACTIVATION_COST: f64 = 0.5;

// Reference orbit for the mission driver, in simulated minutes
const DEFAULT_MISSION_MINUTES: u32 = 180;
const DEFAULT_SUNLIGHT_MINUTES: u32 = 60;
const DEFAULT_ECLIPSE_MINUTES: u32 = 30;

// A single threshold would make the band chatter.
const_assert!(DEFAULT_LOWER_THRESHOLD < DEFAULT_UPPER_THRESHOLD);
const_assert!(DEFAULT_UPPER_THRESHOLD <= FULL_CHARGE);
const_assert!(DEFAULT_SUMMARY_PER_CHAR_COST < DEFAULT_PER_CHAR_COST);

/// Ledger thresholds and passive rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub initial_level: f64,
    pub lower_threshold: f64,
    pub upper_threshold: f64,
    pub passive_drain_rate: f64,
    pub passive_charge_rate: f64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            initial_level: FULL_CHARGE,
            lower_threshold: DEFAULT_LOWER_THRESHOLD,
            upper_threshold: DEFAULT_UPPER_THRESHOLD,
            passive_drain_rate: DEFAULT_PASSIVE_DRAIN_RATE,
            passive_charge_rate: DEFAULT_PASSIVE_CHARGE_RATE,
        }
    }
}

/// Transmission costs and the summary trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub per_char_cost: f64,
    pub summary_per_char_cost: f64,
    pub flush_threshold: usize,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            per_char_cost: DEFAULT_PER_CHAR_COST,
            summary_per_char_cost: DEFAULT_SUMMARY_PER_CHAR_COST,
            flush_threshold: DEFAULT_FLUSH_THRESHOLD,
        }
    }
}

/// Cost model for the actuators and the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsumerConfig {
    pub altitude_cost_per_km: f64,
    pub degrees_per_percent: f64,
    pub payload_activation_cost: f64,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            altitude_cost_per_km: DEFAULT_ALTITUDE_COST_PER_KM,
            degrees_per_percent: DEFAULT_DEGREES_PER_PERCENT,
            payload_activation_cost: DEFAULT_PAYLOAD_ACTIVATION_COST,
        }
    }
}

/// Shared configuration for the whole energy economy.
///
/// Every field has a default matching the reference constants, so a JSON file
/// only needs to name what it overrides.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyConfig {
    pub ledger: LedgerConfig,
    pub telemetry: TelemetryConfig,
    pub consumers: ConsumerConfig,
}

impl EnergyConfig {
    /// Parse and validate a (possibly partial) JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ledger = &self.ledger;

        check_band(ledger.lower_threshold, ledger.upper_threshold)?;

        if !(0.0..=FULL_CHARGE).contains(&ledger.initial_level) {
            return Err(ConfigError::OutOfRange {
                field: "ledger.initial_level",
                value: ledger.initial_level,
            });
        }

        require_positive("ledger.passive_drain_rate", ledger.passive_drain_rate)?;
        require_positive("ledger.passive_charge_rate", ledger.passive_charge_rate)?;

        let telemetry = &self.telemetry;
        require_positive("telemetry.per_char_cost", telemetry.per_char_cost)?;
        require_positive("telemetry.summary_per_char_cost", telemetry.summary_per_char_cost)?;

        // Batching has to be cheaper per character than sending individually.
        if telemetry.summary_per_char_cost >= telemetry.per_char_cost {
            return Err(ConfigError::SummaryNotCheaper {
                per_char: telemetry.per_char_cost,
                summary: telemetry.summary_per_char_cost,
            });
        }

        if telemetry.flush_threshold == 0 {
            return Err(ConfigError::ZeroFlushThreshold);
        }

        let consumers = &self.consumers;
        require_positive("consumers.altitude_cost_per_km", consumers.altitude_cost_per_km)?;
        require_positive("consumers.degrees_per_percent", consumers.degrees_per_percent)?;
        let activation = consumers.payload_activation_cost;
        if activation.is_nan() || activation < 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "consumers.payload_activation_cost",
                value: activation,
            });
        }

        Ok(())
    }
}

/// Scripted mission for the simulation driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MissionConfig {
    pub minutes: u32,
    pub sunlight_minutes: u32,
    pub eclipse_minutes: u32,
    pub payload: PayloadKind,
    /// Solar panels stop delivering current from this minute on.
    pub panel_fault_at: Option<u32>,
    /// Altitude maneuver performed before the first step.
    pub maneuver_to_km: Option<f64>,
    /// Battery level the post-maneuver recovery charge aims for.
    pub recovery_target: f64,
    pub recovery_max_minutes: u32,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            minutes: DEFAULT_MISSION_MINUTES,
            sunlight_minutes: DEFAULT_SUNLIGHT_MINUTES,
            eclipse_minutes: DEFAULT_ECLIPSE_MINUTES,
            payload: PayloadKind::SarRadar,
            panel_fault_at: None,
            maneuver_to_km: None,
            recovery_target: 80.0,
            recovery_max_minutes: 1_000,
        }
    }
}

impl MissionConfig {
    pub fn is_sunlight(&self, minute: u32) -> bool {
        let orbit = self.sunlight_minutes.saturating_add(self.eclipse_minutes);
        orbit == 0 || minute % orbit < self.sunlight_minutes
    }

    /// Whether the panels deliver current at `minute`, given the sunlight phase.
    pub fn is_charging(&self, minute: u32) -> bool {
        let panel_failed = self.panel_fault_at.is_some_and(|at| minute >= at);
        self.is_sunlight(minute) && !panel_failed
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.sunlight_minutes.checked_add(self.eclipse_minutes) {
            Some(orbit) if orbit > 0 => {}
            _ => {
                return Err(ConfigError::OutOfRange {
                    field: "mission.sunlight_minutes + mission.eclipse_minutes",
                    value: f64::from(self.sunlight_minutes) + f64::from(self.eclipse_minutes),
                });
            }
        }
        if !(0.0..=FULL_CHARGE).contains(&self.recovery_target) {
            return Err(ConfigError::OutOfRange {
                field: "mission.recovery_target",
                value: self.recovery_target,
            });
        }
        Ok(())
    }
}

/// Everything the simulation driver reads from its config file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub spacecraft: SpacecraftInfo,
    pub energy: EnergyConfig,
    pub mission: MissionConfig,
}

impl SimulationConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.energy.validate()?;
        config.mission.validate()?;

        // Solar charging stops at the upper threshold; nothing above it is reachable.
        let upper = config.energy.ledger.upper_threshold;
        if config.mission.recovery_target > upper {
            return Err(ConfigError::OutOfRange {
                field: "mission.recovery_target",
                value: config.mission.recovery_target,
            });
        }
        Ok(config)
    }

    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

/// A usable hysteresis band: `0 < lower < upper <= 100`.
pub fn check_band(lower: f64, upper: f64) -> Result<(), ConfigError> {
    if lower > 0.0 && lower < upper && upper <= FULL_CHARGE {
        Ok(())
    } else {
        Err(ConfigError::InvalidBand { lower, upper })
    }
}

fn require_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EnergyConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ledger.lower_threshold, 30.0);
        assert_eq!(config.ledger.upper_threshold, 95.0);
        assert_eq!(config.telemetry.flush_threshold, 4);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EnergyConfig::from_json_str(r#"{"telemetry":{"flush_threshold":6}}"#).unwrap();
        assert_eq!(config.telemetry.flush_threshold, 6);
        assert_eq!(config.telemetry.per_char_cost, 0.005);
        assert_eq!(config.ledger, LedgerConfig::default());
    }

    #[test]
    fn test_collapsed_band_rejected() {
        let mut config = EnergyConfig::default();
        config.ledger.lower_threshold = 60.0;
        config.ledger.upper_threshold = 60.0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidBand { .. })));
    }

    #[test]
    fn test_summary_rate_must_be_cheaper() {
        let mut config = EnergyConfig::default();
        config.telemetry.summary_per_char_cost = 0.01;
        assert!(matches!(config.validate(), Err(ConfigError::SummaryNotCheaper { .. })));
    }

    #[test]
    fn test_invalid_json_reported() {
        let result = EnergyConfig::from_json_str("{ not json");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_mission_orbit_phases() {
        let mission = MissionConfig {
            panel_fault_at: Some(100),
            ..MissionConfig::default()
        };
        assert!(mission.is_sunlight(0));
        assert!(mission.is_sunlight(59));
        assert!(!mission.is_sunlight(60));
        assert!(!mission.is_sunlight(89));
        assert!(mission.is_sunlight(90));
        assert!(mission.is_charging(95));
        assert!(!mission.is_charging(100));
    }

    #[test]
    fn test_simulation_config_sections() {
        let json = r#"{"spacecraft":{"name":"LEO-7"},"mission":{"minutes":30,"payload":"CloudSeedingDevice"}}"#;
        let config = SimulationConfig::from_json_str(json).unwrap();
        assert_eq!(config.spacecraft.name, "LEO-7");
        assert_eq!(config.mission.minutes, 30);
        assert_eq!(config.mission.payload, PayloadKind::CloudSeedingDevice);
        assert_eq!(config.energy, EnergyConfig::default());
    }

    #[test]
    fn test_recovery_target_above_band_rejected() {
        let json = r#"{"mission":{"recovery_target":98.0}}"#;
        assert!(matches!(
            SimulationConfig::from_json_str(json),
            Err(ConfigError::OutOfRange { field: "mission.recovery_target", .. })
        ));

        let json = r#"{"mission":{"recovery_target":95.0}}"#;
        assert!(SimulationConfig::from_json_str(json).is_ok());
    }

    #[test]
    fn test_orbit_length_overflow_rejected() {
        let mission = MissionConfig {
            sunlight_minutes: u32::MAX,
            eclipse_minutes: 30,
            ..MissionConfig::default()
        };
        assert!(matches!(mission.validate(), Err(ConfigError::OutOfRange { .. })));
        // Still answers without overflowing.
        assert!(mission.is_sunlight(10));
    }

    #[test]
    fn test_zero_flush_threshold_rejected() {
        let mut config = EnergyConfig::default();
        config.telemetry.flush_threshold = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroFlushThreshold)));
    }
}
