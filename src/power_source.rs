//! External power-source control.
//!
//! The ledger's hysteresis band reacts to the battery level. This layer reacts to
//! what the spacecraft observes about its environment (sunlight phase, charging
//! current) and forces the charging mode accordingly. The band still applies on
//! the next bound crossing unless the override is renewed.

use crate::bus::PowerBus;
use crate::subsystems::ChargingMode;
use crate::telemetry::StatusEvent;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerSourceCondition {
    /// Sunlight and charging current as expected.
    Nominal,
    /// Sunlight phase without charging current: panel fault or unexpected shadow.
    ChargingAnomaly,
    Eclipse,
}

impl PowerSourceCondition {
    pub fn classify(sunlight_phase: bool, observed_charging: bool) -> Self {
        match (sunlight_phase, observed_charging) {
            (true, true) => PowerSourceCondition::Nominal,
            (true, false) => PowerSourceCondition::ChargingAnomaly,
            (false, _) => PowerSourceCondition::Eclipse,
        }
    }

    pub fn forced_mode(self) -> ChargingMode {
        match self {
            PowerSourceCondition::Nominal => ChargingMode::Solar,
            PowerSourceCondition::ChargingAnomaly | PowerSourceCondition::Eclipse => ChargingMode::Battery,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PowerSourceController;

impl PowerSourceController {
    pub fn new() -> Self {
        Self
    }

    /// Classify the observed signals, report the condition and force the mode.
    pub fn evaluate(
        &self,
        bus: &mut PowerBus,
        sunlight_phase: bool,
        observed_charging: bool,
    ) -> PowerSourceCondition {
        let condition = PowerSourceCondition::classify(sunlight_phase, observed_charging);
        let level = bus.charge_level();

        let event = match condition {
            PowerSourceCondition::Nominal => {
                info!(level, "solar panels charging as expected");
                StatusEvent::SolarNominal { level }
            }
            PowerSourceCondition::ChargingAnomaly => {
                warn!(level, "no charging detected during sunlight phase");
                StatusEvent::ChargingAnomaly { level }
            }
            PowerSourceCondition::Eclipse => {
                info!(level, "spacecraft in eclipse");
                StatusEvent::Eclipse { level }
            }
        };

        bus.report(event, false);
        bus.force_mode(condition.forced_mode());
        condition
    }
}
