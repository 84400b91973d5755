use crate::anomaly::{AnomalyMonitor, SensorReadings};
use crate::bus::PowerBus;
use crate::config::{check_band, EnergyConfig};
use crate::error::{BuildError, Collaborator, UsageFault};
use crate::power_source::PowerSourceCondition;
use crate::subsystems::attitude::Orientation;
use crate::subsystems::payload::{PayloadKind, PayloadStatus, PayloadSubsystem};
use crate::subsystems::{
    ActionOutcome, AttitudeControl, ChargingMode, EnergyLedger, LedgerState, TelemetryChannel, TelemetryStats,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Identity and orbit metadata. Plain data, nothing here draws power.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpacecraftInfo {
    pub norad_id: u32,
    pub name: String,
    pub orbital_altitude_km: f64,
    pub orbital_period_hours: f64,
    pub mass_kg: f64,
    pub mission: String,
    pub country: String,
    pub region: String,
}

impl Default for SpacecraftInfo {
    fn default() -> Self {
        Self {
            norad_id: 0,
            name: "SAT-1".to_string(),
            orbital_altitude_km: 550.0,
            orbital_period_hours: 1.5,
            mass_kg: 150.0,
            mission: "Earth observation".to_string(),
            country: String::new(),
            region: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpacecraftSnapshot {
    pub info: SpacecraftInfo,
    pub ledger: LedgerState,
    pub payload: PayloadStatus,
    pub altitude_km: f64,
    pub orientation: Orientation,
    pub telemetry: TelemetryStats,
    pub alerts_raised: u32,
}

/// Outcome of one simulated time step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    pub payload: ActionOutcome,
    pub power_source: PowerSourceCondition,
    pub payload_in_eclipse: bool,
    pub level: f64,
    pub mode: ChargingMode,
}

/// Wires one ledger and one telemetry channel to every consumer.
///
/// Both collaborators are mandatory; [`build`](Self::build) refuses to produce
/// a spacecraft without them.
#[derive(Debug, Default)]
pub struct SpacecraftBuilder {
    info: SpacecraftInfo,
    config: EnergyConfig,
    ledger: Option<EnergyLedger>,
    telemetry: Option<TelemetryChannel>,
    payload_kind: Option<PayloadKind>,
}

impl SpacecraftBuilder {
    pub fn new(info: SpacecraftInfo) -> Self {
        Self {
            info,
            ..Self::default()
        }
    }

    /// Cost model for the consumers; does not wire a ledger or telemetry.
    pub fn config(mut self, config: EnergyConfig) -> Self {
        self.config = config;
        self
    }

    pub fn ledger(mut self, ledger: EnergyLedger) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn telemetry(mut self, telemetry: TelemetryChannel) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Wire a ledger and telemetry channel built from the current config.
    pub fn with_default_power(mut self) -> Self {
        self.ledger = Some(EnergyLedger::from_config(&self.config.ledger));
        self.telemetry = Some(TelemetryChannel::with_config(self.config.telemetry.clone()));
        self
    }

    pub fn payload(mut self, kind: PayloadKind) -> Self {
        self.payload_kind = Some(kind);
        self
    }

    /// Wiring faults are reported before configuration faults. A ledger passed in
    /// through [`ledger`](Self::ledger) must carry a usable band as well.
    pub fn build(self) -> Result<Spacecraft, BuildError> {
        let ledger = self.ledger.ok_or(UsageFault::NotConnected {
            collaborator: Collaborator::Ledger,
        })?;
        let telemetry = self.telemetry.ok_or(UsageFault::NotConnected {
            collaborator: Collaborator::Telemetry,
        })?;

        self.config.validate()?;
        check_band(ledger.lower_threshold(), ledger.upper_threshold())?;

        let consumers = &self.config.consumers;
        let attitude = AttitudeControl::with_config(self.info.orbital_altitude_km, consumers);
        let payload = PayloadSubsystem::with_config(self.payload_kind.unwrap_or(PayloadKind::SarRadar), consumers);

        info!(name = %self.info.name, norad_id = self.info.norad_id, "spacecraft wired");

        Ok(Spacecraft {
            info: self.info,
            bus: PowerBus::new(ledger, telemetry),
            attitude,
            payload,
            monitor: AnomalyMonitor::new(),
            elapsed_min: 0.0,
        })
    }
}

/// Top-level simulated spacecraft: owns the power bus and every subsystem.
#[derive(Debug)]
pub struct Spacecraft {
    info: SpacecraftInfo,
    bus: PowerBus,
    attitude: AttitudeControl,
    payload: PayloadSubsystem,
    monitor: AnomalyMonitor,
    elapsed_min: f64,
}

impl Spacecraft {
    pub fn builder(info: SpacecraftInfo) -> SpacecraftBuilder {
        SpacecraftBuilder::new(info)
    }

    /// Advance the simulation by `dt` minutes under the observed power conditions.
    ///
    /// Order: background drain or recharge, payload operation, power-source
    /// evaluation, payload observation.
    pub fn step(&mut self, dt: f64, sunlight_phase: bool, observed_charging: bool) -> StepReport {
        self.bus.advance(dt);
        if dt.is_finite() && dt > 0.0 {
            self.elapsed_min += dt;
        }

        let payload = self.payload.update_operation(&mut self.bus, dt, !sunlight_phase);
        let power_source = self.monitor.handle_eclipse(&mut self.bus, sunlight_phase, observed_charging);
        let payload_in_eclipse = self.monitor.check_payload(&mut self.bus, &self.payload, sunlight_phase);

        debug!(
            elapsed_min = self.elapsed_min,
            level = self.bus.charge_level(),
            mode = %self.bus.charging_mode(),
            "step complete"
        );

        StepReport {
            payload,
            power_source,
            payload_in_eclipse,
            level: self.bus.charge_level(),
            mode: self.bus.charging_mode(),
        }
    }

    pub fn maneuver_altitude(&mut self, target_km: f64) -> ActionOutcome {
        self.attitude.change_altitude(&mut self.bus, target_km)
    }

    pub fn reorient(&mut self, target: Orientation) -> ActionOutcome {
        self.attitude.reorient(&mut self.bus, target)
    }

    pub fn report_attitude(&mut self) {
        self.attitude.report(&mut self.bus);
    }

    pub fn activate_payload(&mut self) -> ActionOutcome {
        self.payload.activate(&mut self.bus)
    }

    pub fn deactivate_payload(&mut self) -> ActionOutcome {
        self.payload.deactivate(&mut self.bus)
    }

    pub fn payload_status(&mut self) -> PayloadStatus {
        self.payload.report_status(&mut self.bus)
    }

    pub fn set_payload_kind(&mut self, kind: PayloadKind) {
        self.payload.set_kind(kind);
    }

    pub fn check_sensors(&mut self, readings: SensorReadings) -> usize {
        self.monitor.check_sensors(&mut self.bus, readings)
    }

    /// Recharge one minute at a time until `target` is reached or `max_minutes`
    /// run out. Returns the minutes spent.
    ///
    /// Only charges while the ledger is in solar mode; in battery mode the
    /// background drain runs until the band switches it over. Charging never
    /// goes past the upper threshold, so `target` is capped there and the loop
    /// ends once a charging pass finishes.
    pub fn recover_charge(&mut self, target: f64, max_minutes: u32) -> u32 {
        let upper = self.bus.ledger().upper_threshold();
        if target > upper {
            warn!(target, upper, "recovery target above the charging band, capping");
        }
        let target = target.min(upper);

        let mut minutes = 0;
        let mut charging = false;
        while self.bus.charge_level() < target && minutes < max_minutes {
            self.bus.advance(1.0);
            self.elapsed_min += 1.0;
            minutes += 1;

            match self.bus.charging_mode() {
                ChargingMode::Solar => charging = true,
                ChargingMode::Battery if charging => break,
                ChargingMode::Battery => {}
            }
        }
        info!(minutes, level = self.bus.charge_level(), "recovery charge finished");
        minutes
    }

    pub fn snapshot(&self) -> SpacecraftSnapshot {
        SpacecraftSnapshot {
            info: self.info.clone(),
            ledger: self.bus.ledger().state(),
            payload: self.payload.status(),
            altitude_km: self.attitude.altitude_km(),
            orientation: self.attitude.orientation(),
            telemetry: self.bus.telemetry().stats().clone(),
            alerts_raised: self.monitor.total_alerts(),
        }
    }

    pub fn info(&self) -> &SpacecraftInfo {
        &self.info
    }

    pub fn bus(&self) -> &PowerBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut PowerBus {
        &mut self.bus
    }

    pub fn attitude(&self) -> &AttitudeControl {
        &self.attitude
    }

    pub fn payload(&self) -> &PayloadSubsystem {
        &self.payload
    }

    pub fn monitor(&self) -> &AnomalyMonitor {
        &self.monitor
    }

    pub fn elapsed_min(&self) -> f64 {
        self.elapsed_min
    }
}
