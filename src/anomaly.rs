use crate::bus::PowerBus;
use crate::power_source::{PowerSourceCondition, PowerSourceController};
use crate::subsystems::payload::{PayloadKind, PayloadSubsystem};
use crate::telemetry::{Severity, StatusEvent};
use heapless::Vec;
use serde::{Deserialize, Serialize};
use tracing::warn;

const MAX_ALERT_HISTORY: usize = 32;

/// Health flags reported by the payload instruments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorReadings {
    pub sar_radar_ok: bool,
    pub cloud_seeding_ok: bool,
    pub ionospheric_collector_ok: bool,
}

impl SensorReadings {
    pub fn nominal() -> Self {
        Self {
            sar_radar_ok: true,
            cloud_seeding_ok: true,
            ionospheric_collector_ok: true,
        }
    }

    fn iter(self) -> impl Iterator<Item = (PayloadKind, bool)> {
        [
            (PayloadKind::SarRadar, self.sar_radar_ok),
            (PayloadKind::CloudSeedingDevice, self.cloud_seeding_ok),
            (PayloadKind::IonosphericParticleCollector, self.ionospheric_collector_ok),
        ]
        .into_iter()
    }
}

impl Default for SensorReadings {
    fn default() -> Self {
        Self::nominal()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertKind {
    SensorMalfunction(PayloadKind),
    ChargingAnomaly,
    PayloadInEclipse(PayloadKind),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: u32,
    pub kind: AlertKind,
    pub severity: Severity,
    pub battery_level: f64,
}

/// Watches sensors, the power source and the payload, and raises alerts.
///
/// Alerts go out over telemetry like any other status, so they cost energy too.
/// The most recent alerts are kept in a bounded history.
#[derive(Debug)]
pub struct AnomalyMonitor {
    power_source: PowerSourceController,
    history: Vec<AlertRecord, MAX_ALERT_HISTORY>,
    next_alert_id: u32,
}

impl AnomalyMonitor {
    pub fn new() -> Self {
        Self {
            power_source: PowerSourceController::new(),
            history: Vec::new(),
            next_alert_id: 1,
        }
    }

    /// Raise alert #01..#03 for every failed instrument. Returns the number raised.
    pub fn check_sensors(&mut self, bus: &mut PowerBus, readings: SensorReadings) -> usize {
        let mut raised = 0;
        for (code, (sensor, ok)) in (1u8..).zip(readings.iter()) {
            if ok {
                continue;
            }
            warn!(sensor = %sensor, code, "payload sensor malfunction");
            bus.report(StatusEvent::SensorAlert { code, sensor }, false);
            self.record(AlertKind::SensorMalfunction(sensor), Severity::Alert, bus.charge_level());
            raised += 1;
        }
        raised
    }

    /// Hand the sunlight/charging observation to the power-source controller.
    pub fn handle_eclipse(
        &mut self,
        bus: &mut PowerBus,
        sunlight_phase: bool,
        observed_charging: bool,
    ) -> PowerSourceCondition {
        let condition = self.power_source.evaluate(bus, sunlight_phase, observed_charging);
        if condition == PowerSourceCondition::ChargingAnomaly {
            self.record(AlertKind::ChargingAnomaly, Severity::Alert, bus.charge_level());
        }
        condition
    }

    /// Flag a payload left running in Earth's shadow while the battery is below the band.
    pub fn check_payload(&mut self, bus: &mut PowerBus, payload: &PayloadSubsystem, sunlight_phase: bool) -> bool {
        let level = bus.charge_level();
        if !payload.is_active() || sunlight_phase || level >= bus.ledger().lower_threshold() {
            return false;
        }

        warn!(payload = %payload.kind(), level, "payload active in eclipse on low battery");
        bus.report(StatusEvent::PayloadInEclipse { kind: payload.kind(), level }, false);
        self.record(AlertKind::PayloadInEclipse(payload.kind()), Severity::Caution, level);
        true
    }

    pub fn alert_history(&self) -> &[AlertRecord] {
        &self.history
    }

    pub fn total_alerts(&self) -> u32 {
        self.next_alert_id - 1
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    fn record(&mut self, kind: AlertKind, severity: Severity, battery_level: f64) {
        let id = self.next_alert_id;
        self.next_alert_id = self.next_alert_id.wrapping_add(1);

        if self.history.is_full() {
            self.history.remove(0);
        }
        // Room was made above.
        let pushed = self.history.push(AlertRecord {
            id,
            kind,
            severity,
            battery_level,
        });
        debug_assert!(pushed.is_ok(), "alert history full after eviction");
    }
}

impl Default for AnomalyMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_is_bounded() {
        let mut bus = PowerBus::default();
        let mut monitor = AnomalyMonitor::new();
        let failed = SensorReadings {
            sar_radar_ok: false,
            cloud_seeding_ok: false,
            ionospheric_collector_ok: false,
        };
        for _ in 0..12 {
            monitor.check_sensors(&mut bus, failed);
        }
        assert_eq!(monitor.total_alerts(), 36);
        assert_eq!(monitor.alert_history().len(), MAX_ALERT_HISTORY);
        assert_eq!(monitor.alert_history()[0].id, 5);
    }
}
