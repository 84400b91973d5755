//! Structured status events and their downlink text.
//!
//! Every subsystem reports through [`StatusEvent`] records. The accounting in the
//! telemetry channel only needs the formatted length of an event, so the text
//! rendering lives here in the [`fmt::Display`] impl and nowhere else.

use crate::subsystems::payload::{PayloadKind, PayloadStatus};
use crate::subsystems::SubsystemId;
use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Caution,
    Alert,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StatusEvent {
    /// A logged ledger debit.
    Debit { amount: f64, level: f64 },
    ActionCommitted {
        subsystem: SubsystemId,
        action: String,
        cost: f64,
        level: f64,
    },
    ActionRejected {
        subsystem: SubsystemId,
        action: String,
        cost: f64,
        level: f64,
    },
    PayloadDeactivated { kind: PayloadKind, level: f64 },
    PayloadReport(PayloadStatus),
    AttitudeReport { altitude_km: f64, orientation: [f64; 3] },
    SensorAlert { code: u8, sensor: PayloadKind },
    /// Sunlight phase but no charging current observed.
    ChargingAnomaly { level: f64 },
    SolarNominal { level: f64 },
    Eclipse { level: f64 },
    /// Payload kept running through an eclipse while the battery sits below the band.
    PayloadInEclipse { kind: PayloadKind, level: f64 },
    /// Batched transmission summary emitted by a flush.
    Summary {
        messages: usize,
        chars: usize,
        cost: f64,
        level: f64,
    },
}

impl StatusEvent {
    pub fn severity(&self) -> Severity {
        match self {
            StatusEvent::SensorAlert { .. } | StatusEvent::ChargingAnomaly { .. } => Severity::Alert,
            StatusEvent::ActionRejected { .. }
            | StatusEvent::Eclipse { .. }
            | StatusEvent::PayloadInEclipse { .. } => Severity::Caution,
            _ => Severity::Info,
        }
    }

    /// Size of the transmitted text in characters.
    pub fn weight(&self) -> usize {
        self.to_string().chars().count()
    }
}

impl fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusEvent::Debit { amount, level } => {
                write!(f, "[Power] Action Consumption: -{amount:.2}%, Battery Level: {level:.2}%")
            }
            StatusEvent::ActionCommitted { subsystem, action, cost, level } => {
                write!(f, "[{subsystem}] {action} completed: -{cost:.2}%, Battery: {level:.2}%")
            }
            StatusEvent::ActionRejected { subsystem, action, cost, level } => write!(
                f,
                "[{subsystem}] {action} canceled: needs {cost:.2}%, Battery: {level:.2}%"
            ),
            StatusEvent::PayloadDeactivated { kind, level } => {
                write!(f, "[Payload] {kind} deactivated. Battery: {level:.3}%")
            }
            StatusEvent::PayloadReport(status) => write!(
                f,
                "[Payload Status] Payload Type: {}, Active: {}, Total Runtime (min): {}, In Earth's Shadow: {}",
                status.kind, status.active, status.total_runtime_min, status.in_earth_shadow
            ),
            StatusEvent::AttitudeReport { altitude_km, orientation } => write!(
                f,
                "[Attitude] Altitude: {altitude_km} km, Orientation (pitch, roll, yaw): {orientation:?}"
            ),
            StatusEvent::SensorAlert { code, sensor } => write!(
                f,
                "[ALERT #{code:02}] {sensor} malfunction detected! Notifying mission control."
            ),
            StatusEvent::ChargingAnomaly { level } => write!(
                f,
                "[ECLIPSE/MALFUNCTION] No power charging detected during sunlight phase. \
                 Possible eclipse or solar panel malfunction. Switching to battery power. Battery: {level:.2}%"
            ),
            StatusEvent::SolarNominal { level } => write!(
                f,
                "[POWER] Solar panels charging as expected during sunlight phase. Battery: {level:.2}%"
            ),
            StatusEvent::Eclipse { level } => write!(
                f,
                "[ECLIPSE] Spacecraft is in eclipse (no sunlight). Switching to battery power. Battery: {level:.2}%"
            ),
            StatusEvent::PayloadInEclipse { kind, level } => write!(
                f,
                "[CAUTION] {kind} active in Earth's shadow below charging band. Battery: {level:.2}%"
            ),
            StatusEvent::Summary { messages, chars, cost, level } => write!(
                f,
                "[Comms] Summary of {messages} messages ({chars} chars): -{cost:.4}%, Battery Level: {level:.2}%"
            ),
        }
    }
}

/// One entry of the downlink transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransmittedStatus {
    pub event: StatusEvent,
    pub weight: usize,
    pub cost: f64,
    /// Whether the ledger accepted the transmission cost.
    pub charged: bool,
    /// Emitted from inside a summary flush.
    pub during_summary: bool,
}
