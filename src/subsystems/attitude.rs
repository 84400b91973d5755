use super::{ActionOutcome, EnergyConsumer, SubsystemId};
use crate::bus::PowerBus;
use crate::config::ConsumerConfig;
use crate::telemetry::StatusEvent;
use core::fmt;

/// Pitch, roll, yaw in degrees.
pub type Orientation = [f64; 3];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttitudeAction {
    ChangeAltitude { target_km: f64 },
    Reorient { target: Orientation },
}

impl fmt::Display for AttitudeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttitudeAction::ChangeAltitude { target_km } => write!(f, "Maneuver to {target_km} km"),
            AttitudeAction::Reorient { target } => write!(f, "Reorientation to {target:?}"),
        }
    }
}

/// Altitude and orientation actuators. Costs follow the size of the change.
#[derive(Debug, Clone)]
pub struct AttitudeControl {
    altitude_km: f64,
    orientation: Orientation,
    altitude_cost_per_km: f64,
    degrees_per_percent: f64,
}

impl AttitudeControl {
    pub fn new(altitude_km: f64) -> Self {
        Self::with_config(altitude_km, &ConsumerConfig::default())
    }

    pub fn with_config(altitude_km: f64, config: &ConsumerConfig) -> Self {
        Self {
            altitude_km,
            orientation: [0.0; 3],
            altitude_cost_per_km: config.altitude_cost_per_km,
            degrees_per_percent: config.degrees_per_percent,
        }
    }

    pub fn change_altitude(&mut self, bus: &mut PowerBus, target_km: f64) -> ActionOutcome {
        self.negotiate(bus, AttitudeAction::ChangeAltitude { target_km })
    }

    pub fn reorient(&mut self, bus: &mut PowerBus, target: Orientation) -> ActionOutcome {
        self.negotiate(bus, AttitudeAction::Reorient { target })
    }

    pub fn report(&self, bus: &mut PowerBus) {
        let event = StatusEvent::AttitudeReport {
            altitude_km: self.altitude_km,
            orientation: self.orientation,
        };
        bus.report(event, true);
    }

    pub fn altitude_km(&self) -> f64 {
        self.altitude_km
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }
}

impl EnergyConsumer for AttitudeControl {
    type Action = AttitudeAction;

    fn id(&self) -> SubsystemId {
        SubsystemId::Attitude
    }

    fn energy_cost(&self, action: &Self::Action) -> f64 {
        match action {
            AttitudeAction::ChangeAltitude { target_km } => {
                (target_km - self.altitude_km).abs() * self.altitude_cost_per_km
            }
            AttitudeAction::Reorient { target } => {
                let delta_degrees: f64 = self
                    .orientation
                    .iter()
                    .zip(target.iter())
                    .map(|(current, wanted)| (current - wanted).abs())
                    .sum();
                delta_degrees / self.degrees_per_percent
            }
        }
    }

    fn commit(&mut self, action: Self::Action) {
        match action {
            AttitudeAction::ChangeAltitude { target_km } => self.altitude_km = target_km,
            AttitudeAction::Reorient { target } => self.orientation = target,
        }
    }
}
