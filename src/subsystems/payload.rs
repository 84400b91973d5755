use super::{ActionOutcome, EnergyConsumer, ReportPolicy, SubsystemId};
use crate::bus::PowerBus;
use crate::config::ConsumerConfig;
use crate::error::ConfigError;
use crate::telemetry::StatusEvent;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayloadKind {
    SarRadar,
    CloudSeedingDevice,
    IonosphericParticleCollector,
}

impl PayloadKind {
    pub const ALL: [PayloadKind; 3] = [
        PayloadKind::SarRadar,
        PayloadKind::CloudSeedingDevice,
        PayloadKind::IonosphericParticleCollector,
    ];

    /// Battery percent per minute of operation.
    pub fn consumption_rate(self) -> f64 {
        match self {
            PayloadKind::SarRadar => 1.5,
            PayloadKind::CloudSeedingDevice => 2.0,
            PayloadKind::IonosphericParticleCollector => 1.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PayloadKind::SarRadar => "SAR Radar",
            PayloadKind::CloudSeedingDevice => "Cloud Seeding Device",
            PayloadKind::IonosphericParticleCollector => "Ionospheric Particle Collector",
        }
    }
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PayloadKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        PayloadKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ConfigError::UnknownPayload(wanted.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadStatus {
    pub kind: PayloadKind,
    pub active: bool,
    pub total_runtime_min: f64,
    pub in_earth_shadow: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PayloadAction {
    Activate,
    Operate { dt: f64, in_shadow: bool },
}

impl fmt::Display for PayloadAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadAction::Activate => f.write_str("Activation"),
            PayloadAction::Operate { dt, in_shadow } => {
                let visibility = if *in_shadow { "in Earth's shadow" } else { "in sunlight" };
                write!(f, "Operation for {dt} min ({visibility})")
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct PayloadSubsystem {
    kind: PayloadKind,
    active: bool,
    total_runtime_min: f64,
    in_earth_shadow: bool,
    activation_cost: f64,
}

impl PayloadSubsystem {
    pub fn new(kind: PayloadKind) -> Self {
        Self::with_config(kind, &ConsumerConfig::default())
    }

    pub fn with_config(kind: PayloadKind, config: &ConsumerConfig) -> Self {
        Self {
            kind,
            active: false,
            total_runtime_min: 0.0,
            in_earth_shadow: false,
            activation_cost: config.payload_activation_cost,
        }
    }

    pub fn activate(&mut self, bus: &mut PowerBus) -> ActionOutcome {
        if self.active {
            return ActionOutcome::Unchanged;
        }
        self.negotiate(bus, PayloadAction::Activate)
    }

    /// Switch the payload off. Free of charge.
    pub fn deactivate(&mut self, bus: &mut PowerBus) -> ActionOutcome {
        if !self.active {
            return ActionOutcome::Unchanged;
        }
        self.reset();
        info!(payload = %self.kind, "payload deactivated");
        let event = StatusEvent::PayloadDeactivated {
            kind: self.kind,
            level: bus.charge_level(),
        };
        bus.report(event, true);
        ActionOutcome::Committed { cost: 0.0 }
    }

    /// Run an active payload for `dt` minutes. An unaffordable interval stops it.
    pub fn update_operation(&mut self, bus: &mut PowerBus, dt: f64, in_shadow: bool) -> ActionOutcome {
        self.in_earth_shadow = in_shadow;
        if !self.active {
            return ActionOutcome::Unchanged;
        }
        self.negotiate(bus, PayloadAction::Operate { dt, in_shadow })
    }

    pub fn status(&self) -> PayloadStatus {
        PayloadStatus {
            kind: self.kind,
            active: self.active,
            total_runtime_min: self.total_runtime_min,
            in_earth_shadow: self.in_earth_shadow,
        }
    }

    /// Transmit the current status and return it.
    pub fn report_status(&self, bus: &mut PowerBus) -> PayloadStatus {
        let status = self.status();
        bus.report(StatusEvent::PayloadReport(status.clone()), true);
        status
    }

    pub fn set_kind(&mut self, kind: PayloadKind) {
        self.kind = kind;
        self.reset();
    }

    pub fn set_kind_by_name(&mut self, name: &str) -> Result<(), ConfigError> {
        let kind = name.parse()?;
        self.set_kind(kind);
        Ok(())
    }

    pub fn reset(&mut self) {
        self.active = false;
        self.total_runtime_min = 0.0;
        self.in_earth_shadow = false;
    }

    pub fn kind(&self) -> PayloadKind {
        self.kind
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn total_runtime_min(&self) -> f64 {
        self.total_runtime_min
    }
}

impl EnergyConsumer for PayloadSubsystem {
    type Action = PayloadAction;

    fn id(&self) -> SubsystemId {
        SubsystemId::Payload
    }

    fn energy_cost(&self, action: &Self::Action) -> f64 {
        match action {
            PayloadAction::Activate => self.activation_cost,
            PayloadAction::Operate { dt, .. } => self.kind.consumption_rate() * dt,
        }
    }

    fn commit(&mut self, action: Self::Action) {
        match action {
            PayloadAction::Activate => self.active = true,
            PayloadAction::Operate { dt, .. } => self.total_runtime_min += dt,
        }
    }

    fn on_rejected(&mut self, action: &Self::Action) {
        if let PayloadAction::Operate { .. } = action {
            info!(payload = %self.kind, "payload stopped: insufficient power");
            self.active = false;
        }
    }

    fn report_policy(&self, action: &Self::Action) -> ReportPolicy {
        match action {
            PayloadAction::Activate => ReportPolicy { log_debit: false, routine: false },
            PayloadAction::Operate { .. } => ReportPolicy { log_debit: true, routine: true },
        }
    }
}
