pub mod attitude;
pub mod comms;
pub mod payload;
pub mod power;

pub use attitude::{AttitudeAction, AttitudeControl};
pub use comms::{TelemetryChannel, TelemetryStats};
pub use payload::{PayloadAction, PayloadKind, PayloadSubsystem};
pub use power::{ChargingMode, EnergyLedger, LedgerState};

use crate::bus::PowerBus;
use crate::telemetry::StatusEvent;
use core::fmt;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubsystemId {
    Power,
    Comms,
    Attitude,
    Payload,
}

impl fmt::Display for SubsystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SubsystemId::Power => "Power",
            SubsystemId::Comms => "Comms",
            SubsystemId::Attitude => "Attitude",
            SubsystemId::Payload => "Payload",
        };
        f.write_str(name)
    }
}

/// Result of a costed action. Running short of energy is an expected outcome,
/// not an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActionOutcome {
    Committed { cost: f64 },
    Rejected { cost: f64 },
    /// Nothing to do (already in the requested state).
    Unchanged,
}

impl ActionOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, ActionOutcome::Committed { .. })
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, ActionOutcome::Rejected { .. })
    }
}

/// How an action's debit and success status are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportPolicy {
    /// Emit a telemetry line for the ledger debit itself.
    pub log_debit: bool,
    /// Success status is routine traffic and does not count toward a summary flush.
    pub routine: bool,
}

impl Default for ReportPolicy {
    fn default() -> Self {
        Self { log_debit: true, routine: false }
    }
}

/// The energy negotiation every costed subsystem goes through.
///
/// Implementors supply the cost model and the state change; [`negotiate`](Self::negotiate)
/// owns the ordering: price the action, ask the ledger, then either commit or
/// back out. Nothing else may touch the battery level.
pub trait EnergyConsumer {
    type Action: fmt::Display;

    fn id(&self) -> SubsystemId;

    /// Deterministic cost in battery percent.
    fn energy_cost(&self, action: &Self::Action) -> f64;

    /// Apply the state change once the ledger accepted the debit.
    fn commit(&mut self, action: Self::Action);

    /// React to a refused debit. The tentative change is simply never applied.
    fn on_rejected(&mut self, _action: &Self::Action) {}

    fn report_policy(&self, _action: &Self::Action) -> ReportPolicy {
        ReportPolicy::default()
    }

    fn negotiate(&mut self, bus: &mut PowerBus, action: Self::Action) -> ActionOutcome {
        let cost = self.energy_cost(&action);
        let policy = self.report_policy(&action);
        let description = action.to_string();

        if bus.consume(cost, policy.log_debit) {
            self.commit(action);
            debug!(subsystem = %self.id(), action = %description, cost, "action committed");
            let event = StatusEvent::ActionCommitted {
                subsystem: self.id(),
                action: description,
                cost,
                level: bus.charge_level(),
            };
            bus.report(event, policy.routine);
            ActionOutcome::Committed { cost }
        } else {
            self.on_rejected(&action);
            warn!(subsystem = %self.id(), action = %description, cost, "action rejected: insufficient energy");
            let event = StatusEvent::ActionRejected {
                subsystem: self.id(),
                action: description,
                cost,
                level: bus.charge_level(),
            };
            bus.report(event, false);
            ActionOutcome::Rejected { cost }
        }
    }
}
