use crate::config::EnergyConfig;
use crate::subsystems::{ChargingMode, EnergyLedger, TelemetryChannel};
use crate::telemetry::StatusEvent;

/// One ledger wired to one telemetry channel.
///
/// Consumers borrow the bus for the duration of a call. Both collaborators are
/// required at construction, so a half-wired bus cannot exist.
#[derive(Debug)]
pub struct PowerBus {
    ledger: EnergyLedger,
    telemetry: TelemetryChannel,
}

impl PowerBus {
    pub fn new(ledger: EnergyLedger, telemetry: TelemetryChannel) -> Self {
        Self { ledger, telemetry }
    }

    pub fn from_config(config: &EnergyConfig) -> Self {
        Self::new(
            EnergyLedger::from_config(&config.ledger),
            TelemetryChannel::with_config(config.telemetry.clone()),
        )
    }

    /// Debit the ledger; a logged debit is also transmitted.
    pub fn consume(&mut self, amount: f64, log: bool) -> bool {
        let accepted = self.ledger.consume(amount, log);
        if accepted && log {
            let event = StatusEvent::Debit {
                amount,
                level: self.ledger.charge_level(),
            };
            self.telemetry.send(&mut self.ledger, event, false);
        }
        accepted
    }

    pub fn advance(&mut self, dt: f64) {
        self.ledger.advance(dt);
    }

    pub fn force_mode(&mut self, mode: ChargingMode) {
        self.ledger.force_mode(mode);
    }

    /// Transmit a status event, paid for by the ledger.
    pub fn report(&mut self, event: StatusEvent, skip_summary: bool) {
        self.telemetry.send(&mut self.ledger, event, skip_summary);
    }

    pub fn flush(&mut self) {
        self.telemetry.flush(&mut self.ledger);
    }

    pub fn charge_level(&self) -> f64 {
        self.ledger.charge_level()
    }

    pub fn charging_mode(&self) -> ChargingMode {
        self.ledger.charging_mode()
    }

    pub fn ledger(&self) -> &EnergyLedger {
        &self.ledger
    }

    pub fn telemetry(&self) -> &TelemetryChannel {
        &self.telemetry
    }

    pub fn telemetry_mut(&mut self) -> &mut TelemetryChannel {
        &mut self.telemetry
    }
}

impl Default for PowerBus {
    fn default() -> Self {
        Self::new(EnergyLedger::new(), TelemetryChannel::new())
    }
}
