use crate::config::{LedgerConfig, FULL_CHARGE};
use core::fmt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargingMode {
    Battery,
    Solar,
}

impl fmt::Display for ChargingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChargingMode::Battery => f.write_str("battery"),
            ChargingMode::Solar => f.write_str("solar"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerState {
    pub level: f64,
    pub mode: ChargingMode,
    pub override_pending: bool,
    pub transitions: u32,
}

/// The single authoritative store of remaining battery percentage.
///
/// `level` stays within `[0, 100]`; anything that would leave that range is
/// clamped. The charging mode follows a hysteresis band: solar charging starts
/// once the level drops below the lower threshold and stops, clamped, at the
/// upper threshold.
#[derive(Debug, Clone)]
pub struct EnergyLedger {
    level: f64,
    mode: ChargingMode,
    lower_threshold: f64,
    upper_threshold: f64,
    passive_drain_rate: f64,
    passive_charge_rate: f64,
    override_pending: bool,
    transitions: u32,
}

impl EnergyLedger {
    pub fn new() -> Self {
        Self::from_config(&LedgerConfig::default())
    }

    /// Build from a configuration; callers validate it first.
    pub fn from_config(config: &LedgerConfig) -> Self {
        Self {
            level: config.initial_level.clamp(0.0, FULL_CHARGE),
            mode: ChargingMode::Battery,
            lower_threshold: config.lower_threshold,
            upper_threshold: config.upper_threshold,
            passive_drain_rate: config.passive_drain_rate,
            passive_charge_rate: config.passive_charge_rate,
            override_pending: false,
            transitions: 0,
        }
    }

    /// Default thresholds and rates, starting from `level`.
    pub fn with_level(level: f64) -> Self {
        Self::from_config(&LedgerConfig {
            initial_level: level,
            ..LedgerConfig::default()
        })
    }

    /// Debit `amount` percent if the battery holds at least that much.
    ///
    /// Returns `false` without touching the level when the battery is short or
    /// the amount is negative or not finite.
    pub fn consume(&mut self, amount: f64, log: bool) -> bool {
        if !amount.is_finite() || amount < 0.0 {
            debug!(amount, "refusing malformed debit");
            return false;
        }

        if self.level < amount {
            trace!(amount, level = self.level, "debit refused: insufficient energy");
            return false;
        }

        self.level = (self.level - amount).max(0.0);
        self.apply_hysteresis();

        if log {
            info!(amount, level = self.level, "[Power] action consumption");
        }

        debug_assert!(
            (0.0..=FULL_CHARGE).contains(&self.level),
            "Battery level {} outside [0, 100]",
            self.level
        );
        true
    }

    /// Apply `dt` minutes of background drain or solar recharge.
    pub fn advance(&mut self, dt: f64) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }

        match self.mode {
            ChargingMode::Battery => {
                self.level = (self.level - self.passive_drain_rate * dt).max(0.0);
            }
            ChargingMode::Solar => {
                self.level = (self.level + self.passive_charge_rate * dt).min(FULL_CHARGE);
            }
        }
        trace!(dt, level = self.level, mode = %self.mode, "ledger advanced");

        self.apply_hysteresis();
    }

    pub fn charge_level(&self) -> f64 {
        self.level
    }

    pub fn charging_mode(&self) -> ChargingMode {
        self.mode
    }

    /// External override of the charging mode.
    ///
    /// Suppresses the automatic low-battery switch for the next hysteresis
    /// evaluation only; after that the band applies again unless forced again.
    pub fn force_mode(&mut self, mode: ChargingMode) {
        if self.mode != mode {
            info!(from = %self.mode, to = %mode, level = self.level, "charging mode forced");
            self.mode = mode;
            self.transitions = self.transitions.wrapping_add(1);
        }
        self.override_pending = true;
    }

    pub fn is_override_pending(&self) -> bool {
        self.override_pending
    }

    pub fn lower_threshold(&self) -> f64 {
        self.lower_threshold
    }

    pub fn upper_threshold(&self) -> f64 {
        self.upper_threshold
    }

    pub fn state(&self) -> LedgerState {
        LedgerState {
            level: self.level,
            mode: self.mode,
            override_pending: self.override_pending,
            transitions: self.transitions,
        }
    }

    fn apply_hysteresis(&mut self) {
        let override_active = core::mem::replace(&mut self.override_pending, false);

        match self.mode {
            ChargingMode::Battery if self.level < self.lower_threshold && !override_active => {
                self.mode = ChargingMode::Solar;
                self.transitions = self.transitions.wrapping_add(1);
                info!(level = self.level, "[Power] Low battery: initializing solar charging");
            }
            ChargingMode::Solar if self.level >= self.upper_threshold => {
                self.level = self.upper_threshold;
                self.mode = ChargingMode::Battery;
                self.transitions = self.transitions.wrapping_add(1);
                info!(level = self.level, "[Power] Battery at upper threshold, stopping solar charging");
            }
            _ => {}
        }
    }
}

impl Default for EnergyLedger {
    fn default() -> Self {
        Self::new()
    }
}
