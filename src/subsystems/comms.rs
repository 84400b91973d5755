use super::power::EnergyLedger;
use crate::config::TelemetryConfig;
use crate::telemetry::{StatusEvent, TransmittedStatus};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryStats {
    pub messages_sent: u32,
    pub charges_rejected: u32,
    pub flushes_completed: u32,
    pub summaries_dropped: u32,
    pub reentries_blocked: u32,
    pub energy_spent: f64,
}

/// Downlink channel whose transmissions are paid for out of the energy ledger.
///
/// Each message costs `per_char_cost` per character. Once `flush_threshold`
/// messages have accumulated the channel folds them into one summary charged at
/// the cheaper `summary_per_char_cost`. The summary line is itself transmitted
/// through [`send`](Self::send), so `in_summary` keeps that path from flushing
/// again.
#[derive(Debug)]
pub struct TelemetryChannel {
    config: TelemetryConfig,
    pending_weights: Vec<usize>,
    in_summary: bool,
    flush_depth: u8,
    max_flush_depth: u8,
    transcript: Vec<TransmittedStatus>,
    stats: TelemetryStats,
}

impl TelemetryChannel {
    pub fn new() -> Self {
        Self::with_config(TelemetryConfig::default())
    }

    pub fn with_config(config: TelemetryConfig) -> Self {
        Self {
            config,
            pending_weights: Vec::new(),
            in_summary: false,
            flush_depth: 0,
            max_flush_depth: 0,
            transcript: Vec::new(),
            stats: TelemetryStats::default(),
        }
    }

    /// Transmit one status event and charge the ledger for it.
    ///
    /// A rejected charge does not stop the transmission. Messages sent while a
    /// summary is in progress are not queued for the next summary and never
    /// trigger one.
    pub fn send(&mut self, ledger: &mut EnergyLedger, event: StatusEvent, skip_summary: bool) {
        let weight = event.weight();
        let during_summary = self.in_summary;

        if !during_summary {
            self.pending_weights.push(weight);
        }

        let cost = self.config.per_char_cost * weight as f64;
        let charged = ledger.consume(cost, false);
        if charged {
            self.stats.energy_spent += cost;
        } else {
            self.stats.charges_rejected += 1;
            warn!(cost, level = ledger.charge_level(), "[Power] Not enough battery to send this message");
        }

        debug!(chars = weight, cost, charged, "[Comms] Transmitting: {}", event);
        self.stats.messages_sent += 1;
        self.transcript.push(TransmittedStatus {
            event,
            weight,
            cost,
            charged,
            during_summary,
        });

        if !skip_summary && !during_summary && self.pending_weights.len() >= self.config.flush_threshold {
            self.flush(ledger);
        }
    }

    /// Fold pending messages into one batched summary transmission.
    ///
    /// Pending weights are cleared whether or not the ledger could pay for the
    /// summary; an unaffordable summary line is dropped.
    pub fn flush(&mut self, ledger: &mut EnergyLedger) {
        if self.in_summary {
            self.stats.reentries_blocked += 1;
            warn!("flush requested while a summary is already in progress");
            return;
        }
        if self.pending_weights.is_empty() {
            return;
        }

        self.in_summary = true;
        self.flush_depth += 1;
        self.max_flush_depth = self.max_flush_depth.max(self.flush_depth);

        let messages = self.pending_weights.len();
        let chars: usize = self.pending_weights.iter().sum();
        let cost = self.config.summary_per_char_cost * chars as f64;
        trace!(messages, chars, cost, "[Comms] summarizing");

        if ledger.consume(cost, false) {
            self.stats.energy_spent += cost;
            let summary = StatusEvent::Summary {
                messages,
                chars,
                cost,
                level: ledger.charge_level(),
            };
            self.send(ledger, summary, true);
        } else {
            self.stats.summaries_dropped += 1;
            warn!(cost, level = ledger.charge_level(), "[Power] Not enough battery to send summary");
        }

        self.pending_weights.clear();
        self.stats.flushes_completed += 1;
        self.flush_depth -= 1;
        self.in_summary = false;
    }

    pub fn pending_count(&self) -> usize {
        self.pending_weights.len()
    }

    pub fn pending_weight(&self) -> usize {
        self.pending_weights.iter().sum()
    }

    pub fn is_in_summary(&self) -> bool {
        self.in_summary
    }

    /// Deepest flush nesting observed so far.
    pub fn max_flush_depth(&self) -> u8 {
        self.max_flush_depth
    }

    pub fn flush_threshold(&self) -> usize {
        self.config.flush_threshold
    }

    pub fn transcript(&self) -> &[TransmittedStatus] {
        &self.transcript
    }

    pub fn drain_transcript(&mut self) -> Vec<TransmittedStatus> {
        core::mem::take(&mut self.transcript)
    }

    pub fn stats(&self) -> &TelemetryStats {
        &self.stats
    }
}

impl Default for TelemetryChannel {
    fn default() -> Self {
        Self::new()
    }
}
