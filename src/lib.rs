//! # Spacecraft Energy Economy Core
//!
//! A deterministic, single-threaded simulation of the energy budget shared by every
//! subsystem on a small spacecraft: one battery ledger, the hysteresis band that
//! decides when solar charging kicks in, and a telemetry link whose own status
//! reports cost energy.
//!
//! ## Features
//!
//! - **Energy ledger**: bounded battery percentage with a single consumption entry point
//! - **Charging hysteresis**: enter solar charging below 30%, leave it at 95%
//! - **Self-charging telemetry**: per-character transmission cost with batched summaries
//!   guarded against reentrant flushing
//! - **Power-source state machine**: sunlight/eclipse overrides layered over the band
//! - **Energy negotiation**: a shared trait every costed subsystem implements
//! - **Anomaly monitoring**: sensor alerts, eclipse handling and payload observation
//!
//! ## Quick Start
//!
//! ```rust
//! use satpower::{Spacecraft, SpacecraftInfo};
//! use satpower::subsystems::payload::PayloadKind;
//!
//! let mut craft = Spacecraft::builder(SpacecraftInfo::default())
//!     .with_default_power()
//!     .payload(PayloadKind::SarRadar)
//!     .build()
//!     .expect("ledger and telemetry are wired");
//!
//! craft.activate_payload();
//! craft.step(1.0, true, true);
//!
//! for status in craft.bus().telemetry().transcript() {
//!     println!("{}", status.event);
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`subsystems`] - ledger, telemetry channel and the energy consumers
//! - [`bus`] - the wiring of one ledger to one telemetry channel
//! - [`power_source`] - external sunlight/charging overrides
//! - [`anomaly`] - sensor, eclipse and payload monitoring
//! - [`telemetry`] - structured status events and their text formatting
//! - [`agent`] - the spacecraft entity and its builder
//! - [`config`] - shared thresholds and rate constants

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]

pub mod agent;
pub mod anomaly;
pub mod bus;
pub mod config;
pub mod error;
pub mod power_source;
pub mod subsystems;
pub mod telemetry;

// Re-export main public types for convenience
pub use agent::{Spacecraft, SpacecraftBuilder, SpacecraftInfo};
pub use bus::PowerBus;
pub use config::EnergyConfig;
pub use error::{BuildError, ConfigError, UsageFault};
pub use subsystems::{ChargingMode, EnergyConsumer, EnergyLedger, TelemetryChannel};
pub use telemetry::StatusEvent;
