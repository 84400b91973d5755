use core::fmt;
use thiserror::Error;

/// A collaborator every costed subsystem depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collaborator {
    Ledger,
    Telemetry,
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Collaborator::Ledger => write!(f, "energy ledger"),
            Collaborator::Telemetry => write!(f, "telemetry channel"),
        }
    }
}

/// Misuse of the wiring API. Fatal to the call; no state is touched.
///
/// Running out of energy is not a usage fault: `consume` answers `false` and
/// consumers report [`crate::subsystems::ActionOutcome::Rejected`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageFault {
    #[error("subsystems not connected: missing {collaborator}")]
    NotConnected { collaborator: Collaborator },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid hysteresis band: lower {lower} must be positive and below upper {upper} (upper <= 100)")]
    InvalidBand { lower: f64, upper: f64 },
    #[error("{field} must be positive and finite, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
    #[error("summary cost per char ({summary}) must be below per-message cost ({per_char})")]
    SummaryNotCheaper { per_char: f64, summary: f64 },
    #[error("flush threshold must be at least one message")]
    ZeroFlushThreshold,
    #[error("unsupported payload type: {0}")]
    UnknownPayload(String),
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why [`crate::SpacecraftBuilder::build`] refused to produce a spacecraft.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Wiring(#[from] UsageFault),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
