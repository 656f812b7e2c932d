use crate::dispatch::capability::Capability;
use std::time::Duration;
use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `sms-locator`.
///
/// Each stage of the dispatch workflow defines its own error type. The
/// controller folds all of them into a human-readable `Failed` message at
/// its boundary; library callers that drive the stages directly can match
/// on these to decide what to show.
#[derive(Debug, Error)]
pub enum LocatorError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Destination input ───────────────────────────────────────────────
    #[error("destination: {0}")]
    Validation(#[from] ValidationError),

    // ── Capability gate ─────────────────────────────────────────────────
    #[error("capability: {0}")]
    Capability(#[from] CapabilityMissing),

    // ── Position fix ────────────────────────────────────────────────────
    #[error("acquisition: {0}")]
    Acquisition(#[from] AcquisitionError),

    // ── Messaging transport ─────────────────────────────────────────────
    #[error("transmission: {0}")]
    Transmission(#[from] TransmissionError),

    // ── Controller handle ───────────────────────────────────────────────
    #[error("controller: {0}")]
    Handle(#[from] HandleError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Destination validation ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no destination entered")]
    Empty,

    #[error("{reason}")]
    Malformed { reason: String },
}

// ─── Capability gate ────────────────────────────────────────────────────────

/// One or both required capabilities are not granted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing capability: {}", format_missing(.missing))]
pub struct CapabilityMissing {
    pub missing: Vec<Capability>,
}

fn format_missing(missing: &[Capability]) -> String {
    missing
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

// ─── Position fix ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("no position fix available")]
    NoFixAvailable,

    #[error("positioning permission revoked")]
    PermissionRevoked,

    #[error("no position fix within {}s", .0.as_secs())]
    TimedOut(Duration),

    #[error("positioning provider error: {0:#}")]
    Provider(anyhow::Error),
}

// ─── Messaging transport ────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum TransmissionError {
    #[error("transport {transport} rejected the message: {message}")]
    Rejected { transport: String, message: String },

    #[error("transport {transport} failed: {cause:#}")]
    Failed {
        transport: String,
        cause: anyhow::Error,
    },
}

// ─── Controller handle ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HandleError {
    #[error("dispatch controller has shut down")]
    Closed,
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, LocatorError>;
