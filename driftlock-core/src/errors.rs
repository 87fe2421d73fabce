//! Error taxonomy for the demodulator core.

use thiserror::Error;

/// Top-level error type surfaced to callers of `driftlock-core`.
#[derive(Debug, Error)]
pub enum DriftlockError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("source error: {0}")]
    Source(#[from] SourceError),

    #[error("sink error: {0}")]
    Sink(#[from] SinkError),
}

/// Raised synchronously by `Demod::init` before any worker is spawned.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("interpolation factor L must be positive, got {0}")]
    InvalidL(usize),

    #[error("symbol rate must be positive, got {0}")]
    InvalidSymRate(f64),

    #[error("roll-off alpha must be in (0, 1], got {0}")]
    InvalidAlpha(f64),

    #[error("RRC order must be positive, got {0}")]
    InvalidOrder(usize),
}

/// Backend source failures: anything other than a clean end-of-stream.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SourceError {
    #[error("source reported an impossible size: {0}")]
    Fault(String),
}

/// Output sink failures.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SinkError {
    #[error("sink write failed: {0}")]
    WriteFailed(String),
}

/// Result type alias for Driftlock operations.
pub type Result<T> = std::result::Result<T, DriftlockError>;
