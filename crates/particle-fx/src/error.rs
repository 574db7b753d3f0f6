use std::io;
use thiserror::Error;

/// Error types for particle simulation and rendering hand-off
#[derive(Error, Debug)]
pub enum ParticleError {
    /// A caller broke an API contract (mismatched render buffers, bad time step)
    #[error("Contract violation: {0}")]
    ContractViolation(String),

    /// Configuration values that cannot drive a simulation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A scene lookup named an emitter that was never registered
    #[error("Unknown emitter: {0}")]
    UnknownEmitter(String),

    /// I/O error while reading a scene description
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Scene description could not be decoded
    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type using ParticleError
pub type Result<T> = std::result::Result<T, ParticleError>;

/// Reject negative or non-finite frame deltas.
pub(crate) fn check_delta(delta_time: f32) -> Result<()> {
    if delta_time.is_finite() && delta_time >= 0.0 {
        Ok(())
    } else {
        Err(ParticleError::ContractViolation(format!(
            "delta time must be finite and non-negative, got {delta_time}"
        )))
    }
}
