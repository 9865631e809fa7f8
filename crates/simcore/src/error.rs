use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::WheelId;

/// Faults raised while stepping the simulation.
#[derive(Debug, Error)]
pub enum SimError {
    /// Non-physical loaded radius or velocity singularity on one wheel.
    /// The tire model recovers from this locally by clamping.
    #[error("degenerate tire state on {wheel} wheel: loaded radius {radius:.5} m")]
    DegenerateTireState { wheel: WheelId, radius: f64 },

    #[error("invalid gear transition: requested gear {requested} but the gearbox has {gears} forward gears")]
    InvalidGearTransition { requested: i32, gears: usize },

    /// A state quantity left its sanity bounds; the run cannot continue.
    #[error("simulation diverged at t = {t:.4} s: {quantity} = {value}")]
    Divergence {
        t: f64,
        quantity: &'static str,
        value: f64,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("output sink failed: {0}")]
    Output(#[from] io::Error),
}

/// Problems with parameter files or the driver input series, raised before the loop starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed input on line {line}: {reason}")]
    MalformedInput { line: usize, reason: String },

    #[error("invalid parameter `{field}`: {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Fails with [`ConfigError::Invalid`] unless `value` is finite and strictly positive.
pub fn require_positive(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be positive, got {value}")))
    }
}

/// Fails unless `value` is finite and not negative.
pub fn require_non_negative(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be non-negative, got {value}")))
    }
}
