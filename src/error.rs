//! Error types for echo analysis

use thiserror::Error;

/// Result type for echo analysis operations
pub type EchoResult<T> = Result<T, EchoError>;

/// Errors surfaced synchronously by the analysis engine.
///
/// Every variant carries the parameter that caused it so callers can report
/// which window, size or setting was rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EchoError {
    /// Malformed input data (empty, non-finite, non-positive sample rate)
    #[error("Invalid signal: {reason}")]
    InvalidSignal { reason: String },

    /// Analysis window longer than the signal it is taken from
    #[error("Window of {window_size} samples exceeds signal length {signal_len}")]
    WindowTooLarge { window_size: usize, signal_len: usize },

    /// Transform size rejected for the requested pipeline
    #[error("Invalid transform size {size}: {reason}")]
    InvalidTransformSize { size: usize, reason: String },

    /// Inverse transform left more imaginary residue than allowed
    #[error("Numerical instability: imaginary residue {residue:.3e} exceeds tolerance {tolerance:.3e}")]
    NumericalInstability { residue: f64, tolerance: f64 },

    /// Configuration value outside its valid range
    #[error("Invalid configuration for '{parameter}': {reason}")]
    InvalidConfig { parameter: &'static str, reason: String },

    /// Batch run stopped by the caller
    #[error("Cancelled after {completed} of {total} windows")]
    Cancelled { completed: usize, total: usize },
}

impl EchoError {
    pub fn invalid_signal(reason: impl Into<String>) -> Self {
        Self::InvalidSignal { reason: reason.into() }
    }

    pub fn invalid_config(parameter: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            parameter,
            reason: reason.into(),
        }
    }

    /// Stable machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            EchoError::InvalidSignal { .. } => "invalid_signal",
            EchoError::WindowTooLarge { .. } => "window_too_large",
            EchoError::InvalidTransformSize { .. } => "invalid_transform_size",
            EchoError::NumericalInstability { .. } => "numerical_instability",
            EchoError::InvalidConfig { .. } => "invalid_config",
            EchoError::Cancelled { .. } => "cancelled",
        }
    }
}
