//! Cepstral analysis algorithms
//!
//! - `cepstrum` - classical real cepstrum of a tapered window
//! - `quantum` - quantum-simulated twin of the classical pipeline
//! - `peaks` - echo candidate extraction from a cepstrum
//! - `batch` - parallel windowed analysis of long recordings

pub mod batch;
mod cepstrum;
mod peaks;
mod quantum;

pub use batch::{analyze_windows, analyze_windows_with, window_offsets, WindowReport};
pub use cepstrum::{
    floored_bins, log_magnitude, prepare_window, CepstralEngine, Cepstrum, LOG_MAGNITUDE_FLOOR,
};
pub use peaks::{EchoCandidate, PeakDetector, STRENGTH_TIE_TOLERANCE};
pub use quantum::{measure, QuantumSimulatedPipeline, QuantumState, DEFAULT_MEASUREMENT_SHOTS};
