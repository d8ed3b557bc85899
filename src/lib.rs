//! EchoCheckr - Detect echoes in sampled pressure-wave signals
//!
//! Separates a source waveform from its delayed, attenuated copies (for
//! example arterial pulse reflections) using cepstral analysis.
//!
//! ## Features
//!
//! - **Classical cepstrum**: taper, FFT, floored log-magnitude, inverse FFT
//! - **Quantum-simulated twin**: the same stages expressed as state
//!   preparation, QFT, logarithm, inverse QFT and measurement on a simulated
//!   state vector, for benchmarking against the classical path
//! - **Scale-invariant peak picking**: strengths in standard deviations of
//!   the cepstrum, deterministic ranking
//! - **Reflection estimates**: calibrated coefficients and severity grades
//! - **Batch windows**: parallel analysis of long recordings with
//!   cooperative cancellation
//!
//! ## Module Structure
//!
//! - `core` - Signal model, transforms and cepstral analysis
//! - `cli` - Command-line interface
//! - `config` - Analysis configuration and profiles
//! - `detection` - Result types and reporting
//! - `testgen` - Synthetic signals with known echoes
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use echocheckr::core::EchoAnalyzer;
//! use echocheckr::testgen::SyntheticScenario;
//!
//! let composite = SyntheticScenario::default().with_echo(0.2, 0.5)?.build()?;
//! let analyzer = EchoAnalyzer::builder().window_size(1000).build()?;
//! let report = analyzer.analyze(&composite.received)?;
//!
//! for echo in &report.classical.unwrap().echoes {
//!     println!("{:.3} s  reflection {:.2}", echo.delay(), echo.reflection_coefficient);
//! }
//! ```
//!
//! ## Profiles
//!
//! | Profile       | Use Case                     | Key Adjustments                      |
//! |---------------|------------------------------|--------------------------------------|
//! | Standard      | General echo detection       | Balanced defaults                    |
//! | ArterialPulse | Arterial pressure waveforms  | Inverted echoes, delay-ordered output |
//! | Sensitive     | Weak reflections             | Lower threshold, more candidates     |
//! | Strict        | Triage                       | Higher threshold, top three only     |

// Core analysis functionality
pub mod core;

// Command-line interface
pub mod cli;

// Configuration and profiles
pub mod config;

// Result types and reporting
pub mod detection;

// Error types
pub mod error;

// Synthetic fixtures
pub mod testgen;

// Re-export commonly used types at crate root for convenience
pub use config::{ConfigBuilder, EchoConfig, PipelineSelection, ProfilePreset};
pub use detection::{
    AnalysisResult, EchoEstimate, PipelineComparison, PipelineKind, ResultReporter, Severity,
    SortOrder,
};
pub use crate::core::{
    AnalysisReport, AnalyzerBuilder, CepstralEngine, Cepstrum, CompositeSignal, EchoAnalyzer,
    EchoCandidate, EchoComponent, PeakDetector, QuantumSimulatedPipeline, Signal,
    SpectralTransform, SpectrumFrame, WindowFunction,
};
pub use error::{EchoError, EchoResult};
