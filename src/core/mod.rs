//! Core signal model, transforms and cepstral analysis

pub mod analysis;
pub mod analyzer;
pub mod dsp;
pub mod signal;

pub use analysis::{CepstralEngine, Cepstrum, EchoCandidate, PeakDetector, QuantumSimulatedPipeline};
pub use analyzer::{AnalysisReport, AnalyzerBuilder, EchoAnalyzer};
pub use dsp::{SpectralTransform, SpectrumFrame, WindowFunction};
pub use signal::{compose, validate, CompositeSignal, EchoComponent, Signal};
