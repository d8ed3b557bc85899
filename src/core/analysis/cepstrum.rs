// src/core/analysis/cepstrum.rs
//
// Real cepstrum computation (classical pipeline).
//
// An echo of delay D and gain a multiplies the spectrum by (1 + a e^{-jwD}).
// Taking the log turns that product into a sum, so the echo shows up in the
// log-magnitude spectrum as an additive ripple of period 1/D. The inverse
// transform of the log-magnitude concentrates that ripple into a peak at
// quefrency D (height about a/2), well separated from the smooth spectral
// envelope of the source waveform near quefrency zero.

use log::{debug, warn};
use num_complex::Complex;
use serde::{Deserialize, Serialize};

use crate::config::EchoConfig;
use crate::core::dsp::{SpectralTransform, SpectrumFrame, WindowFunction};
use crate::core::signal::Signal;
use crate::detection::PipelineKind;
use crate::error::{EchoError, EchoResult};

/// Floor applied to spectral magnitudes before taking the logarithm.
///
/// Exact-zero bins (silent input, spectral nulls) would otherwise give
/// `ln(0) = -inf` and poison the whole cepstrum. Any magnitude below the
/// floor is treated as equal to it, so the log-magnitude is bounded below by
/// `ln(1e-12) ≈ -27.63`. Bins that genuinely sit below 1e-12 are far under
/// the double-precision noise of a transform of unit-scale data, so flooring
/// them loses no information.
pub const LOG_MAGNITUDE_FLOOR: f64 = 1e-12;

/// Natural log of each bin magnitude, floored at [`LOG_MAGNITUDE_FLOOR`]
pub fn log_magnitude(spectrum: &SpectrumFrame) -> Vec<f64> {
    spectrum
        .bins()
        .iter()
        .map(|c| c.norm().max(LOG_MAGNITUDE_FLOOR).ln())
        .collect()
}

/// Number of bins whose magnitude was raised to the floor
pub fn floored_bins(spectrum: &SpectrumFrame) -> usize {
    spectrum
        .bins()
        .iter()
        .filter(|c| c.norm() < LOG_MAGNITUDE_FLOOR)
        .count()
}

/// Real-valued sequence indexed by quefrency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cepstrum {
    values: Vec<f64>,
    sample_rate: f64,
    window_len: usize,
    start_time: f64,
    pipeline: PipelineKind,
}

impl Cepstrum {
    pub fn new(
        values: Vec<f64>,
        sample_rate: f64,
        window_len: usize,
        pipeline: PipelineKind,
    ) -> EchoResult<Self> {
        if values.is_empty() {
            return Err(EchoError::invalid_signal("cepstrum has no values"));
        }
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(EchoError::invalid_signal(format!(
                "sample rate must be positive, got {}",
                sample_rate
            )));
        }
        Ok(Self {
            values,
            sample_rate,
            window_len,
            start_time: 0.0,
            pipeline,
        })
    }

    /// Classical cepstrum whose window spans every value
    pub fn from_values(values: Vec<f64>, sample_rate: f64) -> EchoResult<Self> {
        let len = values.len();
        Self::new(values, sample_rate, len, PipelineKind::Classical)
    }

    pub(crate) fn starting_at(mut self, start_time: f64) -> Self {
        self.start_time = start_time;
        self
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Samples in the analysed window (before zero-padding)
    pub fn window_len(&self) -> usize {
        self.window_len
    }

    /// Number of quefrency bins (the transform size)
    pub fn transform_size(&self) -> usize {
        self.values.len()
    }

    /// Time of the first sample of the analysed window
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn pipeline(&self) -> PipelineKind {
        self.pipeline
    }

    /// Seconds per quefrency bin
    pub fn resolution(&self) -> f64 {
        1.0 / self.sample_rate
    }

    pub fn quefrency(&self, bin: usize) -> f64 {
        bin as f64 / self.sample_rate
    }

    /// Nearest bin to a delay in seconds
    pub fn bin_for_delay(&self, delay: f64) -> usize {
        (delay * self.sample_rate).round().max(0.0) as usize
    }
}

/// Tapered window `[offset, offset + window_size)` of a signal.
///
/// Shared by both pipelines so they see identical input.
pub fn prepare_window(
    signal: &Signal,
    offset: usize,
    window_size: usize,
    window_function: WindowFunction,
) -> EchoResult<Signal> {
    if window_size == 0 {
        return Err(EchoError::invalid_config(
            "window_size",
            "window must contain at least one sample",
        ));
    }
    if offset.saturating_add(window_size) > signal.len() {
        return Err(EchoError::WindowTooLarge {
            window_size,
            signal_len: signal.len(),
        });
    }

    let coefficients = window_function.generate(window_size);
    signal
        .slice(offset, window_size)?
        .map_samples(|i, s| s * coefficients[i])
}

/// Classical cepstral analysis: taper, DFT, floored log-magnitude, IDFT
#[derive(Debug)]
pub struct CepstralEngine {
    transform: SpectralTransform,
    window_function: WindowFunction,
    transform_size: Option<usize>,
    max_transform_size: usize,
}

impl Default for CepstralEngine {
    fn default() -> Self {
        Self::from_config(&EchoConfig::default())
    }
}

impl CepstralEngine {
    pub fn new(window_function: WindowFunction, transform_size: Option<usize>) -> Self {
        Self {
            transform: SpectralTransform::new(),
            window_function,
            transform_size,
            max_transform_size: EchoConfig::default().max_transform_size,
        }
    }

    pub fn from_config(config: &EchoConfig) -> Self {
        Self {
            transform: SpectralTransform::new(),
            window_function: config.window_function,
            transform_size: config.transform_size,
            max_transform_size: config.max_transform_size,
        }
    }

    pub fn window_function(&self) -> WindowFunction {
        self.window_function
    }

    /// Cepstrum of the first `window_size` samples
    pub fn analyze(&self, signal: &Signal, window_size: usize) -> EchoResult<Cepstrum> {
        self.analyze_at(signal, 0, window_size)
    }

    /// Cepstrum of the window starting at sample `offset`
    pub fn analyze_at(
        &self,
        signal: &Signal,
        offset: usize,
        window_size: usize,
    ) -> EchoResult<Cepstrum> {
        let windowed = prepare_window(signal, offset, window_size, self.window_function)?;
        let size = self.transform_size.unwrap_or(window_size);
        if size > self.max_transform_size {
            return Err(EchoError::InvalidTransformSize {
                size,
                reason: format!("exceeds configured maximum {}", self.max_transform_size),
            });
        }

        let spectrum = self.transform.forward(&windowed, size)?;
        let values = self.cepstrum_of(&spectrum)?;

        Ok(Cepstrum::new(values, signal.sample_rate(), window_size, PipelineKind::Classical)?
            .starting_at(windowed.start_time()))
    }

    /// Inverse transform of the floored log-magnitude of `spectrum`
    pub fn cepstrum_of(&self, spectrum: &SpectrumFrame) -> EchoResult<Vec<f64>> {
        real_cepstrum(&self.transform, spectrum)
    }
}

/// Log-magnitude (zero imaginary part) followed by the inverse transform
pub(crate) fn real_cepstrum(
    transform: &SpectralTransform,
    spectrum: &SpectrumFrame,
) -> EchoResult<Vec<f64>> {
    let floored = floored_bins(spectrum);
    if floored == spectrum.len() {
        warn!(
            "all {} spectral bins below magnitude floor; cepstrum is flat",
            floored
        );
    } else if floored > 0 {
        debug!("{} of {} spectral bins floored", floored, spectrum.len());
    }

    let log_spectrum = SpectrumFrame::from_bins(
        log_magnitude(spectrum)
            .into_iter()
            .map(|v| Complex::new(v, 0.0))
            .collect(),
        spectrum.sample_rate(),
        spectrum.signal_len(),
    )?;
    transform.inverse(&log_spectrum)
}
