//! Forward and inverse spectral transforms

use log::debug;
use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::sync::{Arc, Mutex};

use crate::core::signal::Signal;
use crate::error::{EchoError, EchoResult};

/// Largest imaginary residue tolerated by [`SpectralTransform::inverse`],
/// relative to the peak real magnitude (floored at 1.0).
pub const INVERSE_RESIDUE_TOLERANCE: f64 = 1e-9;

/// Complex spectrum of a signal plus the bin resolution it was taken at
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumFrame {
    bins: Vec<Complex<f64>>,
    sample_rate: f64,
    signal_len: usize,
}

impl SpectrumFrame {
    /// Wrap an arbitrary spectrum (e.g. a log-magnitude sequence)
    pub fn from_bins(
        bins: Vec<Complex<f64>>,
        sample_rate: f64,
        signal_len: usize,
    ) -> EchoResult<Self> {
        if bins.is_empty() {
            return Err(EchoError::InvalidTransformSize {
                size: 0,
                reason: "spectrum has no bins".to_string(),
            });
        }
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(EchoError::invalid_signal(format!(
                "sample rate must be positive, got {}",
                sample_rate
            )));
        }
        Ok(Self {
            bins,
            sample_rate,
            signal_len,
        })
    }

    pub fn bins(&self) -> &[Complex<f64>] {
        &self.bins
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Length of the signal before zero-padding
    pub fn signal_len(&self) -> usize {
        self.signal_len
    }

    /// Hz per bin
    pub fn bin_resolution(&self) -> f64 {
        self.sample_rate / self.bins.len() as f64
    }

    pub fn frequency_of(&self, bin: usize) -> f64 {
        bin as f64 * self.bin_resolution()
    }

    pub fn magnitudes(&self) -> Vec<f64> {
        self.bins.iter().map(|c| c.norm()).collect()
    }

    pub fn phases(&self) -> Vec<f64> {
        self.bins.iter().map(|c| c.arg()).collect()
    }

    /// Same bins scaled by a real factor
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            bins: self.bins.iter().map(|c| *c * factor).collect(),
            sample_rate: self.sample_rate,
            signal_len: self.signal_len,
        }
    }
}

/// DFT/IDFT shared by the classical and quantum-simulated pipelines.
///
/// Plans are cached in a planner behind a mutex, so a single transform can
/// serve concurrent callers.
pub struct SpectralTransform {
    planner: Mutex<FftPlanner<f64>>,
    require_power_of_two: bool,
}

impl std::fmt::Debug for SpectralTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpectralTransform")
            .field("require_power_of_two", &self.require_power_of_two)
            .finish()
    }
}

impl Default for SpectralTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectralTransform {
    /// Mixed-radix transform accepting any size
    pub fn new() -> Self {
        Self {
            planner: Mutex::new(FftPlanner::new()),
            require_power_of_two: false,
        }
    }

    /// Transform restricted to power-of-two sizes (radix-2 QFT structure)
    pub fn radix2() -> Self {
        Self {
            planner: Mutex::new(FftPlanner::new()),
            require_power_of_two: true,
        }
    }

    pub fn requires_power_of_two(&self) -> bool {
        self.require_power_of_two
    }

    /// Check a transform size against a signal of `signal_len` samples
    pub fn check_size(&self, size: usize, signal_len: usize) -> EchoResult<()> {
        if size < signal_len.max(1) {
            return Err(EchoError::InvalidTransformSize {
                size,
                reason: format!("must be at least the signal length {}", signal_len),
            });
        }
        if self.require_power_of_two && !size.is_power_of_two() {
            return Err(EchoError::InvalidTransformSize {
                size,
                reason: "quantum-simulated path requires a power of two".to_string(),
            });
        }
        Ok(())
    }

    /// DFT of the signal, zero-padded to `size` bins
    pub fn forward(&self, signal: &Signal, size: usize) -> EchoResult<SpectrumFrame> {
        self.check_size(size, signal.len())?;

        let mut buffer: Vec<Complex<f64>> = signal
            .samples()
            .iter()
            .map(|&s| Complex::new(s, 0.0))
            .collect();
        buffer.resize(size, Complex::new(0.0, 0.0));

        self.plan(size, true).process(&mut buffer);
        debug!(
            "forward transform: {} samples -> {} bins ({:.4} Hz/bin)",
            signal.len(),
            size,
            signal.sample_rate() / size as f64
        );

        SpectrumFrame::from_bins(buffer, signal.sample_rate(), signal.len())
    }

    /// Inverse DFT returning the real part of all `len()` output samples.
    ///
    /// Fails with `NumericalInstability` when the imaginary residue is not
    /// negligible, i.e. the spectrum was not (numerically) Hermitian.
    pub fn inverse(&self, spectrum: &SpectrumFrame) -> EchoResult<Vec<f64>> {
        let size = spectrum.len();
        if self.require_power_of_two && !size.is_power_of_two() {
            return Err(EchoError::InvalidTransformSize {
                size,
                reason: "quantum-simulated path requires a power of two".to_string(),
            });
        }

        let mut buffer = spectrum.bins().to_vec();
        self.plan(size, false).process(&mut buffer);

        let scale = 1.0 / size as f64;
        let mut residue = 0.0f64;
        let mut peak = 0.0f64;
        let real: Vec<f64> = buffer
            .iter()
            .map(|c| {
                let value = *c * scale;
                residue = residue.max(value.im.abs());
                peak = peak.max(value.re.abs());
                value.re
            })
            .collect();

        let tolerance = INVERSE_RESIDUE_TOLERANCE * peak.max(1.0);
        if residue.is_nan() || residue > tolerance {
            return Err(EchoError::NumericalInstability { residue, tolerance });
        }
        Ok(real)
    }

    fn plan(&self, size: usize, forward: bool) -> Arc<dyn Fft<f64>> {
        let mut planner = self.planner.lock().unwrap_or_else(|e| e.into_inner());
        if forward {
            planner.plan_fft_forward(size)
        } else {
            planner.plan_fft_inverse(size)
        }
    }
}
