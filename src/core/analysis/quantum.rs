// src/core/analysis/quantum.rs
//
// Quantum-simulated cepstral pipeline.
//
// Each stage of the classical cepstrum is replaced by the operation a
// quantum circuit would perform, simulated on a classical state vector of
// 2^n amplitudes:
//
//   state preparation   windowed samples -> unit-norm amplitude vector
//   QFT                 unitary DFT (classical forward transform / sqrt(N))
//   quantum logarithm   floored log-magnitude of each amplitude
//   inverse QFT         classical inverse transform
//   measurement         |amplitude|^2 probabilities, quantised to a finite
//                       shot count, read back as signed amplitudes
//
// The quantum logarithm has no agreed circuit construction; it is modelled
// as the classical log-magnitude step applied to the simulated amplitudes.
// That makes this pipeline a benchmark twin of the classical one, not a
// statement about what quantum hardware would compute.

use log::debug;

use super::cepstrum::{prepare_window, real_cepstrum, Cepstrum};
use crate::config::EchoConfig;
use crate::core::dsp::{SpectralTransform, SpectrumFrame, WindowFunction};
use crate::core::signal::Signal;
use crate::detection::PipelineKind;
use crate::error::{EchoError, EchoResult};

/// Default number of simulated measurement shots
pub const DEFAULT_MEASUREMENT_SHOTS: u64 = 1 << 20;

/// Unit-norm amplitude register of 2^n entries
#[derive(Debug, Clone, PartialEq)]
pub struct QuantumState {
    amplitudes: Vec<f64>,
    sample_rate: f64,
    source_norm: f64,
}

impl QuantumState {
    /// Normalise `samples` into a register of `size` amplitudes.
    ///
    /// Fails on an all-zero input: no normalised state exists for it.
    pub fn prepare(samples: &[f64], sample_rate: f64, size: usize) -> EchoResult<Self> {
        if !size.is_power_of_two() {
            return Err(EchoError::InvalidTransformSize {
                size,
                reason: "register size must be a power of two".to_string(),
            });
        }
        if samples.len() > size {
            return Err(EchoError::InvalidTransformSize {
                size,
                reason: format!("register too small for {} samples", samples.len()),
            });
        }

        let norm = samples.iter().map(|s| s * s).sum::<f64>().sqrt();
        if !(norm.is_finite() && norm > 0.0) {
            return Err(EchoError::invalid_signal(
                "window has zero energy; cannot prepare a normalised state",
            ));
        }

        let mut amplitudes: Vec<f64> = samples.iter().map(|s| s / norm).collect();
        amplitudes.resize(size, 0.0);
        Ok(Self {
            amplitudes,
            sample_rate,
            source_norm: norm,
        })
    }

    pub fn amplitudes(&self) -> &[f64] {
        &self.amplitudes
    }

    pub fn num_qubits(&self) -> u32 {
        self.amplitudes.len().trailing_zeros()
    }

    /// Norm of the samples before normalisation
    pub fn source_norm(&self) -> f64 {
        self.source_norm
    }

    fn as_signal(&self) -> EchoResult<Signal> {
        Signal::new(self.amplitudes.clone(), self.sample_rate)
    }
}

/// Simulated projective measurement of a real register.
///
/// Probabilities `p_i = v_i^2 / sum(v^2)` are quantised to `shots` expected
/// counts (when given) and read back as amplitudes `sqrt(p_i) * norm(v)`.
/// The relative sign of each amplitude comes from a phase-reference
/// (Hadamard test) readout, so negative cepstral lobes such as the
/// second-order term at twice an echo delay stay negative.
pub fn measure(register: &[f64], shots: Option<u64>) -> Vec<f64> {
    let total: f64 = register.iter().map(|v| v * v).sum();
    if !(total.is_finite() && total > 0.0) {
        return vec![0.0; register.len()];
    }
    let norm = total.sqrt();

    register
        .iter()
        .map(|v| {
            let p = v * v / total;
            let p = match shots {
                Some(s) if s > 0 => (p * s as f64).round() / s as f64,
                _ => p,
            };
            (p.sqrt() * norm).copysign(*v)
        })
        .collect()
}

/// Quantum-simulated twin of [`super::CepstralEngine`]
#[derive(Debug)]
pub struct QuantumSimulatedPipeline {
    transform: SpectralTransform,
    window_function: WindowFunction,
    transform_size: Option<usize>,
    max_transform_size: usize,
    shots: Option<u64>,
}

impl Default for QuantumSimulatedPipeline {
    fn default() -> Self {
        Self::from_config(&EchoConfig::default())
    }
}

impl QuantumSimulatedPipeline {
    pub fn new(
        window_function: WindowFunction,
        transform_size: Option<usize>,
        shots: Option<u64>,
    ) -> Self {
        Self {
            transform: SpectralTransform::radix2(),
            window_function,
            transform_size,
            max_transform_size: EchoConfig::default().max_transform_size,
            shots,
        }
    }

    pub fn from_config(config: &EchoConfig) -> Self {
        Self {
            transform: SpectralTransform::radix2(),
            window_function: config.window_function,
            transform_size: config.transform_size,
            max_transform_size: config.max_transform_size,
            shots: config.measurement_shots,
        }
    }

    /// Register size used for a window: explicit size, else next power of two
    pub fn register_size(&self, window_size: usize) -> usize {
        self.transform_size
            .unwrap_or_else(|| window_size.next_power_of_two())
    }

    pub fn analyze(&self, signal: &Signal, window_size: usize) -> EchoResult<Cepstrum> {
        self.analyze_at(signal, 0, window_size)
    }

    pub fn analyze_at(
        &self,
        signal: &Signal,
        offset: usize,
        window_size: usize,
    ) -> EchoResult<Cepstrum> {
        let windowed = prepare_window(signal, offset, window_size, self.window_function)?;
        let size = self.register_size(window_size);
        self.transform.check_size(size, window_size)?;
        if size > self.max_transform_size {
            return Err(EchoError::InvalidTransformSize {
                size,
                reason: format!("exceeds configured maximum {}", self.max_transform_size),
            });
        }

        let state = QuantumState::prepare(windowed.samples(), signal.sample_rate(), size)?;
        debug!(
            "prepared {}-qubit register (source norm {:.4e})",
            state.num_qubits(),
            state.source_norm()
        );

        let spectrum = self.qft(&state)?;
        let register = real_cepstrum(&self.transform, &spectrum)?;
        let values = measure(&register, self.shots);

        Ok(Cepstrum::new(
            values,
            signal.sample_rate(),
            window_size,
            PipelineKind::QuantumSimulated,
        )?
        .starting_at(windowed.start_time()))
    }

    /// Unitary DFT of the register
    fn qft(&self, state: &QuantumState) -> EchoResult<SpectrumFrame> {
        let size = state.amplitudes().len();
        let spectrum = self.transform.forward(&state.as_signal()?, size)?;
        Ok(spectrum.scaled(1.0 / (size as f64).sqrt()))
    }
}
