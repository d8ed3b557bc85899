// src/testgen/mod.rs
//
// Synthetic signal generation for EchoCheckr
// Builds source waveforms with known echoes superimposed, so detection can
// be checked against ground truth without recorded data.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::path::Path;

use crate::core::signal::{compose, CompositeSignal, EchoComponent, Signal};
use crate::error::{EchoError, EchoResult};

/// `exp(-decay * t) * sin(2 pi f t)` sampled over `duration` seconds
pub fn damped_sinusoid(
    frequency: f64,
    decay: f64,
    sample_rate: f64,
    duration: f64,
) -> EchoResult<Signal> {
    if !(duration.is_finite() && duration > 0.0) {
        return Err(EchoError::invalid_signal(format!(
            "duration must be positive, got {}",
            duration
        )));
    }
    let len = (sample_rate * duration).round() as usize;
    let samples = (0..len)
        .map(|i| {
            let t = i as f64 / sample_rate;
            (-decay * t).exp() * (2.0 * PI * frequency * t).sin()
        })
        .collect();
    Signal::new(samples, sample_rate)
}

/// `pulse` repeated back to back `count` times
pub fn pulse_train(pulse: &Signal, count: usize) -> EchoResult<Signal> {
    let samples = pulse.samples().repeat(count);
    Signal::new(samples, pulse.sample_rate())
}

/// Known-answer scenario: damped sinusoid plus echoes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticScenario {
    /// Carrier frequency in Hz
    pub frequency: f64,
    /// Exponential decay rate in 1/s
    pub decay: f64,
    pub sample_rate: f64,
    /// Length of one pulse in seconds
    pub duration: f64,
    /// Number of back-to-back pulses
    #[serde(default = "default_pulses")]
    pub pulses: usize,
    #[serde(default)]
    pub echoes: Vec<EchoComponent>,
}

fn default_pulses() -> usize {
    1
}

impl Default for SyntheticScenario {
    /// 5 Hz sinusoid damped at 5/s, 1 s at 1 kHz, no echoes
    fn default() -> Self {
        Self {
            frequency: 5.0,
            decay: 5.0,
            sample_rate: 1000.0,
            duration: 1.0,
            pulses: 1,
            echoes: Vec::new(),
        }
    }
}

impl SyntheticScenario {
    pub fn with_echo(mut self, delay: f64, attenuation: f64) -> EchoResult<Self> {
        self.echoes.push(EchoComponent::new(delay, attenuation)?);
        Ok(self)
    }

    pub fn with_inverted_echo(mut self, delay: f64, attenuation: f64) -> EchoResult<Self> {
        self.echoes
            .push(EchoComponent::new(delay, attenuation)?.inverted());
        Ok(self)
    }

    pub fn with_pulses(mut self, pulses: usize) -> Self {
        self.pulses = pulses;
        self
    }

    /// Source waveform (all pulses) before echoes are added
    pub fn original(&self) -> EchoResult<Signal> {
        let pulse = damped_sinusoid(self.frequency, self.decay, self.sample_rate, self.duration)?;
        if self.pulses == 1 {
            Ok(pulse)
        } else {
            pulse_train(&pulse, self.pulses)
        }
    }

    pub fn build(&self) -> EchoResult<CompositeSignal> {
        compose(&self.original()?, &self.echoes)
    }

    /// Window length covering one pulse
    pub fn pulse_len(&self) -> usize {
        (self.sample_rate * self.duration).round() as usize
    }
}

/// Write a signal as a mono 32-bit float WAV file
pub fn write_wav<P: AsRef<Path>>(path: P, signal: &Signal) -> Result<()> {
    let path = path.as_ref();
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: signal.sample_rate().round() as u32,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for &sample in signal.samples() {
        writer.write_sample(sample as f32)?;
    }
    writer
        .finalize()
        .with_context(|| format!("Failed to finalize {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damped_sinusoid_shape() {
        let signal = damped_sinusoid(5.0, 5.0, 1000.0, 1.0).unwrap();
        assert_eq!(signal.len(), 1000);
        assert_eq!(signal.samples()[0], 0.0);
        // Quarter period peak: exp(-5 * 0.05)
        assert!((signal.samples()[50] - (-0.25f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_scenario_build() {
        let composite = SyntheticScenario::default()
            .with_echo(0.2, 0.5)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(composite.echoes.len(), 1);
        assert_eq!(composite.received.len(), 1000);
        let expected = composite.original.samples()[250] + 0.5 * composite.original.samples()[50];
        assert!((composite.received.samples()[250] - expected).abs() < 1e-12);
        assert_eq!(composite.received.samples()[150], composite.original.samples()[150]);
    }

    #[test]
    fn test_pulse_train_repeats() {
        let scenario = SyntheticScenario::default().with_pulses(3);
        let original = scenario.original().unwrap();
        assert_eq!(original.len(), 3000);
        assert_eq!(original.samples()[1050], original.samples()[50]);
        assert_eq!(scenario.pulse_len(), 1000);
    }

    #[test]
    fn test_bad_scenario_rejected() {
        assert!(SyntheticScenario::default().with_echo(-0.1, 0.5).is_err());
        let scenario = SyntheticScenario {
            duration: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            scenario.build(),
            Err(EchoError::InvalidSignal { .. })
        ));
    }

    #[test]
    fn test_scenario_from_json() {
        let scenario: SyntheticScenario = serde_json::from_str(
            r#"{ "frequency": 5.0, "decay": 5.0, "sample_rate": 1000.0, "duration": 1.0,
                 "echoes": [{ "delay": 0.2, "attenuation": 0.5 }] }"#,
        )
        .unwrap();
        assert_eq!(scenario.pulses, 1);
        assert!(!scenario.echoes[0].inverted);
    }
}
