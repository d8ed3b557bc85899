// src/core/signal.rs
//
// Sampled signal model and synthetic echo composition.
//
// A received pressure wave is modelled as the original waveform plus delayed,
// attenuated copies of itself:
//
//     received(t) = original(t) + sum_k a_k * original(t - d_k)
//
// All types here are immutable value objects; derived signals (windowed,
// tapered, sliced) are always new instances.

use serde::{Deserialize, Serialize};

use crate::error::{EchoError, EchoResult};

/// Real-valued sampled time series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSignal")]
pub struct Signal {
    samples: Vec<f64>,
    sample_rate: f64,
    start_time: f64,
}

/// Unchecked wire form of [`Signal`]
#[derive(Deserialize)]
struct RawSignal {
    samples: Vec<f64>,
    sample_rate: f64,
    #[serde(default)]
    start_time: f64,
}

impl TryFrom<RawSignal> for Signal {
    type Error = EchoError;

    fn try_from(raw: RawSignal) -> EchoResult<Self> {
        Signal::new(raw.samples, raw.sample_rate)?.with_start_time(raw.start_time)
    }
}

impl Signal {
    /// Create a signal starting at t = 0
    pub fn new(samples: Vec<f64>, sample_rate: f64) -> EchoResult<Self> {
        validate(Self {
            samples,
            sample_rate,
            start_time: 0.0,
        })
    }

    /// Same samples, different time origin
    pub fn with_start_time(mut self, start_time: f64) -> EchoResult<Self> {
        if !start_time.is_finite() {
            return Err(EchoError::invalid_signal(format!(
                "start time must be finite, got {}",
                start_time
            )));
        }
        self.start_time = start_time;
        Ok(self)
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false for a validated signal
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn sample_period(&self) -> f64 {
        1.0 / self.sample_rate
    }

    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate
    }

    /// Absolute time of a sample index
    pub fn time_at(&self, index: usize) -> f64 {
        self.start_time + index as f64 / self.sample_rate
    }

    /// Derive a sub-window `[offset, offset + len)` as a new signal
    pub fn slice(&self, offset: usize, len: usize) -> EchoResult<Self> {
        let end = offset.checked_add(len).filter(|&end| end <= self.samples.len());
        match end {
            Some(end) if len > 0 => Ok(Self {
                samples: self.samples[offset..end].to_vec(),
                sample_rate: self.sample_rate,
                start_time: self.time_at(offset),
            }),
            _ => Err(EchoError::WindowTooLarge {
                window_size: len,
                signal_len: self.samples.len().saturating_sub(offset),
            }),
        }
    }

    /// Derive a new signal by transforming each sample with its index
    pub fn map_samples<F>(&self, f: F) -> EchoResult<Self>
    where
        F: Fn(usize, f64) -> f64,
    {
        validate(Self {
            samples: self
                .samples
                .iter()
                .enumerate()
                .map(|(i, &s)| f(i, s))
                .collect(),
            sample_rate: self.sample_rate,
            start_time: self.start_time,
        })
    }

    /// Euclidean norm of the samples
    pub fn norm(&self) -> f64 {
        self.samples.iter().map(|s| s * s).sum::<f64>().sqrt()
    }

    /// Linearly interpolated value at a fractional sample position
    ///
    /// Positions outside the signal read as silence.
    pub fn interpolate(&self, position: f64) -> f64 {
        if position <= -1.0 || !position.is_finite() {
            return 0.0;
        }
        let index = position.floor() as i64;
        let frac = position - index as f64;
        let at = |i: i64| {
            usize::try_from(i)
                .ok()
                .and_then(|i| self.samples.get(i))
                .copied()
                .unwrap_or(0.0)
        };
        at(index) * (1.0 - frac) + at(index + 1) * frac
    }
}

/// Check the signal invariants: at least one sample, positive finite sample
/// rate, and only finite samples.
pub fn validate(signal: Signal) -> EchoResult<Signal> {
    if signal.samples.is_empty() {
        return Err(EchoError::invalid_signal("signal has no samples"));
    }
    if !(signal.sample_rate.is_finite() && signal.sample_rate > 0.0) {
        return Err(EchoError::invalid_signal(format!(
            "sample rate must be positive, got {}",
            signal.sample_rate
        )));
    }
    if let Some(index) = signal.samples.iter().position(|s| !s.is_finite()) {
        return Err(EchoError::invalid_signal(format!(
            "non-finite sample at index {}",
            index
        )));
    }
    Ok(signal)
}

/// One reflective path: a delayed, attenuated (optionally inverted) copy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEchoComponent")]
pub struct EchoComponent {
    /// Delay in seconds (> 0)
    pub delay: f64,
    /// Attenuation coefficient, typically in (0, 1]
    pub attenuation: f64,
    /// Phase inversion at the reflecting boundary
    #[serde(default)]
    pub inverted: bool,
}

#[derive(Deserialize)]
struct RawEchoComponent {
    delay: f64,
    attenuation: f64,
    #[serde(default)]
    inverted: bool,
}

impl TryFrom<RawEchoComponent> for EchoComponent {
    type Error = EchoError;

    fn try_from(raw: RawEchoComponent) -> EchoResult<Self> {
        let echo = EchoComponent::new(raw.delay, raw.attenuation)?;
        Ok(if raw.inverted { echo.inverted() } else { echo })
    }
}

impl EchoComponent {
    pub fn new(delay: f64, attenuation: f64) -> EchoResult<Self> {
        if !(delay.is_finite() && delay > 0.0) {
            return Err(EchoError::invalid_config(
                "delay",
                format!("echo delay must be positive, got {}", delay),
            ));
        }
        if !attenuation.is_finite() {
            return Err(EchoError::invalid_config(
                "attenuation",
                format!("echo attenuation must be finite, got {}", attenuation),
            ));
        }
        Ok(Self {
            delay,
            attenuation,
            inverted: false,
        })
    }

    pub fn inverted(mut self) -> Self {
        self.inverted = true;
        self
    }

    /// Signed gain applied to the delayed copy
    pub fn gain(&self) -> f64 {
        if self.inverted {
            -self.attenuation
        } else {
            self.attenuation
        }
    }
}

/// Original signal plus the echoes superimposed on it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeSignal {
    pub original: Signal,
    pub echoes: Vec<EchoComponent>,
    pub received: Signal,
}

/// Superimpose delayed, attenuated copies of `original`.
///
/// Fractional delays are resolved by linear interpolation onto the sample
/// grid. The received signal keeps the original length; echo energy arriving
/// after the last sample is dropped.
pub fn compose(original: &Signal, echoes: &[EchoComponent]) -> EchoResult<CompositeSignal> {
    let rate = original.sample_rate();
    let received = original.map_samples(|i, s| {
        s + echoes
            .iter()
            .map(|echo| echo.gain() * original.interpolate(i as f64 - echo.delay * rate))
            .sum::<f64>()
    })?;

    Ok(CompositeSignal {
        original: original.clone(),
        echoes: echoes.to_vec(),
        received,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_validates() {
        let err = serde_json::from_str::<Signal>(
            r#"{"samples":[],"sample_rate":-1.0,"start_time":0.0}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("no samples"), "{}", err);

        assert!(serde_json::from_str::<Signal>(r#"{"samples":[1.0],"sample_rate":0.0}"#).is_err());

        let signal: Signal =
            serde_json::from_str(r#"{"samples":[1.0,2.0],"sample_rate":4.0,"start_time":0.5}"#)
                .unwrap();
        assert_eq!(signal.len(), 2);
        assert_eq!(signal.start_time(), 0.5);
        let json = serde_json::to_string(&signal).unwrap();
        assert_eq!(serde_json::from_str::<Signal>(&json).unwrap(), signal);

        assert!(serde_json::from_str::<EchoComponent>(r#"{"delay":0.0,"attenuation":0.5}"#).is_err());
        let echo: EchoComponent =
            serde_json::from_str(r#"{"delay":0.2,"attenuation":0.5,"inverted":true}"#).unwrap();
        assert_eq!(echo.gain(), -0.5);
    }

    fn ramp(len: usize, rate: f64) -> Signal {
        Signal::new((0..len).map(|i| i as f64).collect(), rate).unwrap()
    }

    #[test]
    fn test_validate_rejects_bad_signals() {
        assert!(matches!(
            Signal::new(vec![], 1000.0),
            Err(EchoError::InvalidSignal { .. })
        ));
        assert!(matches!(
            Signal::new(vec![1.0], 0.0),
            Err(EchoError::InvalidSignal { .. })
        ));
        assert!(matches!(
            Signal::new(vec![1.0], -10.0),
            Err(EchoError::InvalidSignal { .. })
        ));
        assert!(matches!(
            Signal::new(vec![1.0, f64::NAN], 1000.0),
            Err(EchoError::InvalidSignal { .. })
        ));
        assert!(Signal::new(vec![0.0], 1.0).is_ok());
    }

    #[test]
    fn test_slice_shifts_start_time() {
        let signal = ramp(100, 10.0);
        let window = signal.slice(20, 10).unwrap();
        assert_eq!(window.len(), 10);
        assert_eq!(window.samples()[0], 20.0);
        assert!((window.start_time() - 2.0).abs() < 1e-12);

        assert!(matches!(
            signal.slice(95, 10),
            Err(EchoError::WindowTooLarge { .. })
        ));
    }

    #[test]
    fn test_compose_integer_delay() {
        let mut samples = vec![0.0; 10];
        samples[0] = 1.0;
        let original = Signal::new(samples, 10.0).unwrap();
        let echo = EchoComponent::new(0.3, 0.5).unwrap();

        let composite = compose(&original, &[echo]).unwrap();
        let received = composite.received.samples();
        assert_eq!(received.len(), 10);
        assert!((received[0] - 1.0).abs() < 1e-12);
        assert!((received[3] - 0.5).abs() < 1e-12);
        assert!(received[4].abs() < 1e-12);
    }

    #[test]
    fn test_compose_fractional_delay_interpolates() {
        let mut samples = vec![0.0; 10];
        samples[0] = 1.0;
        let original = Signal::new(samples, 10.0).unwrap();
        let echo = EchoComponent::new(0.25, 1.0).unwrap().inverted();

        let received = compose(&original, &[echo]).unwrap().received;
        // 2.5 samples: split evenly across samples 2 and 3
        assert!((received.samples()[2] + 0.5).abs() < 1e-12);
        assert!((received.samples()[3] + 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_echo_component_validation() {
        assert!(EchoComponent::new(0.0, 0.5).is_err());
        assert!(EchoComponent::new(-0.1, 0.5).is_err());
        assert!(EchoComponent::new(0.1, f64::INFINITY).is_err());
        assert_eq!(EchoComponent::new(0.1, 0.5).unwrap().inverted().gain(), -0.5);
    }
}
