// src/config/profiles.rs
//
// Analysis configuration and preset profiles for common signal types

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::dsp::WindowFunction;
use crate::core::analysis::DEFAULT_MEASUREMENT_SHOTS;
use crate::detection::SortOrder;
use crate::error::{EchoError, EchoResult};

/// Largest transform the engine will plan unless told otherwise
pub const DEFAULT_MAX_TRANSFORM_SIZE: usize = 1 << 20;

/// Which cepstral pipeline(s) to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineSelection {
    #[default]
    Classical,
    QuantumSimulated,
    Both,
}

impl PipelineSelection {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "classical" => Some(Self::Classical),
            "quantum" | "quantum-simulated" | "quantum_simulated" => Some(Self::QuantumSimulated),
            "both" | "compare" => Some(Self::Both),
            _ => None,
        }
    }

    pub fn runs_classical(&self) -> bool {
        matches!(self, Self::Classical | Self::Both)
    }

    pub fn runs_quantum(&self) -> bool {
        matches!(self, Self::QuantumSimulated | Self::Both)
    }
}

/// Preset profiles for common use cases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfilePreset {
    /// Balanced defaults, one-second windows
    Standard,
    /// Arterial pressure pulses (sign-flipped reflections, delay-ordered output)
    ArterialPulse,
    /// Lower threshold, more candidates
    Sensitive,
    /// Only the clearest few reflections
    Strict,
    /// User-defined settings
    Custom,
}

impl ProfilePreset {
    pub fn all() -> Vec<Self> {
        vec![
            Self::Standard,
            Self::ArterialPulse,
            Self::Sensitive,
            Self::Strict,
        ]
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "standard" | "default" => Some(Self::Standard),
            "arterial" | "arterial-pulse" | "arterial_pulse" | "pulse" => Some(Self::ArterialPulse),
            "sensitive" => Some(Self::Sensitive),
            "strict" => Some(Self::Strict),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Standard => "Balanced defaults for general echo detection",
            Self::ArterialPulse => "Arterial pressure pulses with inverted reflections",
            Self::Sensitive => "Weak reflections, more false positives",
            Self::Strict => "Only the strongest reflections",
            Self::Custom => "User-defined settings",
        }
    }
}

/// Every tunable parameter of an analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EchoConfig {
    /// Samples per analysis window
    pub window_size: usize,
    /// Zero-padded transform length; `None` uses the window size
    /// (next power of two for the quantum-simulated pipeline)
    pub transform_size: Option<usize>,
    pub max_transform_size: usize,
    /// Shortest delay searched, in seconds
    pub min_delay: f64,
    /// Longest delay searched, in seconds
    pub max_delay: f64,
    /// Minimum peak height in standard deviations
    pub peak_strength_threshold: f64,
    pub max_candidates: usize,
    pub pipeline: PipelineSelection,
    pub sort_order: SortOrder,
    pub window_function: WindowFunction,
    /// Strength that maps to a reflection coefficient of 1.0
    pub reference_strength: f64,
    pub include_inverted: bool,
    /// Simulated measurement shots; `None` reads exact probabilities
    pub measurement_shots: Option<u64>,
    /// Step between batch windows; `None` means back-to-back windows
    pub hop_size: Option<usize>,
}

impl Default for EchoConfig {
    fn default() -> Self {
        Self::from_preset(ProfilePreset::Standard)
    }
}

impl EchoConfig {
    pub fn from_preset(preset: ProfilePreset) -> Self {
        match preset {
            ProfilePreset::Standard | ProfilePreset::Custom => Self::standard(),
            ProfilePreset::ArterialPulse => Self::arterial_pulse(),
            ProfilePreset::Sensitive => Self::sensitive(),
            ProfilePreset::Strict => Self::strict(),
        }
    }

    fn standard() -> Self {
        Self {
            window_size: 1000,
            transform_size: None,
            max_transform_size: DEFAULT_MAX_TRANSFORM_SIZE,
            min_delay: 0.01,
            max_delay: 0.45,
            peak_strength_threshold: 2.5,
            max_candidates: 8,
            pipeline: PipelineSelection::Classical,
            sort_order: SortOrder::ByStrength,
            window_function: WindowFunction::default(),
            reference_strength: 8.0,
            include_inverted: false,
            measurement_shots: Some(DEFAULT_MEASUREMENT_SHOTS),
            hop_size: None,
        }
    }

    fn arterial_pulse() -> Self {
        Self {
            min_delay: 0.02,
            max_delay: 0.4,
            // Reflections from open vessel ends come back sign-flipped
            include_inverted: true,
            sort_order: SortOrder::ByDelay,
            ..Self::standard()
        }
    }

    fn sensitive() -> Self {
        Self {
            peak_strength_threshold: 1.5,
            max_candidates: 16,
            ..Self::standard()
        }
    }

    fn strict() -> Self {
        Self {
            peak_strength_threshold: 4.0,
            max_candidates: 3,
            ..Self::standard()
        }
    }

    /// Transform length the selected pipelines will use
    pub fn effective_transform_size(&self) -> usize {
        match self.transform_size {
            Some(size) => size,
            None if self.pipeline.runs_quantum() => self.window_size.next_power_of_two(),
            None => self.window_size,
        }
    }

    pub fn effective_hop_size(&self) -> usize {
        self.hop_size.unwrap_or(self.window_size)
    }

    /// Reject parameter combinations no analysis can run with
    pub fn validate(&self) -> EchoResult<()> {
        if self.window_size == 0 {
            return Err(EchoError::invalid_config(
                "window_size",
                "must be at least one sample",
            ));
        }
        if let Some(size) = self.transform_size {
            if size < self.window_size {
                return Err(EchoError::invalid_config(
                    "transform_size",
                    format!("{} is smaller than window size {}", size, self.window_size),
                ));
            }
            if self.pipeline.runs_quantum() && !size.is_power_of_two() {
                return Err(EchoError::InvalidTransformSize {
                    size,
                    reason: "quantum-simulated pipeline needs a power of two".to_string(),
                });
            }
        }
        let size = self.effective_transform_size();
        if size > self.max_transform_size {
            return Err(EchoError::InvalidTransformSize {
                size,
                reason: format!("exceeds configured maximum {}", self.max_transform_size),
            });
        }
        if !(self.min_delay.is_finite() && self.min_delay >= 0.0) {
            return Err(EchoError::invalid_config(
                "min_delay",
                format!("must be a non-negative number of seconds, got {}", self.min_delay),
            ));
        }
        if !(self.max_delay.is_finite() && self.max_delay > self.min_delay) {
            return Err(EchoError::invalid_config(
                "max_delay",
                format!(
                    "must exceed min_delay {} s, got {}",
                    self.min_delay, self.max_delay
                ),
            ));
        }
        if !(self.peak_strength_threshold.is_finite() && self.peak_strength_threshold >= 0.0) {
            return Err(EchoError::invalid_config(
                "peak_strength_threshold",
                format!("must be non-negative, got {}", self.peak_strength_threshold),
            ));
        }
        if self.max_candidates == 0 {
            return Err(EchoError::invalid_config(
                "max_candidates",
                "must allow at least one candidate",
            ));
        }
        if !(self.reference_strength.is_finite() && self.reference_strength > 0.0) {
            return Err(EchoError::invalid_config(
                "reference_strength",
                format!("must be positive, got {}", self.reference_strength),
            ));
        }
        if self.measurement_shots == Some(0) {
            return Err(EchoError::invalid_config(
                "measurement_shots",
                "must be positive when given",
            ));
        }
        if self.hop_size == Some(0) {
            return Err(EchoError::invalid_config("hop_size", "must be positive when given"));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> EchoResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| EchoError::invalid_config("config", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> EchoResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            EchoError::invalid_config("config", format!("{}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> String {
        // Plain data with string keys; serialisation cannot fail
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Builder for custom configurations
pub struct ConfigBuilder {
    config: EchoConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: EchoConfig::default(),
        }
    }

    pub fn from_preset(preset: ProfilePreset) -> Self {
        Self {
            config: EchoConfig::from_preset(preset),
        }
    }

    pub fn window_size(mut self, size: usize) -> Self {
        self.config.window_size = size;
        self
    }

    pub fn transform_size(mut self, size: usize) -> Self {
        self.config.transform_size = Some(size);
        self
    }

    pub fn max_transform_size(mut self, size: usize) -> Self {
        self.config.max_transform_size = size;
        self
    }

    pub fn delay_range(mut self, min_delay: f64, max_delay: f64) -> Self {
        self.config.min_delay = min_delay;
        self.config.max_delay = max_delay;
        self
    }

    pub fn threshold(mut self, threshold: f64) -> Self {
        self.config.peak_strength_threshold = threshold;
        self
    }

    pub fn max_candidates(mut self, count: usize) -> Self {
        self.config.max_candidates = count;
        self
    }

    pub fn pipeline(mut self, pipeline: PipelineSelection) -> Self {
        self.config.pipeline = pipeline;
        self
    }

    pub fn sort_order(mut self, order: SortOrder) -> Self {
        self.config.sort_order = order;
        self
    }

    pub fn window_function(mut self, window: WindowFunction) -> Self {
        self.config.window_function = window;
        self
    }

    pub fn reference_strength(mut self, strength: f64) -> Self {
        self.config.reference_strength = strength;
        self
    }

    pub fn include_inverted(mut self, include: bool) -> Self {
        self.config.include_inverted = include;
        self
    }

    pub fn measurement_shots(mut self, shots: Option<u64>) -> Self {
        self.config.measurement_shots = shots;
        self
    }

    pub fn hop_size(mut self, hop: usize) -> Self {
        self.config.hop_size = Some(hop);
        self
    }

    pub fn build(self) -> EchoResult<EchoConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
