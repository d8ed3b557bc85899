//! CLI argument parsing with profile support

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{EchoConfig, PipelineSelection, ProfilePreset};
use crate::core::dsp::WindowFunction;
use crate::core::signal::EchoComponent;
use crate::detection::SortOrder;
use crate::testgen::SyntheticScenario;

#[derive(Parser, Debug)]
#[command(name = "echocheckr")]
#[command(author, version, about = "Detect echoes in sampled pressure-wave signals with cepstral analysis", long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze WAV files (directories are searched recursively)
    Analyze {
        /// Input files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[command(flatten)]
        options: AnalysisOptions,
    },

    /// Analyze a synthetic damped sinusoid with known echoes
    Synth {
        #[command(flatten)]
        scenario: ScenarioArgs,

        /// Also write the received signal to this WAV file
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        options: AnalysisOptions,
    },

    /// List configuration profiles
    Profiles,
}

/// Analysis settings shared by every subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct AnalysisOptions {
    /// Configuration profile (standard, arterial-pulse, sensitive, strict)
    #[arg(long, value_parser = parse_profile)]
    pub profile: Option<ProfilePreset>,

    /// JSON configuration file; command-line flags override its values
    #[arg(long, env = "ECHOCHECKR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Pipeline to run (classical, quantum, both)
    #[arg(long, value_parser = parse_pipeline)]
    pub pipeline: Option<PipelineSelection>,

    /// Samples per analysis window
    #[arg(long)]
    pub window_size: Option<usize>,

    /// Zero-padded transform size (power of two for the quantum pipeline)
    #[arg(long)]
    pub transform_size: Option<usize>,

    /// Shortest delay searched, in seconds
    #[arg(long)]
    pub min_delay: Option<f64>,

    /// Longest delay searched, in seconds
    #[arg(long)]
    pub max_delay: Option<f64>,

    /// Minimum peak strength in standard deviations
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Maximum echoes reported per window
    #[arg(long)]
    pub max_candidates: Option<usize>,

    /// Output order (strength, delay)
    #[arg(long, value_parser = parse_sort)]
    pub sort: Option<SortOrder>,

    /// Tapering window (rectangular, hann, hamming, blackman, trailing-hann-N)
    #[arg(long, value_parser = parse_window)]
    pub window: Option<WindowFunction>,

    /// Also report sign-flipped echoes
    #[arg(long)]
    pub inverted: bool,

    /// Simulated measurement shots for the quantum pipeline (0 = exact)
    #[arg(long)]
    pub shots: Option<u64>,

    /// Analyze every window with this hop instead of only the first window
    #[arg(long)]
    pub hop: Option<usize>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

impl AnalysisOptions {
    /// Profile or config file first, then individual flag overrides
    pub fn to_config(&self) -> Result<EchoConfig> {
        let mut config = match &self.config {
            Some(path) => EchoConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => EchoConfig::from_preset(self.profile.unwrap_or(ProfilePreset::Standard)),
        };

        if let Some(pipeline) = self.pipeline {
            config.pipeline = pipeline;
        }
        if let Some(size) = self.window_size {
            config.window_size = size;
        }
        if let Some(size) = self.transform_size {
            config.transform_size = Some(size);
        }
        if let Some(delay) = self.min_delay {
            config.min_delay = delay;
        }
        if let Some(delay) = self.max_delay {
            config.max_delay = delay;
        }
        if let Some(threshold) = self.threshold {
            config.peak_strength_threshold = threshold;
        }
        if let Some(count) = self.max_candidates {
            config.max_candidates = count;
        }
        if let Some(order) = self.sort {
            config.sort_order = order;
        }
        if let Some(window) = self.window {
            config.window_function = window;
        }
        if self.inverted {
            config.include_inverted = true;
        }
        if let Some(shots) = self.shots {
            config.measurement_shots = if shots == 0 { None } else { Some(shots) };
        }
        if let Some(hop) = self.hop {
            config.hop_size = Some(hop);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn batch(&self) -> bool {
        self.hop.is_some()
    }
}

/// Synthetic source waveform and its echoes
#[derive(Args, Debug, Clone)]
pub struct ScenarioArgs {
    /// Echo as DELAY:ATTENUATION in seconds; prefix the attenuation with '-' for an inverted echo
    #[arg(long = "echo", value_parser = parse_echo)]
    pub echoes: Vec<EchoComponent>,

    /// Carrier frequency in Hz
    #[arg(long, default_value = "5.0")]
    pub frequency: f64,

    /// Decay rate in 1/s
    #[arg(long, default_value = "5.0")]
    pub decay: f64,

    /// Sample rate in Hz
    #[arg(long, default_value = "1000.0")]
    pub sample_rate: f64,

    /// Pulse length in seconds
    #[arg(long, default_value = "1.0")]
    pub duration: f64,

    /// Number of back-to-back pulses
    #[arg(long, default_value = "1")]
    pub pulses: usize,
}

impl ScenarioArgs {
    pub fn scenario(&self) -> SyntheticScenario {
        SyntheticScenario {
            frequency: self.frequency,
            decay: self.decay,
            sample_rate: self.sample_rate,
            duration: self.duration,
            pulses: self.pulses,
            echoes: self.echoes.clone(),
        }
    }
}

fn parse_profile(name: &str) -> Result<ProfilePreset, String> {
    ProfilePreset::from_name(name).ok_or_else(|| format!("Unknown profile: {}", name))
}

fn parse_pipeline(name: &str) -> Result<PipelineSelection, String> {
    PipelineSelection::from_name(name).ok_or_else(|| format!("Unknown pipeline: {}", name))
}

fn parse_sort(name: &str) -> Result<SortOrder, String> {
    SortOrder::from_name(name).ok_or_else(|| format!("Unknown sort order: {}", name))
}

fn parse_window(name: &str) -> Result<WindowFunction, String> {
    WindowFunction::from_name(name).ok_or_else(|| format!("Unknown window: {}", name))
}

fn parse_echo(spec: &str) -> Result<EchoComponent, String> {
    let (delay, attenuation) = spec
        .split_once(':')
        .ok_or_else(|| format!("Invalid echo format: {}. Use DELAY:ATTENUATION", spec))?;
    let delay: f64 = delay
        .trim()
        .parse()
        .map_err(|_| format!("Invalid echo delay: {}", delay))?;
    let attenuation: f64 = attenuation
        .trim()
        .parse()
        .map_err(|_| format!("Invalid echo attenuation: {}", attenuation))?;

    let echo = EchoComponent::new(delay, attenuation.abs()).map_err(|e| e.to_string())?;
    Ok(if attenuation < 0.0 { echo.inverted() } else { echo })
}
