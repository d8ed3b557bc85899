// src/core/analyzer.rs
//
// High-level echo analysis API with builder pattern.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::sync::atomic::AtomicBool;

use super::analysis::{
    self, CepstralEngine, Cepstrum, PeakDetector, QuantumSimulatedPipeline, WindowReport,
};
use super::signal::Signal;
use crate::config::{ConfigBuilder, EchoConfig, PipelineSelection, ProfilePreset};
use crate::detection::{
    AnalysisMetadata, AnalysisResult, PipelineComparison, ResultReporter, SortOrder,
};
use crate::error::EchoResult;

/// Results of every pipeline that ran on one window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub classical: Option<AnalysisResult>,
    pub quantum: Option<AnalysisResult>,
}

impl AnalysisReport {
    /// Classical result when present, else the quantum-simulated one
    pub fn primary(&self) -> Option<&AnalysisResult> {
        self.classical.as_ref().or(self.quantum.as_ref())
    }

    pub fn results(&self) -> impl Iterator<Item = &AnalysisResult> {
        self.classical.iter().chain(self.quantum.iter())
    }

    /// Only available when both pipelines ran
    pub fn comparison(&self) -> Option<PipelineComparison> {
        match (&self.classical, &self.quantum) {
            (Some(classical), Some(quantum)) => {
                Some(PipelineComparison::new(classical.clone(), quantum.clone()))
            }
            _ => None,
        }
    }

    pub fn echo_count(&self) -> usize {
        self.primary().map_or(0, |r| r.len())
    }
}

/// Builder for EchoAnalyzer configuration
pub struct AnalyzerBuilder {
    config: ConfigBuilder,
}

impl AnalyzerBuilder {
    pub fn new() -> Self {
        Self {
            config: ConfigBuilder::new(),
        }
    }

    pub fn from_preset(preset: ProfilePreset) -> Self {
        Self {
            config: ConfigBuilder::from_preset(preset),
        }
    }

    pub fn window_size(mut self, size: usize) -> Self {
        self.config = self.config.window_size(size);
        self
    }

    pub fn transform_size(mut self, size: usize) -> Self {
        self.config = self.config.transform_size(size);
        self
    }

    pub fn delay_range(mut self, min_delay: f64, max_delay: f64) -> Self {
        self.config = self.config.delay_range(min_delay, max_delay);
        self
    }

    pub fn threshold(mut self, threshold: f64) -> Self {
        self.config = self.config.threshold(threshold);
        self
    }

    pub fn max_candidates(mut self, count: usize) -> Self {
        self.config = self.config.max_candidates(count);
        self
    }

    pub fn pipeline(mut self, pipeline: PipelineSelection) -> Self {
        self.config = self.config.pipeline(pipeline);
        self
    }

    pub fn sort_order(mut self, order: SortOrder) -> Self {
        self.config = self.config.sort_order(order);
        self
    }

    pub fn hop_size(mut self, hop: usize) -> Self {
        self.config = self.config.hop_size(hop);
        self
    }

    pub fn build(self) -> EchoResult<EchoAnalyzer> {
        EchoAnalyzer::new(self.config.build()?)
    }
}

impl Default for AnalyzerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Main analyzer: runs the configured pipeline(s) over a signal.
///
/// Holds only immutable configuration and FFT plan caches, so one analyzer
/// can serve concurrent callers.
#[derive(Debug)]
pub struct EchoAnalyzer {
    config: EchoConfig,
    classical: CepstralEngine,
    quantum: QuantumSimulatedPipeline,
    detector: PeakDetector,
    reporter: ResultReporter,
}

impl EchoAnalyzer {
    pub fn new(config: EchoConfig) -> EchoResult<Self> {
        config.validate()?;
        debug!("analyzer configured: {:?}", config);
        Ok(Self {
            classical: CepstralEngine::from_config(&config),
            quantum: QuantumSimulatedPipeline::from_config(&config),
            detector: PeakDetector::from_config(&config),
            reporter: ResultReporter::from_config(&config),
            config,
        })
    }

    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    pub fn config(&self) -> &EchoConfig {
        &self.config
    }

    /// Analyse the first window of `signal` with the selected pipeline(s)
    pub fn analyze(&self, signal: &Signal) -> EchoResult<AnalysisReport> {
        self.analyze_window(signal, 0)
    }

    /// Analyse the window starting at sample `offset`
    pub fn analyze_window(&self, signal: &Signal, offset: usize) -> EchoResult<AnalysisReport> {
        let selection = self.config.pipeline;
        let classical = if selection.runs_classical() {
            Some(self.detect(&self.classical.analyze_at(
                signal,
                offset,
                self.config.window_size,
            )?))
        } else {
            None
        };
        let quantum = if selection.runs_quantum() {
            Some(self.detect(&self.quantum.analyze_at(
                signal,
                offset,
                self.config.window_size,
            )?))
        } else {
            None
        };

        Ok(AnalysisReport { classical, quantum })
    }

    /// Classical pipeline only, regardless of the configured selection
    pub fn analyze_classical(&self, signal: &Signal) -> EchoResult<AnalysisResult> {
        let cepstrum = self.classical.analyze(signal, self.config.window_size)?;
        Ok(self.detect(&cepstrum))
    }

    /// Quantum-simulated pipeline only, regardless of the configured selection
    pub fn analyze_quantum(&self, signal: &Signal) -> EchoResult<AnalysisResult> {
        let cepstrum = self.quantum.analyze(signal, self.config.window_size)?;
        Ok(self.detect(&cepstrum))
    }

    /// Run both pipelines on the first window and pair their results
    pub fn compare(&self, signal: &Signal) -> EchoResult<PipelineComparison> {
        let comparison = PipelineComparison::new(
            self.analyze_classical(signal)?,
            self.analyze_quantum(signal)?,
        );
        info!(
            "pipeline comparison: max delay deviation {:?} s",
            comparison.max_delay_deviation()
        );
        Ok(comparison)
    }

    /// Peak picking and reporting on an already computed cepstrum
    pub fn detect(&self, cepstrum: &Cepstrum) -> AnalysisResult {
        let candidates = self.detector.find_echoes(
            cepstrum,
            self.config.min_delay,
            self.config.max_delay,
            self.config.max_candidates,
        );
        self.reporter
            .summarize(&candidates, AnalysisMetadata::from(cepstrum))
    }

    /// Analyse every window of a long recording in parallel
    pub fn analyze_windows(
        &self,
        signal: &Signal,
        cancel: &AtomicBool,
    ) -> EchoResult<Vec<WindowReport>> {
        analysis::analyze_windows(self, signal, cancel)
    }
}
