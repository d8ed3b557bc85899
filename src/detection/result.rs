//! Echo analysis result types and reporting

use log::info;
use serde::{Deserialize, Serialize};

use crate::config::EchoConfig;
use crate::core::analysis::{Cepstrum, EchoCandidate};

/// Which pipeline produced a cepstrum or result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipelineKind {
    #[serde(rename = "classical")]
    Classical,
    #[serde(rename = "quantum-simulated")]
    QuantumSimulated,
}

impl PipelineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineKind::Classical => "classical",
            PipelineKind::QuantumSimulated => "quantum-simulated",
        }
    }
}

impl std::fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Output ordering requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Strongest first, for severity triage
    #[default]
    ByStrength,
    /// Shortest delay first, for topology mapping
    ByDelay,
}

impl SortOrder {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "strength" | "by_strength" | "by-strength" => Some(Self::ByStrength),
            "delay" | "by_delay" | "by-delay" => Some(Self::ByDelay),
            _ => None,
        }
    }
}

/// Severity level of a reflection
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Barely above the detection threshold
    Info,
    /// Weak reflection
    Low,
    /// Clear reflection
    Medium,
    /// Strong reflection
    High,
}

impl Severity {
    pub fn from_coefficient(coefficient: f64) -> Self {
        match coefficient {
            c if c >= 0.6 => Severity::High,
            c if c >= 0.35 => Severity::Medium,
            c if c >= 0.15 => Severity::Low,
            _ => Severity::Info,
        }
    }
}

/// Context an analysis ran in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    pub sample_rate: f64,
    pub window_len: usize,
    pub transform_size: usize,
    /// Time of the first sample of the analysed window
    pub start_time: f64,
    pub pipeline: PipelineKind,
}

impl From<&Cepstrum> for AnalysisMetadata {
    fn from(cepstrum: &Cepstrum) -> Self {
        Self {
            sample_rate: cepstrum.sample_rate(),
            window_len: cepstrum.window_len(),
            transform_size: cepstrum.transform_size(),
            start_time: cepstrum.start_time(),
            pipeline: cepstrum.pipeline(),
        }
    }
}

/// Echo candidate with calibrated reflection estimates attached
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EchoEstimate {
    #[serde(flatten)]
    pub candidate: EchoCandidate,
    /// `min(1, strength / reference_strength)`
    pub reflection_coefficient: f64,
    /// Echo gain implied by the raw cepstral peak (`2 |c|`, capped at 1)
    pub attenuation_estimate: f64,
    pub severity: Severity,
}

impl EchoEstimate {
    pub fn delay(&self) -> f64 {
        self.candidate.delay
    }

    pub fn strength(&self) -> f64 {
        self.candidate.strength
    }
}

/// Ordered echo estimates for one window and one pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(flatten)]
    pub metadata: AnalysisMetadata,
    pub order: SortOrder,
    pub echoes: Vec<EchoEstimate>,
}

impl AnalysisResult {
    pub fn pipeline(&self) -> PipelineKind {
        self.metadata.pipeline
    }

    pub fn is_empty(&self) -> bool {
        self.echoes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.echoes.len()
    }

    pub fn delays(&self) -> Vec<f64> {
        self.echoes.iter().map(|e| e.delay()).collect()
    }

    /// Highest-ranked echo regardless of output order
    pub fn strongest(&self) -> Option<&EchoEstimate> {
        self.echoes.iter().min_by_key(|e| e.candidate.rank)
    }

    /// `(delay, reflection coefficient)` pairs by increasing delay
    pub fn echo_delay_map(&self) -> Vec<(f64, f64)> {
        let mut map: Vec<(f64, f64)> = self
            .echoes
            .iter()
            .map(|e| (e.delay(), e.reflection_coefficient))
            .collect();
        map.sort_by(|a, b| a.0.total_cmp(&b.0));
        map
    }

    /// Copy of this result in a different order
    pub fn sorted(&self, order: SortOrder) -> Self {
        let mut result = self.clone();
        sort_echoes(&mut result.echoes, order);
        result.order = order;
        result
    }
}

fn sort_echoes(echoes: &mut [EchoEstimate], order: SortOrder) {
    match order {
        SortOrder::ByStrength => echoes.sort_by_key(|e| e.candidate.rank),
        SortOrder::ByDelay => echoes.sort_by(|a, b| {
            a.candidate
                .bin
                .cmp(&b.candidate.bin)
                .then_with(|| a.candidate.rank.cmp(&b.candidate.rank))
        }),
    }
}

/// Maps ranked candidates to calibrated, caller-ordered results
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResultReporter {
    reference_strength: f64,
    order: SortOrder,
}

impl Default for ResultReporter {
    fn default() -> Self {
        Self::from_config(&EchoConfig::default())
    }
}

impl ResultReporter {
    pub fn new(reference_strength: f64, order: SortOrder) -> Self {
        Self {
            reference_strength,
            order,
        }
    }

    pub fn from_config(config: &EchoConfig) -> Self {
        Self::new(config.reference_strength, config.sort_order)
    }

    pub fn reflection_coefficient(&self, strength: f64) -> f64 {
        (strength / self.reference_strength).clamp(0.0, 1.0)
    }

    /// Attach reflection estimates and order the candidates.
    ///
    /// Delays are recomputed from each bin and the metadata's sample rate.
    pub fn summarize(
        &self,
        candidates: &[EchoCandidate],
        metadata: AnalysisMetadata,
    ) -> AnalysisResult {
        let mut echoes: Vec<EchoEstimate> = candidates
            .iter()
            .map(|candidate| {
                let mut candidate = *candidate;
                candidate.delay = candidate.bin as f64 / metadata.sample_rate;
                let reflection_coefficient = self.reflection_coefficient(candidate.strength);
                EchoEstimate {
                    candidate,
                    reflection_coefficient,
                    attenuation_estimate: (2.0 * candidate.amplitude.abs()).min(1.0),
                    severity: Severity::from_coefficient(reflection_coefficient),
                }
            })
            .collect();
        sort_echoes(&mut echoes, self.order);

        info!(
            "{} pipeline: {} echo(es) in {}-sample window at t={:.3}s",
            metadata.pipeline,
            echoes.len(),
            metadata.window_len,
            metadata.start_time
        );

        AnalysisResult {
            metadata,
            order: self.order,
            echoes,
        }
    }
}

/// Side-by-side classical and quantum-simulated results for one window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineComparison {
    pub classical: AnalysisResult,
    pub quantum: AnalysisResult,
}

impl PipelineComparison {
    pub fn new(classical: AnalysisResult, quantum: AnalysisResult) -> Self {
        Self { classical, quantum }
    }

    /// For each classical echo, distance in seconds to the nearest
    /// quantum-simulated echo
    pub fn delay_deviations(&self) -> Vec<f64> {
        self.classical
            .echoes
            .iter()
            .filter_map(|c| {
                self.quantum
                    .echoes
                    .iter()
                    .map(|q| (q.delay() - c.delay()).abs())
                    .min_by(|a, b| a.total_cmp(b))
            })
            .collect()
    }

    pub fn max_delay_deviation(&self) -> Option<f64> {
        self.delay_deviations()
            .into_iter()
            .max_by(|a, b| a.total_cmp(b))
    }

    /// Same echo count and every delay within `samples` sample periods
    pub fn agrees_within(&self, samples: f64) -> bool {
        if self.classical.len() != self.quantum.len() {
            return false;
        }
        let tolerance = samples / self.classical.metadata.sample_rate + 1e-12;
        self.max_delay_deviation()
            .map_or(true, |deviation| deviation <= tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(bin: usize, strength: f64, rank: usize) -> EchoCandidate {
        EchoCandidate {
            bin,
            delay: 0.0,
            strength,
            amplitude: strength / 20.0,
            rank,
            inverted: false,
        }
    }

    fn metadata(pipeline: PipelineKind) -> AnalysisMetadata {
        AnalysisMetadata {
            sample_rate: 1000.0,
            window_len: 1000,
            transform_size: 1024,
            start_time: 0.0,
            pipeline,
        }
    }

    #[test]
    fn test_severity_from_coefficient() {
        assert_eq!(Severity::from_coefficient(0.9), Severity::High);
        assert_eq!(Severity::from_coefficient(0.5), Severity::Medium);
        assert_eq!(Severity::from_coefficient(0.2), Severity::Low);
        assert_eq!(Severity::from_coefficient(0.05), Severity::Info);
    }

    #[test]
    fn test_summarize_converts_and_calibrates() {
        let reporter = ResultReporter::new(8.0, SortOrder::ByStrength);
        let candidates = [candidate(300, 6.0, 1), candidate(100, 12.0, 2)];
        let result = reporter.summarize(&candidates, metadata(PipelineKind::Classical));

        assert_eq!(result.len(), 2);
        assert_eq!(result.echoes[0].candidate.bin, 300);
        assert!((result.echoes[0].delay() - 0.3).abs() < 1e-12);
        assert!((result.echoes[0].reflection_coefficient - 0.75).abs() < 1e-12);
        assert_eq!(result.echoes[1].reflection_coefficient, 1.0);
        assert!((result.echoes[0].attenuation_estimate - 0.6).abs() < 1e-12);
        assert_eq!(result.echoes[1].severity, Severity::High);
    }

    #[test]
    fn test_delay_order() {
        let reporter = ResultReporter::new(8.0, SortOrder::ByDelay);
        let candidates = [candidate(300, 6.0, 1), candidate(100, 3.0, 2)];
        let result = reporter.summarize(&candidates, metadata(PipelineKind::Classical));
        assert_eq!(result.order, SortOrder::ByDelay);
        assert_eq!(result.delays(), vec![0.1, 0.3]);
        assert_eq!(result.strongest().map(|e| e.candidate.bin), Some(300));

        let by_strength = result.sorted(SortOrder::ByStrength);
        assert_eq!(by_strength.echoes[0].candidate.bin, 300);
        assert_eq!(result.echo_delay_map()[0].0, 0.1);
    }

    #[test]
    fn test_pipeline_comparison() {
        let reporter = ResultReporter::default();
        let classical = reporter.summarize(
            &[candidate(200, 4.0, 1)],
            metadata(PipelineKind::Classical),
        );
        let close = reporter.summarize(
            &[candidate(201, 4.5, 1)],
            metadata(PipelineKind::QuantumSimulated),
        );
        let far = reporter.summarize(
            &[candidate(205, 4.5, 1)],
            metadata(PipelineKind::QuantumSimulated),
        );

        let comparison = PipelineComparison::new(classical.clone(), close);
        assert!(comparison.agrees_within(2.0));
        assert!((comparison.max_delay_deviation().unwrap() - 0.001).abs() < 1e-12);
        assert!(!PipelineComparison::new(classical, far).agrees_within(2.0));
    }

    #[test]
    fn test_pipeline_names_serialize() {
        let json = serde_json::to_string(&PipelineKind::QuantumSimulated).unwrap();
        assert_eq!(json, "\"quantum-simulated\"");
        assert_eq!(PipelineKind::Classical.to_string(), "classical");
    }
}
