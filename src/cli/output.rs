//! Output formatting for CLI results

use colorful::Colorful;
use serde::Serialize;

use crate::config::EchoConfig;
use crate::core::analysis::WindowReport;
use crate::core::analyzer::AnalysisReport;
use crate::detection::{AnalysisResult, EchoEstimate, Severity};
use crate::error::EchoError;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Format one window's report for terminal output
pub fn format_report(source: &str, report: &AnalysisReport, verbose: bool) -> String {
    let mut output = format!("{}{}{}\n", BOLD, source, RESET);

    for result in report.results() {
        output.push_str(&format_result(result, verbose));
    }

    if let Some(comparison) = report.comparison() {
        let rate = comparison.classical.metadata.sample_rate;
        let deviation = comparison
            .max_delay_deviation()
            .map(|d| format!("{:.1} samples", d * rate))
            .unwrap_or_else(|| "n/a".to_string());
        let verdict = if comparison.agrees_within(2.0) {
            "agree".green().to_string()
        } else {
            "disagree".yellow().to_string()
        };
        output.push_str(&format!(
            "  Pipelines {} {}(max deviation {}){}\n",
            verdict, DIM, deviation, RESET
        ));
    }

    output
}

fn format_result(result: &AnalysisResult, verbose: bool) -> String {
    let mut output = format!(
        "  {} {}[{} Hz, window {}, transform {}, t={:.3}s]{}\n",
        result.pipeline().as_str().cyan(),
        DIM,
        result.metadata.sample_rate,
        result.metadata.window_len,
        result.metadata.transform_size,
        result.metadata.start_time,
        RESET
    );

    if result.is_empty() {
        output.push_str(&format!("    {}", "✓ No echoes above threshold\n".green()));
        return output;
    }

    for echo in &result.echoes {
        output.push_str(&format_echo(echo, verbose));
    }
    output
}

fn severity_marker(severity: Severity) -> String {
    match severity {
        Severity::Info => "ℹ".cyan().to_string(),
        Severity::Low | Severity::Medium => "⚠".yellow().to_string(),
        Severity::High => "✗".red().to_string(),
    }
}

fn format_echo(echo: &EchoEstimate, verbose: bool) -> String {
    let candidate = &echo.candidate;
    let mut output = format!(
        "    {} #{} delay {:.4} s  reflection {:.2}{}",
        severity_marker(echo.severity),
        candidate.rank,
        candidate.delay,
        echo.reflection_coefficient,
        if candidate.inverted { " (inverted)" } else { "" }
    );

    output.push_str(&format!(
        " {}(strength {:.2}){}\n",
        DIM, candidate.strength, RESET
    ));

    if verbose {
        output.push_str(&format!(
            "      {}Bin: {} | Amplitude: {:.4} | Attenuation estimate: {:.2}{}\n",
            DIM, candidate.bin, candidate.amplitude, echo.attenuation_estimate, RESET
        ));
    }

    output
}

/// Format a windowed batch run, one line per window
pub fn format_windows(source: &str, windows: &[WindowReport]) -> String {
    let mut output = format!(
        "{}{}{} {}({} windows){}\n",
        BOLD,
        source,
        RESET,
        DIM,
        windows.len(),
        RESET
    );

    for window in windows {
        let delays: Vec<String> = window
            .report
            .primary()
            .map(|r| r.delays().iter().map(|d| format!("{:.3}", d)).collect())
            .unwrap_or_default();
        let summary = if delays.is_empty() {
            "-".to_string()
        } else {
            delays.join(", ")
        };
        output.push_str(&format!(
            "  {:>4}  t={:>8.3}s  echoes: {}\n",
            window.index, window.start_time, summary
        ));
    }

    output
}

/// Format a summary for multiple sources
pub fn format_summary(analyzed: usize, with_echoes: usize, failed: usize) -> String {
    let mut output = format!("\n{}Summary:{}\n", BOLD, RESET);
    output.push_str(&format!("  {} source(s) analyzed\n", analyzed));

    if with_echoes > 0 {
        output.push_str(&format!("  \x1b[33m⚠ {} with echoes{}\n", with_echoes, RESET));
    }
    let clean = analyzed.saturating_sub(with_echoes + failed);
    if clean > 0 {
        output.push_str(&format!("  \x1b[32m✓ {} without echoes{}\n", clean, RESET));
    }
    if failed > 0 {
        output.push_str(&format!("  \x1b[31m✗ {} failed{}\n", failed, RESET));
    }

    output
}

/// Error in a form callers can act on: kind plus the offending value
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub kind: String,
    pub message: String,
}

impl ErrorReport {
    pub fn from_anyhow(error: &anyhow::Error) -> Self {
        match error.downcast_ref::<EchoError>() {
            Some(echo) => Self {
                kind: echo.kind().to_string(),
                message: format!("{:#}", error),
            },
            None => Self {
                kind: "input".to_string(),
                message: format!("{:#}", error),
            },
        }
    }
}

/// Print an error to stderr
pub fn print_error(error: &anyhow::Error) {
    let report = ErrorReport::from_anyhow(error);
    eprintln!("{} [{}] {}", "error".red(), report.kind, report.message);
}

/// Results for one input source
#[derive(Debug, Serialize)]
pub struct SourceReport {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<AnalysisReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub windows: Option<Vec<WindowReport>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorReport>,
}

/// Top-level JSON document
#[derive(Debug, Serialize)]
pub struct JsonEnvelope<'a> {
    pub tool: &'static str,
    pub version: &'static str,
    pub generated_at: String,
    pub config: &'a EchoConfig,
    pub sources: Vec<SourceReport>,
}

impl<'a> JsonEnvelope<'a> {
    pub fn new(config: &'a EchoConfig, sources: Vec<SourceReport>) -> Self {
        Self {
            tool: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            generated_at: chrono::Utc::now().to_rfc3339(),
            config,
            sources,
        }
    }
}

/// Format results as pretty-printed JSON
pub fn format_json(envelope: &JsonEnvelope<'_>) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(envelope)?)
}
