// src/cli/mod.rs
//
// Command-line interface module

mod args;
mod input;
mod output;

pub use args::{AnalysisOptions, Cli, Commands, ScenarioArgs};
pub use input::{collect_wav_files, read_wav_mono};
pub use output::{
    format_json, format_report, format_summary, format_windows, print_error, ErrorReport,
    JsonEnvelope, SourceReport,
};

use anyhow::{anyhow, Result};
use colorful::Colorful;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::AtomicBool;

use crate::config::{EchoConfig, ProfilePreset};
use crate::core::analysis::analyze_windows_with;
use crate::core::analyzer::EchoAnalyzer;
use crate::core::signal::Signal;
use crate::testgen::write_wav;

/// Run the CLI
pub fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Analyze { paths, options } => run_analyze(paths, options, cli.verbose > 0),
        Commands::Synth {
            scenario,
            output,
            options,
        } => {
            let config = options.to_config()?;
            let composite = scenario.scenario().build()?;
            if let Some(path) = output {
                write_wav(path, &composite.received)?;
                log::info!("wrote synthetic signal to {}", path.display());
            }

            let analyzer = EchoAnalyzer::new(config)?;
            let source = analyze_source(
                "synthetic",
                &composite.received,
                &analyzer,
                options.batch(),
                None,
            )?;
            emit(&analyzer, options, vec![source], cli.verbose > 0)
        }
        Commands::Profiles => {
            print_profiles();
            Ok(())
        }
    }
}

fn run_analyze(
    paths: &[std::path::PathBuf],
    options: &AnalysisOptions,
    verbose: bool,
) -> Result<()> {
    let config = options.to_config()?;
    let files = collect_wav_files(paths)?;
    if files.is_empty() {
        println!("{}", "No WAV files found!".red());
        return Ok(());
    }

    let analyzer = EchoAnalyzer::new(config)?;
    let progress = if options.json || files.len() == 1 {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        pb
    };

    let mut sources = Vec::with_capacity(files.len());
    for path in &files {
        let name = path.display().to_string();
        progress.set_message(name.clone());
        let outcome = read_wav_mono(path).and_then(|signal| {
            analyze_source(&name, &signal, &analyzer, options.batch(), Some(&progress))
        });
        sources.push(outcome.unwrap_or_else(|e| failed_source(&name, &e)));
        progress.inc(1);
    }
    progress.finish_and_clear();

    let failed = sources.iter().filter(|s| s.error.is_some()).count();
    emit(&analyzer, options, sources, verbose)?;
    if failed > 0 {
        return Err(anyhow!("{} of {} file(s) failed", failed, files.len()));
    }
    Ok(())
}

fn analyze_source(
    name: &str,
    signal: &Signal,
    analyzer: &EchoAnalyzer,
    batch: bool,
    progress: Option<&ProgressBar>,
) -> Result<SourceReport> {
    let mut source = SourceReport {
        source: name.to_string(),
        report: None,
        windows: None,
        error: None,
    };
    if batch {
        let cancel = AtomicBool::new(false);
        source.windows = Some(analyze_windows_with(analyzer, signal, &cancel, |_| {
            if let Some(pb) = progress {
                pb.tick();
            }
        })?);
    } else {
        source.report = Some(analyzer.analyze(signal)?);
    }
    Ok(source)
}

fn failed_source(name: &str, error: &anyhow::Error) -> SourceReport {
    SourceReport {
        source: name.to_string(),
        report: None,
        windows: None,
        error: Some(ErrorReport::from_anyhow(error)),
    }
}

fn emit(
    analyzer: &EchoAnalyzer,
    options: &AnalysisOptions,
    sources: Vec<SourceReport>,
    verbose: bool,
) -> Result<()> {
    if options.json {
        println!("{}", format_json(&JsonEnvelope::new(analyzer.config(), sources))?);
        return Ok(());
    }

    let mut with_echoes = 0;
    let mut failed = 0;
    for source in &sources {
        if let Some(report) = &source.report {
            print!("{}", format_report(&source.source, report, verbose));
            if report.echo_count() > 0 {
                with_echoes += 1;
            }
        }
        if let Some(windows) = &source.windows {
            print!("{}", format_windows(&source.source, windows));
            if windows.iter().any(|w| w.report.echo_count() > 0) {
                with_echoes += 1;
            }
        }
        if let Some(error) = &source.error {
            failed += 1;
            eprintln!(
                "{} {} [{}] {}",
                "✗".red(),
                source.source,
                error.kind,
                error.message
            );
        }
    }

    if sources.len() > 1 {
        print!("{}", format_summary(sources.len(), with_echoes, failed));
    }
    Ok(())
}

/// Print available profiles
pub fn print_profiles() {
    println!("Available configuration profiles:\n");

    for preset in ProfilePreset::all() {
        let config = EchoConfig::from_preset(preset);
        println!("  {:?} - {}", preset, preset.description());
        println!(
            "    Delay range: {:.3}-{:.3} s | Threshold: {:.1} | Max echoes: {}",
            config.min_delay, config.max_delay, config.peak_strength_threshold, config.max_candidates
        );
        println!(
            "    Window: {} samples, {} | Order: {:?}{}",
            config.window_size,
            config.window_function.name(),
            config.sort_order,
            if config.include_inverted { " | inverted echoes" } else { "" }
        );
        println!();
    }
}
