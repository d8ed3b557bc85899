// src/cli/input.rs
//
// WAV loading and input file discovery

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::core::signal::Signal;

const SUPPORTED_EXTENSIONS: [&str; 2] = ["wav", "wave"];

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Expand files and directories into a sorted list of WAV files
pub fn collect_wav_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            if is_supported(path) {
                files.push(path.clone());
            } else {
                log::warn!("skipping unsupported file {}", path.display());
            }
        } else if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                if entry.file_type().is_file() && is_supported(entry.path()) {
                    files.push(entry.path().to_path_buf());
                }
            }
        } else {
            bail!("Input path does not exist: {}", path.display());
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

/// Decode a WAV file, mixing all channels down to mono
pub fn read_wav_mono(path: &Path) -> Result<Signal> {
    let mut reader = hound::WavReader::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f64> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let scale = 1.0 / (1u64 << (spec.bits_per_sample.max(1) - 1)) as f64;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f64 * scale))
                .collect::<Result<_, _>>()?
        }
    };

    let mono: Vec<f64> = interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f64>() / frame.len() as f64)
        .collect();

    log::debug!(
        "decoded {}: {} Hz, {} channel(s), {} frames",
        path.display(),
        spec.sample_rate,
        channels,
        mono.len()
    );

    Signal::new(mono, spec.sample_rate as f64)
        .with_context(|| format!("Invalid audio in {}", path.display()))
}
