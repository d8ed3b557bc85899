// src/core/analysis/batch.rs
//
// Windowed analysis of long recordings. Windows are independent, so they
// are analysed in parallel on the rayon pool; a shared flag lets the caller
// stop the run between windows.

use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::core::analyzer::{AnalysisReport, EchoAnalyzer};
use crate::core::signal::Signal;
use crate::error::{EchoError, EchoResult};

/// Result for one window of a batch run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowReport {
    pub index: usize,
    /// First sample of the window
    pub offset: usize,
    /// Time of the first sample of the window
    pub start_time: f64,
    pub report: AnalysisReport,
}

/// Start offsets of every full window
pub fn window_offsets(signal_len: usize, window_size: usize, hop_size: usize) -> Vec<usize> {
    if window_size == 0 || hop_size == 0 || window_size > signal_len {
        return Vec::new();
    }
    (0..=signal_len - window_size).step_by(hop_size).collect()
}

/// Analyse every window of `signal`. See [`analyze_windows_with`].
pub fn analyze_windows(
    analyzer: &EchoAnalyzer,
    signal: &Signal,
    cancel: &AtomicBool,
) -> EchoResult<Vec<WindowReport>> {
    analyze_windows_with(analyzer, signal, cancel, |_| {})
}

/// Analyse every window of `signal`, calling `on_window` as each finishes.
///
/// `cancel` is checked before each window starts. If it was raised, the run
/// fails with [`EchoError::Cancelled`] once in-flight windows finish.
/// Otherwise the first failing window (by index) determines the error.
pub fn analyze_windows_with<F>(
    analyzer: &EchoAnalyzer,
    signal: &Signal,
    cancel: &AtomicBool,
    on_window: F,
) -> EchoResult<Vec<WindowReport>>
where
    F: Fn(&WindowReport) + Sync,
{
    let config = analyzer.config();
    let window_size = config.window_size;
    let offsets = window_offsets(signal.len(), window_size, config.effective_hop_size());
    if offsets.is_empty() {
        return Err(EchoError::WindowTooLarge {
            window_size,
            signal_len: signal.len(),
        });
    }

    let total = offsets.len();
    info!(
        "analysing {} window(s) of {} samples (hop {})",
        total,
        window_size,
        config.effective_hop_size()
    );

    let completed = AtomicUsize::new(0);
    let outcomes: Vec<Option<EchoResult<WindowReport>>> = offsets
        .par_iter()
        .enumerate()
        .map(|(index, &offset)| {
            if cancel.load(Ordering::Relaxed) {
                return None;
            }
            let outcome = analyzer
                .analyze_window(signal, offset)
                .map(|report| WindowReport {
                    index,
                    offset,
                    start_time: signal.time_at(offset),
                    report,
                });
            if let Ok(window) = &outcome {
                completed.fetch_add(1, Ordering::Relaxed);
                on_window(window);
            }
            Some(outcome)
        })
        .collect();

    let mut windows = Vec::with_capacity(total);
    let mut skipped = 0;
    for outcome in outcomes {
        match outcome {
            Some(Ok(window)) => windows.push(window),
            Some(Err(e)) => {
                warn!("window analysis failed: {}", e);
                return Err(e);
            }
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        let completed = completed.load(Ordering::Relaxed);
        info!("batch cancelled after {} of {} windows", completed, total);
        return Err(EchoError::Cancelled { completed, total });
    }

    windows.sort_by_key(|w| w.index);
    debug!("batch finished: {} windows", windows.len());
    Ok(windows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_offsets() {
        assert_eq!(window_offsets(3000, 1000, 1000), vec![0, 1000, 2000]);
        assert_eq!(window_offsets(2500, 1000, 500), vec![0, 500, 1000, 1500]);
        assert_eq!(window_offsets(1000, 1000, 1), vec![0]);
        assert!(window_offsets(999, 1000, 1000).is_empty());
        assert!(window_offsets(1000, 0, 1).is_empty());
    }
}
