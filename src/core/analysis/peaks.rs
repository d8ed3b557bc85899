// src/core/analysis/peaks.rs
//
// Cepstral peak picking: turns a cepstrum into ranked echo-delay candidates.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::cepstrum::Cepstrum;
use crate::config::EchoConfig;
use crate::core::dsp::stats::std_dev;

/// Strengths closer than this (relative) are treated as equal
pub const STRENGTH_TIE_TOLERANCE: f64 = 1e-9;

/// A cepstral peak that may correspond to a reflective path
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EchoCandidate {
    /// Quefrency bin of the peak
    pub bin: usize,
    /// Quefrency of the peak in seconds
    pub delay: f64,
    /// Peak height in units of the cepstrum's standard deviation
    pub strength: f64,
    /// Raw cepstral value at the peak
    pub amplitude: f64,
    /// 1-based position after ranking by strength
    pub rank: usize,
    /// Peak found as a negative excursion (sign-flipped reflection)
    pub inverted: bool,
}

/// Finds local maxima of a cepstrum inside a delay range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakDetector {
    threshold: f64,
    include_inverted: bool,
}

impl Default for PeakDetector {
    fn default() -> Self {
        Self::from_config(&EchoConfig::default())
    }
}

impl PeakDetector {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            include_inverted: false,
        }
    }

    pub fn from_config(config: &EchoConfig) -> Self {
        Self {
            threshold: config.peak_strength_threshold,
            include_inverted: config.include_inverted,
        }
    }

    /// Also report negative cepstral peaks (scans |c| instead of c)
    pub fn with_inverted(mut self, include: bool) -> Self {
        self.include_inverted = include;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Rank echo candidates with delays in `[min_delay, max_delay]`.
    ///
    /// The zero-lag bin is never a candidate. An empty result means no peak
    /// cleared the strength threshold; it is not an error.
    pub fn find_echoes(
        &self,
        cepstrum: &Cepstrum,
        min_delay: f64,
        max_delay: f64,
        max_candidates: usize,
    ) -> Vec<EchoCandidate> {
        let raw = cepstrum.values();
        let n = raw.len();
        if n < 3 || max_candidates == 0 {
            return Vec::new();
        }

        let scanned: Vec<f64> = if self.include_inverted {
            raw.iter().map(|v| v.abs()).collect()
        } else {
            raw.to_vec()
        };

        // Zero lag carries the mean log-magnitude and would dominate the scale
        let scale = std_dev(&scanned[1..]);
        let peak = raw.iter().fold(1.0f64, |m, v| m.max(v.abs()));
        if !(scale.is_finite() && scale > 1e-9 * peak) {
            warn!("cepstrum has no variance outside zero lag; no echoes reported");
            return Vec::new();
        }

        let rate = cepstrum.sample_rate();
        let lo = ((min_delay * rate) - 1e-9).ceil().max(1.0) as usize;
        let hi = (((max_delay * rate) + 1e-9).floor().max(0.0) as usize).min(n / 2);
        if lo > hi {
            debug!(
                "delay range [{}, {}] s maps to no quefrency bins",
                min_delay, max_delay
            );
            return Vec::new();
        }

        let mut candidates: Vec<EchoCandidate> = (lo..=hi)
            .filter(|&i| scanned[i] > scanned[i - 1] && scanned[i] > scanned[i + 1])
            .map(|i| EchoCandidate {
                bin: i,
                delay: cepstrum.quefrency(i),
                strength: scanned[i] / scale,
                amplitude: raw[i],
                rank: 0,
                inverted: raw[i] < 0.0,
            })
            .filter(|c| c.strength >= self.threshold)
            .collect();

        rank_by_strength(&mut candidates);
        if candidates.len() > max_candidates {
            debug!(
                "{} peaks above threshold, keeping {}",
                candidates.len(),
                max_candidates
            );
            candidates.truncate(max_candidates);
        }
        for (i, candidate) in candidates.iter_mut().enumerate() {
            candidate.rank = i + 1;
        }
        candidates
    }
}

fn strengths_tie(a: f64, b: f64) -> bool {
    (a - b).abs() <= STRENGTH_TIE_TOLERANCE * a.abs().max(b.abs()).max(1.0)
}

/// Descending strength; near-equal strengths go to the shorter delay
fn rank_by_strength(candidates: &mut [EchoCandidate]) {
    candidates.sort_by(|a, b| {
        b.strength
            .total_cmp(&a.strength)
            .then_with(|| a.bin.cmp(&b.bin))
    });

    // Tolerance is not transitive, so settle ties after the total-order sort
    for i in 1..candidates.len() {
        let mut j = i;
        while j > 0
            && strengths_tie(candidates[j - 1].strength, candidates[j].strength)
            && candidates[j - 1].bin.cmp(&candidates[j].bin) == Ordering::Greater
        {
            candidates.swap(j - 1, j);
            j -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Flat-ish cepstrum with spikes at the given (bin, value) positions
    fn spiky(len: usize, spikes: &[(usize, f64)]) -> Cepstrum {
        let mut values: Vec<f64> = (0..len)
            .map(|i| 0.01 * ((i as f64) * 1.7).sin())
            .collect();
        values[0] = -5.0;
        for &(bin, value) in spikes {
            values[bin] = value;
            values[len - bin] = value;
        }
        Cepstrum::from_values(values, 1000.0).unwrap()
    }

    #[test]
    fn test_finds_and_ranks_peaks() {
        let cepstrum = spiky(1000, &[(100, 0.3), (300, 0.6)]);
        let echoes = PeakDetector::new(2.0).find_echoes(&cepstrum, 0.01, 0.45, 5);

        assert_eq!(echoes.len(), 2);
        assert_eq!(echoes[0].bin, 300);
        assert_eq!(echoes[0].rank, 1);
        assert_eq!(echoes[1].bin, 100);
        assert_eq!(echoes[1].rank, 2);
        assert!((echoes[1].delay - 0.1).abs() < 1e-12);
        assert!(echoes[0].strength > echoes[1].strength);
        assert_eq!(echoes[0].amplitude, 0.6);
    }

    #[test]
    fn test_zero_lag_excluded() {
        let mut values = vec![0.0; 64];
        values[0] = 10.0;
        values[5] = 1.0;
        values[59] = 1.0;
        let cepstrum = Cepstrum::from_values(values, 64.0).unwrap();
        let echoes = PeakDetector::new(0.0).find_echoes(&cepstrum, 0.0, 1.0, 10);
        assert_eq!(echoes.len(), 1);
        assert_eq!(echoes[0].bin, 5);
    }

    #[test]
    fn test_delay_bounds_restrict_search() {
        let cepstrum = spiky(1000, &[(100, 0.3), (300, 0.6)]);
        let echoes = PeakDetector::new(2.0).find_echoes(&cepstrum, 0.2, 0.45, 5);
        assert_eq!(echoes.len(), 1);
        assert_eq!(echoes[0].bin, 300);

        assert!(PeakDetector::new(2.0)
            .find_echoes(&cepstrum, 0.4, 0.2, 5)
            .is_empty());
    }

    #[test]
    fn test_tie_prefers_shorter_delay() {
        let cepstrum = spiky(1000, &[(250, 0.5), (120, 0.5), (400, 0.5)]);
        let echoes = PeakDetector::new(1.0).find_echoes(&cepstrum, 0.01, 0.45, 5);
        let bins: Vec<usize> = echoes.iter().map(|e| e.bin).collect();
        assert_eq!(bins, vec![120, 250, 400]);
    }

    #[test]
    fn test_truncation_and_threshold_monotonicity() {
        let cepstrum = spiky(1000, &[(50, 0.2), (150, 0.4), (250, 0.6), (350, 0.8)]);
        let truncated = PeakDetector::new(1.0).find_echoes(&cepstrum, 0.01, 0.45, 2);
        assert_eq!(truncated.len(), 2);
        assert_eq!(truncated[0].bin, 350);
        assert_eq!(truncated[1].bin, 250);

        let mut previous = usize::MAX;
        for threshold in [0.0, 1.0, 2.0, 4.0, 8.0, 16.0, 64.0] {
            let count = PeakDetector::new(threshold)
                .find_echoes(&cepstrum, 0.01, 0.45, 100)
                .len();
            assert!(count <= previous);
            previous = count;
        }
        assert_eq!(previous, 0);
    }

    #[test]
    fn test_inverted_peaks_only_when_enabled() {
        let cepstrum = spiky(1000, &[(200, -0.5)]);
        assert!(PeakDetector::new(2.0)
            .find_echoes(&cepstrum, 0.01, 0.45, 5)
            .is_empty());

        let echoes = PeakDetector::new(2.0)
            .with_inverted(true)
            .find_echoes(&cepstrum, 0.01, 0.45, 5);
        assert_eq!(echoes.len(), 1);
        assert_eq!(echoes[0].bin, 200);
        assert!(echoes[0].inverted);
        assert!(echoes[0].amplitude < 0.0);
    }

    #[test]
    fn test_flat_cepstrum_has_no_candidates() {
        let mut values = vec![0.0; 32];
        values[0] = -27.0;
        let cepstrum = Cepstrum::from_values(values, 32.0).unwrap();
        assert!(PeakDetector::new(0.0)
            .find_echoes(&cepstrum, 0.0, 1.0, 10)
            .is_empty());
    }
}
