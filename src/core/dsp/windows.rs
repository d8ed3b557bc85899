//! Window function implementations

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Tapering windows applied before the forward transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowFunction {
    Rectangular,
    Hann,
    Hamming,
    Blackman,
    /// Hann half-taper over the trailing percentage of the window
    TrailingHann(u32),
}

impl Default for WindowFunction {
    fn default() -> Self {
        Self::TrailingHann(25)
    }
}

impl WindowFunction {
    /// Generate window coefficients
    pub fn generate(&self, size: usize) -> Vec<f64> {
        if size <= 1 {
            return vec![1.0; size];
        }
        match self {
            WindowFunction::Rectangular => vec![1.0; size],
            WindowFunction::Hann => cosine_sum(size, &[0.5, 0.5]),
            WindowFunction::Hamming => cosine_sum(size, &[0.54, 0.46]),
            WindowFunction::Blackman => cosine_sum(size, &[0.42, 0.5, 0.08]),
            WindowFunction::TrailingHann(percent) => trailing_hann(size, *percent),
        }
    }

    pub fn name(&self) -> String {
        match self {
            WindowFunction::Rectangular => "rectangular".to_string(),
            WindowFunction::Hann => "hann".to_string(),
            WindowFunction::Hamming => "hamming".to_string(),
            WindowFunction::Blackman => "blackman".to_string(),
            WindowFunction::TrailingHann(p) => format!("trailing-hann-{}", p),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "rectangular" | "rect" | "none" => Some(Self::Rectangular),
            "hann" | "hanning" => Some(Self::Hann),
            "hamming" => Some(Self::Hamming),
            "blackman" => Some(Self::Blackman),
            "trailing-hann" | "trailing" => Some(Self::default()),
            other => other
                .strip_prefix("trailing-hann-")
                .and_then(|p| p.parse().ok())
                .filter(|&p: &u32| p <= 100)
                .map(Self::TrailingHann),
        }
    }
}

/// Symmetric generalized cosine window: a0 - a1 cos(x) + a2 cos(2x) - ...
fn cosine_sum(size: usize, coeffs: &[f64]) -> Vec<f64> {
    (0..size)
        .map(|i| {
            let x = 2.0 * PI * i as f64 / (size - 1) as f64;
            coeffs
                .iter()
                .enumerate()
                .map(|(k, &a)| {
                    let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
                    sign * a * (k as f64 * x).cos()
                })
                .sum()
        })
        .collect()
}

fn trailing_hann(size: usize, percent: u32) -> Vec<f64> {
    let mut window = vec![1.0; size];
    let taper = ((percent.min(100) as f64 / 100.0) * size as f64).round() as usize;
    for k in 0..taper {
        // k = 0 is the last sample
        window[size - 1 - k] = 0.5 * (1.0 - (PI * k as f64 / taper as f64).cos());
    }
    window
}
