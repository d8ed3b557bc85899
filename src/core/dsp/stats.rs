//! Statistical helpers shared by the analysis stages

/// Arithmetic mean (0 for an empty slice)
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Population standard deviation
pub fn std_dev(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let m = mean(data);
    let variance = data.iter().map(|&x| (x - m) * (x - m)).sum::<f64>() / data.len() as f64;
    variance.sqrt()
}

/// Compute RMS (Root Mean Square)
pub fn rms(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    (samples.iter().map(|s| s * s).sum::<f64>() / samples.len() as f64).sqrt()
}

/// Largest absolute value
pub fn peak_amplitude(samples: &[f64]) -> f64 {
    samples.iter().map(|s| s.abs()).fold(0.0f64, f64::max)
}

/// Relative error of `actual` against `expected`, scaled by the peak of
/// `expected` so near-zero samples do not blow up the ratio.
pub fn max_relative_error(expected: &[f64], actual: &[f64]) -> f64 {
    let scale = peak_amplitude(expected).max(f64::MIN_POSITIVE);
    expected
        .iter()
        .zip(actual)
        .map(|(e, a)| (e - a).abs() / scale)
        .fold(0.0f64, f64::max)
}
