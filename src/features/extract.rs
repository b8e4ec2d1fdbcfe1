//! Statistics over one window of ADC samples.

use super::FeatureVector;

/// Extract the feature vector of a window.
///
/// The window is mean-centered first; every statistic is taken over the
/// centered values `x`. Standard deviations are population (divisor N).
/// Zero crossings count adjacent pairs of strictly opposite sign, so exact
/// zeros never cross. For a single-sample window the slope series is `[0.0]`.
/// An empty window yields all zeros.
pub fn extract_features(window: &[f32]) -> FeatureVector {
    let n = window.len();
    if n == 0 {
        return FeatureVector::default();
    }

    // Accumulated in f64 and rounded once to f32. Models fitted by an
    // all-f32 implementation agree to the last few ulps.
    let offset = window.iter().map(|&v| v as f64).sum::<f64>() / n as f64;
    let x: Vec<f64> = window.iter().map(|&v| v as f64 - offset).collect();

    let (mean, std) = mean_std(&x);
    let min = x.iter().copied().fold(f64::INFINITY, f64::min) as f32;
    let max = x.iter().copied().fold(f64::NEG_INFINITY, f64::max) as f32;
    let energy = x.iter().map(|v| v * v).sum::<f64>() / n as f64;

    let zero_crossings = x
        .windows(2)
        .filter(|pair| (pair[0] > 0.0 && pair[1] < 0.0) || (pair[0] < 0.0 && pair[1] > 0.0))
        .count();

    let dx: Vec<f64> = if n > 1 {
        x.windows(2).map(|pair| pair[1] - pair[0]).collect()
    } else {
        vec![0.0]
    };
    let (slope_mean, slope_std) = mean_std(&dx);
    let slope_abs_mean = dx.iter().map(|d| d.abs()).sum::<f64>() / dx.len() as f64;

    FeatureVector([
        mean as f32,
        std as f32,
        min,
        max,
        max - min,
        energy as f32,
        zero_crossings as f32,
        slope_mean as f32,
        slope_std as f32,
        slope_abs_mean as f32,
    ])
}

/// Mean and population standard deviation. `values` must be non-empty.
fn mean_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}
