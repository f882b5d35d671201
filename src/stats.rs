/// Mean and sample standard deviation, skipping NaN entries.
///
/// No usable values gives `(NaN, NaN)`, a single value gives a std of 0.0.
pub fn mean_std(values: &[f64]) -> (f64, f64) {
    let present: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if present.is_empty() {
        return (f64::NAN, f64::NAN);
    }

    let mean = calculate_mean(&present);
    if present.len() < 2 {
        return (mean, 0.0);
    }

    let variance = present.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
        / (present.len() - 1) as f64;
    (mean, variance.sqrt())
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(calculate_mean(values))
    }
}

fn calculate_mean(values: &[f64]) -> f64 {
    let sum: f64 = values.iter().sum();
    sum / values.len() as f64
}
