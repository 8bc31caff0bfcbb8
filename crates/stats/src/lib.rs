//! Descriptive statistics shared by the dhwgen crates.
//!
//! Population (N denominator) moments are used throughout because the
//! normal initial guess for trend fitting and the sample-derived GEV
//! parameters both follow maximum-likelihood conventions.

/// Arithmetic mean of a slice. Returns 0.0 if empty.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let sum: f64 = data.iter().sum();
    sum / data.len() as f64
}

/// Population variance (N denominator). Returns 0.0 if empty.
pub fn population_variance(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let m = mean(data);
    data.iter().map(|&x| (x - m) * (x - m)).sum::<f64>() / data.len() as f64
}

/// Population standard deviation (N denominator). Returns 0.0 if empty.
///
/// Together with [`mean`] this is the maximum-likelihood normal fit.
pub fn population_sd(data: &[f64]) -> f64 {
    population_variance(data).sqrt()
}

/// Mean over the finite values of a slice.
///
/// Returns `None` when no finite value is present.
pub fn nan_mean(data: &[f64]) -> Option<f64> {
    let (sum, n) = data
        .iter()
        .filter(|x| x.is_finite())
        .fold((0.0, 0usize), |(s, n), &x| (s + x, n + 1));
    if n == 0 { None } else { Some(sum / n as f64) }
}

/// Largest finite value of a slice, or `None` if there is none.
pub fn finite_max(data: &[f64]) -> Option<f64> {
    data.iter()
        .copied()
        .filter(|x| x.is_finite())
        .fold(None, |acc, x| match acc {
            Some(m) if m >= x => Some(m),
            _ => Some(x),
        })
}

/// Returns `true` if every value is finite.
pub fn all_finite(data: &[f64]) -> bool {
    data.iter().all(|x| x.is_finite())
}
