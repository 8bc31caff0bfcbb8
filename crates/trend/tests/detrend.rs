use approx::assert_relative_eq;
use dhwgen_trend::{DetrendConfig, TimeSeries, TrendModel, combine, detrend, fit_trend};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

/// Bell-shaped warming signal with seeded noise, clamped at zero.
fn noisy_bell(n: usize, seed: u64) -> Vec<f64> {
    let truth = TrendModel::gaussian(8.0, 0.7 * n as f64, 0.4 * n as f64).unwrap();
    let noise = Normal::new(0.0, 0.3).unwrap();
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| (truth.evaluate_index(i) + noise.sample(&mut rng)).max(0.0))
        .collect()
}

#[test]
fn residuals_plus_trend_reproduce_timeline() {
    let values = noisy_bell(60, 7);
    let hist = TimeSeries::from_start(1990, values[..30].to_vec()).unwrap();
    let proj = TimeSeries::from_start(2020, values[30..].to_vec()).unwrap();
    let timeline = combine(&hist, &proj).unwrap();

    let detrended = detrend(&timeline, &DetrendConfig::default()).unwrap();
    assert_eq!(detrended.residuals().len(), timeline.len());
    for (i, (&v, &r)) in timeline
        .values()
        .iter()
        .zip(detrended.residuals().values())
        .enumerate()
    {
        assert_relative_eq!(
            r + detrended.model().evaluate_index(i),
            v,
            epsilon = 1e-9
        );
    }
}

#[test]
fn refitting_the_fitted_curve_is_stable() {
    let values = noisy_bell(50, 11);
    let config = DetrendConfig::default();
    let first = fit_trend(&values, &config).unwrap();

    let smooth: Vec<f64> = (0..values.len()).map(|i| first.evaluate_index(i)).collect();
    let second = fit_trend(&smooth, &config).unwrap();
    for i in 0..values.len() {
        assert_relative_eq!(
            second.evaluate_index(i),
            first.evaluate_index(i),
            epsilon = 1e-4,
            max_relative = 1e-4
        );
    }
}

#[test]
fn fitted_trend_tracks_signal() {
    let values = noisy_bell(80, 3);
    let fit = fit_trend(&values, &DetrendConfig::default()).unwrap();
    let rss: f64 = values
        .iter()
        .enumerate()
        .map(|(i, &v)| (v - fit.evaluate_index(i)).powi(2))
        .sum();
    // Noise variance is 0.09; a good fit leaves roughly that per point.
    assert!(rss / (values.len() as f64) < 0.2, "mean squared residual {}", rss / 80.0);
}

#[test]
fn detrend_constant_timeline_is_fit_failure() {
    let hist = TimeSeries::from_start(2000, vec![1.0; 5]).unwrap();
    let proj = TimeSeries::from_start(2010, vec![1.0; 5]).unwrap();
    let timeline = combine(&hist, &proj).unwrap();
    let err = detrend(&timeline, &DetrendConfig::default()).unwrap_err();
    assert!(err.is_fit_failure());
}
