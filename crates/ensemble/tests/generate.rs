use dhwgen_ensemble::{
    EnsembleConfig, ErrorKind, blend, GevParams, PatternCell, ReferencePattern, Site, SiteCoord,
    TimeSeries, TrendAnchor, YearlyDistribution, generate_ensemble, sample_bounded,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn cell(lon: f64, lat: f64, value: f64) -> PatternCell {
    PatternCell {
        coord: SiteCoord::new(lon, lat),
        value,
    }
}

/// Two-cell pattern with domain mean 0: +1 near the origin, -1 far away.
fn unit_pattern() -> ReferencePattern {
    ReferencePattern::new(vec![cell(0.0, 0.0, 1.0), cell(10.0, 10.0, -1.0)]).unwrap()
}

fn concrete_inputs() -> (TimeSeries, TimeSeries) {
    let hist = TimeSeries::new(vec![2015, 2016, 2017], vec![3.0, 4.0, 2.5]).unwrap();
    let proj = TimeSeries::new(vec![2025, 2026], vec![5.0, 5.5]).unwrap();
    (hist, proj)
}

fn concrete_config(seed: u64) -> EnsembleConfig {
    EnsembleConfig::new()
        .with_n_members(3)
        .with_years(2025, 2027)
        .with_seed(seed)
}

/// A longer synthetic domain record with a warming signal.
fn domain_inputs() -> (TimeSeries, TimeSeries) {
    let hist: Vec<f64> = (0..30)
        .map(|i| 1.0 + 0.05 * i as f64 + if i % 4 == 0 { 2.0 } else { 0.3 * (i % 3) as f64 })
        .collect();
    let proj: Vec<f64> = (0..50)
        .map(|i| 2.5 + 0.12 * i as f64 + if i % 5 == 0 { 3.0 } else { 0.4 * (i % 3) as f64 })
        .collect();
    (
        TimeSeries::from_start(1990, hist).unwrap(),
        TimeSeries::from_start(2021, proj).unwrap(),
    )
}

#[test]
fn concrete_scenario() {
    let (hist, proj) = concrete_inputs();
    let sites = [Site::new(SiteCoord::new(0.0, 0.0))];
    let result = generate_ensemble(&hist, &proj, &sites, &unit_pattern(), &concrete_config(42))
        .unwrap();

    assert_eq!(result.spatial().deviation(0), Some(1.0));
    assert_eq!(result.spatial().domain_mean(), 0.0);

    let array = result.array();
    assert_eq!(array.n_members(), 3);
    assert_eq!(array.n_sites(), 1);
    assert_eq!(array.years(), &[2025, 2026]);
    assert_eq!(array.trajectory(0, 0).unwrap(), &[5.0, 5.5]);
    assert!(array.values().iter().all(|&v| v >= 0.0));

    let again = generate_ensemble(&hist, &proj, &sites, &unit_pattern(), &concrete_config(42))
        .unwrap();
    assert_eq!(again.array(), array);
}

#[test]
fn fixed_seed_is_bit_identical() {
    let (hist, proj) = domain_inputs();
    let sites: Vec<Site> = (0..6)
        .map(|i| Site::new(SiteCoord::new(i as f64 * 2.0, i as f64)))
        .collect();
    let cfg = EnsembleConfig::new()
        .with_n_members(8)
        .with_years(2030, 2060)
        .with_seed(2024);
    let a = generate_ensemble(&hist, &proj, &sites, &unit_pattern(), &cfg).unwrap();
    let b = generate_ensemble(&hist, &proj, &sites, &unit_pattern(), &cfg).unwrap();
    let bits = |r: &dhwgen_ensemble::EnsembleResult| -> Vec<u64> {
        r.array().values().iter().map(|v| v.to_bits()).collect()
    };
    assert_eq!(bits(&a), bits(&b));
    assert_eq!(a.warnings(), b.warnings());
}

#[test]
fn different_seeds_differ() {
    let (hist, proj) = domain_inputs();
    let sites = [Site::new(SiteCoord::new(1.0, 1.0))];
    let base = EnsembleConfig::new().with_n_members(4).with_years(2030, 2040);
    let a = generate_ensemble(&hist, &proj, &sites, &unit_pattern(), &base.clone().with_seed(1))
        .unwrap();
    let b = generate_ensemble(&hist, &proj, &sites, &unit_pattern(), &base.with_seed(2)).unwrap();
    assert_eq!(a.array().trajectory(0, 0), b.array().trajectory(0, 0));
    assert_ne!(a.array().trajectory(1, 0), b.array().trajectory(1, 0));
}

#[test]
fn member_zero_is_projection_and_all_values_non_negative() {
    let (hist, proj) = domain_inputs();
    let sites = [
        Site::new(SiteCoord::new(0.0, 0.0)),
        Site::new(SiteCoord::new(9.0, 9.0)),
    ];
    let cfg = EnsembleConfig::new()
        .with_n_members(10)
        .with_years(2025, 2071)
        .with_seed(5);
    let result = generate_ensemble(&hist, &proj, &sites, &unit_pattern(), &cfg).unwrap();
    let expected = proj.slice_years(2025, 2070).unwrap();
    for s in 0..2 {
        assert_eq!(result.array().trajectory(0, s).unwrap(), expected);
    }
    assert!(result.array().values().iter().all(|&v| v >= 0.0 && v.is_finite()));
}

#[test]
fn windows_grow_across_generation_years() {
    let (hist, proj) = domain_inputs();
    let sites = [Site::new(SiteCoord::new(0.0, 0.0))];
    let cfg = EnsembleConfig::new()
        .with_n_members(2)
        .with_years(2030, 2050)
        .with_seed(3);
    let result = generate_ensemble(&hist, &proj, &sites, &unit_pattern(), &cfg).unwrap();
    let dists = result.distributions();
    assert_eq!(dists.len(), 20);
    assert_eq!(dists[0].window_len(), 30 + (2030 - 2021) + 1);
    assert!(dists.windows(2).all(|w| w[1].window_len() > w[0].window_len()));
    let q = dists[0].params().quantile(0.97).unwrap();
    assert_eq!(result.intensity_threshold(), q);
}

#[test]
fn site_history_and_timeline_anchor() {
    let (hist, proj) = domain_inputs();
    let site_hist = TimeSeries::from_start(
        1990,
        hist.values().iter().map(|v| v * 1.2).collect(),
    )
    .unwrap();
    let sites = [
        Site::with_history(SiteCoord::new(0.0, 0.0), site_hist),
        Site::new(SiteCoord::new(0.0, 0.0)),
    ];
    let cfg = EnsembleConfig::new()
        .with_n_members(5)
        .with_years(2030, 2040)
        .with_seed(11)
        .with_trend_anchor(TrendAnchor::Timeline);
    let result = generate_ensemble(&hist, &proj, &sites, &unit_pattern(), &cfg).unwrap();
    assert_eq!(
        result.array().trajectory(0, 0),
        result.array().trajectory(0, 1)
    );
    assert!(result.array().values().iter().all(|&v| v >= 0.0));
}

#[test]
fn flat_site_timeline_is_fit_error() {
    let (hist, _) = concrete_inputs();
    let proj = TimeSeries::new(vec![2025, 2026], vec![2.0, 2.0]).unwrap();
    // The site's own history plus the projection is constant, so its trend
    // has no spread to start from.
    let flat_hist = TimeSeries::new(vec![2015, 2016], vec![2.0, 2.0]).unwrap();
    let sites = [Site::with_history(SiteCoord::new(0.0, 0.0), flat_hist)];
    let err = generate_ensemble(&hist, &proj, &sites, &unit_pattern(), &concrete_config(1))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Fit);
}

#[test]
fn rejection_cap_clamps_instead_of_hanging() {
    // Lower support bound is 1 - 0.8 / 0.5 = -0.6, above the window maximum.
    let params = GevParams::new(0.5, 1.0, 0.8).unwrap();
    let dist = YearlyDistribution::new(2025, params, 4, -1.0);
    let mut rng = StdRng::seed_from_u64(0);
    let draw = sample_bounded(&dist, 1000, &mut rng);
    assert!(draw.exhausted);
    assert_eq!(draw.attempts, 1000);
    assert_eq!(draw.value, -1.0);
}

#[test]
fn exhausted_draws_are_reported_with_clamped_values() {
    let (hist, proj) = concrete_inputs();
    let sites = [
        Site::new(SiteCoord::new(0.0, 0.0)),
        Site::new(SiteCoord::new(10.0, 10.0)),
    ];
    // One attempt per draw: any draw above the window maximum is clamped.
    let cfg = concrete_config(17).with_n_members(40).with_max_attempts(1);
    let result = generate_ensemble(&hist, &proj, &sites, &unit_pattern(), &cfg).unwrap();

    let warnings = result.warnings();
    assert!(!warnings.is_empty());
    assert!(warnings.windows(2).all(|w| {
        (w[0].site, w[0].member, w[0].year_index) < (w[1].site, w[1].member, w[1].year_index)
    }));

    let array = result.array();
    for w in warnings {
        assert!(w.member >= 1);
        assert_eq!(w.attempts, 1);
        let dist = &result.distributions()[w.year_index];
        let raw = dist.window_max() + result.trend().evaluate_index(w.year_index);
        let deviation = result.spatial().deviation(w.site).unwrap();
        let expected = blend(raw, deviation, result.intensity_threshold());
        assert_eq!(array.get(w.member, w.site, w.year_index), Some(expected));
    }
}
