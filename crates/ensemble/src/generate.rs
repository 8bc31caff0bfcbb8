//! Scenario-level ensemble generation.

use dhwgen_gev::{YearlyDistribution, fit_yearly_distributions};
use dhwgen_spatial::{ReferencePattern, SiteCoord, SpatialPattern};
use dhwgen_trend::{
    CombinedTimeline, TimeSeries, TrendError, TrendModel, combine, detrend, fit_trend,
};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::array::EnsembleArray;
use crate::blend::blend;
use crate::config::{EnsembleConfig, TrendAnchor};
use crate::error::EnsembleError;
use crate::sampler::{SamplingWarning, sample_bounded};
use crate::seed::{resolve_seed, unit_rng};

/// A location to generate trajectories for.
#[derive(Debug, Clone)]
pub struct Site {
    /// Site coordinate, used to look up its spatial deviation.
    pub coord: SiteCoord,
    /// Optional site-level historical yearly maxima. When present the
    /// site's trend is fitted on this history plus the domain projection.
    pub history: Option<TimeSeries>,
}

impl Site {
    /// A site that follows the domain trend.
    pub fn new(coord: SiteCoord) -> Self {
        Self {
            coord,
            history: None,
        }
    }

    /// A site with its own historical record.
    pub fn with_history(coord: SiteCoord, history: TimeSeries) -> Self {
        Self {
            coord,
            history: Some(history),
        }
    }
}

/// Output of [`generate_ensemble`].
#[derive(Debug, Clone)]
pub struct EnsembleResult {
    array: EnsembleArray,
    warnings: Vec<SamplingWarning>,
    distributions: Vec<YearlyDistribution>,
    trend: TrendModel,
    spatial: SpatialPattern,
    intensity_threshold: f64,
    seed: u64,
}

impl EnsembleResult {
    /// The generated ensemble.
    pub fn array(&self) -> &EnsembleArray {
        &self.array
    }

    /// Consumes self, returning the ensemble.
    pub fn into_array(self) -> EnsembleArray {
        self.array
    }

    /// Rejection-sampling exhaustion events, ordered by site, member, year.
    pub fn warnings(&self) -> &[SamplingWarning] {
        &self.warnings
    }

    /// One fitted distribution per generation year.
    pub fn distributions(&self) -> &[YearlyDistribution] {
        &self.distributions
    }

    /// Domain trend.
    pub fn trend(&self) -> &TrendModel {
        &self.trend
    }

    /// Per-site deviations used for blending.
    pub fn spatial(&self) -> &SpatialPattern {
        &self.spatial
    }

    /// Raw value at which the full site deviation applies.
    pub fn intensity_threshold(&self) -> f64 {
        self.intensity_threshold
    }

    /// Scenario seed the member streams were derived from.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

/// Read-only state shared by all (site, member) units of a scenario.
struct Shared<'a> {
    config: &'a EnsembleConfig,
    years: &'a [i32],
    member0: &'a [f64],
    distributions: &'a [YearlyDistribution],
    domain_trend: &'a [f64],
    threshold: f64,
    seed: u64,
}

/// Trend values at each generation year for one timeline and model.
fn trend_values(
    model: &TrendModel,
    timeline: &CombinedTimeline,
    years: &[i32],
    anchor: TrendAnchor,
) -> Result<Vec<f64>, EnsembleError> {
    years
        .iter()
        .enumerate()
        .map(|(i, &year)| -> Result<f64, EnsembleError> {
            let t = match anchor {
                TrendAnchor::GenerationIndex => i,
                TrendAnchor::Timeline => timeline.position_of(year)?,
            };
            Ok(model.evaluate_index(t))
        })
        .collect()
}

/// Generates one site's trajectories for every member, member-major.
fn generate_site(
    index: usize,
    site: &Site,
    deviation: f64,
    projection: &TimeSeries,
    shared: &Shared<'_>,
) -> Result<(Vec<f64>, Vec<SamplingWarning>), EnsembleError> {
    let own_trend;
    let trend: &[f64] = match &site.history {
        Some(history) => {
            let site_err = |source: TrendError| EnsembleError::SiteTrend {
                site: index,
                source,
            };
            let timeline = combine(history, projection).map_err(site_err)?;
            let model = fit_trend(timeline.values(), shared.config.detrend()).map_err(site_err)?;
            own_trend = trend_values(
                &model,
                &timeline,
                shared.years,
                shared.config.trend_anchor(),
            )?;
            &own_trend
        }
        None => shared.domain_trend,
    };

    let n_years = shared.years.len();
    let n_members = shared.config.n_members();
    let mut values = Vec::with_capacity(n_members * n_years);
    let mut warnings = Vec::new();

    values.extend_from_slice(shared.member0);
    for member in 1..n_members {
        let mut rng = unit_rng(shared.seed, index, member);
        for (i, dist) in shared.distributions.iter().enumerate() {
            let draw = sample_bounded(dist, shared.config.max_attempts(), &mut rng);
            if draw.exhausted {
                warn!(
                    site = index,
                    member,
                    year = shared.years[i],
                    attempts = draw.attempts,
                    window_max = dist.window_max(),
                    "rejection sampling exhausted, clamping to window maximum"
                );
                warnings.push(SamplingWarning {
                    site: index,
                    member,
                    year_index: i,
                    attempts: draw.attempts,
                });
            }
            let raw = draw.value + trend[i];
            values.push(blend(raw, deviation, shared.threshold));
        }
    }
    Ok((values, warnings))
}

/// Generates a DHW ensemble for one scenario.
///
/// Member 0 is the projection itself over the generation years. Members
/// `1..n_members` draw a bounded residual per year from that year's fitted
/// distribution, add the trend back, and blend in the site's spatial
/// deviation scaled by intensity. All values are non-negative.
///
/// Sites are processed in parallel; every (site, member) pair has its own
/// random stream, so a fixed seed gives identical output on any thread
/// count.
///
/// # Errors
///
/// Returns a validation error for bad configuration, empty or malformed
/// inputs, or generation years outside the projection, and a fit error if
/// any trend or distribution fit fails. No partial ensemble is returned.
#[tracing::instrument(
    skip(historical, projection, sites, pattern, config),
    fields(n_sites = sites.len(), n_members = config.n_members())
)]
pub fn generate_ensemble(
    historical: &TimeSeries,
    projection: &TimeSeries,
    sites: &[Site],
    pattern: &ReferencePattern,
    config: &EnsembleConfig,
) -> Result<EnsembleResult, EnsembleError> {
    config.validate()?;
    if sites.is_empty() {
        return Err(EnsembleError::NoSites);
    }

    let years = config.generation_years();
    let (first, last) = (config.start_year(), config.end_year() - 1);
    if !projection.contains_year(first) || !projection.contains_year(last) {
        return Err(EnsembleError::YearsNotCovered {
            start: first,
            end: last,
            projection_start: projection.first_year(),
            projection_end: projection.last_year(),
        });
    }
    let member0 = projection.slice_years(first, last)?;

    let timeline = combine(historical, projection)?;
    let detrended = detrend(&timeline, config.detrend())?;
    let distributions =
        fit_yearly_distributions(&timeline, detrended.residuals(), &years, config.gev())?;
    let threshold = distributions[0]
        .params()
        .quantile(config.intensity_quantile())?;
    let domain_trend = trend_values(
        detrended.model(),
        &timeline,
        &years,
        config.trend_anchor(),
    )?;

    let coords: Vec<SiteCoord> = sites.iter().map(|s| s.coord).collect();
    let spatial = pattern.site_pattern(&coords)?;
    let seed = resolve_seed(config.seed());
    debug!(threshold, seed, "scenario fits complete");

    let shared = Shared {
        config,
        years: &years,
        member0,
        distributions: &distributions,
        domain_trend: &domain_trend,
        threshold,
        seed,
    };

    let per_site: Vec<(Vec<f64>, Vec<SamplingWarning>)> = sites
        .par_iter()
        .zip(spatial.deviations().par_iter())
        .enumerate()
        .map(|(s, (site, &deviation))| generate_site(s, site, deviation, projection, &shared))
        .collect::<Result<_, _>>()?;

    let n_sites = sites.len();
    let n_years = years.len();
    let n_members = config.n_members();
    let mut values = vec![0.0; n_members * n_sites * n_years];
    let mut warnings = Vec::new();
    for (s, (site_values, site_warnings)) in per_site.into_iter().enumerate() {
        for (m, row) in site_values.chunks_exact(n_years).enumerate() {
            let start = (m * n_sites + s) * n_years;
            values[start..start + n_years].copy_from_slice(row);
        }
        warnings.extend(site_warnings);
    }
    if !warnings.is_empty() {
        warn!(count = warnings.len(), "rejection sampling exhausted for some draws");
    }

    let array = EnsembleArray::from_values(n_members, years, coords, values)?;
    Ok(EnsembleResult {
        array,
        warnings,
        distributions,
        trend: *detrended.model(),
        spatial,
        intensity_threshold: threshold,
        seed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dhwgen_spatial::PatternCell;

    fn pattern() -> ReferencePattern {
        ReferencePattern::new(vec![
            PatternCell {
                coord: SiteCoord::new(0.0, 0.0),
                value: 1.0,
            },
            PatternCell {
                coord: SiteCoord::new(10.0, 10.0),
                value: -1.0,
            },
        ])
        .unwrap()
    }

    #[test]
    fn trend_values_by_anchor() {
        let hist = TimeSeries::from_start(2015, vec![3.0, 4.0, 2.5]).unwrap();
        let proj = TimeSeries::from_start(2025, vec![5.0, 5.5]).unwrap();
        let timeline = combine(&hist, &proj).unwrap();
        let model = TrendModel::gaussian(2.0, 3.0, 2.0).unwrap();

        let by_index =
            trend_values(&model, &timeline, &[2025, 2026], TrendAnchor::GenerationIndex).unwrap();
        assert_eq!(by_index, vec![model.evaluate_index(0), model.evaluate_index(1)]);

        let by_position =
            trend_values(&model, &timeline, &[2025, 2026], TrendAnchor::Timeline).unwrap();
        assert_eq!(by_position, vec![model.evaluate_index(3), model.evaluate_index(4)]);
    }

    #[test]
    fn no_sites_rejected() {
        let hist = TimeSeries::from_start(2015, vec![3.0, 4.0, 2.5]).unwrap();
        let proj = TimeSeries::from_start(2025, vec![5.0, 5.5]).unwrap();
        let cfg = EnsembleConfig::new().with_years(2025, 2027).with_seed(1);
        assert!(matches!(
            generate_ensemble(&hist, &proj, &[], &pattern(), &cfg),
            Err(EnsembleError::NoSites)
        ));
    }

    #[test]
    fn years_outside_projection_rejected() {
        let hist = TimeSeries::from_start(2015, vec![3.0, 4.0, 2.5]).unwrap();
        let proj = TimeSeries::from_start(2025, vec![5.0, 5.5]).unwrap();
        let cfg = EnsembleConfig::new().with_years(2025, 2028).with_seed(1);
        let sites = [Site::new(SiteCoord::new(0.0, 0.0))];
        let err = generate_ensemble(&hist, &proj, &sites, &pattern(), &cfg).unwrap_err();
        assert!(matches!(err, EnsembleError::YearsNotCovered { end: 2027, .. }));
        assert_eq!(err.kind(), crate::ErrorKind::Validation);
    }
}
