//! One GEV fit per generation year over a growing residual window.

use dhwgen_trend::{CombinedTimeline, ResidualSeries, TrendError};
use tracing::debug;

use crate::config::GevFitConfig;
use crate::error::GevError;
use crate::fit::fit_gev;
use crate::params::GevParams;

/// Distribution fitted for a single generation year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearlyDistribution {
    year: i32,
    params: GevParams,
    window_len: usize,
    window_max: f64,
}

impl YearlyDistribution {
    /// Assembles a record from its parts.
    pub fn new(year: i32, params: GevParams, window_len: usize, window_max: f64) -> Self {
        Self {
            year,
            params,
            window_len,
            window_max,
        }
    }

    /// Generation year this distribution belongs to.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Fitted parameters.
    pub fn params(&self) -> &GevParams {
        &self.params
    }

    /// Number of residuals the fit used.
    pub fn window_len(&self) -> usize {
        self.window_len
    }

    /// Largest residual in the fitting window; draws above it are rejected.
    pub fn window_max(&self) -> f64 {
        self.window_max
    }
}

/// Fits one distribution per generation year.
///
/// The window for `years[i]` holds every historical residual plus the
/// projected residuals up to and including `years[i]`. `years` must be
/// strictly increasing, so window lengths are too. The result is indexed
/// like `years`.
///
/// # Errors
///
/// Returns a validation error if `years` is empty, not strictly increasing
/// or outside the projection, or if `residuals` does not match the
/// timeline. Any per-year fit failure is returned as is.
#[tracing::instrument(skip_all, fields(n_years = years.len(), n = timeline.len()))]
pub fn fit_yearly_distributions(
    timeline: &CombinedTimeline,
    residuals: &ResidualSeries,
    years: &[i32],
    config: &GevFitConfig,
) -> Result<Vec<YearlyDistribution>, GevError> {
    config.validate()?;
    if years.is_empty() {
        return Err(GevError::NoGenerationYears);
    }
    if residuals.len() != timeline.len() {
        return Err(GevError::ResidualLengthMismatch {
            timeline: timeline.len(),
            residuals: residuals.len(),
        });
    }
    for w in years.windows(2) {
        if w[1] <= w[0] {
            return Err(TrendError::NonMonotonicYears {
                prev: w[0],
                year: w[1],
            }
            .into());
        }
    }

    let mut out = Vec::with_capacity(years.len());
    for &year in years {
        let end = timeline.window_end(year)?;
        let window = residuals.window(end).ok_or(GevError::EmptyWindow)?;
        let window_max = dhwgen_stats::finite_max(window).ok_or(GevError::NonFiniteData)?;
        let params = fit_gev(window, config)?;
        debug!(year, window_len = end, window_max, "yearly distribution fitted");
        out.push(YearlyDistribution::new(year, params, end, window_max));
    }
    Ok(out)
}
