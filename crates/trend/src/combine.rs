//! Historical + projected timeline construction.

use crate::error::TrendError;
use crate::series::TimeSeries;

/// A historical series followed by a projected series.
///
/// The two segments are concatenated as-is, so the timeline length is
/// always `n_hist + n_proj`. A projection that restarts inside the
/// historical record keeps both copies of the overlapping years; the
/// position of a value (not its year) is what the trend fit sees.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedTimeline {
    years: Vec<i32>,
    values: Vec<f64>,
    n_hist: usize,
    projection_start: i32,
    projection_end: i32,
}

impl CombinedTimeline {
    /// Years in timeline order.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// Values in timeline order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Total number of timeline entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false`; both segments are non-empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Length of the historical segment.
    pub fn n_hist(&self) -> usize {
        self.n_hist
    }

    /// Length of the projected segment.
    pub fn n_proj(&self) -> usize {
        self.values.len() - self.n_hist
    }

    /// First projected year.
    pub fn projection_start(&self) -> i32 {
        self.projection_start
    }

    /// Last projected year.
    pub fn projection_end(&self) -> i32 {
        self.projection_end
    }

    fn check_projected(&self, year: i32) -> Result<(), TrendError> {
        if year < self.projection_start || year > self.projection_end {
            return Err(TrendError::YearOutOfRange {
                year,
                start: self.projection_start,
                end: self.projection_end,
            });
        }
        Ok(())
    }

    /// Timeline index of a projected year.
    pub fn position_of(&self, year: i32) -> Result<usize, TrendError> {
        self.check_projected(year)?;
        Ok(self.n_hist + (year - self.projection_start) as usize)
    }

    /// Exclusive end of the fitting window for a generation year: all
    /// historical entries plus projected entries up to and including `year`.
    pub fn window_end(&self, year: i32) -> Result<usize, TrendError> {
        Ok(self.position_of(year)? + 1)
    }
}

/// Concatenates a historical and a projected series into one timeline.
///
/// # Errors
///
/// Returns [`TrendError::ProjectionNotAfterHistory`] if the projection does
/// not reach beyond the last historical year.
pub fn combine(historical: &TimeSeries, projected: &TimeSeries) -> Result<CombinedTimeline, TrendError> {
    if projected.last_year() <= historical.last_year() {
        return Err(TrendError::ProjectionNotAfterHistory {
            history_end: historical.last_year(),
            projection_end: projected.last_year(),
        });
    }

    let n = historical.len() + projected.len();
    let mut years = Vec::with_capacity(n);
    let mut values = Vec::with_capacity(n);
    years.extend_from_slice(historical.years());
    years.extend_from_slice(projected.years());
    values.extend_from_slice(historical.values());
    values.extend_from_slice(projected.values());

    Ok(CombinedTimeline {
        years,
        values,
        n_hist: historical.len(),
        projection_start: projected.first_year(),
        projection_end: projected.last_year(),
    })
}
