//! Validated yearly DHW series.

use std::collections::BTreeMap;

use crate::error::TrendError;

/// An ordered, gap-free mapping of year to DHW value.
///
/// Years are strictly increasing with a step of one; values are finite
/// and non-negative. Construction is the only place these checks run.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    years: Vec<i32>,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Builds a series from parallel year/value vectors.
    ///
    /// # Errors
    ///
    /// Returns [`TrendError`] if the series is empty, lengths differ, years
    /// are not strictly increasing or contain gaps, or any value is
    /// non-finite or negative.
    pub fn new(years: Vec<i32>, values: Vec<f64>) -> Result<Self, TrendError> {
        if years.is_empty() || values.is_empty() {
            return Err(TrendError::EmptySeries { series: "yearly" });
        }
        if years.len() != values.len() {
            return Err(TrendError::LengthMismatch {
                years: years.len(),
                values: values.len(),
            });
        }
        for w in years.windows(2) {
            let (prev, year) = (w[0], w[1]);
            if year <= prev {
                return Err(TrendError::NonMonotonicYears { prev, year });
            }
            if year != prev + 1 {
                return Err(TrendError::YearGap { prev, year });
            }
        }
        for (&year, &value) in years.iter().zip(&values) {
            if !value.is_finite() {
                return Err(TrendError::NonFiniteValue { year });
            }
            if value < 0.0 {
                return Err(TrendError::NegativeValue { year, value });
            }
        }
        Ok(Self { years, values })
    }

    /// Builds a series of consecutive years beginning at `start_year`.
    pub fn from_start(start_year: i32, values: Vec<f64>) -> Result<Self, TrendError> {
        let years = (0..values.len() as i32).map(|i| start_year + i).collect();
        Self::new(years, values)
    }

    /// Reduces sub-annual observations to one maximum per year.
    ///
    /// Observations may arrive in any order. Non-finite values are ignored;
    /// a year whose observations are all non-finite is an error, as is a
    /// missing year between the first and last observed year.
    pub fn yearly_maxima(observations: &[(i32, f64)]) -> Result<Self, TrendError> {
        if observations.is_empty() {
            return Err(TrendError::EmptySeries {
                series: "observation",
            });
        }
        let mut maxima: BTreeMap<i32, Option<f64>> = BTreeMap::new();
        for &(year, value) in observations {
            let slot = maxima.entry(year).or_insert(None);
            if value.is_finite() {
                *slot = Some(slot.map_or(value, |m: f64| m.max(value)));
            }
        }
        let mut years = Vec::with_capacity(maxima.len());
        let mut values = Vec::with_capacity(maxima.len());
        for (year, max) in maxima {
            let Some(max) = max else {
                return Err(TrendError::NonFiniteValue { year });
            };
            years.push(year);
            values.push(max);
        }
        Self::new(years, values)
    }

    /// Returns the years.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// Returns the values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of years in the series (never zero).
    pub fn len(&self) -> usize {
        self.years.len()
    }

    /// Always `false`; a `TimeSeries` cannot be empty.
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// First year of the series.
    pub fn first_year(&self) -> i32 {
        self.years[0]
    }

    /// Last year of the series.
    pub fn last_year(&self) -> i32 {
        self.years[self.years.len() - 1]
    }

    /// Returns `true` if `year` is covered by the series.
    pub fn contains_year(&self, year: i32) -> bool {
        (self.first_year()..=self.last_year()).contains(&year)
    }

    /// Value for a single year, if present.
    pub fn get(&self, year: i32) -> Option<f64> {
        if !self.contains_year(year) {
            return None;
        }
        Some(self.values[(year - self.first_year()) as usize])
    }

    /// Values for the inclusive range `start..=end`.
    ///
    /// # Errors
    ///
    /// Returns [`TrendError::YearOutOfRange`] if either bound lies outside
    /// the series, or [`TrendError::NonMonotonicYears`] if `end < start`.
    pub fn slice_years(&self, start: i32, end: i32) -> Result<&[f64], TrendError> {
        if end < start {
            return Err(TrendError::NonMonotonicYears {
                prev: start,
                year: end,
            });
        }
        for year in [start, end] {
            if !self.contains_year(year) {
                return Err(TrendError::YearOutOfRange {
                    year,
                    start: self.first_year(),
                    end: self.last_year(),
                });
            }
        }
        let lo = (start - self.first_year()) as usize;
        let hi = (end - self.first_year()) as usize;
        Ok(&self.values[lo..=hi])
    }
}
