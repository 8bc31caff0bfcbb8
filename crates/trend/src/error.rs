//! Error types for the dhwgen-trend crate.

/// Error type for all fallible operations in the dhwgen-trend crate.
///
/// Variants split into input validation problems and trend-fit failures;
/// see [`TrendError::is_fit_failure`].
#[derive(Debug, Clone, thiserror::Error)]
pub enum TrendError {
    /// Returned when a series has no values.
    #[error("{series} series is empty")]
    EmptySeries {
        /// Which series was empty.
        series: &'static str,
    },

    /// Returned when the year and value slices differ in length.
    #[error("length mismatch: {years} years but {values} values")]
    LengthMismatch {
        /// Number of years supplied.
        years: usize,
        /// Number of values supplied.
        values: usize,
    },

    /// Returned when years are not strictly increasing.
    #[error("years must be strictly increasing: {year} follows {prev}")]
    NonMonotonicYears {
        /// The preceding year.
        prev: i32,
        /// The offending year.
        year: i32,
    },

    /// Returned when consecutive years skip one or more years.
    #[error("gap in yearly series between {prev} and {year}")]
    YearGap {
        /// The preceding year.
        prev: i32,
        /// The year following the gap.
        year: i32,
    },

    /// Returned when a value is NaN or infinite.
    #[error("non-finite value for year {year}")]
    NonFiniteValue {
        /// Year carrying the bad value.
        year: i32,
    },

    /// Returned when a DHW value is negative.
    #[error("negative DHW value {value} for year {year}")]
    NegativeValue {
        /// Year carrying the bad value.
        year: i32,
        /// The negative value.
        value: f64,
    },

    /// Returned when the projection does not extend past the historical record.
    #[error("projection ends in {projection_end}, not after historical end {history_end}")]
    ProjectionNotAfterHistory {
        /// Last historical year.
        history_end: i32,
        /// Last projected year.
        projection_end: i32,
    },

    /// Returned when a requested year lies outside the projected range.
    #[error("year {year} outside projected range {start}..={end}")]
    YearOutOfRange {
        /// Requested year.
        year: i32,
        /// First projected year.
        start: i32,
        /// Last projected year.
        end: i32,
    },

    /// Returned when a configuration parameter is invalid.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when the moment-based starting point cannot seed the fit.
    #[error("degenerate initial guess for trend fit (center={center}, spread={spread})")]
    DegenerateInitialGuess {
        /// Initial center estimate.
        center: f64,
        /// Initial spread estimate.
        spread: f64,
    },

    /// Returned when the least-squares optimiser does not converge.
    #[error("trend fit did not converge: {reason}")]
    NotConverged {
        /// Optimiser termination description.
        reason: String,
    },
}

impl TrendError {
    /// Returns `true` for curve-fit failures, `false` for input validation errors.
    pub fn is_fit_failure(&self) -> bool {
        matches!(
            self,
            Self::DegenerateInitialGuess { .. } | Self::NotConverged { .. }
        )
    }
}
