//! Error types for the dhwgen-ensemble crate.

use dhwgen_gev::GevError;
use dhwgen_spatial::SpatialError;
use dhwgen_trend::TrendError;

/// Broad failure class of an [`EnsembleError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input or configuration.
    Validation,
    /// A trend or distribution fit did not converge.
    Fit,
}

/// Error type for all fallible operations in the dhwgen-ensemble crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EnsembleError {
    /// Returned when a configuration parameter is invalid.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when no sites are supplied.
    #[error("no sites supplied")]
    NoSites,

    /// Returned when requested generation years are not all projected.
    #[error(
        "generation years {start}..={end} not covered by projection {projection_start}..={projection_end}"
    )]
    YearsNotCovered {
        /// First generation year.
        start: i32,
        /// Last generation year.
        end: i32,
        /// First projected year.
        projection_start: i32,
        /// Last projected year.
        projection_end: i32,
    },

    /// Returned when an array's dimensions and value count disagree.
    #[error("expected {expected} values for the given dimensions, got {actual}")]
    ShapeMismatch {
        /// Product of the dimensions.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },

    /// Returned when ensembles to be merged differ in sites or years.
    #[error("ensembles disagree on {what}")]
    IncompatibleEnsembles {
        /// Which axis differs.
        what: &'static str,
    },

    /// Returned when merging an empty list of ensembles.
    #[error("no ensembles to merge")]
    NothingToMerge,

    /// Returned when a year selection falls outside the ensemble.
    #[error("year range {start}..={end} outside ensemble years {first}..={last}")]
    YearSelection {
        /// First requested year.
        start: i32,
        /// Last requested year.
        end: i32,
        /// First ensemble year.
        first: i32,
        /// Last ensemble year.
        last: i32,
    },

    /// Trend fit for one site's own history failed.
    #[error("site {site}: {source}")]
    SiteTrend {
        /// Site index.
        site: usize,
        /// Underlying error.
        #[source]
        source: TrendError,
    },

    /// Error from the trend crate.
    #[error(transparent)]
    Trend(#[from] TrendError),

    /// Error from the GEV crate.
    #[error(transparent)]
    Gev(#[from] GevError),

    /// Error from the spatial crate.
    #[error(transparent)]
    Spatial(#[from] SpatialError),
}

impl EnsembleError {
    /// Classifies the error as a validation or fit failure.
    pub fn kind(&self) -> ErrorKind {
        let fit = match self {
            Self::Trend(e) | Self::SiteTrend { source: e, .. } => e.is_fit_failure(),
            Self::Gev(e) => e.is_fit_failure(),
            _ => false,
        };
        if fit {
            ErrorKind::Fit
        } else {
            ErrorKind::Validation
        }
    }
}
