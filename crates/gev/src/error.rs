//! Error types for the dhwgen-gev crate.

use dhwgen_trend::TrendError;

/// Error type for all fallible operations in the dhwgen-gev crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GevError {
    /// Returned when a fitting window has no values.
    #[error("cannot fit a GEV distribution to an empty window")]
    EmptyWindow,

    /// Returned when a fitting window contains NaN or infinite values.
    #[error("fitting window contains non-finite values")]
    NonFiniteData,

    /// Returned when distribution parameters are out of domain.
    #[error("invalid GEV parameters (shape={shape}, location={location}, scale={scale})")]
    InvalidParams {
        /// Shape parameter.
        shape: f64,
        /// Location parameter.
        location: f64,
        /// Scale parameter.
        scale: f64,
    },

    /// Returned when a probability lies outside the open interval (0, 1).
    #[error("probability {p} outside (0, 1)")]
    InvalidProbability {
        /// The offending probability.
        p: f64,
    },

    /// Returned when a configuration parameter is invalid.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when residuals and timeline differ in length.
    #[error("residual series has {residuals} values but timeline has {timeline}")]
    ResidualLengthMismatch {
        /// Timeline length.
        timeline: usize,
        /// Residual series length.
        residuals: usize,
    },

    /// Returned when no generation years are requested.
    #[error("no generation years requested")]
    NoGenerationYears,

    /// Returned when the likelihood optimiser fails or stops early.
    #[error("GEV fit failed for window of {window_len} values: {reason}")]
    FitFailed {
        /// Length of the fitting window.
        window_len: usize,
        /// Description of the failure.
        reason: String,
    },

    /// Timeline or window error from the trend crate.
    #[error(transparent)]
    Trend(#[from] TrendError),
}

impl GevError {
    /// Returns `true` for distribution-fit failures, `false` for input
    /// validation errors.
    pub fn is_fit_failure(&self) -> bool {
        match self {
            Self::FitFailed { .. } => true,
            Self::Trend(e) => e.is_fit_failure(),
            _ => false,
        }
    }
}
