//! Fit configuration: which GEV parameters are estimated and how.

use crate::error::GevError;

/// How a single GEV parameter is obtained during fitting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamSpec {
    /// Estimated by maximum likelihood.
    Free,
    /// Held at the given value.
    Fixed(f64),
    /// Taken from the fitting window: mean for location, population SD for
    /// scale. Not available for shape.
    FromSample,
}

impl ParamSpec {
    /// Returns `true` if the parameter is estimated by the optimiser.
    pub fn is_free(&self) -> bool {
        matches!(self, Self::Free)
    }
}

/// Configuration for [`crate::fit_gev`].
///
/// The default holds location at 1.0 and scale at 0.8 and estimates only
/// the shape. A fully free three-parameter fit is rejected: short or
/// skewed windows make it unstable.
#[derive(Debug, Clone)]
pub struct GevFitConfig {
    shape: ParamSpec,
    location: ParamSpec,
    scale: ParamSpec,
    max_iters: u64,
    sd_tolerance: f64,
}

impl GevFitConfig {
    /// Creates a configuration with default values.
    ///
    /// Defaults:
    /// - `shape`: `Free`
    /// - `location`: `Fixed(1.0)`
    /// - `scale`: `Fixed(0.8)`
    /// - `max_iters`: 1000
    /// - `sd_tolerance`: 1e-8
    pub fn new() -> Self {
        Self {
            shape: ParamSpec::Free,
            location: ParamSpec::Fixed(1.0),
            scale: ParamSpec::Fixed(0.8),
            max_iters: 1000,
            sd_tolerance: 1e-8,
        }
    }

    /// Sets the shape policy.
    pub fn with_shape(mut self, spec: ParamSpec) -> Self {
        self.shape = spec;
        self
    }

    /// Sets the location policy.
    pub fn with_location(mut self, spec: ParamSpec) -> Self {
        self.location = spec;
        self
    }

    /// Sets the scale policy.
    pub fn with_scale(mut self, spec: ParamSpec) -> Self {
        self.scale = spec;
        self
    }

    /// Sets the Nelder-Mead iteration cap.
    pub fn with_max_iters(mut self, max_iters: u64) -> Self {
        self.max_iters = max_iters;
        self
    }

    /// Sets the Nelder-Mead convergence tolerance (SD of simplex costs).
    pub fn with_sd_tolerance(mut self, tol: f64) -> Self {
        self.sd_tolerance = tol;
        self
    }

    /// Shape policy.
    pub fn shape(&self) -> ParamSpec {
        self.shape
    }

    /// Location policy.
    pub fn location(&self) -> ParamSpec {
        self.location
    }

    /// Scale policy.
    pub fn scale(&self) -> ParamSpec {
        self.scale
    }

    /// Nelder-Mead iteration cap.
    pub fn max_iters(&self) -> u64 {
        self.max_iters
    }

    /// Nelder-Mead convergence tolerance.
    pub fn sd_tolerance(&self) -> f64 {
        self.sd_tolerance
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), GevError> {
        let invalid = |reason: &str| {
            Err(GevError::InvalidConfig {
                reason: reason.to_string(),
            })
        };
        if self.shape.is_free() && self.location.is_free() && self.scale.is_free() {
            return invalid("at least one GEV parameter must be held fixed or taken from the sample");
        }
        if self.shape == ParamSpec::FromSample {
            return invalid("shape cannot be taken from the sample");
        }
        for (name, spec) in [
            ("shape", self.shape),
            ("location", self.location),
            ("scale", self.scale),
        ] {
            match spec {
                ParamSpec::Fixed(v) if !v.is_finite() => {
                    return invalid(&format!("fixed {name} must be finite"));
                }
                _ => {}
            }
        }
        if matches!(self.scale, ParamSpec::Fixed(v) if v <= 0.0) {
            return invalid("fixed scale must be > 0");
        }
        if self.max_iters == 0 {
            return invalid("max_iters must be > 0");
        }
        if !self.sd_tolerance.is_finite() || self.sd_tolerance <= 0.0 {
            return invalid("sd_tolerance must be finite and > 0");
        }
        Ok(())
    }
}

impl Default for GevFitConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_validates() {
        let cfg = GevFitConfig::default();
        assert_eq!(cfg.shape(), ParamSpec::Free);
        assert_eq!(cfg.location(), ParamSpec::Fixed(1.0));
        assert_eq!(cfg.scale(), ParamSpec::Fixed(0.8));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn all_free_rejected() {
        let cfg = GevFitConfig::new()
            .with_location(ParamSpec::Free)
            .with_scale(ParamSpec::Free);
        assert!(matches!(
            cfg.validate(),
            Err(GevError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn shape_from_sample_rejected() {
        let cfg = GevFitConfig::new().with_shape(ParamSpec::FromSample);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn non_positive_fixed_scale_rejected() {
        assert!(
            GevFitConfig::new()
                .with_scale(ParamSpec::Fixed(0.0))
                .validate()
                .is_err()
        );
        assert!(
            GevFitConfig::new()
                .with_location(ParamSpec::Fixed(f64::NAN))
                .validate()
                .is_err()
        );
    }

    #[test]
    fn sample_derived_location_and_scale_valid() {
        let cfg = GevFitConfig::new()
            .with_location(ParamSpec::FromSample)
            .with_scale(ParamSpec::FromSample);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn optimiser_settings_validated() {
        assert!(GevFitConfig::new().with_max_iters(0).validate().is_err());
        assert!(GevFitConfig::new().with_sd_tolerance(0.0).validate().is_err());
    }
}
