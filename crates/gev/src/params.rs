//! GEV distribution parameters, CDF, quantile function and sampling.
//!
//! Shape follows the climatological sign convention: `shape > 0` gives a
//! heavy (Fréchet-type) right tail, `shape < 0` a bounded (Weibull-type)
//! one, and `shape == 0` is the Gumbel limit.

use rand::Rng;
use rand_distr::{Distribution, Open01};

use crate::error::GevError;

/// Below this magnitude the shape is treated as exactly zero (Gumbel).
const GUMBEL_EPS: f64 = 1e-9;

/// Validated parameters of a generalized extreme value distribution.
///
/// All three parameters are finite and `scale > 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GevParams {
    shape: f64,
    location: f64,
    scale: f64,
}

impl GevParams {
    /// Creates parameters after validating them.
    ///
    /// # Errors
    ///
    /// Returns [`GevError::InvalidParams`] if any parameter is non-finite or
    /// `scale <= 0`.
    pub fn new(shape: f64, location: f64, scale: f64) -> Result<Self, GevError> {
        if shape.is_finite() && location.is_finite() && scale.is_finite() && scale > 0.0 {
            Ok(Self {
                shape,
                location,
                scale,
            })
        } else {
            Err(GevError::InvalidParams {
                shape,
                location,
                scale,
            })
        }
    }

    /// Shape parameter (xi).
    pub fn shape(&self) -> f64 {
        self.shape
    }

    /// Location parameter (mu).
    pub fn location(&self) -> f64 {
        self.location
    }

    /// Scale parameter (sigma).
    pub fn scale(&self) -> f64 {
        self.scale
    }

    fn is_gumbel(&self) -> bool {
        self.shape.abs() < GUMBEL_EPS
    }

    /// Smallest value with non-zero density (`-inf` unless `shape > 0`).
    pub fn lower_bound(&self) -> f64 {
        if self.shape >= GUMBEL_EPS {
            self.location - self.scale / self.shape
        } else {
            f64::NEG_INFINITY
        }
    }

    /// Largest value with non-zero density (`+inf` unless `shape < 0`).
    pub fn upper_bound(&self) -> f64 {
        if self.shape <= -GUMBEL_EPS {
            self.location - self.scale / self.shape
        } else {
            f64::INFINITY
        }
    }

    /// Cumulative distribution function.
    pub fn cdf(&self, x: f64) -> f64 {
        let z = (x - self.location) / self.scale;
        if self.is_gumbel() {
            return (-(-z).exp()).exp();
        }
        let t = 1.0 + self.shape * z;
        if t <= 0.0 {
            // Outside the support: below it for a heavy tail, above it otherwise.
            return if self.shape > 0.0 { 0.0 } else { 1.0 };
        }
        (-t.powf(-1.0 / self.shape)).exp()
    }

    /// Inverse CDF.
    ///
    /// # Errors
    ///
    /// Returns [`GevError::InvalidProbability`] unless `0 < p < 1`.
    pub fn quantile(&self, p: f64) -> Result<f64, GevError> {
        if !(p > 0.0 && p < 1.0) {
            return Err(GevError::InvalidProbability { p });
        }
        Ok(self.quantile_unchecked(p))
    }

    fn quantile_unchecked(&self, p: f64) -> f64 {
        let y = -p.ln();
        if self.is_gumbel() {
            self.location - self.scale * y.ln()
        } else {
            self.location + self.scale * (y.powf(-self.shape) - 1.0) / self.shape
        }
    }

    /// Log-density at `x`; `-inf` outside the support.
    pub fn ln_pdf(&self, x: f64) -> f64 {
        let z = (x - self.location) / self.scale;
        if self.is_gumbel() {
            return -self.scale.ln() - z - (-z).exp();
        }
        let t = 1.0 + self.shape * z;
        if t <= 0.0 {
            return f64::NEG_INFINITY;
        }
        -self.scale.ln() - (1.0 + 1.0 / self.shape) * t.ln() - t.powf(-1.0 / self.shape)
    }

    /// Sum of log-densities over `data`.
    pub fn log_likelihood(&self, data: &[f64]) -> f64 {
        data.iter().map(|&x| self.ln_pdf(x)).sum()
    }
}

impl Distribution<f64> for GevParams {
    /// Inverse-transform sampling from an open-interval uniform draw.
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let u: f64 = rng.sample(Open01);
        self.quantile_unchecked(u)
    }
}
