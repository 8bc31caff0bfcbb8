//! Gaussian trend fitting and residual extraction.
//!
//! The trend is a bell curve over the timeline index,
//! `f(t) = amplitude * exp(-((t - center) / spread)^2)`. It is fitted by
//! Levenberg-Marquardt least squares in log-quadratic form,
//! `f(t) = exp(c0 + c1 * tau + c2 * tau^2)` with `tau` the index rescaled to
//! `[-1, 1]`. Every bell curve with positive amplitude has exactly one such
//! representation (`c2 < 0`), and the form stays finite when the data pull
//! the peak off to infinity, where the bell-curve parameters diverge.
//!
//! Only bell curves and their limit (`c2 = 0`, an exponential) are valid
//! trends. When the free fit comes out convex (`c2 > 0`) it is refitted
//! with `c2` pinned at zero, the best curve on the boundary of the bell
//! family.
//!
//! The starting point is a normal fit to the raw values (mean and
//! population SD taken as center and spread) with unit amplitude.

use levenberg_marquardt::{LeastSquaresProblem, LevenbergMarquardt};
use nalgebra::{Dyn, OMatrix, OVector, Owned, U2, U3, Vector2, Vector3};
use tracing::debug;

use crate::combine::CombinedTimeline;
use crate::config::DetrendConfig;
use crate::error::TrendError;

/// Bell-curve parameters of a trend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianShape {
    /// Peak height.
    pub amplitude: f64,
    /// Timeline index of the peak.
    pub center: f64,
    /// Width parameter (positive).
    pub spread: f64,
}

/// Fitted trend curve. Immutable once fitted.
///
/// Stored as `exp(c0 + c1 * tau + c2 * tau^2)` with
/// `tau = (t - origin) / scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendModel {
    coefficients: [f64; 3],
    origin: f64,
    scale: f64,
}

impl TrendModel {
    /// Creates a bell-curve trend.
    ///
    /// Returns `None` unless all parameters are finite, `amplitude > 0` and
    /// `spread != 0`. The sign of `spread` is irrelevant to the curve.
    pub fn gaussian(amplitude: f64, center: f64, spread: f64) -> Option<Self> {
        if !(amplitude.is_finite() && center.is_finite() && spread.is_finite()) {
            return None;
        }
        if amplitude <= 0.0 || spread == 0.0 {
            return None;
        }
        Some(Self {
            coefficients: [amplitude.ln(), 0.0, -1.0],
            origin: center,
            scale: spread.abs(),
        })
    }

    fn from_coefficients(coefficients: [f64; 3], origin: f64, scale: f64) -> Option<Self> {
        coefficients.iter().all(|c| c.is_finite()).then_some(Self {
            coefficients,
            origin,
            scale,
        })
    }

    /// Evaluates the curve at a (fractional) timeline index.
    pub fn evaluate(&self, t: f64) -> f64 {
        let tau = (t - self.origin) / self.scale;
        let [c0, c1, c2] = self.coefficients;
        (c0 + c1 * tau + c2 * tau * tau).exp()
    }

    /// Evaluates the curve at an integer timeline index.
    pub fn evaluate_index(&self, i: usize) -> f64 {
        self.evaluate(i as f64)
    }

    /// Bell-curve parameters, or `None` if the fit settled on a limit
    /// curve without a finite peak.
    pub fn as_gaussian(&self) -> Option<GaussianShape> {
        let [c0, c1, c2] = self.coefficients;
        if c2 >= 0.0 {
            return None;
        }
        let peak = -c1 / (2.0 * c2);
        let shape = GaussianShape {
            amplitude: (c0 - c1 * c1 / (4.0 * c2)).exp(),
            center: self.origin + self.scale * peak,
            spread: self.scale / (-c2).sqrt(),
        };
        (shape.amplitude.is_finite() && shape.center.is_finite() && shape.spread.is_finite())
            .then_some(shape)
    }
}

/// Observed-minus-trend values, aligned with the timeline they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ResidualSeries {
    values: Vec<f64>,
}

impl ResidualSeries {
    /// Wraps precomputed residuals.
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// All residuals in timeline order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of residuals.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if there are no residuals.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The leading `end` residuals (a growing fitting window).
    ///
    /// Returns `None` if `end` exceeds the series length.
    pub fn window(&self, end: usize) -> Option<&[f64]> {
        self.values.get(..end)
    }
}

/// Result of detrending a timeline.
#[derive(Debug, Clone)]
pub struct Detrended {
    model: TrendModel,
    residuals: ResidualSeries,
}

impl Detrended {
    /// The fitted trend.
    pub fn model(&self) -> &TrendModel {
        &self.model
    }

    /// Observed minus trend, one entry per timeline position.
    pub fn residuals(&self) -> &ResidualSeries {
        &self.residuals
    }

    /// Consumes self, returning the trend and residuals.
    pub fn into_parts(self) -> (TrendModel, ResidualSeries) {
        (self.model, self.residuals)
    }
}

/// Least-squares problem for the log-quadratic curve over indices `0..n`.
struct LogQuadraticProblem {
    /// Parameter vector `[c0, c1, c2]`.
    params: Vector3<f64>,
    /// Rescaled indices.
    tau: Vec<f64>,
    y: Vec<f64>,
}

impl LogQuadraticProblem {
    fn curve(&self, tau: f64) -> f64 {
        (self.params[0] + self.params[1] * tau + self.params[2] * tau * tau).exp()
    }
}

impl LeastSquaresProblem<f64, Dyn, U3> for LogQuadraticProblem {
    type ParameterStorage = Owned<f64, U3>;
    type ResidualStorage = Owned<f64, Dyn>;
    type JacobianStorage = Owned<f64, Dyn, U3>;

    fn set_params(&mut self, p: &Vector3<f64>) {
        self.params.copy_from(p);
    }

    fn params(&self) -> Vector3<f64> {
        self.params
    }

    fn residuals(&self) -> Option<OVector<f64, Dyn>> {
        let mut residuals = OVector::<f64, Dyn>::zeros(self.y.len());
        for (i, (&tau, &y)) in self.tau.iter().zip(&self.y).enumerate() {
            residuals[i] = y - self.curve(tau);
        }
        residuals.iter().all(|r| r.is_finite()).then_some(residuals)
    }

    fn jacobian(&self) -> Option<OMatrix<f64, Dyn, U3>> {
        let mut jac = OMatrix::<f64, Dyn, U3>::zeros(self.y.len());
        for (i, &tau) in self.tau.iter().enumerate() {
            let f = self.curve(tau);
            // r = y - f, so each column is -df/dc.
            jac[(i, 0)] = -f;
            jac[(i, 1)] = -f * tau;
            jac[(i, 2)] = -f * tau * tau;
        }
        jac.iter().all(|v| v.is_finite()).then_some(jac)
    }
}

/// Least-squares problem for the exponential limit `exp(c0 + c1 * tau)`.
struct LogLinearProblem {
    /// Parameter vector `[c0, c1]`.
    params: Vector2<f64>,
    tau: Vec<f64>,
    y: Vec<f64>,
}

impl LogLinearProblem {
    fn curve(&self, tau: f64) -> f64 {
        (self.params[0] + self.params[1] * tau).exp()
    }
}

impl LeastSquaresProblem<f64, Dyn, U2> for LogLinearProblem {
    type ParameterStorage = Owned<f64, U2>;
    type ResidualStorage = Owned<f64, Dyn>;
    type JacobianStorage = Owned<f64, Dyn, U2>;

    fn set_params(&mut self, p: &Vector2<f64>) {
        self.params.copy_from(p);
    }

    fn params(&self) -> Vector2<f64> {
        self.params
    }

    fn residuals(&self) -> Option<OVector<f64, Dyn>> {
        let mut residuals = OVector::<f64, Dyn>::zeros(self.y.len());
        for (i, (&tau, &y)) in self.tau.iter().zip(&self.y).enumerate() {
            residuals[i] = y - self.curve(tau);
        }
        residuals.iter().all(|r| r.is_finite()).then_some(residuals)
    }

    fn jacobian(&self) -> Option<OMatrix<f64, Dyn, U2>> {
        let mut jac = OMatrix::<f64, Dyn, U2>::zeros(self.y.len());
        for (i, &tau) in self.tau.iter().enumerate() {
            let f = self.curve(tau);
            jac[(i, 0)] = -f;
            jac[(i, 1)] = -f * tau;
        }
        jac.iter().all(|v| v.is_finite()).then_some(jac)
    }
}

/// Refits with `c2 = 0`, starting from the flat curve at the mean.
fn fit_exponential_limit(
    tau: Vec<f64>,
    y: Vec<f64>,
    mean: f64,
    config: &DetrendConfig,
) -> Result<([f64; 3], usize), TrendError> {
    let problem = LogLinearProblem {
        params: Vector2::new(mean.ln(), 0.0),
        tau,
        y,
    };
    let (result, report) = LevenbergMarquardt::new()
        .with_patience(config.patience())
        .minimize(problem);
    if !report.termination.was_successful() {
        return Err(TrendError::NotConverged {
            reason: format!("exponential limit: {:?}", report.termination),
        });
    }
    let p = result.params;
    Ok(([p[0], p[1], 0.0], report.number_of_evaluations))
}

/// Fits the trend to values indexed `0..n`.
///
/// # Errors
///
/// Returns [`TrendError::DegenerateInitialGuess`] if the normal fit yields a
/// zero spread (constant input), and [`TrendError::NotConverged`] if the
/// optimiser stops for any reason other than convergence or yields
/// unusable parameters.
///
/// The returned curve is never convex: `c2 <= 0` always holds.
pub fn fit_trend(values: &[f64], config: &DetrendConfig) -> Result<TrendModel, TrendError> {
    config.validate()?;
    if values.is_empty() {
        return Err(TrendError::EmptySeries { series: "timeline" });
    }

    let center = dhwgen_stats::mean(values);
    let spread = dhwgen_stats::population_sd(values);
    if !center.is_finite() || !spread.is_finite() || spread <= 0.0 {
        return Err(TrendError::DegenerateInitialGuess { center, spread });
    }

    let origin = (values.len() - 1) as f64 / 2.0;
    let scale = origin.max(1.0);
    let (c, s) = ((center - origin) / scale, spread / scale);
    let initial = Vector3::new(-(c * c) / (s * s), 2.0 * c / (s * s), -1.0 / (s * s));
    if initial.iter().any(|v| !v.is_finite()) {
        return Err(TrendError::DegenerateInitialGuess { center, spread });
    }

    let tau: Vec<f64> = (0..values.len()).map(|i| (i as f64 - origin) / scale).collect();
    let problem = LogQuadraticProblem {
        params: initial,
        tau: tau.clone(),
        y: values.to_vec(),
    };
    let (result, report) = LevenbergMarquardt::new()
        .with_patience(config.patience())
        .minimize(problem);

    if !report.termination.was_successful() {
        return Err(TrendError::NotConverged {
            reason: format!("{:?}", report.termination),
        });
    }

    let p = result.params;
    let mut coefficients = [p[0], p[1], p[2]];
    let mut evaluations = report.number_of_evaluations;
    if coefficients[2] > 0.0 {
        debug!(curvature = coefficients[2], "convex fit, refitting at the exponential limit");
        let (limit, extra) = fit_exponential_limit(tau, values.to_vec(), center, config)?;
        coefficients = limit;
        evaluations += extra;
    }

    let model = TrendModel::from_coefficients(coefficients, origin, scale).ok_or_else(|| {
        TrendError::NotConverged {
            reason: format!(
                "unusable coefficients ({}, {}, {})",
                coefficients[0], coefficients[1], coefficients[2]
            ),
        }
    })?;

    match model.as_gaussian() {
        Some(shape) => debug!(
            amplitude = shape.amplitude,
            center = shape.center,
            spread = shape.spread,
            evaluations,
            "trend fitted"
        ),
        None => debug!(
            evaluations,
            "trend fitted without a finite peak"
        ),
    }
    Ok(model)
}

/// Fits the trend over a timeline and returns it with the residuals.
#[tracing::instrument(skip(timeline, config), fields(n = timeline.len()))]
pub fn detrend(timeline: &CombinedTimeline, config: &DetrendConfig) -> Result<Detrended, TrendError> {
    let model = fit_trend(timeline.values(), config)?;
    let residuals = timeline
        .values()
        .iter()
        .enumerate()
        .map(|(i, &v)| v - model.evaluate_index(i))
        .collect();
    Ok(Detrended {
        model,
        residuals: ResidualSeries::new(residuals),
    })
}
