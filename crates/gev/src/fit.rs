//! Maximum-likelihood GEV fitting with partially fixed parameters.
//!
//! Free parameters are estimated by Nelder-Mead on the negative
//! log-likelihood; the scale is optimised on the log scale so that every
//! simplex vertex maps to a valid distribution.

use argmin::core::{CostFunction, Executor, State, TerminationReason, TerminationStatus};
use argmin::solver::neldermead::NelderMead;
use tracing::debug;

use crate::config::{GevFitConfig, ParamSpec};
use crate::error::GevError;
use crate::params::GevParams;

/// Euler-Mascheroni constant, the mean of a standard Gumbel variable.
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Where a parameter's value comes from once the window is known.
#[derive(Debug, Clone, Copy)]
enum Slot {
    Known(f64),
    /// Index into the optimiser's parameter vector.
    Free(usize),
}

impl Slot {
    fn value(self, x: &[f64]) -> f64 {
        match self {
            Slot::Known(v) => v,
            Slot::Free(i) => x[i],
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Layout {
    shape: Slot,
    location: Slot,
    /// Free scale is stored as `ln(scale)`.
    scale: Slot,
}

impl Layout {
    fn params(&self, x: &[f64]) -> Result<GevParams, GevError> {
        let scale = match self.scale {
            Slot::Known(v) => v,
            Slot::Free(i) => x[i].exp(),
        };
        GevParams::new(self.shape.value(x), self.location.value(x), scale)
    }
}

/// Cost function for argmin: negative log-likelihood.
struct GevCost<'a> {
    data: &'a [f64],
    layout: Layout,
}

impl CostFunction for GevCost<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, x: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        match self.layout.params(x) {
            Ok(params) => {
                let ll = params.log_likelihood(self.data);
                Ok(if ll.is_finite() { -ll } else { f64::MAX })
            }
            Err(_) => Ok(f64::MAX),
        }
    }
}

/// Fits a GEV distribution to `data` under the given parameter policy.
///
/// # Errors
///
/// Returns a validation error for an empty or non-finite window, an
/// invalid configuration, or a sample-derived scale of zero.
/// Returns [`GevError::FitFailed`] if Nelder-Mead stops for any reason
/// other than convergence or ends at an invalid point.
pub fn fit_gev(data: &[f64], config: &GevFitConfig) -> Result<GevParams, GevError> {
    config.validate()?;
    if data.is_empty() {
        return Err(GevError::EmptyWindow);
    }
    if !dhwgen_stats::all_finite(data) {
        return Err(GevError::NonFiniteData);
    }

    let mean = dhwgen_stats::mean(data);
    let sd = dhwgen_stats::population_sd(data);

    let mut start: Vec<f64> = Vec::with_capacity(3);
    let mut steps: Vec<f64> = Vec::with_capacity(3);

    let shape = match config.shape() {
        ParamSpec::Fixed(v) => Slot::Known(v),
        // Rejected by validate(); treated as free for exhaustiveness.
        ParamSpec::Free | ParamSpec::FromSample => {
            start.push(0.0);
            steps.push(0.1);
            Slot::Free(start.len() - 1)
        }
    };

    let known_scale = match config.scale() {
        ParamSpec::Fixed(v) => Some(v),
        ParamSpec::FromSample => {
            if sd <= 0.0 {
                return Err(GevError::InvalidParams {
                    shape: 0.0,
                    location: mean,
                    scale: sd,
                });
            }
            Some(sd)
        }
        ParamSpec::Free => None,
    };
    // Gumbel moment estimate of the scale seeds the location and scale starts.
    let moment_scale = if sd > 0.0 {
        sd * 6.0_f64.sqrt() / std::f64::consts::PI
    } else {
        1.0
    };
    let scale_guess = known_scale.unwrap_or(moment_scale);

    let location = match config.location() {
        ParamSpec::Fixed(v) => Slot::Known(v),
        ParamSpec::FromSample => Slot::Known(mean),
        ParamSpec::Free => {
            start.push(mean - EULER_GAMMA * scale_guess);
            steps.push(0.5 * scale_guess);
            Slot::Free(start.len() - 1)
        }
    };

    let scale = match known_scale {
        Some(v) => Slot::Known(v),
        None => {
            start.push(scale_guess.ln());
            steps.push(0.3);
            Slot::Free(start.len() - 1)
        }
    };

    let layout = Layout {
        shape,
        location,
        scale,
    };

    if start.is_empty() {
        return layout.params(&start);
    }

    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(start.len() + 1);
    simplex.push(start.clone());
    for (i, step) in steps.iter().enumerate() {
        let mut vertex = start.clone();
        vertex[i] += step;
        simplex.push(vertex);
    }

    let failed = |reason: String| GevError::FitFailed {
        window_len: data.len(),
        reason,
    };

    let cost = GevCost { data, layout };
    let solver = NelderMead::new(simplex)
        .with_sd_tolerance(config.sd_tolerance())
        .map_err(|e| failed(e.to_string()))?;
    let result = Executor::new(cost, solver)
        .configure(|state| state.max_iters(config.max_iters()))
        .run()
        .map_err(|e| failed(e.to_string()))?;

    let state = result.state();
    match state.get_termination_status() {
        TerminationStatus::Terminated(TerminationReason::SolverConverged) => {}
        other => return Err(failed(format!("{other:?}"))),
    }
    if !state.get_best_cost().is_finite() || state.get_best_cost() == f64::MAX {
        return Err(failed("no point with finite likelihood".to_string()));
    }
    let best = state
        .get_best_param()
        .ok_or_else(|| failed("optimiser returned no parameters".to_string()))?;
    let params = layout
        .params(best)
        .map_err(|e| failed(e.to_string()))?;

    debug!(
        shape = params.shape(),
        location = params.location(),
        scale = params.scale(),
        iterations = state.get_iter(),
        n = data.len(),
        "GEV fitted"
    );
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand_distr::Distribution;

    fn draws(params: &GevParams, n: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n).map(|_| params.sample(&mut rng)).collect()
    }

    #[test]
    fn empty_window_rejected() {
        assert!(matches!(
            fit_gev(&[], &GevFitConfig::default()),
            Err(GevError::EmptyWindow)
        ));
    }

    #[test]
    fn non_finite_window_rejected() {
        assert!(matches!(
            fit_gev(&[1.0, f64::NAN], &GevFitConfig::default()),
            Err(GevError::NonFiniteData)
        ));
    }

    #[test]
    fn fixed_parameters_are_kept() {
        let truth = GevParams::new(0.2, 1.0, 0.8).unwrap();
        let data = draws(&truth, 200, 1);
        let fit = fit_gev(&data, &GevFitConfig::default()).unwrap();
        assert_eq!(fit.location(), 1.0);
        assert_eq!(fit.scale(), 0.8);
    }

    #[test]
    fn recovers_shape_with_fixed_location_and_scale() {
        let truth = GevParams::new(0.2, 1.0, 0.8).unwrap();
        let data = draws(&truth, 2000, 3);
        let fit = fit_gev(&data, &GevFitConfig::default()).unwrap();
        assert_relative_eq!(fit.shape(), 0.2, epsilon = 0.06);
    }

    #[test]
    fn recovers_location_and_scale_with_fixed_shape() {
        let truth = GevParams::new(0.0, 3.0, 1.5).unwrap();
        let data = draws(&truth, 2000, 5);
        let cfg = GevFitConfig::new()
            .with_shape(ParamSpec::Fixed(0.0))
            .with_location(ParamSpec::Free)
            .with_scale(ParamSpec::Free);
        let fit = fit_gev(&data, &cfg).unwrap();
        assert_relative_eq!(fit.location(), 3.0, epsilon = 0.15);
        assert_relative_eq!(fit.scale(), 1.5, epsilon = 0.15);
    }

    #[test]
    fn fitted_likelihood_beats_start() {
        let truth = GevParams::new(0.3, 1.0, 0.8).unwrap();
        let data = draws(&truth, 300, 9);
        let fit = fit_gev(&data, &GevFitConfig::default()).unwrap();
        let gumbel = GevParams::new(0.0, 1.0, 0.8).unwrap();
        assert!(fit.log_likelihood(&data) >= gumbel.log_likelihood(&data));
    }

    #[test]
    fn fully_determined_config_skips_optimiser() {
        let data = [1.0, 2.0, 3.0];
        let cfg = GevFitConfig::new()
            .with_shape(ParamSpec::Fixed(-0.1))
            .with_location(ParamSpec::FromSample)
            .with_scale(ParamSpec::FromSample);
        let fit = fit_gev(&data, &cfg).unwrap();
        assert_relative_eq!(fit.shape(), -0.1);
        assert_relative_eq!(fit.location(), 2.0);
        assert_relative_eq!(fit.scale(), (2.0f64 / 3.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn sample_scale_of_constant_window_rejected() {
        let cfg = GevFitConfig::new().with_scale(ParamSpec::FromSample);
        assert!(matches!(
            fit_gev(&[2.0; 5], &cfg),
            Err(GevError::InvalidParams { .. })
        ));
    }

    #[test]
    fn iteration_cap_is_fit_failure() {
        let truth = GevParams::new(0.2, 1.0, 0.8).unwrap();
        let data = draws(&truth, 100, 2);
        let cfg = GevFitConfig::new()
            .with_max_iters(1)
            .with_sd_tolerance(1e-300);
        let err = fit_gev(&data, &cfg).unwrap_err();
        assert!(err.is_fit_failure());
    }
}
