//! Generalized extreme value (GEV) fitting and sampling for DHW residuals.
//!
//! For every generation year a GEV distribution is fitted to the detrended
//! residuals accumulated up to that year. At least one of the three
//! parameters is held fixed (or taken from the sample) because free
//! three-parameter fits are unstable on short windows; see
//! [`GevFitConfig`].
//!
//! Shape uses the climatological convention (`shape > 0` is heavy-tailed).

mod config;
mod error;
mod fit;
mod params;
mod yearly;

pub use config::{GevFitConfig, ParamSpec};
pub use error::GevError;
pub use fit::fit_gev;
pub use params::GevParams;
pub use yearly::{YearlyDistribution, fit_yearly_distributions};
