//! Yearly DHW series handling and Gaussian detrending.
//!
//! A site's historical yearly-maximum record is joined to a projected
//! series, and a bell-shaped trend is fitted over the combined timeline.
//! The residuals (observed minus trend) feed the extreme-value fits in
//! `dhwgen-gev`.
//!
//! ```text
//! historical ──┐
//!              ├─ combine ─► CombinedTimeline ─ detrend ─► TrendModel + ResidualSeries
//! projected  ──┘
//! ```
//!
//! Positions on the timeline are plain indices `0..n_hist + n_proj`; the
//! trend is a function of index, not of calendar year.

mod combine;
mod config;
mod detrend;
mod error;
mod series;

pub use combine::{CombinedTimeline, combine};
pub use config::DetrendConfig;
pub use detrend::{Detrended, GaussianShape, ResidualSeries, TrendModel, detrend, fit_trend};
pub use error::TrendError;
pub use series::TimeSeries;
