//! Stochastic DHW ensemble generation.
//!
//! Combines the trend, extreme-value and spatial crates into one scenario
//! run:
//!
//! ```mermaid
//! flowchart LR
//!     H[historical] --> C[combine]
//!     P[projection] --> C
//!     C --> D[detrend]
//!     D --> Y[yearly GEV fits]
//!     Y --> S[bounded sampling]
//!     D --> S
//!     R[reference pattern] --> B[intensity blend]
//!     S --> B
//!     B --> E[EnsembleArray]
//! ```
//!
//! Member 0 of every site is the projection itself. The remaining members
//! are drawn from per-(site, member) random streams derived from one
//! scenario seed, in parallel across sites.
//!
//! Draws rejected more often than the configured cap are clamped and
//! reported as [`SamplingWarning`]s rather than failing the run.

mod array;
mod blend;
mod config;
mod error;
mod generate;
mod sampler;
mod scenario;
mod seed;

pub use array::EnsembleArray;
pub use blend::{blend, intensity_factor};
pub use config::{EnsembleConfig, TrendAnchor};
pub use error::{EnsembleError, ErrorKind};
pub use generate::{EnsembleResult, Site, generate_ensemble};
pub use sampler::{BoundedDraw, SamplingWarning, sample_bounded};
pub use scenario::rcp_code;
pub use seed::mix_seed;

pub use dhwgen_gev::{GevFitConfig, GevParams, ParamSpec, YearlyDistribution};
pub use dhwgen_spatial::{PatternCell, ReferencePattern, SiteCoord, SpatialPattern};
pub use dhwgen_trend::{DetrendConfig, TimeSeries, TrendModel};
