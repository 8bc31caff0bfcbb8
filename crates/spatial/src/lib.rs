//! Spatial deviation pattern for DHW ensembles.
//!
//! A fine reference grid (e.g. the mean of several observed marine heatwave
//! years) gives each site a deviation from the domain mean: the value of the
//! nearest cell minus the mean of all cells. "Nearest" is the smallest
//! `|Δlon| + |Δlat|`, first cell wins on ties.

mod coord;
mod error;
mod pattern;

pub use coord::SiteCoord;
pub use error::SpatialError;
pub use pattern::{PatternCell, ReferencePattern, SpatialPattern};
