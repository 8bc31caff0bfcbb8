//! Coordinates and the lon/lat L1 distance.

use crate::error::SpatialError;

/// A site location in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiteCoord {
    /// Longitude.
    pub lon: f64,
    /// Latitude.
    pub lat: f64,
}

impl SiteCoord {
    /// Creates a coordinate.
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Returns an error unless both components are finite.
    pub fn validate(&self) -> Result<(), SpatialError> {
        if self.lon.is_finite() && self.lat.is_finite() {
            Ok(())
        } else {
            Err(SpatialError::NonFiniteCoordinate {
                lon: self.lon,
                lat: self.lat,
            })
        }
    }

    /// Sum of absolute lon and lat differences.
    ///
    /// Not a geodesic distance; it only ranks nearby grid cells.
    pub fn l1_distance(&self, other: &SiteCoord) -> f64 {
        (self.lon - other.lon).abs() + (self.lat - other.lat).abs()
    }
}
