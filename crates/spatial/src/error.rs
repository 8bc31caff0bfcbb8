//! Error types for the dhwgen-spatial crate.

/// Error type for all fallible operations in the dhwgen-spatial crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SpatialError {
    /// Returned when the reference pattern has no cells.
    #[error("reference pattern has no cells")]
    EmptyPattern,

    /// Returned when no reference layers are supplied.
    #[error("no reference layers supplied")]
    NoLayers,

    /// Returned when a reference layer does not cover every cell.
    #[error("layer {layer} has {actual} values but there are {expected} cells")]
    LayerLengthMismatch {
        /// Zero-based layer index.
        layer: usize,
        /// Number of cells.
        expected: usize,
        /// Number of values in the layer.
        actual: usize,
    },

    /// Returned when a coordinate is NaN or infinite.
    #[error("non-finite coordinate (lon={lon}, lat={lat})")]
    NonFiniteCoordinate {
        /// Longitude.
        lon: f64,
        /// Latitude.
        lat: f64,
    },

    /// Returned when every cell value is NaN or infinite.
    #[error("reference pattern has no finite cell values")]
    NoFiniteCells,

    /// Returned when the deviation count does not match the site count.
    #[error("{deviations} deviations for {sites} sites")]
    DeviationCountMismatch {
        /// Number of sites.
        sites: usize,
        /// Number of deviations.
        deviations: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_layer_mismatch() {
        let e = SpatialError::LayerLengthMismatch {
            layer: 2,
            expected: 10,
            actual: 9,
        };
        assert_eq!(e.to_string(), "layer 2 has 9 values but there are 10 cells");
    }

    #[test]
    fn display_non_finite_coordinate() {
        let e = SpatialError::NonFiniteCoordinate {
            lon: f64::NAN,
            lat: -18.0,
        };
        assert_eq!(e.to_string(), "non-finite coordinate (lon=NaN, lat=-18)");
    }

    #[test]
    fn error_is_std_error() {
        fn assert_impl<T: std::error::Error>() {}
        assert_impl::<SpatialError>();
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<SpatialError>();
    }
}
