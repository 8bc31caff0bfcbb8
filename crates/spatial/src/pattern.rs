//! Reference pattern and per-site deviations.

use tracing::debug;

use crate::coord::SiteCoord;
use crate::error::SpatialError;

/// One reference grid cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternCell {
    /// Cell location.
    pub coord: SiteCoord,
    /// Pattern value; may be NaN for cells without data.
    pub value: f64,
}

/// Fine-grained reference pattern with its domain mean.
#[derive(Debug, Clone)]
pub struct ReferencePattern {
    cells: Vec<PatternCell>,
    domain_mean: f64,
}

impl ReferencePattern {
    /// Builds a pattern from cells. The domain mean ignores non-finite values.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::EmptyPattern`] for no cells,
    /// [`SpatialError::NonFiniteCoordinate`] for a bad cell location and
    /// [`SpatialError::NoFiniteCells`] if no cell has a finite value.
    pub fn new(cells: Vec<PatternCell>) -> Result<Self, SpatialError> {
        if cells.is_empty() {
            return Err(SpatialError::EmptyPattern);
        }
        for cell in &cells {
            cell.coord.validate()?;
        }
        let values: Vec<f64> = cells.iter().map(|c| c.value).collect();
        let domain_mean = dhwgen_stats::nan_mean(&values).ok_or(SpatialError::NoFiniteCells)?;
        debug!(n_cells = cells.len(), domain_mean, "reference pattern built");
        Ok(Self { cells, domain_mean })
    }

    /// Builds a pattern by averaging several layers cell-wise.
    ///
    /// `layers[k][j]` is the value of cell `coords[j]` in layer `k`. Each
    /// cell's value is the mean of its finite layer values, or NaN if it
    /// has none.
    pub fn from_layers(coords: &[SiteCoord], layers: &[Vec<f64>]) -> Result<Self, SpatialError> {
        if layers.is_empty() {
            return Err(SpatialError::NoLayers);
        }
        for (layer, values) in layers.iter().enumerate() {
            if values.len() != coords.len() {
                return Err(SpatialError::LayerLengthMismatch {
                    layer,
                    expected: coords.len(),
                    actual: values.len(),
                });
            }
        }
        let mut column = Vec::with_capacity(layers.len());
        let cells = coords
            .iter()
            .enumerate()
            .map(|(j, &coord)| {
                column.clear();
                column.extend(layers.iter().map(|layer| layer[j]));
                PatternCell {
                    coord,
                    value: dhwgen_stats::nan_mean(&column).unwrap_or(f64::NAN),
                }
            })
            .collect();
        Self::new(cells)
    }

    /// All cells in input order.
    pub fn cells(&self) -> &[PatternCell] {
        &self.cells
    }

    /// Mean of all finite cell values.
    pub fn domain_mean(&self) -> f64 {
        self.domain_mean
    }

    /// The finite-valued cell closest to `site` in lon/lat L1 distance.
    ///
    /// On ties the earliest cell wins.
    pub fn nearest(&self, site: &SiteCoord) -> Option<&PatternCell> {
        let mut best: Option<(&PatternCell, f64)> = None;
        for cell in self.cells.iter().filter(|c| c.value.is_finite()) {
            let d = site.l1_distance(&cell.coord);
            match best {
                Some((_, bd)) if d >= bd => {}
                _ => best = Some((cell, d)),
            }
        }
        best.map(|(cell, _)| cell)
    }

    /// Nearest cell value minus the domain mean.
    pub fn deviation(&self, site: &SiteCoord) -> Result<f64, SpatialError> {
        site.validate()?;
        let cell = self.nearest(site).ok_or(SpatialError::NoFiniteCells)?;
        Ok(cell.value - self.domain_mean)
    }

    /// Deviations for a list of sites.
    pub fn site_pattern(&self, sites: &[SiteCoord]) -> Result<SpatialPattern, SpatialError> {
        let deviations = sites
            .iter()
            .map(|s| self.deviation(s))
            .collect::<Result<Vec<_>, _>>()?;
        SpatialPattern::new(sites.to_vec(), deviations, self.domain_mean)
    }
}

/// Per-site deviations from the domain mean, in site order.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialPattern {
    sites: Vec<SiteCoord>,
    deviations: Vec<f64>,
    domain_mean: f64,
}

impl SpatialPattern {
    /// Assembles a pattern from precomputed deviations.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::DeviationCountMismatch`] if the lengths differ.
    pub fn new(
        sites: Vec<SiteCoord>,
        deviations: Vec<f64>,
        domain_mean: f64,
    ) -> Result<Self, SpatialError> {
        if sites.len() != deviations.len() {
            return Err(SpatialError::DeviationCountMismatch {
                sites: sites.len(),
                deviations: deviations.len(),
            });
        }
        Ok(Self {
            sites,
            deviations,
            domain_mean,
        })
    }

    /// Site coordinates.
    pub fn sites(&self) -> &[SiteCoord] {
        &self.sites
    }

    /// Deviation per site.
    pub fn deviations(&self) -> &[f64] {
        &self.deviations
    }

    /// Deviation of one site.
    pub fn deviation(&self, site: usize) -> Option<f64> {
        self.deviations.get(site).copied()
    }

    /// Domain mean of the reference pattern.
    pub fn domain_mean(&self) -> f64 {
        self.domain_mean
    }

    /// Number of sites.
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// Returns `true` if there are no sites.
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}
