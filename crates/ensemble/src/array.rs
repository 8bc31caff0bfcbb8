//! Member × site × year ensemble storage.

use dhwgen_spatial::SiteCoord;

use crate::error::EnsembleError;

/// Dense `[member][site][year]` array of DHW values.
///
/// Values are stored member-major in one contiguous buffer; the flat index
/// of `(m, s, y)` is `(m * n_sites + s) * n_years + y`.
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleArray {
    n_members: usize,
    years: Vec<i32>,
    sites: Vec<SiteCoord>,
    values: Vec<f64>,
}

impl EnsembleArray {
    /// Wraps a flat member-major buffer.
    ///
    /// # Errors
    ///
    /// Returns [`EnsembleError::ShapeMismatch`] if `values.len()` differs
    /// from `n_members * sites.len() * years.len()`.
    pub fn from_values(
        n_members: usize,
        years: Vec<i32>,
        sites: Vec<SiteCoord>,
        values: Vec<f64>,
    ) -> Result<Self, EnsembleError> {
        let expected = n_members * sites.len() * years.len();
        if values.len() != expected {
            return Err(EnsembleError::ShapeMismatch {
                expected,
                actual: values.len(),
            });
        }
        Ok(Self {
            n_members,
            years,
            sites,
            values,
        })
    }

    pub fn n_members(&self) -> usize {
        self.n_members
    }

    pub fn n_sites(&self) -> usize {
        self.sites.len()
    }

    pub fn n_years(&self) -> usize {
        self.years.len()
    }

    /// Generation years along the last axis.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// Site coordinates along the middle axis.
    pub fn sites(&self) -> &[SiteCoord] {
        &self.sites
    }

    /// Flat member-major buffer.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Consumes self, returning the flat buffer.
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    /// Value at `(member, site, year_index)`.
    pub fn get(&self, member: usize, site: usize, year_index: usize) -> Option<f64> {
        if member >= self.n_members || site >= self.n_sites() || year_index >= self.n_years() {
            return None;
        }
        Some(self.values[(member * self.n_sites() + site) * self.n_years() + year_index])
    }

    /// One member's trajectory at one site.
    pub fn trajectory(&self, member: usize, site: usize) -> Option<&[f64]> {
        if member >= self.n_members || site >= self.n_sites() {
            return None;
        }
        let start = (member * self.n_sites() + site) * self.n_years();
        Some(&self.values[start..start + self.n_years()])
    }

    /// Sub-array for the inclusive year range `start..=end`.
    ///
    /// # Errors
    ///
    /// Returns [`EnsembleError::YearSelection`] if the range is empty or
    /// not inside the ensemble's years.
    pub fn select_years(&self, start: i32, end: i32) -> Result<Self, EnsembleError> {
        let out_of_range = || EnsembleError::YearSelection {
            start,
            end,
            first: self.years.first().copied().unwrap_or_default(),
            last: self.years.last().copied().unwrap_or_default(),
        };
        if end < start {
            return Err(out_of_range());
        }
        let lo = self
            .years
            .iter()
            .position(|&y| y == start)
            .ok_or_else(out_of_range)?;
        let hi = self
            .years
            .iter()
            .position(|&y| y == end)
            .ok_or_else(out_of_range)?;

        let n_years = self.n_years();
        let values = self
            .values
            .chunks_exact(n_years)
            .flat_map(|row| row[lo..=hi].iter().copied())
            .collect();
        Ok(Self {
            n_members: self.n_members,
            years: self.years[lo..=hi].to_vec(),
            sites: self.sites.clone(),
            values,
        })
    }

    /// Stacks ensembles along the member axis, in order.
    ///
    /// # Errors
    ///
    /// Returns [`EnsembleError::NothingToMerge`] for an empty list and
    /// [`EnsembleError::IncompatibleEnsembles`] if years or sites differ.
    pub fn concat_members(parts: &[EnsembleArray]) -> Result<Self, EnsembleError> {
        let first = parts.first().ok_or(EnsembleError::NothingToMerge)?;
        for part in &parts[1..] {
            if part.years != first.years {
                return Err(EnsembleError::IncompatibleEnsembles { what: "years" });
            }
            if part.sites != first.sites {
                return Err(EnsembleError::IncompatibleEnsembles { what: "sites" });
            }
        }
        let n_members = parts.iter().map(|p| p.n_members).sum();
        let mut values = Vec::with_capacity(parts.iter().map(|p| p.values.len()).sum());
        for part in parts {
            values.extend_from_slice(&part.values);
        }
        Ok(Self {
            n_members,
            years: first.years.clone(),
            sites: first.sites.clone(),
            values,
        })
    }
}
