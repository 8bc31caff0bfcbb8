//! Ensemble generation configuration.

use dhwgen_gev::GevFitConfig;
use dhwgen_trend::DetrendConfig;

use crate::error::EnsembleError;

/// Where on the trend curve a generation year is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrendAnchor {
    /// Generation-year offset `i` (0 for the first generation year).
    #[default]
    GenerationIndex,
    /// The generation year's own position on the combined timeline.
    Timeline,
}

/// Configuration for [`crate::generate_ensemble`].
///
/// # Example
///
/// ```
/// use dhwgen_ensemble::EnsembleConfig;
///
/// let config = EnsembleConfig::new()
///     .with_n_members(10)
///     .with_years(2030, 2051)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.generation_years().len(), 21);
/// ```
#[derive(Debug, Clone)]
pub struct EnsembleConfig {
    n_members: usize,
    start_year: i32,
    end_year: i32,
    seed: Option<u64>,
    max_attempts: usize,
    intensity_quantile: f64,
    trend_anchor: TrendAnchor,
    detrend: DetrendConfig,
    gev: GevFitConfig,
}

impl EnsembleConfig {
    /// Creates a configuration with default values.
    ///
    /// Defaults: 50 members, years `2025..2100` (end exclusive), no seed,
    /// 1000 draws per rejection loop, intensity quantile 0.97,
    /// [`TrendAnchor::GenerationIndex`], default trend and GEV fits.
    pub fn new() -> Self {
        Self {
            n_members: 50,
            start_year: 2025,
            end_year: 2100,
            seed: None,
            max_attempts: 1000,
            intensity_quantile: 0.97,
            trend_anchor: TrendAnchor::GenerationIndex,
            detrend: DetrendConfig::new(),
            gev: GevFitConfig::new(),
        }
    }

    /// Sets the number of members, including the deterministic member 0.
    pub fn with_n_members(mut self, n: usize) -> Self {
        self.n_members = n;
        self
    }

    /// Sets the generation years `start..end` (end exclusive).
    pub fn with_years(mut self, start: i32, end: i32) -> Self {
        self.start_year = start;
        self.end_year = end;
        self
    }

    /// Sets the scenario seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets an optional scenario seed.
    pub fn with_seed_opt(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the draw cap of the rejection loop.
    pub fn with_max_attempts(mut self, n: usize) -> Self {
        self.max_attempts = n;
        self
    }

    /// Sets the quantile of the first year's distribution used as the
    /// full-intensity threshold.
    pub fn with_intensity_quantile(mut self, q: f64) -> Self {
        self.intensity_quantile = q;
        self
    }

    /// Sets the trend anchor.
    pub fn with_trend_anchor(mut self, anchor: TrendAnchor) -> Self {
        self.trend_anchor = anchor;
        self
    }

    /// Sets the trend fit configuration.
    pub fn with_detrend(mut self, detrend: DetrendConfig) -> Self {
        self.detrend = detrend;
        self
    }

    /// Sets the GEV fit configuration.
    pub fn with_gev(mut self, gev: GevFitConfig) -> Self {
        self.gev = gev;
        self
    }

    /// Number of members, including the deterministic member 0.
    pub fn n_members(&self) -> usize {
        self.n_members
    }

    /// First generation year.
    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    /// Exclusive end year.
    pub fn end_year(&self) -> i32 {
        self.end_year
    }

    /// Scenario seed, if fixed.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Rejection-sampling attempts per draw before clamping.
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Quantile level of the full-intensity threshold.
    pub fn intensity_quantile(&self) -> f64 {
        self.intensity_quantile
    }

    /// Where generation years are read on the trend curve.
    pub fn trend_anchor(&self) -> TrendAnchor {
        self.trend_anchor
    }

    /// Trend fit settings.
    pub fn detrend(&self) -> &DetrendConfig {
        &self.detrend
    }

    /// Per-year distribution fit settings.
    pub fn gev(&self) -> &GevFitConfig {
        &self.gev
    }

    /// Generation years in order.
    pub fn generation_years(&self) -> Vec<i32> {
        (self.start_year..self.end_year).collect()
    }

    /// Validates this configuration and the nested fit configurations.
    pub fn validate(&self) -> Result<(), EnsembleError> {
        let invalid = |reason: String| Err(EnsembleError::InvalidConfig { reason });
        if self.n_members == 0 {
            return invalid("n_members must be > 0".to_string());
        }
        if self.end_year <= self.start_year {
            return invalid(format!(
                "end_year ({}) must be after start_year ({})",
                self.end_year, self.start_year
            ));
        }
        if self.max_attempts == 0 {
            return invalid("max_attempts must be > 0".to_string());
        }
        if !(self.intensity_quantile > 0.0 && self.intensity_quantile < 1.0) {
            return invalid(format!(
                "intensity_quantile must be in (0, 1), got {}",
                self.intensity_quantile
            ));
        }
        self.detrend.validate()?;
        self.gev.validate()?;
        Ok(())
    }
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dhwgen_gev::ParamSpec;

    #[test]
    fn defaults() {
        let cfg = EnsembleConfig::default();
        assert_eq!(cfg.n_members(), 50);
        assert_eq!(cfg.start_year(), 2025);
        assert_eq!(cfg.end_year(), 2100);
        assert_eq!(cfg.seed(), None);
        assert_eq!(cfg.max_attempts(), 1000);
        assert_eq!(cfg.intensity_quantile(), 0.97);
        assert_eq!(cfg.trend_anchor(), TrendAnchor::GenerationIndex);
        assert_eq!(cfg.generation_years().len(), 75);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn builder_chaining() {
        let cfg = EnsembleConfig::new()
            .with_n_members(3)
            .with_years(2025, 2027)
            .with_seed(7)
            .with_max_attempts(10)
            .with_trend_anchor(TrendAnchor::Timeline);
        assert_eq!(cfg.n_members(), 3);
        assert_eq!(cfg.generation_years(), vec![2025, 2026]);
        assert_eq!(cfg.seed(), Some(7));
        assert_eq!(cfg.max_attempts(), 10);
        assert_eq!(cfg.trend_anchor(), TrendAnchor::Timeline);
        assert_eq!(cfg.with_seed_opt(None).seed(), None);
    }

    #[test]
    fn invalid_values_rejected() {
        for cfg in [
            EnsembleConfig::new().with_n_members(0),
            EnsembleConfig::new().with_years(2030, 2030),
            EnsembleConfig::new().with_max_attempts(0),
            EnsembleConfig::new().with_intensity_quantile(1.0),
            EnsembleConfig::new().with_intensity_quantile(f64::NAN),
        ] {
            assert!(matches!(
                cfg.validate(),
                Err(EnsembleError::InvalidConfig { .. })
            ));
        }
    }

    #[test]
    fn nested_config_errors_propagate() {
        let gev = GevFitConfig::new()
            .with_location(ParamSpec::Free)
            .with_scale(ParamSpec::Free);
        let err = EnsembleConfig::new().with_gev(gev).validate().unwrap_err();
        assert!(matches!(err, EnsembleError::Gev(_)));
    }
}
