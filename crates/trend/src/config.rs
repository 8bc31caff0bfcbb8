//! Configuration for the trend fit.

use crate::error::TrendError;

/// Levenberg-Marquardt settings for [`crate::detrend`].
#[derive(Debug, Clone)]
pub struct DetrendConfig {
    /// Evaluation budget factor: the optimiser may use `patience * 4`
    /// residual evaluations before giving up.
    patience: usize,
}

impl DetrendConfig {
    /// Creates a configuration with `patience = 200`.
    pub fn new() -> Self {
        Self { patience: 200 }
    }

    /// Sets the evaluation budget factor.
    pub fn with_patience(mut self, patience: usize) -> Self {
        self.patience = patience;
        self
    }

    /// Returns the evaluation budget factor.
    pub fn patience(&self) -> usize {
        self.patience
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), TrendError> {
        if self.patience == 0 {
            return Err(TrendError::InvalidConfig {
                reason: "patience must be > 0".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for DetrendConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_validates() {
        let cfg = DetrendConfig::default();
        assert_eq!(cfg.patience(), 200);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_patience_fails() {
        let cfg = DetrendConfig::new().with_patience(0);
        assert!(matches!(
            cfg.validate(),
            Err(TrendError::InvalidConfig { .. })
        ));
    }
}
