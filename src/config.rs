//! Tuning parameters for the transition search.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::SunlightError;

/// Configuration for [`TransitionFinder`](crate::transitions::TransitionFinder).
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use sunlight_tracker::SearchConfig;
///
/// let config = SearchConfig::new()
///     .with_precision(dec!(0.001))
///     .with_max_iterations(20);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchConfig {
    precision: Decimal,
    max_iterations: u32,
    max_polar_skips: u32,
    noon_search_days: i64,
}

impl SearchConfig {
    /// Creates a configuration with defaults.
    ///
    /// Defaults: `precision = 0.0001°`, `max_iterations = 50`,
    /// `max_polar_skips = 1000`, `noon_search_days = 4`.
    pub fn new() -> Self {
        Self {
            precision: dec!(0.0001),
            max_iterations: 50,
            max_polar_skips: 1000,
            noon_search_days: 4,
        }
    }

    /// Sets the elevation tolerance, in degrees, at which refinement stops.
    pub fn with_precision(mut self, precision: Decimal) -> Self {
        self.precision = precision;
        self
    }

    /// Sets the refinement iteration budget.
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets how many polar half-days may be skipped before giving up.
    pub fn with_max_polar_skips(mut self, max_polar_skips: u32) -> Self {
        self.max_polar_skips = max_polar_skips;
        self
    }

    /// Sets how far, in days, the solar noon search reaches on each side.
    pub fn with_noon_search_days(mut self, days: i64) -> Self {
        self.noon_search_days = days;
        self
    }

    pub fn precision(&self) -> Decimal {
        self.precision
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    pub fn max_polar_skips(&self) -> u32 {
        self.max_polar_skips
    }

    pub fn noon_search_days(&self) -> i64 {
        self.noon_search_days
    }

    /// Validates this configuration.
    pub fn validate(&self) -> Result<(), SunlightError> {
        if self.precision <= Decimal::ZERO {
            return Err(SunlightError::InvalidConfig {
                reason: format!("precision must be positive, got {}", self.precision),
            });
        }
        if self.max_iterations == 0 {
            return Err(SunlightError::InvalidConfig {
                reason: "max_iterations must be at least 1".to_string(),
            });
        }
        if self.noon_search_days < 1 {
            return Err(SunlightError::InvalidConfig {
                reason: format!(
                    "noon_search_days must be at least 1, got {}",
                    self.noon_search_days
                ),
            });
        }
        Ok(())
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let c = SearchConfig::default();
        assert_eq!(c.precision(), dec!(0.0001));
        assert_eq!(c.max_iterations(), 50);
        assert_eq!(c.max_polar_skips(), 1000);
        assert_eq!(c.noon_search_days(), 4);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_precision() {
        let c = SearchConfig::new().with_precision(Decimal::ZERO);
        assert!(matches!(
            c.validate(),
            Err(SunlightError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn rejects_zero_iterations() {
        let c = SearchConfig::new().with_max_iterations(0);
        let err = c.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid search configuration: max_iterations must be at least 1"
        );
    }

    #[test]
    fn rejects_empty_noon_search() {
        let c = SearchConfig::new().with_noon_search_days(0);
        assert!(c.validate().is_err());
    }
}
