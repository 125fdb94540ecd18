//! Error types for the sunlight_tracker crate.

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Error type for the deterministic math layer.
///
/// Every variant is a domain violation that is reported as-is; nothing in
/// the math layer clamps an out-of-domain argument silently.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MathError {
    /// Returned when `asin` receives an argument outside [-1, 1].
    #[error("asin argument out of domain: {value} (must be within [-1, 1])")]
    AsinDomain {
        /// The rejected argument.
        value: Decimal,
    },

    /// Returned when `acos` receives an argument outside [-1, 1].
    #[error("acos argument out of domain: {value} (must be within [-1, 1])")]
    AcosDomain {
        /// The rejected argument.
        value: Decimal,
    },

    /// Returned when `ln` receives a non-positive argument.
    #[error("log argument must be positive, got {value}")]
    LogDomain {
        /// The rejected argument.
        value: Decimal,
    },

    /// Returned when `sqrt` receives a negative argument.
    #[error("sqrt argument must be non-negative, got {value}")]
    SqrtDomain {
        /// The rejected argument.
        value: Decimal,
    },

    /// Returned when a negative base is raised to a non-integer power.
    #[error("negative base {base} cannot be raised to non-integer power {exponent}")]
    NegativeBasePower {
        /// The base.
        base: Decimal,
        /// The exponent.
        exponent: Decimal,
    },

    /// Returned when a function would divide by zero (e.g. `tan` at a pole).
    #[error("division by zero in {function}")]
    DivisionByZero {
        /// Name of the failing function.
        function: &'static str,
    },

    /// Returned when a result does not fit the decimal range.
    #[error("{function} result overflows the decimal range")]
    Overflow {
        /// Name of the failing function.
        function: &'static str,
    },
}

/// Error type for all fallible operations in the sunlight_tracker crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SunlightError {
    /// A math-layer domain error, propagated unchanged.
    #[error(transparent)]
    Math(#[from] MathError),

    /// Returned when a latitude or longitude is NaN or infinite.
    #[error("coordinate is not a finite number: {value}")]
    NonFiniteCoordinate {
        /// The rejected value.
        value: f64,
    },

    /// Returned when a latitude or longitude is too large to evaluate.
    #[error("coordinate magnitude {value} exceeds the supported limit of {limit} degrees")]
    CoordinateOutOfRange {
        /// The rejected value.
        value: f64,
        /// The largest accepted magnitude.
        limit: f64,
    },

    /// Returned when a search configuration is invalid.
    #[error("invalid search configuration: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when date/time arithmetic leaves chrono's representable range.
    #[error("time arithmetic out of range while {context}")]
    TimeOutOfRange {
        /// What was being computed.
        context: &'static str,
    },

    /// Returned when the bracketing solar noons/midnights cannot be located.
    #[error("no bracketing solar noon found within {days} days of {date}")]
    SolarNoonNotFound {
        /// The local date the search started from.
        date: NaiveDate,
        /// The search radius in days.
        days: i64,
    },

    /// Returned when polar conditions persist past the skip budget.
    #[error("no sunlight change found after skipping {skips} polar half-days")]
    PolarSkipLimit {
        /// Number of half-days skipped.
        skips: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn error_asin_domain() {
        let e = MathError::AsinDomain { value: dec!(1.5) };
        assert_eq!(
            e.to_string(),
            "asin argument out of domain: 1.5 (must be within [-1, 1])"
        );
    }

    #[test]
    fn error_log_domain() {
        let e = MathError::LogDomain { value: dec!(-2) };
        assert_eq!(e.to_string(), "log argument must be positive, got -2");
    }

    #[test]
    fn error_negative_base_power() {
        let e = MathError::NegativeBasePower {
            base: dec!(-8),
            exponent: dec!(0.5),
        };
        assert_eq!(
            e.to_string(),
            "negative base -8 cannot be raised to non-integer power 0.5"
        );
    }

    #[test]
    fn error_math_is_transparent() {
        let e: SunlightError = MathError::SqrtDomain { value: dec!(-1) }.into();
        assert_eq!(e.to_string(), "sqrt argument must be non-negative, got -1");
    }

    #[test]
    fn error_coordinate_out_of_range() {
        let e = SunlightError::CoordinateOutOfRange {
            value: 1e30,
            limit: 1e9,
        };
        assert_eq!(
            e.to_string(),
            "coordinate magnitude 1000000000000000000000000000000 exceeds the supported limit of 1000000000 degrees"
        );
    }

    #[test]
    fn error_noon_not_found() {
        let e = SunlightError::SolarNoonNotFound {
            date: NaiveDate::from_ymd_opt(2024, 1, 25).unwrap(),
            days: 4,
        };
        assert_eq!(
            e.to_string(),
            "no bracketing solar noon found within 4 days of 2024-01-25"
        );
    }

    #[test]
    fn error_polar_skip_limit() {
        let e = SunlightError::PolarSkipLimit { skips: 1000 };
        assert_eq!(
            e.to_string(),
            "no sunlight change found after skipping 1000 polar half-days"
        );
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync + std::error::Error>() {}
        assert_impl::<MathError>();
        assert_impl::<SunlightError>();
    }
}
