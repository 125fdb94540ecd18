//! Deterministic transcendental functions over [`Decimal`].
//!
//! Everything here is built from Taylor series and Newton iterations on the
//! 96-bit decimal type, so a given input produces the same output on every
//! host regardless of its floating-point unit. Series are summed until a
//! partial sum stops changing or [`MAX_SERIES_TERMS`] is reached.

use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

use crate::error::MathError;

pub const PI: Decimal = dec!(3.1415926535897932384626433833);
pub const HALF_PI: Decimal = dec!(1.5707963267948966192313216916);
pub const TWO_PI: Decimal = dec!(6.2831853071795864769252867666);
pub const LN_2: Decimal = dec!(0.6931471805599453094172321215);

/// Smallest positive difference the decimal type can represent.
pub const EPSILON: Decimal = dec!(0.0000000000000000000000000001);

pub const MAX_SERIES_TERMS: u32 = 100;

/// Arguments of `asin`/`acos` within this distance beyond ±1 are treated as ±1.
pub const DOMAIN_TOLERANCE: Decimal = dec!(0.000000000000000000000001);

const HALF: Decimal = dec!(0.5);
const HALVING_LIMIT: Decimal = dec!(0.85);
const EXP_LIMIT: Decimal = dec!(66);

pub fn to_radians(degrees: Decimal) -> Decimal {
    degrees * PI / dec!(180)
}

pub fn to_degrees(radians: Decimal) -> Decimal {
    radians * dec!(180) / PI
}

/// Floored remainder: the result is always in `[0, modulus)` for a positive modulus.
pub fn rem_euclid(value: Decimal, modulus: Decimal) -> Decimal {
    let r = value % modulus;
    if r.is_sign_negative() && !r.is_zero() {
        r + modulus
    } else {
        r
    }
}

/// Normalizes an angle in degrees to `[0, 360)`.
pub fn normalize_degrees(angle: Decimal) -> Decimal {
    rem_euclid(angle, dec!(360))
}

/// Wraps into `[-2π, 2π]` and then folds into `[-π, π]` for faster convergence.
fn reduce_angle(x: Decimal) -> Decimal {
    let r = x % TWO_PI;
    if r > PI {
        r - TWO_PI
    } else if r < -PI {
        r + TWO_PI
    } else {
        r
    }
}

/// Sums a series given its first term and a term-to-term step.
///
/// `step(n, previous)` returns term `n` from term `n - 1`. Summation stops once
/// adding a term no longer changes the partial sum.
fn sum_series(first: Decimal, mut step: impl FnMut(u32, Decimal) -> Decimal) -> Decimal {
    let mut term = first;
    let mut sum = first;
    for n in 1..=MAX_SERIES_TERMS {
        term = step(n, term);
        let next = sum + term;
        if term.is_zero() || next == sum {
            break;
        }
        sum = next;
    }
    sum
}

pub fn sin(x: Decimal) -> Decimal {
    let x = reduce_angle(x);
    let x2 = x * x;
    sum_series(x, |n, term| {
        let k = Decimal::from(2 * n);
        -term * x2 / (k * (k + Decimal::ONE))
    })
}

pub fn cos(x: Decimal) -> Decimal {
    let x = reduce_angle(x);
    let x2 = x * x;
    sum_series(Decimal::ONE, |n, term| {
        let k = Decimal::from(2 * n);
        -term * x2 / ((k - Decimal::ONE) * k)
    })
}

pub fn tan(x: Decimal) -> Result<Decimal, MathError> {
    let c = cos(x);
    if c.is_zero() {
        return Err(MathError::DivisionByZero { function: "tan" });
    }
    sin(x)
        .checked_div(c)
        .ok_or(MathError::Overflow { function: "tan" })
}

/// Square root with the default convergence epsilon ([`EPSILON`]).
pub fn sqrt(x: Decimal) -> Result<Decimal, MathError> {
    sqrt_with_epsilon(x, EPSILON)
}

/// Newton–Raphson square root seeded from a floating-point estimate.
///
/// Iterates until two successive approximations are within `epsilon` of each
/// other, or [`MAX_SERIES_TERMS`] iterations have run.
pub fn sqrt_with_epsilon(x: Decimal, epsilon: Decimal) -> Result<Decimal, MathError> {
    if x.is_zero() {
        return Ok(Decimal::ZERO);
    }
    if x.is_sign_negative() {
        return Err(MathError::SqrtDomain { value: x });
    }
    let mut y = x
        .to_f64()
        .map(f64::sqrt)
        .and_then(Decimal::from_f64)
        .filter(|seed| !seed.is_zero())
        .unwrap_or(x);
    for _ in 0..MAX_SERIES_TERMS {
        let next = (y + x / y) / Decimal::TWO;
        let settled = (next - y).abs() <= epsilon;
        y = next;
        if settled {
            break;
        }
    }
    Ok(y)
}

/// Maclaurin series of asin, only used for |x| <= 0.5.
fn asin_series(x: Decimal) -> Decimal {
    let x2 = x * x;
    let mut coefficient = x;
    sum_series(x, |n, _| {
        let k = Decimal::from(2 * n);
        coefficient = coefficient * x2 * (k - Decimal::ONE) / k;
        coefficient / (k + Decimal::ONE)
    })
}

/// Inverse sine in radians.
///
/// The argument is reduced before the series is applied:
/// - |x| <= 0.5: series directly
/// - |x| <= 0.85: `asin(x) = 0.5 * (π/2 - asin(1 - 2x²))`
/// - otherwise: `asin(x) = π/2 - 2 * asin(sqrt((1 - x) / 2))`
pub fn asin(x: Decimal) -> Result<Decimal, MathError> {
    let magnitude = x.abs();
    if magnitude > Decimal::ONE + DOMAIN_TOLERANCE {
        return Err(MathError::AsinDomain { value: x });
    }
    let magnitude = magnitude.min(Decimal::ONE);

    let result = if magnitude <= HALF {
        asin_series(magnitude)
    } else if magnitude <= HALVING_LIMIT {
        HALF * (HALF_PI - asin_series(Decimal::ONE - Decimal::TWO * magnitude * magnitude))
    } else {
        let reduced = sqrt((Decimal::ONE - magnitude) / Decimal::TWO)?;
        HALF_PI - Decimal::TWO * asin_series(reduced)
    };

    Ok(if x.is_sign_negative() { -result } else { result })
}

pub fn acos(x: Decimal) -> Result<Decimal, MathError> {
    if x.abs() > Decimal::ONE + DOMAIN_TOLERANCE {
        return Err(MathError::AcosDomain { value: x });
    }
    Ok(HALF_PI - asin(x)?)
}

pub fn atan(x: Decimal) -> Result<Decimal, MathError> {
    if x > Decimal::ONE {
        return Ok(HALF_PI - atan(Decimal::ONE / x)?);
    }
    if x < Decimal::NEGATIVE_ONE {
        return Ok(-HALF_PI - atan(Decimal::ONE / x)?);
    }
    asin(x / sqrt(Decimal::ONE + x * x)?)
}

/// Four-quadrant inverse tangent of `y / x`, in `(-π, π]`. `atan2(0, 0)` is 0.
pub fn atan2(y: Decimal, x: Decimal) -> Result<Decimal, MathError> {
    if x.is_zero() {
        return Ok(if y.is_zero() {
            Decimal::ZERO
        } else if y.is_sign_negative() {
            -HALF_PI
        } else {
            HALF_PI
        });
    }
    let base = atan(
        y.checked_div(x)
            .ok_or(MathError::Overflow { function: "atan2" })?,
    )?;
    Ok(if x.is_sign_positive() {
        base
    } else if y.is_sign_negative() && !y.is_zero() {
        base - PI
    } else {
        base + PI
    })
}

/// `e^x`, using `e^x = 2^m · e^r` with `r = x - m·ln 2` in [-0.35, 0.35].
pub fn exp(x: Decimal) -> Result<Decimal, MathError> {
    if x > EXP_LIMIT {
        return Err(MathError::Overflow { function: "exp" });
    }
    if x < -EXP_LIMIT {
        return Ok(Decimal::ZERO);
    }
    let m = (x / LN_2).round();
    let r = x - m * LN_2;
    let series = sum_series(Decimal::ONE, |n, term| term * r / Decimal::from(n));
    let power = m.to_i64().ok_or(MathError::Overflow { function: "exp" })?;
    Ok(series * powi(Decimal::TWO, power)?)
}

/// Natural logarithm via `ln(m · 2^k) = 2·atanh((m-1)/(m+1)) + k·ln 2`.
pub fn ln(x: Decimal) -> Result<Decimal, MathError> {
    if x.is_zero() || x.is_sign_negative() {
        return Err(MathError::LogDomain { value: x });
    }
    let mut mantissa = x;
    let mut exponent: i64 = 0;
    while mantissa >= Decimal::TWO {
        mantissa /= Decimal::TWO;
        exponent += 1;
    }
    while mantissa < Decimal::ONE {
        mantissa *= Decimal::TWO;
        exponent -= 1;
    }

    let z = (mantissa - Decimal::ONE) / (mantissa + Decimal::ONE);
    let z2 = z * z;
    let mut power = z;
    let atanh = sum_series(z, |n, _| {
        power *= z2;
        power / Decimal::from(2 * n + 1)
    });
    Ok(Decimal::TWO * atanh + Decimal::from(exponent) * LN_2)
}

/// Integer power by repeated squaring.
pub fn powi(base: Decimal, exponent: i64) -> Result<Decimal, MathError> {
    let overflow = MathError::Overflow { function: "powi" };
    let mut result = Decimal::ONE;
    let mut square = base;
    let mut remaining = exponent.unsigned_abs();
    while remaining > 0 {
        if remaining & 1 == 1 {
            result = result.checked_mul(square).ok_or(overflow.clone())?;
        }
        remaining >>= 1;
        if remaining > 0 {
            square = square.checked_mul(square).ok_or(overflow.clone())?;
        }
    }
    if exponent < 0 {
        if result.is_zero() {
            return Err(MathError::DivisionByZero { function: "powi" });
        }
        return Decimal::ONE.checked_div(result).ok_or(overflow);
    }
    Ok(result)
}

/// Real power. Integer exponents go through [`powi`]; everything else uses
/// `exp(exponent · ln(base))` and therefore needs a non-negative base.
pub fn powd(base: Decimal, exponent: Decimal) -> Result<Decimal, MathError> {
    if exponent.fract().is_zero() {
        if let Some(n) = exponent.to_i64() {
            return powi(base, n);
        }
    }
    if base.is_zero() {
        return if exponent.is_sign_positive() {
            Ok(Decimal::ZERO)
        } else {
            Err(MathError::DivisionByZero { function: "powd" })
        };
    }
    if base.is_sign_negative() {
        return Err(MathError::NegativeBasePower { base, exponent });
    }
    exp(exponent * ln(base)?)
}
