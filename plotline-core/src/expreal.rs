//! Scaled base-10-exponent arithmetic for overflow-prone expressions.
//!
//! An [`ExpReal`] stores a number as `sign * mantissa * 10^exponent` with
//! the mantissa normalized into `[1, 10)` and the exponent kept as a plain
//! integer. That lets `exp(x^2) / exp(x^2 - 1)` cancel to roughly `e` for
//! x values where both terms overflow an f64 on their own.
//!
//! Zero and NaN are explicit states rather than encodings: any arithmetic
//! on a NaN stays NaN, and division by zero becomes NaN.

/// Sign, mantissa in `[1, 10)`, and a base-10 exponent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpReal {
    sign: f64,
    mantissa: f64,
    exponent10: i32,
    is_zero: bool,
    is_nan: bool,
}

impl Default for ExpReal {
    fn default() -> Self {
        Self::ZERO
    }
}

impl ExpReal {
    pub const ZERO: Self = Self {
        sign: 1.0,
        mantissa: 0.0,
        exponent10: 0,
        is_zero: true,
        is_nan: false,
    };

    pub const NAN: Self = Self {
        sign: 1.0,
        mantissa: 0.0,
        exponent10: 0,
        is_zero: true,
        is_nan: true,
    };

    #[must_use]
    pub fn from_f64(value: f64) -> Self {
        if value.is_nan() {
            return Self::NAN;
        }
        if value == 0.0 {
            return Self::ZERO;
        }
        let sign = if value < 0.0 { -1.0 } else { 1.0 };
        let abs = value.abs();
        let exponent = abs.log10().floor() as i32;
        let mantissa = abs / 10f64.powi(exponent);
        Self::normalize(sign, mantissa, exponent)
    }

    /// `e^value`, computed in log10 space so it never overflows.
    #[must_use]
    pub fn exp(value: f64) -> Self {
        if value.is_nan() {
            return Self::NAN;
        }
        let log10_value = value / std::f64::consts::LN_10;
        let exponent = log10_value.floor() as i32;
        let mantissa = 10f64.powf(log10_value - f64::from(exponent));
        Self::normalize(1.0, mantissa, exponent)
    }

    #[must_use]
    pub fn mul(a: Self, b: Self) -> Self {
        if a.is_nan || b.is_nan {
            return Self::NAN;
        }
        if a.is_zero || b.is_zero {
            return Self::ZERO;
        }
        Self::normalize(a.sign * b.sign, a.mantissa * b.mantissa, a.exponent10 + b.exponent10)
    }

    #[must_use]
    pub fn div(a: Self, b: Self) -> Self {
        if a.is_nan || b.is_nan || b.is_zero {
            return Self::NAN;
        }
        if a.is_zero {
            return Self::ZERO;
        }
        Self::normalize(a.sign * b.sign, a.mantissa / b.mantissa, a.exponent10 - b.exponent10)
    }

    #[must_use]
    pub fn add(a: Self, b: Self) -> Self {
        if a.is_nan || b.is_nan {
            return Self::NAN;
        }
        if a.is_zero {
            return b;
        }
        if b.is_zero {
            return a;
        }

        let diff = a.exponent10 - b.exponent10;
        // Past 16 decimal orders of magnitude the smaller term vanishes in
        // an f64 mantissa anyway.
        if diff.abs() > 16 {
            return if diff > 0 { a } else { b };
        }

        let a_value = a.sign * a.mantissa * 10f64.powi(if diff > 0 { 0 } else { diff });
        let b_value = b.sign * b.mantissa * 10f64.powi(if diff > 0 { -diff } else { 0 });
        let sum = a_value + b_value;
        let sign = if sum < 0.0 { -1.0 } else { 1.0 };
        let exponent = if diff > 0 { a.exponent10 } else { b.exponent10 };
        Self::normalize(sign, sum.abs(), exponent)
    }

    #[must_use]
    pub fn sub(a: Self, b: Self) -> Self {
        let mut negated = b;
        negated.sign = -negated.sign;
        Self::add(a, negated)
    }

    /// Raise to an f64 power. A negative base with a non-integer power is NaN.
    #[must_use]
    pub fn powf(a: Self, power: f64) -> Self {
        if a.is_nan {
            return Self::NAN;
        }
        if a.is_zero {
            return Self::ZERO;
        }
        if a.sign < 0.0 && (power - power.round()).abs() > 1e-9 {
            return Self::NAN;
        }
        let log10_value = a.mantissa.log10() + f64::from(a.exponent10);
        let result_log10 = log10_value * power;
        let exponent = result_log10.floor() as i32;
        let mantissa = 10f64.powf(result_log10 - f64::from(exponent));
        let sign = if a.sign < 0.0 && (power.round() as i64) % 2 != 0 {
            -1.0
        } else {
            1.0
        };
        Self::normalize(sign, mantissa, exponent)
    }

    #[must_use]
    pub fn is_nan(self) -> bool {
        self.is_nan
    }

    #[must_use]
    pub fn is_zero(self) -> bool {
        self.is_zero && !self.is_nan
    }

    /// Whether the magnitude is at most `limit`, compared in log10 space so
    /// values far beyond f64 range still compare correctly.
    #[must_use]
    pub fn is_within(self, limit: f64) -> bool {
        if self.is_nan {
            return false;
        }
        if self.is_zero() {
            return true;
        }
        let abs_limit = limit.abs();
        if abs_limit <= 0.0 {
            return false;
        }
        self.mantissa.log10() + f64::from(self.exponent10) <= abs_limit.log10()
    }

    #[must_use]
    pub fn to_f64(self) -> f64 {
        if self.is_nan {
            return f64::NAN;
        }
        if self.is_zero() {
            return 0.0;
        }
        self.sign * self.mantissa * 10f64.powi(self.exponent10)
    }

    fn normalize(sign: f64, mantissa: f64, exponent10: i32) -> Self {
        if mantissa == 0.0 {
            return Self::ZERO;
        }
        let mut abs = mantissa.abs();
        let mut exponent = exponent10;
        while abs >= 10.0 {
            abs /= 10.0;
            exponent += 1;
        }
        while abs > 0.0 && abs < 1.0 {
            abs *= 10.0;
            exponent -= 1;
        }
        Self {
            sign: if sign < 0.0 { -1.0 } else { 1.0 },
            mantissa: abs,
            exponent10: exponent,
            is_zero: false,
            is_nan: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9 * b.abs().max(1.0)
    }

    // -- construction --

    #[test]
    fn round_trips_ordinary_values() {
        for value in [1.0, -2.5, 0.001, 123_456.789, -9.9e8] {
            assert!(close(ExpReal::from_f64(value).to_f64(), value));
        }
    }

    #[test]
    fn zero_and_nan_are_preserved() {
        assert_eq!(ExpReal::from_f64(0.0).to_f64(), 0.0);
        assert!(ExpReal::from_f64(f64::NAN).is_nan());
        assert!(ExpReal::from_f64(f64::NAN).to_f64().is_nan());
    }

    // -- arithmetic --

    #[test]
    fn mul_and_div_track_exponents() {
        let a = ExpReal::from_f64(3.0e100);
        let b = ExpReal::from_f64(2.0e100);
        assert!(close(ExpReal::div(a, b).to_f64(), 1.5));
        // The product overflows f64 but stays representable here.
        let product = ExpReal::mul(a, b);
        assert!(!product.is_nan());
        assert!(!product.is_within(1e300));
    }

    #[test]
    fn add_with_distant_exponents_keeps_larger_term() {
        let big = ExpReal::from_f64(1.0e40);
        let tiny = ExpReal::from_f64(1.0);
        assert!(close(ExpReal::add(big, tiny).to_f64(), 1.0e40));
        assert!(close(ExpReal::add(tiny, big).to_f64(), 1.0e40));
    }

    #[test]
    fn sub_of_equal_values_is_zero() {
        let a = ExpReal::from_f64(7.25);
        assert!(ExpReal::sub(a, a).is_zero());
    }

    #[test]
    fn div_by_zero_is_nan() {
        assert!(ExpReal::div(ExpReal::from_f64(1.0), ExpReal::ZERO).is_nan());
    }

    #[test]
    fn negative_base_fractional_power_is_nan() {
        assert!(ExpReal::powf(ExpReal::from_f64(-2.0), 0.5).is_nan());
        assert!(close(ExpReal::powf(ExpReal::from_f64(-2.0), 3.0).to_f64(), -8.0));
    }

    // -- exp cancellation --

    #[test]
    fn exp_ratio_cancels_to_e_for_large_arguments() {
        // exp(x^2) / exp(x^2 - 1) = e, even where exp(x^2) overflows f64.
        for x in [5.0, 30.0, 100.0] {
            let x_squared = ExpReal::powf(ExpReal::from_f64(x), 2.0);
            let numerator = ExpReal::exp(x_squared.to_f64());
            let minus_one = ExpReal::sub(x_squared, ExpReal::from_f64(1.0));
            let denominator = ExpReal::exp(minus_one.to_f64());
            let ratio = ExpReal::div(numerator, denominator);
            assert!(
                close(ratio.to_f64(), std::f64::consts::E),
                "x = {x}: got {}",
                ratio.to_f64()
            );
        }
    }

    // -- limits --

    #[test]
    fn is_within_compares_in_log_space() {
        assert!(ExpReal::from_f64(4.9).is_within(5.0));
        assert!(!ExpReal::from_f64(5.1).is_within(5.0));
        assert!(ExpReal::ZERO.is_within(5.0));
        assert!(!ExpReal::exp(1e6).is_within(1e300));
        assert!(!ExpReal::from_f64(1.0).is_within(0.0));
    }
}
