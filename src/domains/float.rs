//! The field of double precision floating point numbers.

use std::fmt::{Display, Formatter};

use rand::Rng;

use super::{Field, FieldError, Ring};

/// The field of real numbers, approximated by [f64].
///
/// Elements are compared exactly, without any tolerance, so that the result of
/// an elimination is reproducible bit for bit.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct RealField;

/// The reals, approximated by [f64].
pub const REALS: RealField = RealField;

impl RealField {
    pub fn new() -> RealField {
        RealField
    }
}

impl Display for RealField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ℝ")
    }
}

impl Ring for RealField {
    type Element = f64;

    #[inline]
    fn add(&self, a: &f64, b: &f64) -> f64 {
        a + b
    }

    #[inline]
    fn sub(&self, a: &f64, b: &f64) -> f64 {
        a - b
    }

    #[inline]
    fn mul(&self, a: &f64, b: &f64) -> f64 {
        a * b
    }

    #[inline]
    fn add_mul_assign(&self, a: &mut f64, b: &f64, c: &f64) {
        *a += b * c;
    }

    #[inline]
    fn neg(&self, a: &f64) -> f64 {
        -a
    }

    #[inline]
    fn zero(&self) -> f64 {
        0.
    }

    #[inline]
    fn one(&self) -> f64 {
        1.
    }

    #[inline]
    fn is_zero(&self, a: &f64) -> bool {
        *a == 0.
    }

    #[inline]
    fn is_one(&self, a: &f64) -> bool {
        *a == 1.
    }

    fn nth(&self, n: i64) -> f64 {
        n as f64
    }

    /// Multiply `e` copies of `b` from left to right, which is not always
    /// bit-identical to [f64::powi].
    fn pow(&self, b: &f64, e: u64) -> f64 {
        let mut res = 1.;
        for i in 0..e {
            res *= b;

            // from here on only the sign can change
            if res == 0. || !res.is_finite() {
                if b.is_sign_negative() && (e - i - 1) % 2 == 1 {
                    res = -res;
                }
                break;
            }
        }
        res
    }

    fn sample(&self, rng: &mut impl rand::RngCore, range: (i64, i64)) -> f64 {
        rng.gen_range(range.0 as f64..range.1 as f64)
    }
}

impl Field for RealField {
    #[inline]
    fn try_inv(&self, a: &f64) -> Result<f64, FieldError> {
        if *a == 0. {
            Err(FieldError::NotInvertible)
        } else {
            Ok(1. / a)
        }
    }
}
