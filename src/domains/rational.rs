//! Exact rational numbers.
//!
//! [Q] works on [Rational], which stays on the machine-word fast path for as long as
//! the numerator and denominator fit in an `i64` and falls back to GMP when they do not.
//! [QQ] works on [rug::Rational] directly.

use std::fmt::{Display, Formatter};

use rand::Rng;
use rug::{Integer as MultiPrecisionInteger, Rational as MultiPrecisionRational};

use super::{
    integer::{gcd_signed, gcd_unsigned},
    Field, FieldError, Ring,
};

/// The field of rational numbers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct RationalField;

/// The field of rational numbers.
pub const Q: RationalField = RationalField;

impl RationalField {
    pub fn new() -> RationalField {
        RationalField
    }
}

/// A rational number in lowest terms with a positive denominator.
///
/// Numbers that fit in `i64` are always stored as [Rational::Natural], so that
/// two equal numbers have the same representation.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Rational {
    Natural(i64, i64),
    Large(MultiPrecisionRational),
}

impl Rational {
    /// Create the reduced fraction `num / den`.
    pub fn new(num: i64, den: i64) -> Result<Rational, FieldError> {
        if den == 0 {
            return Err(FieldError::ZeroDenominator);
        }

        let g = gcd_signed(num, den);
        let (num, den) = (num / g as i64, den / g as i64);
        if den < 0 {
            match (num.checked_neg(), den.checked_neg()) {
                (Some(n), Some(d)) => Ok(Rational::Natural(n, d)),
                _ => Ok(Rational::from_large(MultiPrecisionRational::from((num, den)))),
            }
        } else {
            Ok(Rational::Natural(num, den))
        }
    }

    /// Convert a multi-precision rational, demoting it to the machine-word
    /// representation when possible.
    pub fn from_large(r: MultiPrecisionRational) -> Rational {
        if let (Some(n), Some(d)) = (r.numer().to_i64(), r.denom().to_i64()) {
            Rational::Natural(n, d)
        } else {
            Rational::Large(r)
        }
    }

    pub fn to_multi_prec(&self) -> MultiPrecisionRational {
        match self {
            Rational::Natural(n, d) => MultiPrecisionRational::from((*n, *d)),
            Rational::Large(r) => r.clone(),
        }
    }

    pub fn numerator(&self) -> MultiPrecisionInteger {
        match self {
            Rational::Natural(n, _) => MultiPrecisionInteger::from(*n),
            Rational::Large(r) => r.numer().clone(),
        }
    }

    pub fn denominator(&self) -> MultiPrecisionInteger {
        match self {
            Rational::Natural(_, d) => MultiPrecisionInteger::from(*d),
            Rational::Large(r) => r.denom().clone(),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Rational::Natural(n, _) => *n == 0,
            Rational::Large(r) => *r.numer() == 0,
        }
    }

    pub fn is_one(&self) -> bool {
        match self {
            Rational::Natural(n, d) => *n == 1 && *d == 1,
            Rational::Large(r) => *r.numer() == 1 && *r.denom() == 1,
        }
    }

    pub fn is_integer(&self) -> bool {
        match self {
            Rational::Natural(_, d) => *d == 1,
            Rational::Large(r) => *r.denom() == 1,
        }
    }
}

macro_rules! from_with_cast {
    ($($base:ty),*) => {
        $(
            impl From<$base> for Rational {
                #[inline]
                fn from(value: $base) -> Self {
                    Rational::Natural(value as i64, 1)
                }
            }
        )*
    };
}

from_with_cast!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for Rational {
    fn from(value: u64) -> Self {
        if value <= i64::MAX as u64 {
            Rational::Natural(value as i64, 1)
        } else {
            Rational::Large(MultiPrecisionRational::from(value))
        }
    }
}

impl TryFrom<(i64, i64)> for Rational {
    type Error = FieldError;

    fn try_from(value: (i64, i64)) -> Result<Self, Self::Error> {
        Rational::new(value.0, value.1)
    }
}

impl From<MultiPrecisionRational> for Rational {
    fn from(value: MultiPrecisionRational) -> Self {
        Rational::from_large(value)
    }
}

impl Display for Rational {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Rational::Natural(n, d) => {
                if *d == 1 {
                    write!(f, "{}", n)
                } else {
                    write!(f, "{}/{}", n, d)
                }
            }
            Rational::Large(r) => r.fmt(f),
        }
    }
}

impl Display for RationalField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ℚ")
    }
}

impl Ring for RationalField {
    type Element = Rational;

    fn add(&self, a: &Rational, b: &Rational) -> Rational {
        if let (Rational::Natural(n1, d1), Rational::Natural(n2, d2)) = (a, b) {
            let g = gcd_unsigned(*d1 as u64, *d2 as u64) as i64;
            if let Some(lcm) = d2.checked_mul(d1 / g) {
                if let Some(num2) = n2.checked_mul(lcm / d2) {
                    if let Some(num1) = n1.checked_mul(lcm / d1) {
                        if let Some(num) = num1.checked_add(num2) {
                            let g = gcd_signed(num, lcm) as i64;
                            return Rational::Natural(num / g, lcm / g);
                        }
                    }
                }
            }
        }

        Rational::from_large(a.to_multi_prec() + b.to_multi_prec())
    }

    fn sub(&self, a: &Rational, b: &Rational) -> Rational {
        self.add(a, &self.neg(b))
    }

    fn mul(&self, a: &Rational, b: &Rational) -> Rational {
        if let (Rational::Natural(n1, d1), Rational::Natural(n2, d2)) = (a, b) {
            let gcd1 = gcd_signed(*n1, *d2) as i64;
            let gcd2 = gcd_signed(*d1, *n2) as i64;

            if let Some(nn) = (n2 / gcd2).checked_mul(n1 / gcd1) {
                if let Some(nd) = (d1 / gcd2).checked_mul(d2 / gcd1) {
                    return Rational::Natural(nn, nd);
                }
            }
        }

        Rational::from_large(a.to_multi_prec() * b.to_multi_prec())
    }

    fn neg(&self, a: &Rational) -> Rational {
        match a {
            Rational::Natural(n, d) => {
                if let Some(neg) = n.checked_neg() {
                    Rational::Natural(neg, *d)
                } else {
                    Rational::Large(-MultiPrecisionRational::from((*n, *d)))
                }
            }
            Rational::Large(r) => Rational::from_large(MultiPrecisionRational::from(-r)),
        }
    }

    fn zero(&self) -> Rational {
        Rational::Natural(0, 1)
    }

    fn one(&self) -> Rational {
        Rational::Natural(1, 1)
    }

    /// Compare the reduced numerator and denominator, regardless of how
    /// the numbers are stored.
    fn is_equal(&self, a: &Rational, b: &Rational) -> bool {
        match (a, b) {
            (Rational::Natural(n1, d1), Rational::Natural(n2, d2)) => n1 == n2 && d1 == d2,
            _ => a.numerator() == b.numerator() && a.denominator() == b.denominator(),
        }
    }

    fn is_zero(&self, a: &Rational) -> bool {
        a.is_zero()
    }

    fn is_one(&self, a: &Rational) -> bool {
        a.is_one()
    }

    fn nth(&self, n: i64) -> Rational {
        n.into()
    }

    fn sample(&self, rng: &mut impl rand::RngCore, range: (i64, i64)) -> Rational {
        let num = rng.gen_range(range.0..range.1);
        let den = rng.gen_range(1..=8);
        Rational::new(num, den).unwrap_or_else(|_| num.into())
    }
}

impl Field for RationalField {
    fn try_inv(&self, a: &Rational) -> Result<Rational, FieldError> {
        if a.is_zero() {
            return Err(FieldError::NotInvertible);
        }

        Ok(match a {
            Rational::Natural(n, d) => {
                if *n < 0 {
                    if let Some(neg) = n.checked_neg() {
                        Rational::Natural(-d, neg)
                    } else {
                        Rational::Large(MultiPrecisionRational::from((*n, *d)).recip())
                    }
                } else {
                    Rational::Natural(*d, *n)
                }
            }
            Rational::Large(r) => Rational::from_large(r.clone().recip()),
        })
    }
}

/// The field of rational numbers backed by GMP, without a machine-word fast path.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct MultiPrecisionRationalField;

/// The field of multi-precision rational numbers.
pub const QQ: MultiPrecisionRationalField = MultiPrecisionRationalField;

/// Create the multi-precision fraction `num / den` in lowest terms.
pub fn multi_precision_rational(num: i64, den: i64) -> Result<MultiPrecisionRational, FieldError> {
    if den == 0 {
        Err(FieldError::ZeroDenominator)
    } else {
        Ok(MultiPrecisionRational::from((num, den)))
    }
}

impl Display for MultiPrecisionRationalField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ℚ")
    }
}

impl Ring for MultiPrecisionRationalField {
    type Element = MultiPrecisionRational;

    fn add(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        MultiPrecisionRational::from(a + b)
    }

    fn sub(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        MultiPrecisionRational::from(a - b)
    }

    fn mul(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        MultiPrecisionRational::from(a * b)
    }

    fn add_assign(&self, a: &mut Self::Element, b: &Self::Element) {
        *a += b;
    }

    fn mul_assign(&self, a: &mut Self::Element, b: &Self::Element) {
        *a *= b;
    }

    fn neg(&self, a: &Self::Element) -> Self::Element {
        MultiPrecisionRational::from(-a)
    }

    fn zero(&self) -> Self::Element {
        MultiPrecisionRational::new()
    }

    fn one(&self) -> Self::Element {
        MultiPrecisionRational::from(1)
    }

    fn is_zero(&self, a: &Self::Element) -> bool {
        *a.numer() == 0
    }

    fn is_one(&self, a: &Self::Element) -> bool {
        *a.numer() == 1 && *a.denom() == 1
    }

    fn nth(&self, n: i64) -> Self::Element {
        MultiPrecisionRational::from(n)
    }

    fn sample(&self, rng: &mut impl rand::RngCore, range: (i64, i64)) -> Self::Element {
        let num = rng.gen_range(range.0..range.1);
        let den = rng.gen_range(1..=8i64);
        MultiPrecisionRational::from((num, den))
    }
}

impl Field for MultiPrecisionRationalField {
    fn try_inv(&self, a: &Self::Element) -> Result<Self::Element, FieldError> {
        if self.is_zero(a) {
            Err(FieldError::NotInvertible)
        } else {
            Ok(a.clone().recip())
        }
    }
}

#[cfg(test)]
mod test {
    use rug::Rational as MultiPrecisionRational;

    use crate::domains::{Field, FieldError, Ring};

    use super::{multi_precision_rational, Rational, Q, QQ};

    #[test]
    fn construction() {
        assert_eq!(Rational::new(4, -6).unwrap(), Rational::Natural(-2, 3));
        assert_eq!(Rational::new(0, -6).unwrap(), Rational::Natural(0, 1));
        assert_eq!(Rational::new(1, 0), Err(FieldError::ZeroDenominator));
        assert_eq!(multi_precision_rational(3, 0), Err(FieldError::ZeroDenominator));
        assert_eq!(Rational::new(6, 3).unwrap().to_string(), "2");
        assert_eq!(Rational::new(-1, 3).unwrap().to_string(), "-1/3");
    }

    #[test]
    fn arithmetic() {
        let a = Rational::new(1, 6).unwrap();
        let b = Rational::new(1, 3).unwrap();

        assert_eq!(Q.add(&a, &b), Rational::new(1, 2).unwrap());
        assert_eq!(Q.sub(&a, &b), Rational::new(-1, 6).unwrap());
        assert_eq!(Q.mul(&a, &b), Rational::new(1, 18).unwrap());
        assert_eq!(Q.div(&a, &b), Rational::new(1, 2).unwrap());
        assert_eq!(Q.inv(&Rational::new(-2, 5).unwrap()), Rational::new(-5, 2).unwrap());
        assert_eq!(Q.add(&a, &Q.neg(&a)), Q.zero());
    }

    #[test]
    fn overflow() {
        let big = Rational::from(i64::MAX);
        let sum = Q.add(&big, &big);
        assert!(matches!(sum, Rational::Large(_)));
        assert_eq!(sum.numerator(), rug::Integer::from(i64::MAX) * 2);

        // going back into range demotes the number
        let back = Q.sub(&sum, &big);
        assert_eq!(back, big);

        let min = Rational::from(i64::MIN);
        let neg = Q.neg(&min);
        assert!(Q.is_equal(&Q.add(&neg, &min), &Q.zero()));
        assert_eq!(Q.inv(&Q.inv(&min)), min);
    }

    #[test]
    fn cross_representation_equality() {
        let natural = Rational::Natural(3, 4);
        let large = Rational::Large(MultiPrecisionRational::from((3, 4)));
        assert_ne!(natural, large);
        assert!(Q.is_equal(&natural, &large));
    }

    #[test]
    fn multi_precision() {
        let a = multi_precision_rational(2, 4).unwrap();
        assert_eq!(a, MultiPrecisionRational::from((1, 2)));
        assert_eq!(QQ.add(&a, &a), QQ.one());
        assert_eq!(QQ.mul(&a, &QQ.inv(&a)), QQ.one());
        assert_eq!(QQ.try_inv(&QQ.zero()), Err(FieldError::NotInvertible));
        assert_eq!(QQ.exp(&a, -3), QQ.nth(8));
    }
}
