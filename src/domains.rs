//! Defines the algebraic traits that matrices are generic over.
//!
//! The core trait is [Ring], which has two binary operations, addition and multiplication.
//! Each ring has an associated element type, that should not be confused with the ring type itself.
//! For example:
//! - The reals [REALS](float::REALS) have elements of type [f64].
//! - The rational numbers [Q](rational::Q) have elements of type [Rational](rational::Rational).
//! - The multi-precision rationals [QQ](rational::QQ) have elements of type [rug::Rational].
//! - A prime field [FiniteField](finite_field::FiniteField) has elements of type [FiniteFieldElement](finite_field::FiniteFieldElement).
//!
//! The ring elements do not implement operations such as addition or multiplication,
//! but rather the ring itself does. A ring is a cheap, stateless descriptor that
//! can be cloned and shared freely between matrices.
//!
//! The [`Field`] trait extends [`Ring`] with inversion and division.
pub mod finite_field;
pub mod float;
pub mod integer;
pub mod rational;

use std::fmt::{Debug, Display};

/// Errors raised while constructing a field or one of its elements, or when
/// asking for the inverse of zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldError {
    /// The multiplicative inverse of the additive identity was requested.
    NotInvertible,
    /// A fraction was constructed with a zero denominator.
    ZeroDenominator,
    /// A prime field was requested for a modulus that is not prime.
    NotPrime(u64),
}

impl Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldError::NotInvertible => write!(f, "Cannot invert zero"),
            FieldError::ZeroDenominator => write!(f, "The denominator of a fraction cannot be zero"),
            FieldError::NotPrime(p) => {
                write!(f, "{} is not a prime, so Z/{}Z is not a field", p, p)
            }
        }
    }
}

impl std::error::Error for FieldError {}

/// A ring is a set with two binary operations, addition and multiplication.
///
/// Only the primitive operations need to be implemented: subtraction, sums, products
/// and powers are derived from them.
pub trait Ring: Clone + PartialEq + Debug + Display {
    /// The element of a ring. For example, the elements of [Q](rational::Q) are [Rational](rational::Rational).
    type Element: Clone + PartialEq + Debug + Display;

    fn add(&self, a: &Self::Element, b: &Self::Element) -> Self::Element;
    fn mul(&self, a: &Self::Element, b: &Self::Element) -> Self::Element;
    /// The additive inverse of `a`.
    fn neg(&self, a: &Self::Element) -> Self::Element;
    fn zero(&self) -> Self::Element;
    fn one(&self) -> Self::Element;

    /// Check if two elements are equal. Override this when the structural
    /// equality of the element type does not coincide with equality in the ring.
    fn is_equal(&self, a: &Self::Element, b: &Self::Element) -> bool {
        a == b
    }

    fn sub(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        self.add(a, &self.neg(b))
    }

    fn add_assign(&self, a: &mut Self::Element, b: &Self::Element) {
        *a = self.add(a, b);
    }

    fn sub_assign(&self, a: &mut Self::Element, b: &Self::Element) {
        *a = self.sub(a, b);
    }

    fn mul_assign(&self, a: &mut Self::Element, b: &Self::Element) {
        *a = self.mul(a, b);
    }

    /// Compute `a += b * c`.
    fn add_mul_assign(&self, a: &mut Self::Element, b: &Self::Element, c: &Self::Element) {
        self.add_assign(a, &self.mul(b, c));
    }

    fn is_zero(&self, a: &Self::Element) -> bool {
        self.is_equal(a, &self.zero())
    }

    fn is_one(&self, a: &Self::Element) -> bool {
        self.is_equal(a, &self.one())
    }

    /// Return the nth element by computing `n * 1`.
    fn nth(&self, n: i64) -> Self::Element {
        let r = self.pow_add(&self.one(), n.unsigned_abs());
        if n < 0 {
            self.neg(&r)
        } else {
            r
        }
    }

    /// Compute `b^e` by repeated squaring.
    fn pow(&self, b: &Self::Element, mut e: u64) -> Self::Element {
        let mut res = self.one();
        let mut base = b.clone();
        while e > 0 {
            if e & 1 == 1 {
                self.mul_assign(&mut res, &base);
            }
            e >>= 1;
            if e > 0 {
                base = self.mul(&base, &base);
            }
        }
        res
    }

    /// Sum all elements, starting from zero.
    fn sum<'a, I: IntoIterator<Item = &'a Self::Element>>(&self, elements: I) -> Self::Element
    where
        Self::Element: 'a,
    {
        elements
            .into_iter()
            .fold(self.zero(), |acc, e| self.add(&acc, e))
    }

    /// Multiply all elements, starting from one.
    fn product<'a, I: IntoIterator<Item = &'a Self::Element>>(&self, elements: I) -> Self::Element
    where
        Self::Element: 'a,
    {
        elements
            .into_iter()
            .fold(self.one(), |acc, e| self.mul(&acc, e))
    }

    /// Sample an element whose integer part lies in `range`.
    fn sample(&self, rng: &mut impl rand::RngCore, range: (i64, i64)) -> Self::Element;

    /// Compute `n * a` by doubling.
    #[doc(hidden)]
    fn pow_add(&self, a: &Self::Element, mut n: u64) -> Self::Element {
        let mut res = self.zero();
        let mut base = a.clone();
        while n > 0 {
            if n & 1 == 1 {
                self.add_assign(&mut res, &base);
            }
            n >>= 1;
            if n > 0 {
                base = self.add(&base, &base);
            }
        }
        res
    }
}

/// A field is a ring that supports division and inversion of all non-zero elements.
pub trait Field: Ring {
    /// The multiplicative inverse of `a`, which fails if `a` is zero.
    fn try_inv(&self, a: &Self::Element) -> Result<Self::Element, FieldError>;

    /// The multiplicative inverse of `a`.
    ///
    /// # Panics
    ///
    /// Panics with [FieldError::NotInvertible] if `a` is zero.
    fn inv(&self, a: &Self::Element) -> Self::Element {
        match self.try_inv(a) {
            Ok(r) => r,
            Err(e) => panic!("{}: {}", e, a),
        }
    }

    /// Compute `a / b`, which fails if `b` is zero.
    fn try_div(&self, a: &Self::Element, b: &Self::Element) -> Result<Self::Element, FieldError> {
        Ok(self.mul(a, &self.try_inv(b)?))
    }

    /// Compute `a / b`.
    ///
    /// # Panics
    ///
    /// Panics if `b` is zero.
    fn div(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        self.mul(a, &self.inv(b))
    }

    fn div_assign(&self, a: &mut Self::Element, b: &Self::Element) {
        *a = self.div(a, b);
    }

    /// Raise `b` to an integer power. Negative powers invert `b` first,
    /// which fails if `b` is zero.
    fn try_exp(&self, b: &Self::Element, e: i64) -> Result<Self::Element, FieldError> {
        if e >= 0 {
            Ok(self.pow(b, e as u64))
        } else {
            Ok(self.pow(&self.try_inv(b)?, e.unsigned_abs()))
        }
    }

    /// Raise `b` to an integer power.
    ///
    /// # Panics
    ///
    /// Panics if `e` is negative and `b` is zero.
    fn exp(&self, b: &Self::Element, e: i64) -> Self::Element {
        match self.try_exp(b, e) {
            Ok(r) => r,
            Err(err) => panic!("{}: {}^{}", err, b, e),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{
        finite_field::FiniteField,
        rational::{Rational, Q},
        Field, FieldError, Ring,
    };

    #[test]
    fn derived_operations() {
        let f = FiniteField::new(11).unwrap();
        let a = f.to_element(3);
        let b = f.to_element(5);

        assert_eq!(f.sub(&a, &b), f.to_element(9));
        assert_eq!(f.div(&a, &b), f.to_element(5));
        assert_eq!(f.sum([&a, &b, &b]), f.to_element(2));
        assert_eq!(f.product([&a, &b, &b]), f.to_element(9));
        assert_eq!(f.sum(std::iter::empty()), f.zero());
        assert_eq!(f.product(std::iter::empty()), f.one());
        assert_eq!(f.nth(-1), f.to_element(10));
    }

    #[test]
    fn exponentiation() {
        let two = Q.nth(2);
        assert_eq!(Q.exp(&two, 0), Q.one());
        assert_eq!(Q.exp(&two, 10), Q.nth(1024));
        assert_eq!(Q.exp(&two, -3), Rational::new(1, 8).unwrap());
        assert_eq!(Q.try_exp(&Q.zero(), -1), Err(FieldError::NotInvertible));
        assert_eq!(Q.exp(&Q.zero(), 0), Q.one());
    }

    #[test]
    #[should_panic(expected = "Cannot invert zero")]
    fn invert_zero() {
        Q.inv(&Q.zero());
    }
}
