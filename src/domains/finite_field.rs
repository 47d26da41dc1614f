//! Prime fields `Z/pZ`.

use std::fmt::{Display, Formatter};

use rand::Rng;

use super::{
    integer::{extended_gcd, is_prime_u64},
    Field, FieldError, Ring,
};

/// A number in a finite field, stored in standard form `[0,p)`.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct FiniteFieldElement(pub(crate) u64);

impl Display for FiniteFieldElement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The field `Z/pZ` for a prime `p` that fits in a `u64`.
///
/// Construction verifies that `p` is prime, so every non-zero element
/// has an inverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FiniteField {
    p: u64,
}

/// A prime field.
pub type Zp = FiniteField;

impl FiniteField {
    /// Create a new prime field. Fails if `p` is not a prime.
    pub fn new(p: u64) -> Result<FiniteField, FieldError> {
        if !is_prime_u64(p) {
            return Err(FieldError::NotPrime(p));
        }

        Ok(FiniteField { p })
    }

    pub fn get_prime(&self) -> u64 {
        self.p
    }

    /// Convert a number to its representative in the prime field.
    #[inline]
    pub fn to_element(&self, a: u64) -> FiniteFieldElement {
        FiniteFieldElement(a % self.p)
    }

    /// Convert a signed number to its representative in the prime field.
    #[inline]
    pub fn to_element_signed(&self, a: i64) -> FiniteFieldElement {
        FiniteFieldElement((a as i128).rem_euclid(self.p as i128) as u64)
    }

    /// Convert a number from the finite field to standard form `[0,p)`.
    #[inline]
    pub fn from_element(&self, a: &FiniteFieldElement) -> u64 {
        a.0
    }

    /// Convert a number from the finite field to symmetric form `[-p/2,p/2]`.
    pub fn to_symmetric_integer(&self, a: &FiniteFieldElement) -> i128 {
        if a.0 as u128 * 2 > self.p as u128 {
            a.0 as i128 - self.p as i128
        } else {
            a.0 as i128
        }
    }
}

impl Display for FiniteField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Z/{}Z", self.p)
    }
}

impl Ring for FiniteField {
    type Element = FiniteFieldElement;

    #[inline]
    fn add(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        let t = a.0 as u128 + b.0 as u128;
        if t >= self.p as u128 {
            FiniteFieldElement((t - self.p as u128) as u64)
        } else {
            FiniteFieldElement(t as u64)
        }
    }

    #[inline]
    fn sub(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        if a.0 >= b.0 {
            FiniteFieldElement(a.0 - b.0)
        } else {
            FiniteFieldElement(a.0 + (self.p - b.0))
        }
    }

    #[inline]
    fn mul(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        FiniteFieldElement(((a.0 as u128 * b.0 as u128) % self.p as u128) as u64)
    }

    /// Computes -x mod n.
    #[inline]
    fn neg(&self, a: &Self::Element) -> Self::Element {
        if a.0 == 0 {
            *a
        } else {
            FiniteFieldElement(self.p - a.0)
        }
    }

    #[inline]
    fn zero(&self) -> Self::Element {
        FiniteFieldElement(0)
    }

    #[inline]
    fn one(&self) -> Self::Element {
        FiniteFieldElement(1)
    }

    #[inline]
    fn is_zero(&self, a: &Self::Element) -> bool {
        a.0 == 0
    }

    #[inline]
    fn is_one(&self, a: &Self::Element) -> bool {
        a.0 == 1
    }

    fn nth(&self, n: i64) -> Self::Element {
        self.to_element_signed(n)
    }

    fn sample(&self, rng: &mut impl rand::RngCore, range: (i64, i64)) -> Self::Element {
        self.to_element_signed(rng.gen_range(range.0..range.1))
    }
}

impl Field for FiniteField {
    /// Solve `a * s + p * t = 1` for the Bézout coefficient `s`.
    fn try_inv(&self, a: &Self::Element) -> Result<Self::Element, FieldError> {
        if a.0 == 0 {
            return Err(FieldError::NotInvertible);
        }

        let (g, s, _) = extended_gcd(a.0 as i128, self.p as i128);
        // p is prime, so this can only fail for elements that are not in standard form
        if g != 1 {
            return Err(FieldError::NotInvertible);
        }

        Ok(FiniteFieldElement(s.rem_euclid(self.p as i128) as u64))
    }
}

#[cfg(test)]
mod test {
    use crate::domains::{Field, FieldError, Ring};

    use super::FiniteField;

    #[test]
    fn construction() {
        assert!(FiniteField::new(11).is_ok());
        assert!(FiniteField::new(2).is_ok());
        assert_eq!(FiniteField::new(12), Err(FieldError::NotPrime(12)));
        assert_eq!(FiniteField::new(1), Err(FieldError::NotPrime(1)));
        assert_eq!(FiniteField::new(0), Err(FieldError::NotPrime(0)));
    }

    #[test]
    fn inverse() {
        let f = FiniteField::new(11).unwrap();
        for i in 1..11 {
            let a = f.to_element(i);
            assert_eq!(f.mul(&a, &f.inv(&a)), f.one());
        }
        assert_eq!(f.inv(&f.to_element(3)), f.to_element(4));
        assert_eq!(f.try_inv(&f.zero()), Err(FieldError::NotInvertible));
    }

    #[test]
    fn large_prime() {
        let f = FiniteField::new(18446744073709551557).unwrap();
        let a = f.to_element(u64::MAX);
        let b = f.add(&a, &a);
        assert_eq!(f.sub(&b, &a), a);
        assert_eq!(f.mul(&a, &f.inv(&a)), f.one());
        assert_eq!(f.to_element_signed(-1), f.neg(&f.one()));
        assert_eq!(f.to_symmetric_integer(&f.neg(&f.one())), -1);
    }
}
