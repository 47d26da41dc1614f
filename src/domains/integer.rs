//! Integer helpers used by the rational and finite field domains.

pub fn gcd_unsigned(mut a: u64, mut b: u64) -> u64 {
    let mut c;
    while a != 0 {
        c = a;
        a = b % a;
        b = c;
    }
    b
}

pub fn gcd_signed(mut a: i64, mut b: i64) -> u64 {
    let mut c;
    while a != 0 {
        c = a;
        // only wraps when i64::MIN % -1 and that still yields 0
        a = b.wrapping_rem(a);
        b = c;
    }
    b.unsigned_abs()
}

/// Compute `(g, s, t)` such that `a * s + b * t = g = gcd(a, b)`.
pub fn extended_gcd(a: i128, b: i128) -> (i128, i128, i128) {
    let (mut old_r, mut r) = (a, b);
    let (mut old_s, mut s) = (1i128, 0i128);
    let (mut old_t, mut t) = (0i128, 1i128);

    while r != 0 {
        let q = old_r / r;
        (old_r, r) = (r, old_r - q * r);
        (old_s, s) = (s, old_s - q * s);
        (old_t, t) = (t, old_t - q * t);
    }

    if old_r < 0 {
        (-old_r, -old_s, -old_t)
    } else {
        (old_r, old_s, old_t)
    }
}

#[inline(always)]
fn mul_mod(a: u64, b: u64, n: u64) -> u64 {
    ((a as u128 * b as u128) % n as u128) as u64
}

fn pow_mod(mut b: u64, mut e: u64, n: u64) -> u64 {
    let mut r = 1 % n;
    b %= n;
    while e > 0 {
        if e & 1 == 1 {
            r = mul_mod(r, b, n);
        }
        b = mul_mod(b, b, n);
        e >>= 1;
    }
    r
}

/// Do a deterministic Miller test to check if `n` is a prime.
/// Since `n` is a `u64`, a basis of only 7 witnesses has to be tested.
pub fn is_prime_u64(n: u64) -> bool {
    // shortest SPRP basis from Jim Sinclair for testing primality of u64
    const WITNESSES: [u64; 7] = [2, 325, 9375, 28178, 450775, 9780504, 1795265022];

    if n < 2 {
        return false;
    }

    if n % 2 == 0 {
        return n == 2;
    }

    let mut s = 0;
    let mut d = n - 1;
    while d % 2 == 0 {
        d /= 2;
        s += 1;
    }

    'test: for a in WITNESSES {
        let a = a % n;
        if a == 0 {
            continue;
        }

        let mut x = pow_mod(a, d, n);
        if x == 1 || x == n - 1 {
            continue;
        }

        for _ in 1..s {
            x = mul_mod(x, x, n);
            if x == n - 1 {
                continue 'test;
            }
            if x == 1 {
                return false;
            }
        }

        return false;
    }

    true
}

#[cfg(test)]
mod test {
    use super::{extended_gcd, gcd_signed, gcd_unsigned, is_prime_u64};

    #[test]
    fn gcd() {
        assert_eq!(gcd_unsigned(12, 18), 6);
        assert_eq!(gcd_unsigned(0, 7), 7);
        assert_eq!(gcd_signed(-12, 18), 6);
        assert_eq!(gcd_signed(i64::MIN, -1), 1);

        let (g, s, t) = extended_gcd(240, 46);
        assert_eq!(g, 2);
        assert_eq!(240 * s + 46 * t, 2);
    }

    #[test]
    fn primality() {
        let primes: Vec<u64> = (0..60).filter(|n| is_prime_u64(*n)).collect();
        assert_eq!(
            primes,
            vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59]
        );

        assert!(is_prime_u64(2147483659));
        assert!(is_prime_u64(18446744073709551557));
        assert!(!is_prime_u64(3215031751)); // strong pseudoprime to bases 2, 3, 5, 7
        assert!(!is_prime_u64(561));
    }
}
