//! Scalar arithmetic over Z_q for word-sized moduli

/// Modular arithmetic helpers over Z_q, q < 2^63
pub struct ModQ;

impl ModQ {
    #[inline]
    pub fn add(a: u64, b: u64, q: u64) -> u64 {
        let sum = a + b;
        if sum >= q {
            sum - q
        } else {
            sum
        }
    }

    #[inline]
    pub fn sub(a: u64, b: u64, q: u64) -> u64 {
        if a >= b {
            a - b
        } else {
            q - b + a
        }
    }

    #[inline]
    pub fn mul(a: u64, b: u64, q: u64) -> u64 {
        ((a as u128 * b as u128) % q as u128) as u64
    }

    #[inline]
    pub fn negate(a: u64, q: u64) -> u64 {
        if a == 0 {
            0
        } else {
            q - a
        }
    }

    /// Map a signed integer into [0, q)
    #[inline]
    pub fn from_signed(val: i64, q: u64) -> u64 {
        let r = (val as i128).rem_euclid(q as i128);
        r as u64
    }

    /// Centered representative in (-q/2, q/2]
    #[inline]
    pub fn to_signed(val: u64, q: u64) -> i64 {
        if val <= q / 2 {
            val as i64
        } else {
            -((q - val) as i64)
        }
    }

    /// base^exp mod q by square-and-multiply
    pub fn pow(base: u64, mut exp: u64, q: u64) -> u64 {
        let mut result = 1u64 % q;
        let mut base = base % q;
        while exp > 0 {
            if exp & 1 == 1 {
                result = Self::mul(result, base, q);
            }
            base = Self::mul(base, base, q);
            exp >>= 1;
        }
        result
    }

    /// Deterministic Miller-Rabin for all 64-bit inputs.
    pub fn is_prime(n: u64) -> bool {
        const WITNESSES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

        if n < 2 {
            return false;
        }
        for &p in &WITNESSES {
            if n % p == 0 {
                return n == p;
            }
        }

        let mut d = n - 1;
        let mut s = 0;
        while d % 2 == 0 {
            d /= 2;
            s += 1;
        }

        'witness: for &a in &WITNESSES {
            let mut x = Self::pow(a, d, n);
            if x == 1 || x == n - 1 {
                continue;
            }
            for _ in 1..s {
                x = Self::mul(x, x, n);
                if x == n - 1 {
                    continue 'witness;
                }
            }
            return false;
        }
        true
    }
}
