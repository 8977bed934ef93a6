//! CRT (Chinese Remainder Theorem) helpers for the RNS representation.

/// Compute a modular inverse using extended Euclidean algorithm.
///
/// Returns `None` when `a` is not invertible modulo `modulus`.
pub fn mod_inverse(a: u64, modulus: u64) -> Option<u64> {
    let mut t: i128 = 0;
    let mut new_t: i128 = 1;
    let mut r: i128 = modulus as i128;
    let mut new_r: i128 = (a % modulus) as i128;

    while new_r != 0 {
        let quotient = r / new_r;
        (t, new_t) = (new_t, t - quotient * new_t);
        (r, new_r) = (new_r, r - quotient * new_r);
    }

    if r != 1 {
        return None;
    }
    Some(t.rem_euclid(modulus as i128) as u64)
}

/// Compute the product of moduli (composite modulus).
///
/// Callers guarantee the product fits in 64 bits.
pub fn crt_modulus(moduli: &[u64]) -> u64 {
    moduli.iter().product()
}

/// Precomputed Garner constants for composing residues into Z_Q.
#[derive(Clone, Debug)]
pub struct CrtComposer {
    moduli: Vec<u64>,
    /// inv[i] = (q_0 ... q_{i-1})^{-1} mod q_i
    inv: Vec<u64>,
    modulus: u64,
}

impl CrtComposer {
    /// Returns `None` if the moduli are not pairwise coprime.
    pub fn new(moduli: &[u64]) -> Option<Self> {
        let mut inv = Vec::with_capacity(moduli.len());
        for (i, &qi) in moduli.iter().enumerate() {
            let prefix = moduli[..i]
                .iter()
                .fold(1u128, |acc, &m| acc * m as u128 % qi as u128) as u64;
            inv.push(mod_inverse(prefix, qi)?);
        }
        Some(Self {
            moduli: moduli.to_vec(),
            inv,
            modulus: crt_modulus(moduli),
        })
    }

    /// Composite modulus Q.
    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    /// Recombine one residue per modulus into the unique value in [0, Q).
    ///
    /// Garner's mixed-radix form:
    ///   x = a0 + q0 * (t1 + q1 * (t2 + ...))
    pub fn compose(&self, residues: &[u64]) -> u64 {
        debug_assert_eq!(residues.len(), self.moduli.len());

        let mut x: u64 = 0;
        let mut radix: u64 = 1;
        for (i, (&qi, &ai)) in self.moduli.iter().zip(residues).enumerate() {
            let x_mod_qi = x % qi;
            let diff = if ai >= x_mod_qi {
                ai - x_mod_qi
            } else {
                ai + qi - x_mod_qi
            };
            let t = (diff as u128 * self.inv[i] as u128 % qi as u128) as u64;
            x += radix * t;
            radix = radix.wrapping_mul(qi);
        }
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const Q0: u64 = 1073692673;
    const Q1: u64 = 1073643521;

    #[test]
    fn test_mod_inverse() {
        let inv = mod_inverse(12345, Q0).unwrap();
        assert_eq!((12345u128 * inv as u128 % Q0 as u128) as u64, 1);
        assert!(mod_inverse(6, 9).is_none());
    }

    #[test]
    fn test_compose_recovers_value() {
        let composer = CrtComposer::new(&[Q0, Q1]).unwrap();
        let q = composer.modulus();
        for x in [0u64, 1, 42, Q0, Q0 + 7, q / 2, q - 1] {
            assert_eq!(composer.compose(&[x % Q0, x % Q1]), x);
        }
    }

    #[test]
    fn test_single_modulus_is_identity() {
        let composer = CrtComposer::new(&[Q0]).unwrap();
        assert_eq!(composer.compose(&[123]), 123);
    }
}
