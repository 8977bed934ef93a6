//! Number-Theoretic Transform (NTT) for fast polynomial multiplication.
//!
//! Cooley-Tukey forward / Gentleman-Sande inverse transforms for negacyclic
//! convolution over Z_q[X]/(X^n + 1), one independent transform per RNS limb.
//!
//! Values leave `forward` in Montgomery form and stay there until `inverse`.
//! Output position `j` of the forward transform holds the evaluation
//! a(ψ^(2·brv(j) + 1)), where brv is the log2(n)-bit reversal. The batch
//! encoder relies on this ordering to place slots.
//!
//! # Example
//!
//! ```
//! use hescore::math::ntt::NttContext;
//!
//! let ctx = NttContext::with_moduli(256, &[1073738753]);
//!
//! let mut coeffs = vec![1u64; 256];
//! ctx.forward(&mut coeffs);
//! ctx.inverse(&mut coeffs);
//! assert_eq!(coeffs[0], 1);
//! ```

use super::modular::ModQ;

/// Precomputed NTT context with twiddle factors.
///
/// Stores roots of unity and Montgomery constants for every modulus of an
/// RNS basis. Coefficient slices are limb-major: limb `i` occupies
/// `[i * n, (i + 1) * n)`.
///
/// # Fields
///
/// * `n` - Ring dimension
/// * `moduli` - RNS moduli, each ≡ 1 (mod 2n)
/// * `psi_powers` / `psi_inv_powers` - Per-limb twiddle tables
/// * `n_inv` - n^(-1) per limb for inverse scaling
///
/// # Example
///
/// ```
/// use hescore::math::NttContext;
///
/// let ctx = NttContext::with_moduli(1024, &[1073738753, 1073732609]);
/// assert_eq!(ctx.dimension(), 1024);
/// assert_eq!(ctx.crt_count(), 2);
/// ```
#[derive(Clone)]
pub struct NttContext {
    /// Ring dimension (power of two).
    n: usize,
    /// RNS moduli.
    moduli: Vec<u64>,
    /// -q^(-1) mod 2^64 per modulus.
    q_inv_neg: Vec<u64>,
    /// 2^128 mod q per modulus.
    r_squared: Vec<u64>,
    /// Forward twiddle factors (powers of ψ where ψ^n = -1).
    psi_powers: Vec<Vec<u64>>,
    /// Inverse twiddle factors (powers of ψ^(-1)).
    psi_inv_powers: Vec<Vec<u64>>,
    /// n^(-1) mod q in Montgomery form.
    n_inv: Vec<u64>,
}

impl NttContext {
    /// Creates an NTT context for a set of moduli.
    ///
    /// # Arguments
    ///
    /// * `n` - Ring dimension (power of two)
    /// * `moduli` - RNS moduli (each must satisfy q ≡ 1 (mod 2n))
    ///
    /// # Panics
    ///
    /// Panics if `n` is not a power of two, or a modulus is not ≡ 1 (mod 2n).
    /// Parameter validation rejects both before a context is built.
    pub fn with_moduli(n: usize, moduli: &[u64]) -> Self {
        assert!(n.is_power_of_two(), "n must be a power of two");
        assert!(!moduli.is_empty(), "moduli must be non-empty");

        let mut q_inv_neg = Vec::with_capacity(moduli.len());
        let mut r_squared = Vec::with_capacity(moduli.len());
        let mut psi_powers = Vec::with_capacity(moduli.len());
        let mut psi_inv_powers = Vec::with_capacity(moduli.len());
        let mut n_inv = Vec::with_capacity(moduli.len());

        for &q in moduli {
            assert!(q % (2 * n as u64) == 1, "q must be ≡ 1 (mod 2n)");

            let q_inv = Self::compute_q_inv_neg(q);
            let r2 = Self::compute_r_squared(q);

            let psi = Self::find_primitive_root(2 * n as u64, q);
            let psi_mont = Self::to_montgomery(psi, q, r2, q_inv);
            psi_powers.push(Self::compute_twiddle_factors(n, psi_mont, q, q_inv, r2));

            let psi_inv = ModQ::pow(psi, q - 2, q);
            let psi_inv_mont = Self::to_montgomery(psi_inv, q, r2, q_inv);
            psi_inv_powers.push(Self::compute_twiddle_factors(n, psi_inv_mont, q, q_inv, r2));

            let n_inv_val = ModQ::pow(n as u64, q - 2, q);
            n_inv.push(Self::to_montgomery(n_inv_val, q, r2, q_inv));

            q_inv_neg.push(q_inv);
            r_squared.push(r2);
        }

        Self {
            n,
            moduli: moduli.to_vec(),
            q_inv_neg,
            r_squared,
            psi_powers,
            psi_inv_powers,
            n_inv,
        }
    }

    /// Returns the ring dimension.
    pub fn dimension(&self) -> usize {
        self.n
    }

    /// Returns the RNS moduli.
    pub fn moduli(&self) -> &[u64] {
        &self.moduli
    }

    /// Number of RNS limbs.
    pub fn crt_count(&self) -> usize {
        self.moduli.len()
    }

    /// Performs forward NTT in-place.
    ///
    /// Input coefficients are converted to Montgomery form first.
    ///
    /// # Arguments
    ///
    /// * `coeffs` - Limb-major residues (modified in-place)
    ///
    /// # Panics
    ///
    /// Panics if `coeffs.len() != n * crt_count`.
    pub fn forward(&self, coeffs: &mut [u64]) {
        self.check_len(coeffs.len());

        for idx in 0..self.crt_count() {
            let limb = &mut coeffs[idx * self.n..(idx + 1) * self.n];
            for c in limb.iter_mut() {
                *c = self.to_mont_at(*c, idx);
            }
            self.forward_inplace_at(limb, idx);
        }
    }

    fn forward_inplace_at(&self, coeffs: &mut [u64], idx: usize) {
        let n = self.n;
        let q = self.moduli[idx];
        let psi_powers = &self.psi_powers[idx];

        let mut t = n;
        let mut m = 1;

        while m < n {
            t >>= 1;
            for i in 0..m {
                let j1 = 2 * i * t;
                let w = psi_powers[m + i];

                for j in j1..j1 + t {
                    let u = coeffs[j];
                    let v = self.montgomery_mul_at(coeffs[j + t], w, idx);

                    coeffs[j] = ModQ::add(u, v, q);
                    coeffs[j + t] = ModQ::sub(u, v, q);
                }
            }
            m <<= 1;
        }
    }

    /// Performs inverse NTT in-place.
    ///
    /// Output is converted out of Montgomery form.
    ///
    /// # Arguments
    ///
    /// * `coeffs` - Limb-major NTT-domain values (modified in-place)
    ///
    /// # Panics
    ///
    /// Panics if `coeffs.len() != n * crt_count`.
    pub fn inverse(&self, coeffs: &mut [u64]) {
        self.check_len(coeffs.len());

        for idx in 0..self.crt_count() {
            let limb = &mut coeffs[idx * self.n..(idx + 1) * self.n];
            self.inverse_inplace_at(limb, idx);
            for c in limb.iter_mut() {
                *c = self.from_mont_at(*c, idx);
            }
        }
    }

    fn inverse_inplace_at(&self, coeffs: &mut [u64], idx: usize) {
        let n = self.n;
        let q = self.moduli[idx];
        let psi_inv_powers = &self.psi_inv_powers[idx];

        let mut t = 1;
        let mut m = n;

        while m > 1 {
            m >>= 1;
            for i in 0..m {
                let j1 = i * 2 * t;
                let w = psi_inv_powers[m + i];

                for j in j1..j1 + t {
                    let u = coeffs[j];
                    let v = coeffs[j + t];

                    coeffs[j] = ModQ::add(u, v, q);
                    coeffs[j + t] = self.montgomery_mul_at(ModQ::sub(u, v, q), w, idx);
                }
            }
            t <<= 1;
        }

        for c in coeffs.iter_mut() {
            *c = self.montgomery_mul_at(*c, self.n_inv[idx], idx);
        }
    }

    /// Pointwise product of two NTT-domain operands, written to `result`.
    ///
    /// Inputs and output are in Montgomery form.
    ///
    /// # Example
    ///
    /// ```
    /// use hescore::math::NttContext;
    ///
    /// let ctx = NttContext::with_moduli(16, &[97]);
    /// let mut a = vec![0u64; 16];
    /// let mut b = vec![0u64; 16];
    /// a[1] = 5; // 5X
    /// b[15] = 3; // 3X^15
    /// ctx.forward(&mut a);
    /// ctx.forward(&mut b);
    ///
    /// let mut product = vec![0u64; 16];
    /// ctx.pointwise_mul(&a, &b, &mut product);
    /// ctx.inverse(&mut product);
    ///
    /// // 15 X^16 = -15 in Z_97[X]/(X^16 + 1)
    /// assert_eq!(product[0], 97 - 15);
    /// ```
    pub fn pointwise_mul(&self, a: &[u64], b: &[u64], result: &mut [u64]) {
        self.check_len(a.len());
        self.check_len(b.len());
        self.check_len(result.len());

        for idx in 0..self.crt_count() {
            let start = idx * self.n;
            for i in start..start + self.n {
                result[i] = self.montgomery_mul_at(a[i], b[i], idx);
            }
        }
    }

    /// Converts a value for limb `idx` into Montgomery form.
    #[inline]
    pub fn to_mont_at(&self, a: u64, idx: usize) -> u64 {
        Self::to_montgomery(
            a,
            self.moduli[idx],
            self.r_squared[idx],
            self.q_inv_neg[idx],
        )
    }

    /// Converts a value for limb `idx` out of Montgomery form.
    #[inline]
    pub fn from_mont_at(&self, a: u64, idx: usize) -> u64 {
        self.montgomery_mul_at(a, 1, idx)
    }

    fn check_len(&self, len: usize) {
        assert_eq!(
            len,
            self.n * self.crt_count(),
            "Input length must match dimension * crt_count"
        );
    }

    #[inline]
    fn montgomery_mul_at(&self, a: u64, b: u64, idx: usize) -> u64 {
        Self::redc(
            (a as u128) * (b as u128),
            self.moduli[idx],
            self.q_inv_neg[idx],
        )
    }

    #[inline]
    fn redc(ab: u128, q: u64, q_inv_neg: u64) -> u64 {
        let m = ((ab as u64).wrapping_mul(q_inv_neg)) as u128;
        let t = ((ab + m * (q as u128)) >> 64) as u64;
        if t >= q {
            t - q
        } else {
            t
        }
    }

    fn to_montgomery(a: u64, q: u64, r_squared: u64, q_inv_neg: u64) -> u64 {
        Self::redc((a as u128) * (r_squared as u128), q, q_inv_neg)
    }

    fn compute_q_inv_neg(q: u64) -> u64 {
        let mut y: u64 = 1;
        for i in 1..64 {
            let yi = y.wrapping_mul(q) & (1u64 << i);
            y |= yi;
        }
        y.wrapping_neg()
    }

    fn compute_r_squared(q: u64) -> u64 {
        let r_mod_q = (1u128 << 64) % (q as u128);
        ((r_mod_q * r_mod_q) % (q as u128)) as u64
    }

    /// Primitive `order`-th root of unity modulo q, `order` a power of two.
    fn find_primitive_root(order: u64, q: u64) -> u64 {
        let exp = (q - 1) / order;
        (2..q)
            .map(|g| ModQ::pow(g, exp, q))
            .find(|&candidate| ModQ::pow(candidate, order / 2, q) != 1)
            .unwrap_or_else(|| panic!("no primitive {order}-th root of unity mod {q}"))
    }

    /// Twiddle table indexed the way the butterflies walk it.
    fn compute_twiddle_factors(
        n: usize,
        psi: u64,
        q: u64,
        q_inv_neg: u64,
        r_squared: u64,
    ) -> Vec<u64> {
        let one = Self::to_montgomery(1, q, r_squared, q_inv_neg);
        let mut factors = vec![0u64; n];
        factors[1] = one;

        for m in 1..n {
            if m.is_power_of_two() {
                // ψ^(n / (2m))
                let mut pow = one;
                for _ in 0..n / (2 * m) {
                    pow = Self::redc(pow as u128 * psi as u128, q, q_inv_neg);
                }
                factors[m] = pow;
            } else {
                let prev_idx = m & (m - 1);
                let step_idx = m & m.wrapping_neg();
                factors[m] = Self::redc(
                    factors[prev_idx] as u128 * factors[step_idx] as u128,
                    q,
                    q_inv_neg,
                );
            }
        }

        factors
    }
}

impl std::fmt::Debug for NttContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NttContext")
            .field("n", &self.n)
            .field("moduli", &self.moduli)
            .finish()
    }
}
