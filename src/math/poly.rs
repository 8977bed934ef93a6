//! Polynomial operations over R_Q = Z_Q[X]/(X^n + 1) in RNS form.
//!
//! A polynomial stores one residue polynomial per RNS modulus, limb-major in
//! a flat vector. It lives either in the coefficient domain or in the NTT
//! domain (Montgomery form, see [`NttContext`]).
//!
//! # Example
//!
//! ```
//! use hescore::math::{CrtComposer, NttContext, Poly};
//!
//! let moduli = [1073738753, 1073732609];
//! let ctx = NttContext::with_moduli(256, &moduli);
//! let composer = CrtComposer::new(&moduli).unwrap();
//!
//! let a = Poly::from_signed(&[1, -2, 3], 256, &moduli);
//! let b = Poly::constant(2, 256, &moduli);
//! let product = a.mul_ntt(&b, &ctx);
//! assert_eq!(product.coeff_signed(1, &composer), -4);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use super::crt::CrtComposer;
use super::gaussian::GaussianSampler;
use super::modular::ModQ;
use super::ntt::NttContext;

/// Polynomial in R_Q with Q = q_0 · q_1 ⋯ q_{L-1}.
///
/// # Fields
///
/// * `coeffs` - Residues, limb-major
/// * `moduli` - RNS moduli
/// * `is_ntt` - Whether coefficients are in NTT domain
///
/// # Example
///
/// ```
/// use hescore::math::Poly;
///
/// let moduli = [1073738753, 1073732609];
/// let poly = Poly::constant(42, 256, &moduli);
/// assert_eq!(poly.dimension(), 256);
/// assert_eq!(poly.limb(0)[0], 42);
/// assert_eq!(poly.limb(1)[0], 42);
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Poly {
    /// Residues, limb-major: limb i occupies `[i * n, (i + 1) * n)`.
    coeffs: Vec<u64>,
    /// RNS moduli.
    moduli: Vec<u64>,
    /// Whether coefficients are in NTT domain.
    is_ntt: bool,
}

impl Poly {
    /// Create zero polynomial with given dimension and moduli
    pub fn zero(dim: usize, moduli: &[u64]) -> Self {
        Self {
            coeffs: vec![0; dim * moduli.len()],
            moduli: moduli.to_vec(),
            is_ntt: false,
        }
    }

    /// Create polynomial from flat limb-major residues, reducing each limb
    pub fn from_coeffs_moduli(mut coeffs: Vec<u64>, moduli: &[u64]) -> Self {
        let dim = coeffs.len() / moduli.len();
        for (limb, &q) in coeffs.chunks_mut(dim).zip(moduli) {
            for c in limb {
                *c %= q;
            }
        }
        Self {
            coeffs,
            moduli: moduli.to_vec(),
            is_ntt: false,
        }
    }

    /// Lift small signed coefficients into every limb; missing tail is zero
    ///
    /// # Arguments
    ///
    /// * `values` - Leading coefficients, at most `dim` of them
    /// * `dim` - Ring dimension
    /// * `moduli` - RNS moduli
    ///
    /// # Example
    ///
    /// ```
    /// use hescore::math::Poly;
    ///
    /// let poly = Poly::from_signed(&[-1, 2], 8, &[97, 113]);
    /// assert_eq!(poly.limb(0)[..3], [96, 2, 0]);
    /// assert_eq!(poly.limb(1)[..3], [112, 2, 0]);
    /// ```
    pub fn from_signed(values: &[i64], dim: usize, moduli: &[u64]) -> Self {
        debug_assert!(values.len() <= dim);
        let mut poly = Self::zero(dim, moduli);
        for (limb, &q) in poly.coeffs.chunks_mut(dim).zip(moduli) {
            for (c, &v) in limb.iter_mut().zip(values) {
                *c = ModQ::from_signed(v, q);
            }
        }
        poly
    }

    /// Constant polynomial
    pub fn constant(value: u64, dim: usize, moduli: &[u64]) -> Self {
        let mut poly = Self::zero(dim, moduli);
        for (limb, &q) in poly.coeffs.chunks_mut(dim).zip(moduli) {
            limb[0] = value % q;
        }
        poly
    }

    /// Sample polynomial with coefficients from discrete Gaussian distribution
    pub fn sample_gaussian(dim: usize, moduli: &[u64], sampler: &mut GaussianSampler) -> Self {
        Self::from_signed(&sampler.sample_vec(dim), dim, moduli)
    }

    /// Sample polynomial with coefficients uniform in {-1, 0, 1}
    pub fn sample_ternary(dim: usize, moduli: &[u64], sampler: &mut GaussianSampler) -> Self {
        Self::from_signed(&sampler.sample_ternary_vec(dim), dim, moduli)
    }

    /// Uniformly random element of R_Q, sampled limb by limb
    pub fn sample_uniform(dim: usize, moduli: &[u64], sampler: &mut GaussianSampler) -> Self {
        let mut coeffs = Vec::with_capacity(dim * moduli.len());
        for &q in moduli {
            coeffs.extend((0..dim).map(|_| sampler.sample_uniform(q)));
        }
        Self {
            coeffs,
            moduli: moduli.to_vec(),
            is_ntt: false,
        }
    }

    /// Get polynomial dimension
    pub fn dimension(&self) -> usize {
        if self.moduli.is_empty() {
            0
        } else {
            self.coeffs.len() / self.moduli.len()
        }
    }

    /// RNS moduli
    pub fn moduli(&self) -> &[u64] {
        &self.moduli
    }

    /// Check if in NTT domain
    pub fn is_ntt(&self) -> bool {
        self.is_ntt
    }

    /// Flat limb-major residues
    pub fn coeffs(&self) -> &[u64] {
        &self.coeffs
    }

    /// Residues of limb `i`
    pub fn limb(&self, i: usize) -> &[u64] {
        let n = self.dimension();
        &self.coeffs[i * n..(i + 1) * n]
    }

    /// Coefficient `i` as a centered integer, composed over all limbs
    pub fn coeff_signed(&self, i: usize, composer: &CrtComposer) -> i64 {
        assert!(!self.is_ntt, "Cannot access coefficients in NTT domain");
        ModQ::to_signed(self.compose_at(i, composer), composer.modulus())
    }

    /// Coefficient `i` in [0, Q)
    pub fn compose_at(&self, i: usize, composer: &CrtComposer) -> u64 {
        let n = self.dimension();
        let residues: Vec<u64> = (0..self.moduli.len())
            .map(|l| self.coeffs[l * n + i])
            .collect();
        composer.compose(&residues)
    }

    /// Every coefficient composed into [0, Q)
    pub fn compose(&self, composer: &CrtComposer) -> Vec<u64> {
        assert!(!self.is_ntt, "Cannot compose coefficients in NTT domain");
        (0..self.dimension())
            .map(|i| self.compose_at(i, composer))
            .collect()
    }

    /// L-infinity norm of the centered representative over Q
    ///
    /// # Example
    ///
    /// ```
    /// use hescore::math::{CrtComposer, Poly};
    ///
    /// let moduli = [1073738753, 1073732609];
    /// let composer = CrtComposer::new(&moduli).unwrap();
    /// let poly = Poly::from_signed(&[3, -7, 5], 256, &moduli);
    /// assert_eq!(poly.linf_norm(&composer), 7);
    /// ```
    pub fn linf_norm(&self, composer: &CrtComposer) -> u64 {
        let q = composer.modulus();
        self.compose(composer)
            .into_iter()
            .map(|c| if c <= q / 2 { c } else { q - c })
            .max()
            .unwrap_or(0)
    }

    /// Convert to NTT domain
    pub fn to_ntt(&mut self, ctx: &NttContext) {
        if !self.is_ntt {
            ctx.forward(&mut self.coeffs);
            self.is_ntt = true;
        }
    }

    /// Convert from NTT domain to coefficient domain
    pub fn from_ntt(&mut self, ctx: &NttContext) {
        if self.is_ntt {
            ctx.inverse(&mut self.coeffs);
            self.is_ntt = false;
        }
    }

    /// Multiply every limb by the same integer scalar
    pub fn scalar_mul(&self, scalar: u64) -> Self {
        let n = self.dimension();
        let mut result = self.clone();
        for (limb, &q) in result.coeffs.chunks_mut(n).zip(&self.moduli) {
            let s = scalar % q;
            for c in limb {
                *c = ModQ::mul(*c, s, q);
            }
        }
        result
    }

    /// Negacyclic product, returned in coefficient domain
    ///
    /// Operands already in NTT domain are used as they are.
    ///
    /// # Panics
    ///
    /// Panics if the operands have different moduli.
    pub fn mul_ntt(&self, other: &Self, ctx: &NttContext) -> Self {
        let mut a = self.clone();
        let mut b = other.clone();
        a.to_ntt(ctx);
        b.to_ntt(ctx);

        let mut product = a.mul_ntt_domain(&b, ctx);
        product.from_ntt(ctx);
        product
    }

    /// Pointwise product when both operands are already in NTT domain
    pub fn mul_ntt_domain(&self, other: &Self, ctx: &NttContext) -> Self {
        assert!(
            self.is_ntt && other.is_ntt,
            "Both polynomials must be in NTT domain"
        );
        assert_eq!(self.moduli, other.moduli, "Moduli must match");

        let mut result = vec![0u64; self.coeffs.len()];
        ctx.pointwise_mul(&self.coeffs, &other.coeffs, &mut result);

        Self {
            coeffs: result,
            moduli: self.moduli.clone(),
            is_ntt: true,
        }
    }

    /// Check if polynomial is zero
    pub fn is_zero(&self) -> bool {
        self.coeffs.iter().all(|&c| c == 0)
    }

    /// Shape and range check for polynomials read from untrusted bytes.
    ///
    /// Returns a description of the first violation.
    ///
    /// # Example
    ///
    /// ```
    /// use hescore::math::Poly;
    ///
    /// let moduli = [1073738753, 1073732609];
    /// let poly = Poly::zero(256, &moduli);
    /// assert!(poly.check_shape(256, &moduli).is_ok());
    /// assert!(poly.check_shape(512, &moduli).is_err());
    /// assert!(poly.check_shape(256, &moduli[..1]).is_err());
    /// ```
    pub fn check_shape(&self, dim: usize, moduli: &[u64]) -> Result<(), String> {
        if self.is_ntt {
            return Err("polynomial is marked as NTT domain".into());
        }
        if self.moduli != moduli {
            return Err(format!(
                "moduli {:?} do not match expected {:?}",
                self.moduli, moduli
            ));
        }
        if self.coeffs.len() != dim * moduli.len() {
            return Err(format!(
                "expected {} residues, found {}",
                dim * moduli.len(),
                self.coeffs.len()
            ));
        }
        for (l, (limb, &q)) in self.coeffs.chunks(dim).zip(moduli).enumerate() {
            if let Some(i) = limb.iter().position(|&c| c >= q) {
                return Err(format!(
                    "coefficient out of range at limb {l}, index {i}: {} >= {q}",
                    limb[i]
                ));
            }
        }
        Ok(())
    }

    fn zip_limbs(&self, rhs: &Self, op: impl Fn(u64, u64, u64) -> u64) -> Self {
        assert_eq!(self.moduli, rhs.moduli, "Moduli must match");
        assert_eq!(self.is_ntt, rhs.is_ntt, "NTT domains must match");
        assert_eq!(
            self.coeffs.len(),
            rhs.coeffs.len(),
            "Dimensions must match"
        );

        let n = self.dimension();
        let mut coeffs = Vec::with_capacity(self.coeffs.len());
        for (l, &q) in self.moduli.iter().enumerate() {
            let range = l * n..(l + 1) * n;
            coeffs.extend(
                self.coeffs[range.clone()]
                    .iter()
                    .zip(&rhs.coeffs[range])
                    .map(|(&a, &b)| op(a, b, q)),
            );
        }

        Poly {
            coeffs,
            moduli: self.moduli.clone(),
            is_ntt: self.is_ntt,
        }
    }
}

impl PartialEq for Poly {
    fn eq(&self, other: &Self) -> bool {
        self.moduli == other.moduli && self.is_ntt == other.is_ntt && self.coeffs == other.coeffs
    }
}

impl Eq for Poly {}

impl Add for &Poly {
    type Output = Poly;

    fn add(self, rhs: Self) -> Self::Output {
        self.zip_limbs(rhs, ModQ::add)
    }
}

impl Add for Poly {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        &self + &rhs
    }
}

impl AddAssign<&Poly> for Poly {
    fn add_assign(&mut self, rhs: &Self) {
        *self = &*self + rhs;
    }
}

impl Sub for &Poly {
    type Output = Poly;

    fn sub(self, rhs: Self) -> Self::Output {
        self.zip_limbs(rhs, ModQ::sub)
    }
}

impl Sub for Poly {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        &self - &rhs
    }
}

impl SubAssign<&Poly> for Poly {
    fn sub_assign(&mut self, rhs: &Self) {
        *self = &*self - rhs;
    }
}

impl Neg for &Poly {
    type Output = Poly;

    fn neg(self) -> Self::Output {
        let n = self.dimension();
        let mut result = self.clone();
        for (limb, &q) in result.coeffs.chunks_mut(n).zip(&self.moduli) {
            for c in limb {
                *c = ModQ::negate(*c, q);
            }
        }
        result
    }
}

impl Neg for Poly {
    type Output = Self;

    fn neg(self) -> Self::Output {
        -&self
    }
}
