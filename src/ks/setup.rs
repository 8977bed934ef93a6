//! Key-switching matrix generation

use serde::{Deserialize, Serialize};

use crate::bfv::{apply_automorphism, BfvContext, SecretKey};
use crate::math::{GaussianSampler, ModQ, Poly};
use crate::params::SchemeParameters;

/// Gadget vector g_z = [1, z, z², ..., z^(ℓ-1)]^T over Z_Q.
///
/// # Example
///
/// ```
/// use hescore::ks::GadgetVector;
/// use hescore::params::SchemeParameters;
///
/// let gadget = GadgetVector::from_params(&SchemeParameters::system());
/// assert_eq!(gadget.powers(), vec![1, 1 << 20, 1 << 40]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GadgetVector {
    /// Gadget base z.
    pub base: u64,
    /// Number of digits ℓ.
    pub len: usize,
    /// Composite ciphertext modulus Q.
    pub q: u64,
}

impl GadgetVector {
    pub fn new(base: u64, len: usize, q: u64) -> Self {
        debug_assert!(base > 1, "Gadget base must be > 1");
        debug_assert!(len > 0, "Gadget length must be > 0");
        Self { base, len, q }
    }

    pub fn from_params(params: &SchemeParameters) -> Self {
        Self::new(params.gadget_base, params.gadget_len, params.modulus())
    }

    /// Get all powers [1, z, z², ..., z^(ℓ-1)] mod Q
    pub fn powers(&self) -> Vec<u64> {
        std::iter::successors(Some(1u64 % self.q), |&p| {
            Some(ModQ::mul(p, self.base, self.q))
        })
        .take(self.len)
        .collect()
    }
}

/// One RLWE row of a key-switching matrix
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KsRow {
    pub a: Poly,
    /// b = -a·s + e + z^i·s'
    pub b: Poly,
}

/// Key-switching matrix from secret key s' to secret key s
///
/// The matrix consists of ℓ RLWE ciphertexts encrypting s'·z^i under s:
/// ```text
/// K[i] = (a_i, -a_i·s + e_i + s'·z^i)
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySwitchingMatrix {
    /// ℓ RLWE rows
    pub rows: Vec<KsRow>,
    /// Gadget parameters
    pub gadget: GadgetVector,
}

impl KeySwitchingMatrix {
    /// Get the number of rows (same as gadget length)
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Largest ‖b_i + a_i·s - z^i·s'‖∞ over all rows.
    ///
    /// For a well-formed matrix this is bounded by the sampler tail cut.
    pub fn residual_norm(&self, from: &Poly, to_key: &SecretKey, ctx: &BfvContext) -> u64 {
        let mut s_ntt = to_key.poly.clone();
        s_ntt.to_ntt(ctx.ntt());

        self.rows
            .iter()
            .zip(self.gadget.powers())
            .map(|(row, power)| {
                let a_s = row.a.mul_ntt(&s_ntt, ctx.ntt());
                let residual = &(&row.b + &a_s) - &from.scalar_mul(power);
                residual.linf_norm(ctx.composer())
            })
            .max()
            .unwrap_or(0)
    }

    /// Structural check against a profile; returns the first violation.
    pub fn check_shape(&self, params: &SchemeParameters) -> Result<(), String> {
        if self.gadget != GadgetVector::from_params(params) {
            return Err(format!("gadget {:?} does not match the profile", self.gadget));
        }
        if self.rows.len() != self.gadget.len {
            return Err(format!(
                "expected {} rows, found {}",
                self.gadget.len,
                self.rows.len()
            ));
        }
        for (i, row) in self.rows.iter().enumerate() {
            row.a
                .check_shape(params.ring_degree, &params.moduli)
                .and_then(|_| row.b.check_shape(params.ring_degree, &params.moduli))
                .map_err(|e| format!("row {i}: {e}"))?;
        }
        Ok(())
    }
}

/// Generate a key-switching matrix from `from` (s') to `to_key` (s)
///
/// This creates ℓ RLWE encryptions of s'·z^i under s:
/// ```text
/// K[i] = (a_i, -a_i·s + e_i + s'·z^i)
/// ```
pub fn generate_ks_matrix(
    from: &Poly,
    to_key: &SecretKey,
    gadget: &GadgetVector,
    sampler: &mut GaussianSampler,
    ctx: &BfvContext,
) -> KeySwitchingMatrix {
    let n = ctx.ring_degree();
    let moduli = ctx.moduli();

    let mut s_ntt = to_key.poly.clone();
    s_ntt.to_ntt(ctx.ntt());

    let rows = gadget
        .powers()
        .into_iter()
        .map(|power| {
            let a = Poly::sample_uniform(n, moduli, sampler);
            let error = Poly::sample_gaussian(n, moduli, sampler);

            let a_s = a.mul_ntt(&s_ntt, ctx.ntt());
            let b = &(&(-a_s) + &error) + &from.scalar_mul(power);
            KsRow { a, b }
        })
        .collect();

    KeySwitchingMatrix {
        rows,
        gadget: gadget.clone(),
    }
}

/// Generate a key-switching matrix for Galois automorphism τ_g
///
/// Switches from τ_g(s) back to s after τ_g is applied to a ciphertext.
pub fn generate_automorphism_ks_matrix(
    sk: &SecretKey,
    automorphism: usize,
    gadget: &GadgetVector,
    sampler: &mut GaussianSampler,
    ctx: &BfvContext,
) -> KeySwitchingMatrix {
    let auto_s = apply_automorphism(&sk.poly, automorphism);
    generate_ks_matrix(&auto_s, sk, gadget, sampler, ctx)
}
