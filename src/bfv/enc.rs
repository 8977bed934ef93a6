//! BFV key generation, encryption and decryption
//!
//! Public-key encryption of m ∈ R_t:
//!   a' = a·u + e2,  b' = b·u + e1 + ⌊Q·m / t⌉
//! with u ternary and e1, e2 Gaussian. Decryption computes
//!   x = b' + a'·s = ⌊Q·m / t⌉ + v,  m = ⌊t·x / Q⌉ mod t.

use tracing::debug;

use crate::error::{Error, Result};
use crate::math::{GaussianSampler, Poly};

use super::context::BfvContext;
use super::types::{Ciphertext, KeyId, Plaintext, PublicKey, SecretKey};

impl SecretKey {
    /// Sample a ternary secret key
    pub fn generate(ctx: &BfvContext, key_id: KeyId, sampler: &mut GaussianSampler) -> Self {
        Self {
            poly: Poly::sample_ternary(ctx.ring_degree(), ctx.moduli(), sampler),
            key_id,
        }
    }
}

impl PublicKey {
    /// Derive a public key (a, -a·s + e) from the secret key
    pub fn generate(ctx: &BfvContext, sk: &SecretKey, sampler: &mut GaussianSampler) -> Self {
        let n = ctx.ring_degree();
        let a = Poly::sample_uniform(n, ctx.moduli(), sampler);
        let e = Poly::sample_gaussian(n, ctx.moduli(), sampler);

        let a_s = a.mul_ntt(&sk.poly, ctx.ntt());
        let b = &(-a_s) + &e;

        Self {
            key_id: sk.key_id,
            a,
            b,
        }
    }

    /// ‖b + a·s‖∞, the public key error as seen through `sk`
    pub fn residual_norm(&self, ctx: &BfvContext, sk: &SecretKey) -> u64 {
        let a_s = self.a.mul_ntt(&sk.poly, ctx.ntt());
        (&self.b + &a_s).linf_norm(ctx.composer())
    }
}

/// Public-key encryptor with the key held in NTT domain.
pub struct Encryptor<'a> {
    ctx: &'a BfvContext,
    a_ntt: Poly,
    b_ntt: Poly,
    key_id: KeyId,
}

impl<'a> Encryptor<'a> {
    pub fn new(ctx: &'a BfvContext, pk: &PublicKey) -> Self {
        let mut a_ntt = pk.a.clone();
        let mut b_ntt = pk.b.clone();
        a_ntt.to_ntt(ctx.ntt());
        b_ntt.to_ntt(ctx.ntt());

        Self {
            ctx,
            a_ntt,
            b_ntt,
            key_id: pk.key_id,
        }
    }

    /// Encrypt a batched plaintext
    pub fn encrypt(&self, plain: &Plaintext, sampler: &mut GaussianSampler) -> Ciphertext {
        let ctx = self.ctx;
        let n = ctx.ring_degree();
        let moduli = ctx.moduli();

        let mut u = Poly::sample_ternary(n, moduli, sampler);
        u.to_ntt(ctx.ntt());
        let e1 = Poly::sample_gaussian(n, moduli, sampler);
        let e2 = Poly::sample_gaussian(n, moduli, sampler);

        let mut a = self.a_ntt.mul_ntt_domain(&u, ctx.ntt());
        let mut b = self.b_ntt.mul_ntt_domain(&u, ctx.ntt());
        a.from_ntt(ctx.ntt());
        b.from_ntt(ctx.ntt());

        let scaled = self.scale_message(plain);

        Ciphertext {
            key_id: self.key_id,
            a: &a + &e2,
            b: &(&b + &e1) + &scaled,
        }
    }

    /// ⌊Q·m / t⌉ per coefficient, split into RNS residues
    fn scale_message(&self, plain: &Plaintext) -> Poly {
        let q = self.ctx.composer().modulus() as u128;
        let t = self.ctx.params().plain_modulus as u128;
        let moduli = self.ctx.moduli();

        let scaled: Vec<u64> = plain
            .coeffs()
            .iter()
            .map(|&m| ((q * m as u128 + t / 2) / t) as u64)
            .collect();

        let mut residues = Vec::with_capacity(scaled.len() * moduli.len());
        for &qi in moduli {
            residues.extend(scaled.iter().map(|&v| v % qi));
        }
        Poly::from_coeffs_moduli(residues, moduli)
    }
}

/// Secret-key decryptor.
pub struct Decryptor<'a> {
    ctx: &'a BfvContext,
    s_ntt: Poly,
    key_id: KeyId,
}

impl<'a> Decryptor<'a> {
    pub fn new(ctx: &'a BfvContext, sk: &SecretKey) -> Self {
        let mut s_ntt = sk.poly.clone();
        s_ntt.to_ntt(ctx.ntt());

        Self {
            ctx,
            s_ntt,
            key_id: sk.key_id,
        }
    }

    /// x = b + a·s, composed into [0, Q) per coefficient
    fn phase(&self, ct: &Ciphertext) -> Vec<u64> {
        let mut a = ct.a.clone();
        a.to_ntt(self.ctx.ntt());
        let mut a_s = a.mul_ntt_domain(&self.s_ntt, self.ctx.ntt());
        a_s.from_ntt(self.ctx.ntt());

        (&ct.b + &a_s).compose(self.ctx.composer())
    }

    /// Decrypt to a plaintext modulo t.
    ///
    /// Fails with [`Error::KeyLoad`] if the ciphertext was produced under a
    /// different key bundle.
    pub fn decrypt(&self, ct: &Ciphertext) -> Result<Plaintext> {
        if ct.key_id != self.key_id {
            return Err(Error::KeyLoad(format!(
                "ciphertext belongs to key {}, secret key is {}",
                ct.key_id, self.key_id
            )));
        }

        let q = self.ctx.composer().modulus() as u128;
        let t = self.ctx.params().plain_modulus;
        let coeffs: Vec<u64> = self
            .phase(ct)
            .into_iter()
            .map(|x| (((t as u128 * x as u128 + q / 2) / q) as u64) % t)
            .collect();

        let plain = Plaintext {
            poly: Poly::from_coeffs_moduli(coeffs, &[t]),
        };
        debug!(
            noise_budget_bits = self.invariant_noise_budget(ct),
            "decrypted ciphertext"
        );
        Ok(plain)
    }

    /// Remaining invariant noise budget in bits; 0 means decryption may fail.
    ///
    /// log2(Q) - log2(‖t·x mod Q‖∞) - 1, x the decryption phase.
    pub fn invariant_noise_budget(&self, ct: &Ciphertext) -> u32 {
        let q = self.ctx.composer().modulus();
        let t = self.ctx.params().plain_modulus as u128;

        let norm = self
            .phase(ct)
            .into_iter()
            .map(|x| {
                let v = ((t * x as u128) % q as u128) as u64;
                if v <= q / 2 {
                    v
                } else {
                    q - v
                }
            })
            .max()
            .unwrap_or(0);

        let q_bits = 64 - q.leading_zeros();
        let norm_bits = 64 - norm.leading_zeros();
        q_bits.saturating_sub(norm_bits).saturating_sub(1)
    }
}
