//! Key-switching operation

use crate::bfv::{apply_automorphism, BfvContext, Ciphertext};
use crate::math::{CrtComposer, Poly};

use super::setup::{GadgetVector, KeySwitchingMatrix};

/// Gadget decomposition g⁻¹(a): ℓ polynomials with digits in [0, z)
///
/// Each coefficient is composed into [0, Q) first, so the digits satisfy
/// Σᵢ aᵢ·z^i = a over Z_Q.
pub fn gadget_decompose(poly: &Poly, gadget: &GadgetVector, composer: &CrtComposer) -> Vec<Poly> {
    let n = poly.dimension();
    let moduli = poly.moduli();
    let mask = gadget.base - 1;
    let shift = gadget.base.trailing_zeros();
    debug_assert!(gadget.base.is_power_of_two(), "gadget base must be a power of two");

    let mut digits = vec![vec![0i64; n]; gadget.len];
    for (i, value) in poly.compose(composer).into_iter().enumerate() {
        let mut rest = value;
        for digit in digits.iter_mut() {
            digit[i] = (rest & mask) as i64;
            rest >>= shift;
        }
    }

    digits
        .iter()
        .map(|d| Poly::from_signed(d, n, moduli))
        .collect()
}

/// Apply key-switching to move a ciphertext from key s' to key s
///
/// Given (a, b) with b + a·s' ≈ Δm and K switching s' → s:
/// ```text
/// (a', b') = (0, b) + Σᵢ aᵢ · K[i]
/// ```
/// so that b' + a'·s ≈ Δm plus Σᵢ aᵢ·eᵢ.
pub fn key_switch(ct: &Ciphertext, ks_matrix: &KeySwitchingMatrix, ctx: &BfvContext) -> Ciphertext {
    let n = ctx.ring_degree();
    let moduli = ctx.moduli();
    let ntt = ctx.ntt();

    let a_decomp = gadget_decompose(&ct.a, &ks_matrix.gadget, ctx.composer());

    let mut result_a = Poly::zero(n, moduli);
    let mut result_b = Poly::zero(n, moduli);
    result_a.to_ntt(ntt);
    result_b.to_ntt(ntt);

    for (mut digit, row) in a_decomp.into_iter().zip(&ks_matrix.rows) {
        digit.to_ntt(ntt);

        let mut ks_a = row.a.clone();
        let mut ks_b = row.b.clone();
        ks_a.to_ntt(ntt);
        ks_b.to_ntt(ntt);

        result_a += &digit.mul_ntt_domain(&ks_a, ntt);
        result_b += &digit.mul_ntt_domain(&ks_b, ntt);
    }

    result_a.from_ntt(ntt);
    result_b.from_ntt(ntt);

    Ciphertext {
        key_id: ct.key_id,
        a: result_a,
        b: &ct.b + &result_b,
    }
}

/// Apply τ_g to a ciphertext and switch back to the original key
pub fn automorph(ct: &Ciphertext, g: usize, ks_matrix: &KeySwitchingMatrix, ctx: &BfvContext) -> Ciphertext {
    let rotated = Ciphertext {
        key_id: ct.key_id,
        a: apply_automorphism(&ct.a, g),
        b: apply_automorphism(&ct.b, g),
    };
    key_switch(&rotated, ks_matrix, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bfv::{BatchEncoder, Decryptor, Encryptor, KeyId, PublicKey, SecretKey};
    use crate::ks::{generate_automorphism_ks_matrix, generate_ks_matrix};
    use crate::math::GaussianSampler;
    use crate::params::SchemeParameters;

    fn test_params() -> SchemeParameters {
        SchemeParameters {
            ring_degree: 256,
            moduli: vec![1073738753, 1073732609],
            plain_modulus: 1047041,
            sigma: 3.2,
            gadget_base: 1 << 20,
            gadget_len: 3,
            version: 1,
        }
    }

    #[test]
    fn test_gadget_decompose_recomposes() {
        let params = test_params();
        let ctx = BfvContext::new(&params).unwrap();
        let mut sampler = GaussianSampler::with_seed(params.sigma, 21);
        let gadget = GadgetVector::from_params(&params);

        let a = Poly::sample_uniform(params.ring_degree, &params.moduli, &mut sampler);
        let digits = gadget_decompose(&a, &gadget, ctx.composer());
        assert_eq!(digits.len(), gadget.len);

        let mut recomposed = Poly::zero(params.ring_degree, &params.moduli);
        for (digit, power) in digits.iter().zip(gadget.powers()) {
            assert!(digit.linf_norm(ctx.composer()) < gadget.base);
            recomposed += &digit.scalar_mul(power);
        }
        assert_eq!(recomposed, a);
    }

    #[test]
    fn test_key_switch_same_key_preserves_message() {
        let params = test_params();
        let ctx = BfvContext::new(&params).unwrap();
        let encoder = BatchEncoder::new(&params);
        let mut sampler = GaussianSampler::with_seed(params.sigma, 22);

        let sk = SecretKey::generate(&ctx, KeyId::random(&mut sampler), &mut sampler);
        let pk = PublicKey::generate(&ctx, &sk, &mut sampler);
        let gadget = GadgetVector::from_params(&params);
        let ks_matrix = generate_ks_matrix(&sk.poly, &sk, &gadget, &mut sampler, &ctx);

        let values: Vec<u64> = (0..256u64).map(|i| i % 50).collect();
        let ct = Encryptor::new(&ctx, &pk).encrypt(&encoder.encode(&values).unwrap(), &mut sampler);
        let switched = key_switch(&ct, &ks_matrix, &ctx);

        let decrypted = Decryptor::new(&ctx, &sk).decrypt(&switched).unwrap();
        assert_eq!(encoder.decode(&decrypted), values);
    }

    #[test]
    fn test_automorph_rotates_encrypted_rows() {
        let params = test_params();
        let ctx = BfvContext::new(&params).unwrap();
        let encoder = BatchEncoder::new(&params);
        let mut sampler = GaussianSampler::with_seed(params.sigma, 23);

        let sk = SecretKey::generate(&ctx, KeyId::random(&mut sampler), &mut sampler);
        let pk = PublicKey::generate(&ctx, &sk, &mut sampler);
        let gadget = GadgetVector::from_params(&params);
        let ks_matrix = generate_automorphism_ks_matrix(&sk, 3, &gadget, &mut sampler, &ctx);

        let values: Vec<u64> = (0..256u64).collect();
        let ct = Encryptor::new(&ctx, &pk).encrypt(&encoder.encode(&values).unwrap(), &mut sampler);
        let rotated = automorph(&ct, 3, &ks_matrix, &ctx);

        let decoded = encoder.decode(&Decryptor::new(&ctx, &sk).decrypt(&rotated).unwrap());
        let row = 128;
        for i in 0..row {
            assert_eq!(decoded[i], values[(i + 1) % row]);
            assert_eq!(decoded[row + i], values[row + (i + 1) % row]);
        }
    }
}
