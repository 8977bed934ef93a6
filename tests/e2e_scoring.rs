//! End-to-end scoring flow tests
//!
//! Tests the full requester flow: Keygen → Encrypt query → (engine) → Decrypt score

use std::fs;

use tempfile::tempdir;

use hescore::bfv::{galois_element_for_step, BfvContext, Ciphertext};
use hescore::keys::{self, KeyBundle, KEY_FILES, PUBLIC_KEY_FILE, SECRET_KEY_FILE};
use hescore::ks::automorph;
use hescore::math::GaussianSampler;
use hescore::params::{SchemeParameters, SYSTEM_RING_DEGREE};
use hescore::serialize::HEADER_LEN;
use hescore::{
    decrypt_score, encrypt_vector, encrypt_vector_to_text, encrypt_vector_to_vec, Error,
    ScoreDecryptor, VectorEncryptor,
};

/// Serialized size of a system-profile ciphertext: header plus two polynomials
/// of 2 limbs × 8192 u32 residues.
const SYSTEM_CIPHERTEXT_LEN: usize = HEADER_LEN + 2 * 2 * 8192 * 4;

fn small_params() -> SchemeParameters {
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
fn test_e2e_concrete_scenario() {
    let dir = tempdir().unwrap();
    keys::generate(dir.path(), SYSTEM_RING_DEGREE).unwrap();

    let text = encrypt_vector_to_text(&[1, 0, 0, 1], dir.path()).unwrap();
    let sk_bytes = fs::read(dir.path().join(SECRET_KEY_FILE)).unwrap();

    assert_eq!(decrypt_score(&text, &sk_bytes).unwrap(), 1);
}

#[test]
fn test_e2e_generated_files() {
    let dir = tempdir().unwrap();
    let bundle = keys::generate(dir.path(), SYSTEM_RING_DEGREE).unwrap();

    for name in KEY_FILES {
        assert!(dir.path().join(name).is_file(), "{name} missing");
    }
    // 12 doubling steps in each direction share ±2048, plus the row swap
    assert_eq!(bundle.galois_keys.keys.len(), 24);
}

#[test]
fn test_e2e_buffer_exact_and_short() {
    let dir = tempdir().unwrap();
    keys::generate(dir.path(), SYSTEM_RING_DEGREE).unwrap();

    let required = encrypt_vector_to_vec(&[1, 0, 0, 1], dir.path()).unwrap().len();
    assert_eq!(required, SYSTEM_CIPHERTEXT_LEN);

    let mut exact = vec![0u8; required];
    assert_eq!(encrypt_vector(&[1, 0, 0, 1], dir.path(), &mut exact).unwrap(), required);

    let mut short = vec![0x77u8; required - 1];
    match encrypt_vector(&[1, 0, 0, 1], dir.path(), &mut short) {
        Err(Error::BufferTooSmall { required: r, capacity }) => {
            assert_eq!(r, required);
            assert_eq!(capacity, required - 1);
        }
        other => panic!("expected BufferTooSmall, got {other:?}"),
    }
    assert!(short.iter().all(|&b| b == 0x77));
}

#[test]
fn test_e2e_slot_capacity() {
    let dir = tempdir().unwrap();
    keys::generate(dir.path(), SYSTEM_RING_DEGREE).unwrap();

    let full = vec![1u64; SYSTEM_RING_DEGREE];
    assert!(encrypt_vector_to_vec(&full, dir.path()).is_ok());

    let over = vec![1u64; SYSTEM_RING_DEGREE + 1];
    assert!(matches!(
        encrypt_vector_to_vec(&over, dir.path()),
        Err(Error::InvalidInput(_))
    ));
}

#[test]
fn test_e2e_profile_binding() {
    let dir = tempdir().unwrap();
    keys::generate(dir.path(), 4096).unwrap();

    // Public key of another profile cannot be used for the system profile
    let result = encrypt_vector_to_vec(&[1], dir.path());
    assert!(matches!(result, Err(Error::KeyLoad(_))));

    // Secret key bytes of another profile are rejected, not misread
    let system_dir = tempdir().unwrap();
    keys::generate(system_dir.path(), SYSTEM_RING_DEGREE).unwrap();
    let text = encrypt_vector_to_text(&[1], system_dir.path()).unwrap();
    let foreign_sk = fs::read(dir.path().join(SECRET_KEY_FILE)).unwrap();
    assert!(matches!(
        decrypt_score(&text, &foreign_sk),
        Err(Error::Deserialization(_))
    ));
}

#[test]
fn test_e2e_independent_generations() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    let a = keys::generate(first.path(), SYSTEM_RING_DEGREE).unwrap();
    let b = keys::generate(second.path(), SYSTEM_RING_DEGREE).unwrap();

    assert_ne!(a.key_id, b.key_id);
    assert_ne!(a.secret_key.poly, b.secret_key.poly);

    let params = SchemeParameters::system();
    for dir in [first.path(), second.path()] {
        let loaded = KeyBundle::load(dir, &params).unwrap();
        loaded.validate().unwrap();
    }

    // A query for one bundle cannot be scored with the other
    let text = encrypt_vector_to_text(&[1, 0, 0, 1], first.path()).unwrap();
    let other_sk = fs::read(second.path().join(SECRET_KEY_FILE)).unwrap();
    assert!(matches!(decrypt_score(&text, &other_sk), Err(Error::KeyLoad(_))));
}

#[test]
fn test_e2e_mixed_bundle_rejected() {
    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    keys::generate(first.path(), SYSTEM_RING_DEGREE).unwrap();
    keys::generate(second.path(), SYSTEM_RING_DEGREE).unwrap();

    fs::copy(
        second.path().join(PUBLIC_KEY_FILE),
        first.path().join(PUBLIC_KEY_FILE),
    )
    .unwrap();

    let result = KeyBundle::load(first.path(), &SchemeParameters::system());
    assert!(matches!(result, Err(Error::KeyLoad(_))));
}

#[test]
fn test_e2e_unsupported_degree() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("keys");

    for degree in [0, 1024, 3000, 65536] {
        assert!(matches!(
            keys::generate(&target, degree),
            Err(Error::InvalidParameters(_))
        ));
    }
    assert!(!target.exists());
}

/// The engine side of a match count: rotate-and-sum over the first slot row.
///
/// After log2(row) rotations every slot of row 0 holds the row total.
fn sum_row(ct: &Ciphertext, bundle: &KeyBundle, ctx: &BfvContext) -> Ciphertext {
    let row = ctx.ring_degree() / 2;
    let mut acc = ct.clone();
    let mut step = 1;
    while step < row {
        let g = galois_element_for_step(step as isize, ctx.ring_degree());
        let matrix = bundle.galois_keys.get(g).unwrap();
        let rotated = automorph(&acc, g, matrix, ctx);
        acc = Ciphertext {
            key_id: acc.key_id,
            a: &acc.a + &rotated.a,
            b: &acc.b + &rotated.b,
        };
        step *= 2;
    }
    acc
}

#[test]
fn test_e2e_rotation_keys_support_row_sum() {
    let params = small_params();
    let ctx = BfvContext::new(&params).unwrap();
    let mut sampler = GaussianSampler::with_seed(params.sigma, 2024);
    let bundle = KeyBundle::generate(&params, &mut sampler).unwrap();

    let encryptor = VectorEncryptor::new(params.clone(), bundle.public_key.clone()).unwrap();
    let decryptor = ScoreDecryptor::new(params.clone(), bundle.secret_key.clone()).unwrap();

    let mut query = vec![0u64; 128];
    for i in [0, 3, 17, 64, 127] {
        query[i] = 1;
    }
    let ct = encryptor.encrypt(&query, &mut sampler).unwrap();
    let summed = sum_row(&ct, &bundle, &ctx);

    assert_eq!(decryptor.decrypt_score(&summed).unwrap(), 5);
    assert!(decryptor.noise_budget(&summed) > 0);
}
