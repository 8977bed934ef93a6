//! BFV encryption over R_Q = Z_Q[X]/(X^n + 1)
//!
//! # Overview
//!
//! - Secret key s is ternary, public key is an encryption of zero (a, -a·s + e)
//! - Plaintexts are polynomials mod t holding n batched slots
//! - Ciphertext (a, b) satisfies b + a·s = ⌊Q·m / t⌉ + v for small noise v
//!
//! # Example
//!
//! ```
//! use hescore::bfv::{BatchEncoder, BfvContext, Decryptor, Encryptor, KeyId, PublicKey, SecretKey};
//! use hescore::math::GaussianSampler;
//! use hescore::params::SchemeParameters;
//!
//! let params = SchemeParameters::bfv_d2048();
//! let ctx = BfvContext::new(&params).unwrap();
//! let encoder = BatchEncoder::new(&params);
//! let mut sampler = GaussianSampler::with_seed(params.sigma, 42);
//!
//! let key_id = KeyId::random(&mut sampler);
//! let sk = SecretKey::generate(&ctx, key_id, &mut sampler);
//! let pk = PublicKey::generate(&ctx, &sk, &mut sampler);
//!
//! let plain = encoder.encode(&[1, 0, 0, 1]).unwrap();
//! let ct = Encryptor::new(&ctx, &pk).encrypt(&plain, &mut sampler);
//! let decrypted = Decryptor::new(&ctx, &sk).decrypt(&ct).unwrap();
//! assert_eq!(encoder.decode(&decrypted)[..4], [1, 0, 0, 1]);
//! ```

pub mod context;
pub mod enc;
pub mod encoder;
pub mod galois;
pub mod types;

pub use context::BfvContext;
pub use enc::{Decryptor, Encryptor};
pub use encoder::BatchEncoder;
pub use galois::{apply_automorphism, galois_element_for_step, galois_elements, row_swap_element};
pub use types::{Ciphertext, KeyId, Plaintext, PublicKey, SecretKey};
