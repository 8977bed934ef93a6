//! hescore: privacy-preserving match scoring over BFV
//!
//! A requester encrypts a sparse 0/1 query vector under a public key; an
//! untrusted scoring engine evaluates a match score homomorphically; only the
//! secret key holder can read the score.
//!
//! This crate is the requester-side core:
//! - One fixed, fingerprinted BFV profile ([`params`])
//! - Key bundle generation, persistence and loading ([`keys`])
//! - Query encryption into caller buffers and score decryption ([`score`])
//! - Base64 transport ([`codec`]) and a C ABI ([`ffi`])
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! let dir = Path::new("keys");
//! hescore::keys::generate(dir, hescore::params::SYSTEM_RING_DEGREE)?;
//!
//! let mut out = vec![0u8; 256 * 1024];
//! let written = hescore::encrypt_vector(&[1, 0, 0, 1], dir, &mut out)?;
//! # let _ = written;
//! # Ok::<(), hescore::Error>(())
//! ```

pub mod error;
pub mod params;
pub mod math;
pub mod bfv;
pub mod ks;
pub mod serialize;
pub mod keys;
pub mod score;
pub mod codec;
pub mod query;
pub mod ffi;

pub use error::{Error, Result};
pub use keys::KeyBundle;
pub use params::{SchemeParameters, SYSTEM_RING_DEGREE};
pub use score::{
    decrypt_score, encrypt_vector, encrypt_vector_to_text, encrypt_vector_to_vec,
    ScoreDecryptor, VectorEncryptor,
};
pub use codec::{decode_from_text, encode_to_text};
