//! Requester-side scoring flow
//!
//! 1. [`encrypt_vector`]: query vector → batched plaintext → ciphertext under
//!    the distributed public key → caller buffer
//! 2. the scoring engine evaluates homomorphically (not part of this crate)
//! 3. [`decrypt_score`]: base64 result → ciphertext → slot 0 with the secret key

mod decrypt;
mod encrypt;

pub use decrypt::{decrypt_score, ScoreDecryptor, NO_SCORE};
pub use encrypt::{encrypt_vector, encrypt_vector_to_text, encrypt_vector_to_vec, VectorEncryptor};
