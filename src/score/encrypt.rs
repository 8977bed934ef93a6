//! Query vector encryption into caller-owned buffers

use std::path::Path;

use tracing::debug;

use crate::bfv::{BatchEncoder, BfvContext, Ciphertext, Encryptor, PublicKey};
use crate::codec::encode_to_text;
use crate::error::{Error, Result};
use crate::keys::load_public_key;
use crate::math::GaussianSampler;
use crate::params::SchemeParameters;
use crate::serialize::to_bytes;

/// Public-key encryptor for batched query vectors
pub struct VectorEncryptor {
    params: SchemeParameters,
    ctx: BfvContext,
    encoder: BatchEncoder,
    public_key: PublicKey,
}

impl VectorEncryptor {
    pub fn new(params: SchemeParameters, public_key: PublicKey) -> Result<Self> {
        let ctx = BfvContext::new(&params)?;
        let encoder = BatchEncoder::new(&params);
        Ok(Self {
            params,
            ctx,
            encoder,
            public_key,
        })
    }

    /// Load `public_key.k` from `dir` under the system profile.
    ///
    /// Every failure to obtain the key is reported as [`Error::KeyLoad`].
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let params = SchemeParameters::system();
        let public_key = load_public_key(dir, &params).map_err(Error::into_key_load)?;
        Self::new(params, public_key)
    }

    pub fn params(&self) -> &SchemeParameters {
        &self.params
    }

    /// Encode `vector` into the leading slots and encrypt it
    pub fn encrypt(&self, vector: &[u64], sampler: &mut GaussianSampler) -> Result<Ciphertext> {
        let plain = self.encoder.encode(vector)?;
        Ok(Encryptor::new(&self.ctx, &self.public_key).encrypt(&plain, sampler))
    }

    /// Encrypt with fresh randomness and serialize in the compact encoding
    pub fn encrypt_to_vec(&self, vector: &[u64]) -> Result<Vec<u8>> {
        let mut sampler = GaussianSampler::from_entropy(self.params.sigma);
        let ct = self.encrypt(vector, &mut sampler)?;
        to_bytes(&ct, &self.params)
    }

    /// Encrypt into `out`, returning the number of bytes written.
    ///
    /// If the serialized ciphertext does not fit, fails with
    /// [`Error::BufferTooSmall`] and leaves `out` untouched.
    pub fn encrypt_into(&self, vector: &[u64], out: &mut [u8]) -> Result<usize> {
        let bytes = self.encrypt_to_vec(vector)?;
        if bytes.len() > out.len() {
            return Err(Error::BufferTooSmall {
                required: bytes.len(),
                capacity: out.len(),
            });
        }
        out[..bytes.len()].copy_from_slice(&bytes);
        debug!(written = bytes.len(), capacity = out.len(), "encrypted query vector");
        Ok(bytes.len())
    }
}

/// Encrypt `vector` under the public key in `public_key_dir` into `out`.
///
/// Returns the exact number of bytes written. The capacity is `out.len()`.
pub fn encrypt_vector(vector: &[u64], public_key_dir: &Path, out: &mut [u8]) -> Result<usize> {
    VectorEncryptor::from_dir(public_key_dir)?.encrypt_into(vector, out)
}

/// Like [`encrypt_vector`], returning an owned buffer of exactly the right size
pub fn encrypt_vector_to_vec(vector: &[u64], public_key_dir: &Path) -> Result<Vec<u8>> {
    VectorEncryptor::from_dir(public_key_dir)?.encrypt_to_vec(vector)
}

/// Like [`encrypt_vector`], returning base64 text ready for transport
pub fn encrypt_vector_to_text(vector: &[u64], public_key_dir: &Path) -> Result<String> {
    Ok(encode_to_text(&encrypt_vector_to_vec(vector, public_key_dir)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeyBundle;
    use crate::serialize::HEADER_LEN;

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

    fn encryptor(seed: u64) -> VectorEncryptor {
        let params = test_params();
        let mut sampler = GaussianSampler::with_seed(params.sigma, seed);
        let bundle = KeyBundle::generate(&params, &mut sampler).unwrap();
        VectorEncryptor::new(params, bundle.public_key).unwrap()
    }

    const CIPHERTEXT_LEN: usize = HEADER_LEN + 2 * 2 * 256 * 4;

    #[test]
    fn test_exact_capacity_succeeds() {
        let enc = encryptor(61);
        let mut out = vec![0u8; CIPHERTEXT_LEN];
        assert_eq!(enc.encrypt_into(&[1, 0, 0, 1], &mut out).unwrap(), CIPHERTEXT_LEN);
        assert_eq!(&out[..4], b"HESC");
    }

    #[test]
    fn test_larger_buffer_tail_is_untouched() {
        let enc = encryptor(62);
        let mut out = vec![0xAAu8; CIPHERTEXT_LEN + 100];
        let written = enc.encrypt_into(&[1, 0, 0, 1], &mut out).unwrap();
        assert_eq!(written, CIPHERTEXT_LEN);
        assert!(out[written..].iter().all(|&b| b == 0xAA));
    }

    #[test]
    fn test_small_buffer_is_not_written() {
        let enc = encryptor(63);
        let mut out = vec![0x5Au8; CIPHERTEXT_LEN - 1];

        match enc.encrypt_into(&[1, 0, 0, 1], &mut out) {
            Err(Error::BufferTooSmall { required, capacity }) => {
                assert_eq!(required, CIPHERTEXT_LEN);
                assert_eq!(capacity, CIPHERTEXT_LEN - 1);
            }
            other => panic!("expected BufferTooSmall, got {other:?}"),
        }
        assert!(out.iter().all(|&b| b == 0x5A));
    }

    #[test]
    fn test_oversized_vector_rejected() {
        let enc = encryptor(64);
        let mut out = vec![0u8; CIPHERTEXT_LEN];
        let result = enc.encrypt_into(&vec![1; 257], &mut out);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert!(out.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_full_and_empty_vectors() {
        let enc = encryptor(65);
        let full = vec![1u64; 256];
        assert_eq!(enc.encrypt_to_vec(&full).unwrap().len(), CIPHERTEXT_LEN);
        assert_eq!(enc.encrypt_to_vec(&[]).unwrap().len(), CIPHERTEXT_LEN);
    }

    #[test]
    fn test_missing_key_dir_is_key_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut out = vec![0u8; 16];
        let result = encrypt_vector(&[1], dir.path(), &mut out);
        assert!(matches!(result, Err(Error::KeyLoad(_))));
    }
}
