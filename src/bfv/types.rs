//! BFV key, plaintext and ciphertext types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::math::{GaussianSampler, Poly};

/// Random identity shared by every artifact of one key bundle.
///
/// Written into each artifact header. A ciphertext remembers the key id of
/// the public key it was encrypted under, so decrypting with the secret key
/// of a different bundle is detected instead of producing noise.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct KeyId(pub [u8; 16]);

impl KeyId {
    /// Draw a fresh identifier
    pub fn random(sampler: &mut GaussianSampler) -> Self {
        let mut bytes = [0u8; 16];
        sampler.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyId({self})")
    }
}

/// BFV secret key: ternary polynomial s ∈ R_Q.
///
/// Serialized as one signed byte per coefficient, never as RNS residues.
#[derive(Clone)]
pub struct SecretKey {
    /// Secret polynomial, coefficient domain.
    pub poly: Poly,
    /// Bundle this key belongs to.
    pub key_id: KeyId,
}

impl SecretKey {
    /// Returns the ring dimension.
    pub fn ring_dim(&self) -> usize {
        self.poly.dimension()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("ring_dim", &self.ring_dim())
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

/// BFV public key: an encryption of zero, (a, b = -a·s + e).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PublicKey {
    /// Bundle this key belongs to, carried in the artifact header.
    #[serde(skip)]
    pub key_id: KeyId,
    /// Uniform polynomial in R_Q.
    pub a: Poly,
    /// b = -a·s + e.
    pub b: Poly,
}

/// Batched plaintext: one polynomial modulo t.
///
/// Slot values are not stored directly; see [`super::BatchEncoder`] for the
/// slot layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plaintext {
    /// Single-limb polynomial over Z_t, coefficient domain.
    pub poly: Poly,
}

impl Plaintext {
    /// The all-zero plaintext
    pub fn zero(dim: usize, plain_modulus: u64) -> Self {
        Self {
            poly: Poly::zero(dim, &[plain_modulus]),
        }
    }

    /// Plaintext modulus t
    pub fn plain_modulus(&self) -> u64 {
        self.poly.moduli()[0]
    }

    /// Coefficients in [0, t)
    pub fn coeffs(&self) -> &[u64] {
        self.poly.coeffs()
    }
}

/// BFV ciphertext (a, b) with b + a·s = Δ·m + v for small noise v.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ciphertext {
    /// Key bundle of the public key used for encryption.
    #[serde(skip)]
    pub key_id: KeyId,
    pub a: Poly,
    pub b: Poly,
}

impl Ciphertext {
    /// Returns the ring dimension.
    pub fn ring_dim(&self) -> usize {
        self.a.dimension()
    }
}
