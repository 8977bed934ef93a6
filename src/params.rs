//! BFV parameter profiles
//!
//! One profile per supported ring degree. The modulus chain is two
//! NTT-friendly primes (q_i ≡ 1 mod 2n), the plaintext modulus the largest
//! 20-bit prime t ≡ 1 (mod 2n) so every profile supports batching.
//!
//! Encryption and decryption always use [`SchemeParameters::system`]; the
//! other degrees exist for key generation. Every serialized artifact embeds
//! [`SchemeParameters::fingerprint`] and is rejected under any other profile.

use byteorder::{LittleEndian, WriteBytesExt};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::math::{crt_modulus, ModQ, DEFAULT_SIGMA};

/// Ring degree shared by every encrypt and decrypt call site
pub const SYSTEM_RING_DEGREE: usize = 8192;

/// Ring degrees accepted by key generation
pub const SUPPORTED_RING_DEGREES: [usize; 5] = [2048, 4096, 8192, 16384, 32768];

/// Bit length of the batching plaintext modulus
pub const PLAIN_MODULUS_BITS: u32 = 20;

/// Bumped whenever the canonical encoding or a profile constant changes
pub const PROFILE_VERSION: u16 = 1;

/// Largest composite modulus the compact ciphertext layout can carry
const MAX_MODULUS_BITS: u32 = 63;

/// Truncated SHA-256 identity of a parameter profile
pub type Fingerprint = [u8; 16];

/// Cryptographic parameters of one BFV profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemeParameters {
    /// Ring dimension n (power of two)
    pub ring_degree: usize,

    /// RNS modulus chain, each q_i ≡ 1 (mod 2n) and below 2^32
    pub moduli: Vec<u64>,

    /// Plaintext modulus t ≡ 1 (mod 2n)
    pub plain_modulus: u64,

    /// Standard deviation for Gaussian error sampling
    pub sigma: f64,

    /// Gadget decomposition base z for key-switching keys
    pub gadget_base: u64,

    /// Number of gadget digits: ℓ = ⌈log_z(Q)⌉
    pub gadget_len: usize,

    /// Profile format version, part of the fingerprint
    pub version: u16,
}

impl SchemeParameters {
    fn profile(ring_degree: usize, moduli: [u64; 2], plain_modulus: u64) -> Self {
        let gadget_base: u64 = 1 << 20;
        let q_bits = 64 - crt_modulus(&moduli).leading_zeros();
        let gadget_len = q_bits.div_ceil(gadget_base.trailing_zeros()) as usize;

        Self {
            ring_degree,
            moduli: moduli.to_vec(),
            plain_modulus,
            sigma: DEFAULT_SIGMA,
            gadget_base,
            gadget_len,
            version: PROFILE_VERSION,
        }
    }

    /// n = 2048, Q ≈ 2^54
    pub fn bfv_d2048() -> Self {
        Self::profile(2048, [134176769, 134111233], 1032193)
    }

    /// n = 4096, Q ≈ 2^60
    pub fn bfv_d4096() -> Self {
        Self::profile(4096, [1073692673, 1073668097], 1032193)
    }

    /// n = 8192, Q ≈ 2^60 (system profile)
    pub fn bfv_d8192() -> Self {
        Self::profile(8192, [1073692673, 1073643521], 1032193)
    }

    /// n = 16384, Q ≈ 2^60
    pub fn bfv_d16384() -> Self {
        Self::profile(16384, [1073643521, 1073479681], 786433)
    }

    /// n = 32768, Q ≈ 2^60
    pub fn bfv_d32768() -> Self {
        Self::profile(32768, [1073479681, 1072496641], 786433)
    }

    /// Profile for a ring degree requested at key generation
    pub fn for_degree(ring_degree: usize) -> Result<Self> {
        match ring_degree {
            2048 => Ok(Self::bfv_d2048()),
            4096 => Ok(Self::bfv_d4096()),
            8192 => Ok(Self::bfv_d8192()),
            16384 => Ok(Self::bfv_d16384()),
            32768 => Ok(Self::bfv_d32768()),
            _ => Err(Error::InvalidParameters(format!(
                "unsupported ring degree {ring_degree}, expected one of {SUPPORTED_RING_DEGREES:?}"
            ))),
        }
    }

    /// The single profile used by every encrypt and decrypt path
    pub fn system() -> Self {
        Self::bfv_d8192()
    }

    /// Number of plaintext slots (equal to the ring degree)
    pub fn slot_count(&self) -> usize {
        self.ring_degree
    }

    /// Composite ciphertext modulus Q
    pub fn modulus(&self) -> u64 {
        crt_modulus(&self.moduli)
    }

    /// Scaling factor Δ = ⌊Q/t⌋
    pub fn delta(&self) -> u64 {
        self.modulus() / self.plain_modulus
    }

    /// Canonical little-endian encoding hashed into the fingerprint
    fn canonical_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(64);
        buf.extend_from_slice(b"hescore/bfv-profile");
        // Writes into a Vec cannot fail.
        let _ = buf.write_u16::<LittleEndian>(self.version);
        let _ = buf.write_u64::<LittleEndian>(self.ring_degree as u64);
        let _ = buf.write_u8(self.moduli.len() as u8);
        for &q in &self.moduli {
            let _ = buf.write_u64::<LittleEndian>(q);
        }
        let _ = buf.write_u64::<LittleEndian>(self.plain_modulus);
        let _ = buf.write_u64::<LittleEndian>(self.sigma.to_bits());
        let _ = buf.write_u64::<LittleEndian>(self.gadget_base);
        let _ = buf.write_u8(self.gadget_len as u8);
        buf
    }

    /// First 16 bytes of SHA-256 over the canonical profile encoding
    pub fn fingerprint(&self) -> Fingerprint {
        let digest = Sha256::digest(self.canonical_bytes());
        let mut out = [0u8; 16];
        out.copy_from_slice(&digest[..16]);
        out
    }

    /// Check if parameters are valid
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(Error::InvalidParameters(msg));
        let two_n = 2 * self.ring_degree as u64;

        if !self.ring_degree.is_power_of_two() || self.ring_degree < 16 {
            return invalid(format!(
                "ring degree {} must be a power of two >= 16",
                self.ring_degree
            ));
        }
        if self.moduli.is_empty() {
            return invalid("modulus chain is empty".into());
        }
        for (i, &q) in self.moduli.iter().enumerate() {
            if q >= 1 << 32 || !ModQ::is_prime(q) || q % two_n != 1 {
                return invalid(format!(
                    "modulus q{i} = {q} must be a prime below 2^32 with q ≡ 1 (mod {two_n})"
                ));
            }
            if self.moduli[..i].contains(&q) {
                return invalid(format!("modulus {q} appears twice in the chain"));
            }
        }
        let q_bits: u32 = self.moduli.iter().map(|q| 64 - q.leading_zeros()).sum();
        if q_bits > MAX_MODULUS_BITS {
            return invalid(format!(
                "composite modulus has {q_bits} bits, at most {MAX_MODULUS_BITS} supported"
            ));
        }
        let t = self.plain_modulus;
        if !ModQ::is_prime(t) || t % two_n != 1 {
            return invalid(format!(
                "plain modulus {t} must be a prime with t ≡ 1 (mod {two_n}) for batching"
            ));
        }
        if 64 - t.leading_zeros() != PLAIN_MODULUS_BITS {
            return invalid(format!(
                "plain modulus {t} must have {PLAIN_MODULUS_BITS} bits"
            ));
        }
        if !(self.sigma > 0.0 && self.sigma.is_finite()) {
            return invalid(format!("sigma {} must be positive", self.sigma));
        }
        if !self.gadget_base.is_power_of_two() || self.gadget_base < 2 {
            return invalid(format!(
                "gadget base {} must be a power of two",
                self.gadget_base
            ));
        }
        let covered = self.gadget_len as u32 * self.gadget_base.trailing_zeros();
        let q_exact_bits = 64 - self.modulus().leading_zeros();
        if covered < q_exact_bits {
            return invalid(format!(
                "gadget covers {covered} bits but Q has {q_exact_bits}"
            ));
        }
        Ok(())
    }
}

impl Default for SchemeParameters {
    fn default() -> Self {
        Self::system()
    }
}
