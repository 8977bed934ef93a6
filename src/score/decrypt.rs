//! Score decryption from transport text and in-memory secret key bytes

use tracing::debug;

use crate::bfv::{BatchEncoder, BfvContext, Ciphertext, Decryptor, SecretKey};
use crate::codec::decode_from_text;
use crate::error::Result;
use crate::keys::load_secret_key_from_bytes;
use crate::params::SchemeParameters;
use crate::serialize::from_bytes;

/// Returned when a decryption yields no slots
pub const NO_SCORE: i64 = -1;

/// Secret-key holder that turns result ciphertexts into scores
pub struct ScoreDecryptor {
    params: SchemeParameters,
    ctx: BfvContext,
    encoder: BatchEncoder,
    secret_key: SecretKey,
}

impl ScoreDecryptor {
    pub fn new(params: SchemeParameters, secret_key: SecretKey) -> Result<Self> {
        let ctx = BfvContext::new(&params)?;
        let encoder = BatchEncoder::new(&params);
        Ok(Self {
            params,
            ctx,
            encoder,
            secret_key,
        })
    }

    /// Parse secret key bytes under the system profile; never touches disk
    pub fn from_secret_key_bytes(bytes: &[u8]) -> Result<Self> {
        let params = SchemeParameters::system();
        let secret_key = load_secret_key_from_bytes(bytes, &params)?;
        Self::new(params, secret_key)
    }

    pub fn params(&self) -> &SchemeParameters {
        &self.params
    }

    /// All slots as centered signed integers
    pub fn decrypt_slots(&self, ct: &Ciphertext) -> Result<Vec<i64>> {
        let plain = Decryptor::new(&self.ctx, &self.secret_key).decrypt(ct)?;
        Ok(self.encoder.decode_signed(&plain))
    }

    /// Slot 0 of the decrypted result
    pub fn decrypt_score(&self, ct: &Ciphertext) -> Result<i64> {
        let slots = self.decrypt_slots(ct)?;
        Ok(slots.first().copied().unwrap_or(NO_SCORE))
    }

    /// Parse serialized ciphertext bytes, then decrypt slot 0
    pub fn decrypt_bytes(&self, bytes: &[u8]) -> Result<i64> {
        let ct: Ciphertext = from_bytes(bytes, &self.params)?;
        self.decrypt_score(&ct)
    }

    /// Remaining noise budget of `ct` in bits
    pub fn noise_budget(&self, ct: &Ciphertext) -> u32 {
        Decryptor::new(&self.ctx, &self.secret_key).invariant_noise_budget(ct)
    }
}

/// Decrypt a base64 result ciphertext with secret key bytes held in memory.
///
/// Returns slot 0 as a signed integer.
pub fn decrypt_score(encoded_ciphertext: &str, secret_key_bytes: &[u8]) -> Result<i64> {
    let bytes = decode_from_text(encoded_ciphertext)?;
    let params = SchemeParameters::system();
    let ct: Ciphertext = from_bytes(&bytes, &params)?;

    let decryptor = ScoreDecryptor::from_secret_key_bytes(secret_key_bytes)?;
    let score = decryptor.decrypt_score(&ct)?;
    debug!(score, "decrypted score");
    Ok(score)
}
