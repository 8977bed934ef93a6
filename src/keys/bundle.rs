//! Key bundle generation and consistency checks

use std::time::Instant;

use tracing::{debug, info};

use crate::bfv::{BfvContext, KeyId, PublicKey, SecretKey};
use crate::error::{Error, Result};
use crate::ks::{GaloisKeys, RelinKeys};
use crate::math::{tailcut_bound, GaussianSampler};
use crate::params::SchemeParameters;

/// Everything produced by one key generation run
#[derive(Clone, Debug)]
pub struct KeyBundle {
    pub params: SchemeParameters,
    pub key_id: KeyId,
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
    pub relin_keys: RelinKeys,
    pub galois_keys: GaloisKeys,
}

impl KeyBundle {
    /// Sample a fresh bundle under `params`
    pub fn generate(params: &SchemeParameters, sampler: &mut GaussianSampler) -> Result<Self> {
        let ctx = BfvContext::new(params)?;
        let start = Instant::now();

        let key_id = KeyId::random(sampler);
        let secret_key = SecretKey::generate(&ctx, key_id, sampler);
        let public_key = PublicKey::generate(&ctx, &secret_key, sampler);
        let relin_keys = RelinKeys::generate(&ctx, &secret_key, sampler);
        debug!(elapsed_ms = start.elapsed().as_millis() as u64, "public and relinearization keys ready");

        let galois_keys = GaloisKeys::generate(&ctx, &secret_key, sampler);
        info!(
            %key_id,
            ring_degree = params.ring_degree,
            galois_elements = galois_keys.keys.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "generated key bundle"
        );

        Ok(Self {
            params: params.clone(),
            key_id,
            secret_key,
            public_key,
            relin_keys,
            galois_keys,
        })
    }

    /// Check that every artifact belongs to this bundle and matches the secret key.
    ///
    /// The public key and every key-switching row are opened with the secret
    /// key; each residual must stay within the sampler tail bound.
    pub fn validate(&self) -> Result<()> {
        let ctx = BfvContext::new(&self.params)?;
        let bound = tailcut_bound(self.params.sigma);

        let ids = [
            ("secret key", self.secret_key.key_id),
            ("public key", self.public_key.key_id),
            ("relinearization keys", self.relin_keys.key_id),
            ("galois keys", self.galois_keys.key_id),
        ];
        if let Some((name, id)) = ids.iter().find(|(_, id)| *id != self.key_id) {
            return Err(Error::KeyLoad(format!(
                "{name} belongs to bundle {id}, expected {}",
                self.key_id
            )));
        }

        let checks = [
            ("public key", self.public_key.residual_norm(&ctx, &self.secret_key)),
            ("relinearization keys", self.relin_keys.residual_norm(&ctx, &self.secret_key)),
            ("galois keys", self.galois_keys.residual_norm(&ctx, &self.secret_key)),
        ];
        for (name, residual) in checks {
            debug!(artifact = name, residual, bound, "residual check");
            if residual > bound {
                return Err(Error::KeyLoad(format!(
                    "{name} do not match the secret key: residual {residual} exceeds {bound}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn test_generated_bundle_validates() {
        let params = test_params();
        let mut sampler = GaussianSampler::with_seed(params.sigma, 41);
        let bundle = KeyBundle::generate(&params, &mut sampler).unwrap();

        assert_eq!(bundle.secret_key.key_id, bundle.key_id);
        assert_eq!(bundle.galois_keys.keys.len(), crate::bfv::galois_elements(256).len());
        bundle.validate().unwrap();
    }

    #[test]
    fn test_swapped_public_key_fails_validation() {
        let params = test_params();
        let mut sampler = GaussianSampler::with_seed(params.sigma, 42);
        let mut bundle = KeyBundle::generate(&params, &mut sampler).unwrap();
        let other = KeyBundle::generate(&params, &mut sampler).unwrap();

        bundle.public_key = other.public_key.clone();
        assert!(matches!(bundle.validate(), Err(Error::KeyLoad(_))));

        // Same key id but foreign material is caught by the residual check
        bundle.public_key.key_id = bundle.key_id;
        assert!(matches!(bundle.validate(), Err(Error::KeyLoad(_))));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let mut params = test_params();
        params.plain_modulus = 65537;
        let mut sampler = GaussianSampler::with_seed(3.2, 43);
        assert!(matches!(
            KeyBundle::generate(&params, &mut sampler),
            Err(Error::InvalidParameters(_))
        ));
    }
}
