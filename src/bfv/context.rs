//! Precomputed per-profile state

use crate::error::{Error, Result};
use crate::math::{CrtComposer, NttContext};
use crate::params::{Fingerprint, SchemeParameters};

/// Everything derived once from a validated [`SchemeParameters`].
///
/// Cheap to share by reference across threads; every operation that needs
/// ring arithmetic over Q borrows one.
#[derive(Debug, Clone)]
pub struct BfvContext {
    params: SchemeParameters,
    ntt: NttContext,
    composer: CrtComposer,
    fingerprint: Fingerprint,
}

impl BfvContext {
    /// Validate `params` and precompute NTT tables and CRT constants.
    pub fn new(params: &SchemeParameters) -> Result<Self> {
        params.validate()?;

        let composer = CrtComposer::new(&params.moduli).ok_or_else(|| {
            Error::InvalidParameters("modulus chain is not pairwise coprime".into())
        })?;

        Ok(Self {
            params: params.clone(),
            ntt: NttContext::with_moduli(params.ring_degree, &params.moduli),
            composer,
            fingerprint: params.fingerprint(),
        })
    }

    pub fn params(&self) -> &SchemeParameters {
        &self.params
    }

    pub fn ntt(&self) -> &NttContext {
        &self.ntt
    }

    pub fn composer(&self) -> &CrtComposer {
        &self.composer
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    pub fn ring_degree(&self) -> usize {
        self.params.ring_degree
    }

    pub fn moduli(&self) -> &[u64] {
        &self.params.moduli
    }
}
