//! Relinearization and Galois key sets

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bfv::{apply_automorphism, galois_elements, BfvContext, KeyId, SecretKey};
use crate::math::GaussianSampler;
use crate::params::SchemeParameters;

use super::setup::{generate_automorphism_ks_matrix, generate_ks_matrix, GadgetVector, KeySwitchingMatrix};

/// Relinearization keys: a key-switching matrix from s² to s.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelinKeys {
    #[serde(skip)]
    pub key_id: KeyId,
    pub matrix: KeySwitchingMatrix,
}

impl RelinKeys {
    pub fn generate(ctx: &BfvContext, sk: &SecretKey, sampler: &mut GaussianSampler) -> Self {
        let gadget = GadgetVector::from_params(ctx.params());
        let s_squared = sk.poly.mul_ntt(&sk.poly, ctx.ntt());

        Self {
            key_id: sk.key_id,
            matrix: generate_ks_matrix(&s_squared, sk, &gadget, sampler, ctx),
        }
    }

    /// Largest row residual against `sk`; see [`KeySwitchingMatrix::residual_norm`].
    pub fn residual_norm(&self, ctx: &BfvContext, sk: &SecretKey) -> u64 {
        let s_squared = sk.poly.mul_ntt(&sk.poly, ctx.ntt());
        self.matrix.residual_norm(&s_squared, sk, ctx)
    }

    pub fn check_shape(&self, params: &SchemeParameters) -> Result<(), String> {
        self.matrix.check_shape(params)
    }
}

/// Galois keys: one key-switching matrix per Galois element.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GaloisKeys {
    #[serde(skip)]
    pub key_id: KeyId,
    /// Galois element -> matrix switching τ_g(s) back to s.
    pub keys: BTreeMap<usize, KeySwitchingMatrix>,
}

impl GaloisKeys {
    /// Generate keys for the default rotation set of the ring.
    ///
    /// Matrices are built in parallel, each from its own forked sampler.
    pub fn generate(ctx: &BfvContext, sk: &SecretKey, sampler: &mut GaussianSampler) -> Self {
        let gadget = GadgetVector::from_params(ctx.params());
        let jobs: Vec<(usize, GaussianSampler)> = galois_elements(ctx.ring_degree())
            .into_iter()
            .map(|g| (g, sampler.fork()))
            .collect();
        debug!(count = jobs.len(), "generating galois keys");

        let keys = jobs
            .into_par_iter()
            .map(|(g, mut local)| {
                let matrix = generate_automorphism_ks_matrix(sk, g, &gadget, &mut local, ctx);
                (g, matrix)
            })
            .collect();

        Self {
            key_id: sk.key_id,
            keys,
        }
    }

    /// Matrix for Galois element `g`, if present
    pub fn get(&self, g: usize) -> Option<&KeySwitchingMatrix> {
        self.keys.get(&g)
    }

    /// Galois elements covered, ascending
    pub fn elements(&self) -> Vec<usize> {
        self.keys.keys().copied().collect()
    }

    /// Largest row residual over all matrices against `sk`.
    pub fn residual_norm(&self, ctx: &BfvContext, sk: &SecretKey) -> u64 {
        self.keys
            .par_iter()
            .map(|(&g, matrix)| {
                let auto_s = apply_automorphism(&sk.poly, g);
                matrix.residual_norm(&auto_s, sk, ctx)
            })
            .max()
            .unwrap_or(0)
    }

    /// Element set must equal the default rotation set for the profile.
    pub fn check_shape(&self, params: &SchemeParameters) -> Result<(), String> {
        let expected = galois_elements(params.ring_degree);
        let found = self.elements();
        if found != expected {
            return Err(format!(
                "galois elements {found:?} do not match the expected set {expected:?}"
            ));
        }
        for (g, matrix) in &self.keys {
            matrix
                .check_shape(params)
                .map_err(|e| format!("galois element {g}: {e}"))?;
        }
        Ok(())
    }
}
