//! Key-switching material: relinearization and Galois keys
//!
//! A key-switching matrix K from s' to s consists of ℓ RLWE rows:
//! ```text
//! K[i] = (a_i, -a_i·s + e_i + s'·z^i),   i = 0..ℓ
//! ```
//! Relinearization keys use s' = s², Galois keys use s' = τ_g(s) for every
//! element of the default rotation set.
//!
//! To switch (a, b) from s' to s:
//! 1. Decompose a using the gadget: g⁻¹(a) = [a₀, a₁, ..., a_{ℓ-1}]
//! 2. Compute (a', b') = (0, b) + Σᵢ aᵢ · K[i]

mod keys;
mod setup;
mod switch;

pub use keys::{GaloisKeys, RelinKeys};
pub use setup::{
    generate_automorphism_ks_matrix, generate_ks_matrix, GadgetVector, KeySwitchingMatrix, KsRow,
};
pub use switch::{automorph, gadget_decompose, key_switch};
