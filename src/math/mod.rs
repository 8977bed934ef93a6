//! Mathematical primitives for lattice-based encryption.
//!
//! - **Modular arithmetic** over Z_q, including primality checks for moduli
//! - **Number-Theoretic Transform (NTT)** per RNS limb, Montgomery form
//! - **RNS polynomials** over R_Q = Z_Q[X]/(X^n + 1)
//! - **CRT composition** back to a single integer modulo Q
//! - **Discrete Gaussian sampling** for errors and secrets
//!
//! # Example
//!
//! ```
//! use hescore::math::{GaussianSampler, NttContext, Poly};
//!
//! let moduli = [1073738753, 1073732609];
//! let ctx = NttContext::with_moduli(256, &moduli);
//! let mut sampler = GaussianSampler::with_seed(3.2, 1);
//!
//! let mut poly = Poly::sample_uniform(256, &moduli, &mut sampler);
//! poly.to_ntt(&ctx);
//! ```

pub mod crt;
pub mod gaussian;
pub mod modular;
pub mod ntt;
pub mod poly;

pub use crt::{crt_modulus, mod_inverse, CrtComposer};
pub use gaussian::{tailcut_bound, GaussianSampler, DEFAULT_SIGMA};
pub use modular::ModQ;
pub use ntt::NttContext;
pub use poly::Poly;
