//! Key manager: generation, persistence and loading of key bundles
//!
//! One generation run produces four artifacts sharing a random key id:
//!
//! | File | Contents | Distribution |
//! |------|----------|--------------|
//! | `secret_key.k` | ternary secret s | requester only |
//! | `public_key.k` | (a, -a·s + e) | public |
//! | `relin_keys.k` | key switch s² → s | scoring engine |
//! | `gal_keys.k` | key switch τ_g(s) → s per rotation | scoring engine |

mod bundle;
mod store;

pub use bundle::KeyBundle;
pub use store::{
    generate, load_galois_keys, load_public_key, load_relin_keys, load_secret_key,
    load_secret_key_from_bytes, GALOIS_KEYS_FILE, KEY_FILES, PUBLIC_KEY_FILE, RELIN_KEYS_FILE,
    SECRET_KEY_FILE,
};
