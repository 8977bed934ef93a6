//! Base64 transport for ciphertext bytes
//!
//! Standard alphabet with padding. Decoding ignores ASCII whitespace so
//! line-wrapped or newline-terminated input is accepted.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::{de_err, Result};

pub fn encode_to_text(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn decode_from_text(text: &str) -> Result<Vec<u8>> {
    let compact: Vec<u8> = text
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    STANDARD
        .decode(compact)
        .map_err(|e| de_err!("invalid base64: {e}"))
}
