//! Error handling for hescore
//!
//! Every internal component returns structured [`Error`] values. Only the
//! foreign boundary in [`crate::ffi`] collapses them into sentinels.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by key management, encryption and decryption.
#[derive(Debug, Error)]
pub enum Error {
    /// Unsupported ring degree or an inconsistent parameter set.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// A key artifact that was expected on disk is absent.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Key material is missing, unreadable, mismatched or inconsistent.
    #[error("key load failed: {0}")]
    KeyLoad(String),

    /// Malformed artifact bytes, or bytes produced under another profile.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The caller-owned destination cannot hold the serialized output.
    #[error("output buffer too small: {required} bytes required, capacity is {capacity}")]
    BufferTooSmall { required: usize, capacity: usize },

    /// Input rejected before any cryptographic work was done.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A stateful collaborator was used before `initialize`.
    #[error("{0} is not initialized")]
    NotInitialized(&'static str),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Self::Deserialization(err.to_string())
    }
}

impl Error {
    /// Re-tag a failure that happened while reading key material.
    ///
    /// The encrypt path reports every public key problem as [`Error::KeyLoad`],
    /// keeping the original message.
    pub(crate) fn into_key_load(self) -> Self {
        match self {
            Error::KeyLoad(msg) => Error::KeyLoad(msg),
            Error::FileNotFound(path) => {
                Error::KeyLoad(format!("{} does not exist", path.display()))
            }
            other => Error::KeyLoad(other.to_string()),
        }
    }
}

/// Result type for hescore operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Create a [`Error::Deserialization`] with format string support
macro_rules! de_err {
    ($($arg:tt)*) => {
        $crate::error::Error::Deserialization(format!($($arg)*))
    };
}

pub(crate) use de_err;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_too_small_message() {
        let err = Error::BufferTooSmall {
            required: 131_130,
            capacity: 64,
        };
        assert_eq!(
            err.to_string(),
            "output buffer too small: 131130 bytes required, capacity is 64"
        );
    }

    #[test]
    fn test_into_key_load_keeps_context() {
        let err = Error::FileNotFound(PathBuf::from("/keys/public_key.k")).into_key_load();
        match err {
            Error::KeyLoad(msg) => assert!(msg.contains("public_key.k")),
            other => panic!("unexpected variant: {other:?}"),
        }

        let err = de_err!("bad magic {:x}", 7).into_key_load();
        assert!(matches!(err, Error::KeyLoad(msg) if msg.contains("bad magic 7")));
    }
}
