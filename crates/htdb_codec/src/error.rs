//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while sealing or opening an artifact.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The artifact is not valid base64 text.
    #[error("invalid base64 framing: {message}")]
    InvalidBase64 {
        /// Description of the decoding error.
        message: String,
    },

    /// The frame does not start with the expected magic marker.
    #[error("invalid magic marker")]
    InvalidMagic,

    /// The frame is shorter than its fixed header, or the ciphertext is not
    /// a whole number of cipher blocks.
    #[error("truncated frame: {len} bytes")]
    Truncated {
        /// Length of the frame or ciphertext in bytes.
        len: usize,
    },

    /// Decryption produced invalid padding (usually a wrong password).
    #[error("decryption failed")]
    DecryptionFailed,

    /// The key material could not be used to build the cipher.
    #[error("key derivation failed: {message}")]
    KeyDerivation {
        /// Description of the failure.
        message: String,
    },

    /// The snapshot could not be serialized or parsed.
    #[error("serialization failed: {message}")]
    Serialization {
        /// Description of the serialization error.
        message: String,
    },
}

impl CodecError {
    /// Create an invalid base64 error.
    pub fn invalid_base64(message: impl Into<String>) -> Self {
        Self::InvalidBase64 {
            message: message.into(),
        }
    }

    /// Create a key derivation error.
    pub fn key_derivation(message: impl Into<String>) -> Self {
        Self::KeyDerivation {
            message: message.into(),
        }
    }

    /// Create a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}
