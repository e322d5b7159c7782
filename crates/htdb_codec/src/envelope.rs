//! On-disk framing of an encrypted snapshot.
//!
//! ```text
//! base64( MAGIC (8 bytes) || salt (8 bytes) || ciphertext )
//! ```
//!
//! This is the OpenSSL `enc` salted format, which CryptoJS also emits for
//! passphrase encryption.

use crate::error::{CodecError, CodecResult};
use crate::kdf::SALT_SIZE;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Magic marker at the start of every frame.
pub const MAGIC: [u8; 8] = *b"Salted__";

/// Size of the fixed frame header (magic plus salt).
pub const HEADER_SIZE: usize = MAGIC.len() + SALT_SIZE;

/// A decoded frame: the salt and the ciphertext it protects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Salt the key and IV were derived with.
    pub salt: [u8; SALT_SIZE],
    /// AES-256-CBC ciphertext.
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Creates an envelope from its parts.
    #[must_use]
    pub fn new(salt: [u8; SALT_SIZE], ciphertext: Vec<u8>) -> Self {
        Self { salt, ciphertext }
    }

    /// Encodes the binary frame.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_SIZE + self.ciphertext.len());
        buf.extend_from_slice(&MAGIC);
        buf.extend_from_slice(&self.salt);
        buf.extend_from_slice(&self.ciphertext);
        buf
    }

    /// Decodes a binary frame.
    ///
    /// # Errors
    ///
    /// Returns `Truncated` if the frame is shorter than the header and
    /// `InvalidMagic` if the marker does not match exactly.
    pub fn from_bytes(data: &[u8]) -> CodecResult<Self> {
        if data.len() < HEADER_SIZE {
            return Err(CodecError::Truncated { len: data.len() });
        }
        if data[..MAGIC.len()] != MAGIC {
            return Err(CodecError::InvalidMagic);
        }

        let mut salt = [0u8; SALT_SIZE];
        salt.copy_from_slice(&data[MAGIC.len()..HEADER_SIZE]);

        Ok(Self {
            salt,
            ciphertext: data[HEADER_SIZE..].to_vec(),
        })
    }

    /// Encodes the frame as printable base64 text.
    #[must_use]
    pub fn to_text(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    /// Decodes a frame from base64 text.
    ///
    /// Surrounding whitespace (such as a trailing newline) is ignored.
    pub fn from_text(text: &str) -> CodecResult<Self> {
        let bytes = STANDARD
            .decode(text.trim())
            .map_err(|e| CodecError::invalid_base64(e.to_string()))?;
        Self::from_bytes(&bytes)
    }
}
