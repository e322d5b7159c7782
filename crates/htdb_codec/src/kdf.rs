//! Password-based key and IV derivation.
//!
//! The derivation is the OpenSSL `EVP_BytesToKey` scheme with one round per
//! block:
//!
//! ```text
//! D_1 = H(password || salt)
//! D_i = H(D_{i-1} || password || salt)
//! material = D_1 || D_2 || ...   (truncated to KEY_SIZE + IV_SIZE)
//! key = material[..KEY_SIZE], iv = material[KEY_SIZE..]
//! ```
//!
//! The same password and salt always yield the same key and IV, which is what
//! lets a reader re-derive them from the salt stored in the frame.

use md5::Md5;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Size of the AES-256 key in bytes.
pub const KEY_SIZE: usize = 32;
/// Size of the CBC initialization vector in bytes.
pub const IV_SIZE: usize = 16;
/// Size of the per-save salt in bytes.
pub const SALT_SIZE: usize = 8;

/// Digest used by the key derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyDigest {
    /// MD5, as used by CryptoJS and OpenSSL before 1.1.0.
    #[default]
    Md5,
    /// SHA-256, the default of `openssl enc` since 1.1.0.
    Sha256,
}

/// Derived key material for AES-256-CBC.
///
/// Zeroized when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial {
    key: [u8; KEY_SIZE],
    iv: [u8; IV_SIZE],
}

impl KeyMaterial {
    /// Derives the key and IV for `password` and `salt`.
    #[must_use]
    pub fn derive(password: &[u8], salt: &[u8], digest: KeyDigest) -> Self {
        let material = match digest {
            KeyDigest::Md5 => bytes_to_key::<Md5>(password, salt, KEY_SIZE + IV_SIZE),
            KeyDigest::Sha256 => bytes_to_key::<Sha256>(password, salt, KEY_SIZE + IV_SIZE),
        };

        let mut key = [0u8; KEY_SIZE];
        let mut iv = [0u8; IV_SIZE];
        key.copy_from_slice(&material[..KEY_SIZE]);
        iv.copy_from_slice(&material[KEY_SIZE..]);
        Self { key, iv }
    }

    /// Returns the cipher key.
    ///
    /// # Security
    ///
    /// Don't log or serialize the result.
    #[must_use]
    pub fn key(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }

    /// Returns the initialization vector.
    #[must_use]
    pub fn iv(&self) -> &[u8; IV_SIZE] {
        &self.iv
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("key", &"[REDACTED]")
            .field("iv", &"[REDACTED]")
            .finish()
    }
}

/// Produces `len` bytes of material by chaining digests of
/// `(previous digest, password, salt)`.
pub fn bytes_to_key<D: Digest>(password: &[u8], salt: &[u8], len: usize) -> Zeroizing<Vec<u8>> {
    let mut material = Zeroizing::new(Vec::with_capacity(len + <D as Digest>::output_size()));
    let mut previous = Zeroizing::new(Vec::new());

    while material.len() < len {
        let mut hasher = D::new();
        hasher.update(previous.as_slice());
        hasher.update(password);
        hasher.update(salt);
        let block = hasher.finalize();

        material.extend_from_slice(&block);
        previous.clear();
        previous.extend_from_slice(&block);
    }

    material.truncate(len);
    material
}
