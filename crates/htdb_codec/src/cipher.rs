//! AES-256-CBC with PKCS#7 padding.

use crate::error::{CodecError, CodecResult};
use crate::kdf::KeyMaterial;
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};

/// AES block size in bytes.
pub const BLOCK_SIZE: usize = 16;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Encrypts `plaintext` under the derived key and IV.
///
/// The output is always a non-empty multiple of [`BLOCK_SIZE`].
pub fn encrypt(material: &KeyMaterial, plaintext: &[u8]) -> CodecResult<Vec<u8>> {
    let encryptor = Aes256CbcEnc::new_from_slices(material.key(), material.iv())
        .map_err(|e| CodecError::key_derivation(e.to_string()))?;
    Ok(encryptor.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

/// Decrypts `ciphertext` and strips its padding.
///
/// # Errors
///
/// - `Truncated` if the ciphertext is empty or not block aligned
/// - `DecryptionFailed` if the padding is invalid, which is what a wrong
///   password looks like
pub fn decrypt(material: &KeyMaterial, ciphertext: &[u8]) -> CodecResult<Vec<u8>> {
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(CodecError::Truncated {
            len: ciphertext.len(),
        });
    }

    let decryptor = Aes256CbcDec::new_from_slices(material.key(), material.iv())
        .map_err(|e| CodecError::key_derivation(e.to_string()))?;
    decryptor
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CodecError::DecryptionFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kdf::KeyDigest;

    fn material(password: &[u8]) -> KeyMaterial {
        KeyMaterial::derive(password, &[9; 8], KeyDigest::Md5)
    }

    #[test]
    fn encrypt_then_decrypt() {
        let m = material(b"pw");
        let ciphertext = encrypt(&m, b"secret payload").unwrap();
        assert_eq!(ciphertext.len() % BLOCK_SIZE, 0);
        assert_eq!(decrypt(&m, &ciphertext).unwrap(), b"secret payload");
    }

    #[test]
    fn empty_plaintext_is_one_padding_block() {
        let m = material(b"pw");
        let ciphertext = encrypt(&m, b"").unwrap();
        assert_eq!(ciphertext.len(), BLOCK_SIZE);
        assert!(decrypt(&m, &ciphertext).unwrap().is_empty());
    }

    #[test]
    fn unaligned_ciphertext_is_truncated() {
        let m = material(b"pw");
        assert_eq!(
            decrypt(&m, &[0u8; 15]),
            Err(CodecError::Truncated { len: 15 })
        );
        assert_eq!(decrypt(&m, &[]), Err(CodecError::Truncated { len: 0 }));
    }

    #[test]
    fn wrong_key_never_returns_plaintext() {
        let ciphertext = encrypt(&material(b"right"), b"a fairly long secret message").unwrap();
        match decrypt(&material(b"wrong"), &ciphertext) {
            Err(CodecError::DecryptionFailed) => {}
            // Garbage with accidentally valid padding is possible but must
            // never equal the original.
            Ok(garbage) => assert_ne!(garbage, b"a fairly long secret message"),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
}
