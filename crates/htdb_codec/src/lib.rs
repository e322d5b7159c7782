//! # HtDB Codec
//!
//! Password-encrypted snapshot codec for HtDB.
//!
//! A snapshot is serialized to JSON, encrypted with AES-256-CBC under a key
//! and IV derived from the password and a fresh random salt, and framed as
//! base64 text in the OpenSSL salted format:
//!
//! ```text
//! base64( "Salted__" || salt (8 bytes) || AES-256-CBC(json) )
//! ```
//!
//! Artifacts are interchangeable with `openssl enc -aes-256-cbc -md md5` and
//! with CryptoJS passphrase encryption.
//!
//! ## Usage
//!
//! ```
//! use htdb_codec::Codec;
//! use std::collections::BTreeMap;
//!
//! let codec = Codec::new();
//! let mut snapshot = BTreeMap::new();
//! snapshot.insert("answer".to_string(), 42);
//!
//! let text = codec.encode(&snapshot, "password").unwrap();
//! let decoded: BTreeMap<String, i32> = codec.decode(&text, "password").unwrap();
//! assert_eq!(decoded, snapshot);
//!
//! assert!(codec.decode::<BTreeMap<String, i32>>(&text, "wrong").is_err());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cipher;
mod envelope;
mod error;
mod kdf;

pub use cipher::{decrypt, encrypt, BLOCK_SIZE};
pub use envelope::{Envelope, HEADER_SIZE, MAGIC};
pub use error::{CodecError, CodecResult};
pub use kdf::{bytes_to_key, KeyDigest, KeyMaterial, IV_SIZE, KEY_SIZE, SALT_SIZE};

use rand::RngCore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use zeroize::Zeroizing;

/// Seals and opens encrypted snapshots.
#[derive(Debug, Clone, Copy, Default)]
pub struct Codec {
    digest: KeyDigest,
}

impl Codec {
    /// Creates a codec using the MD5 key derivation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the digest used for key derivation.
    #[must_use]
    pub const fn with_digest(mut self, digest: KeyDigest) -> Self {
        self.digest = digest;
        self
    }

    /// Returns the digest used for key derivation.
    #[must_use]
    pub const fn digest(&self) -> KeyDigest {
        self.digest
    }

    /// Encrypts `plaintext` with a fresh random salt and frames it as text.
    pub fn seal(&self, plaintext: &[u8], password: &str) -> CodecResult<String> {
        let mut salt = [0u8; SALT_SIZE];
        rand::thread_rng().fill_bytes(&mut salt);
        self.seal_with_salt(plaintext, password, salt)
    }

    /// Encrypts `plaintext` with the given salt.
    ///
    /// Salts must never be reused across saves; this exists for reproducible
    /// test vectors.
    pub fn seal_with_salt(
        &self,
        plaintext: &[u8],
        password: &str,
        salt: [u8; SALT_SIZE],
    ) -> CodecResult<String> {
        let material = KeyMaterial::derive(password.as_bytes(), &salt, self.digest);
        let ciphertext = encrypt(&material, plaintext)?;
        Ok(Envelope::new(salt, ciphertext).to_text())
    }

    /// Opens a framed artifact and returns the plaintext.
    ///
    /// # Errors
    ///
    /// Fails on bad base64, a short frame, a wrong magic marker, or a
    /// decryption failure (wrong password or corrupted ciphertext).
    pub fn open(&self, text: &str, password: &str) -> CodecResult<Zeroizing<Vec<u8>>> {
        let envelope = Envelope::from_text(text)?;
        let material = KeyMaterial::derive(password.as_bytes(), &envelope.salt, self.digest);
        decrypt(&material, &envelope.ciphertext).map(Zeroizing::new)
    }

    /// Serializes `value` to JSON and seals it.
    pub fn encode<T: Serialize + ?Sized>(&self, value: &T, password: &str) -> CodecResult<String> {
        let json = Zeroizing::new(serde_json::to_vec(value)?);
        self.seal(&json, password)
    }

    /// Opens an artifact and parses the JSON snapshot inside.
    ///
    /// # Errors
    ///
    /// Any failure of [`open`](Self::open), plus `Serialization` when the
    /// plaintext is not valid UTF-8 JSON of the expected shape.
    pub fn decode<T: DeserializeOwned>(&self, text: &str, password: &str) -> CodecResult<T> {
        let plaintext = self.open(text, password)?;
        Ok(serde_json::from_slice(&plaintext)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::{json, Value};

    const SNAPSHOT: &str =
        r#"{"users":{"columns":["name","email"],"records":[{"email":"j@x.com","name":"John"}]}}"#;

    // Produced by `openssl enc -aes-256-cbc -md md5 -pass pass:password` with
    // salt 0102030405060708, framed with the Salted__ header.
    const OPENSSL_MD5: &str = "U2FsdGVkX18BAgMEBQYHCAl/FB44hFMP7Atl6TKDKmJnQtZ0A7nBGgkSQdasyHC+I9nsLcue2mINoS/Q+Y2oFJxg9uvZZ7XlbAxCutvCBRT767ScNyE9idxI85tzoKyhFi89rE32jqSn26yQqzxWcA==";

    // Same, with `-md sha256`.
    const OPENSSL_SHA256: &str = "U2FsdGVkX18BAgMEBQYHCG+eWWXZ4qmKVkBAhpz+geWvtoMFQrIxIwlIkGm4fHcHCiNJbNNkJVCkTY8I9PogB+Dt48wea7lvgIfmuZRjmhFRHJBi1iNtrm1MtXk6SjHYB3fszAQObnCM4p73INHupg==";

    // Random salt, as written by `openssl enc ... -base64 -A`.
    const OPENSSL_RANDOM_SALT: &str = "U2FsdGVkX1+YJS1wPDkWIn1wgJHimmj9Bz2k5z8bLqUnGX1IQ1DVeChnExzDiNoEQQ58xZX8lQhkIjEV3jD9WOCsK3YpWf1py4DWo7gVfsaLWzBPV+RN8KrnyOUt3ZJI4FjJvqOKcco7M6YxCM1AbQ==";

    const SALT: [u8; SALT_SIZE] = [1, 2, 3, 4, 5, 6, 7, 8];

    #[test]
    fn seal_matches_openssl_vector() {
        let text = Codec::new()
            .seal_with_salt(SNAPSHOT.as_bytes(), "password", SALT)
            .unwrap();
        assert_eq!(text, OPENSSL_MD5);
    }

    #[test]
    fn seal_matches_openssl_sha256_vector() {
        let text = Codec::new()
            .with_digest(KeyDigest::Sha256)
            .seal_with_salt(SNAPSHOT.as_bytes(), "password", SALT)
            .unwrap();
        assert_eq!(text, OPENSSL_SHA256);
    }

    #[test]
    fn opens_openssl_artifact() {
        let plaintext = Codec::new().open(OPENSSL_RANDOM_SALT, "password").unwrap();
        assert_eq!(plaintext.as_slice(), SNAPSHOT.as_bytes());
    }

    #[test]
    fn decodes_openssl_artifact_as_json() {
        let value: Value = Codec::new().decode(OPENSSL_MD5, "password").unwrap();
        assert_eq!(value["users"]["records"][0]["name"], json!("John"));
    }

    #[test]
    fn digest_mismatch_fails() {
        let result = Codec::new()
            .with_digest(KeyDigest::Sha256)
            .decode::<Value>(OPENSSL_MD5, "password");
        assert!(result.is_err());
    }

    #[test]
    fn fresh_salt_per_seal() {
        let codec = Codec::new();
        let a = codec.seal(b"same", "pw").unwrap();
        let b = codec.seal(b"same", "pw").unwrap();
        assert_ne!(a, b);

        let salt_a = Envelope::from_text(&a).unwrap().salt;
        let salt_b = Envelope::from_text(&b).unwrap().salt;
        assert_ne!(salt_a, salt_b);
    }

    #[test]
    fn wrong_password_is_an_error() {
        let codec = Codec::new();
        let text = codec.encode(&json!({"t": {"columns": [], "records": []}}), "right").unwrap();
        assert!(codec.decode::<Value>(&text, "wrong").is_err());
    }

    #[test]
    fn non_json_plaintext_is_serialization_error() {
        let codec = Codec::new();
        let text = codec.seal(b"definitely not json", "pw").unwrap();
        assert!(matches!(
            codec.decode::<Value>(&text, "pw"),
            Err(CodecError::Serialization { .. })
        ));
    }

    #[test]
    fn garbage_text_is_rejected() {
        let codec = Codec::new();
        assert!(codec.decode::<Value>("", "pw").is_err());
        assert!(codec.decode::<Value>("U2FsdGVkX18=", "pw").is_err());
        assert_eq!(
            codec.decode::<Value>("AAAAAAAAAAAAAAAAAAAAAA==", "pw"),
            Err(CodecError::InvalidMagic)
        );
    }

    #[test]
    fn floats_round_trip_bit_exact() {
        let codec = Codec::new();
        let floats = vec![1.0715660391465826e-75, 0.1 + 0.2, 5e-324, -1.7976931348623157e308];
        let text = codec.encode(&floats, "pw").unwrap();
        let decoded: Vec<f64> = codec.decode(&text, "pw").unwrap();
        let bits = |v: &[f64]| v.iter().map(|f| f.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&decoded), bits(&floats));
    }

    fn json_leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| json!(n)),
            any::<f64>()
                .prop_filter("finite", |f| f.is_finite())
                .prop_map(|f| json!(f)),
            ".{0,16}".prop_map(Value::String),
        ]
    }

    proptest! {
        #[test]
        fn roundtrip_arbitrary_json(
            entries in prop::collection::btree_map("[a-z]{1,8}", json_leaf(), 0..8),
            password in ".{0,24}",
        ) {
            let codec = Codec::new();
            let text = codec.encode(&entries, &password).unwrap();
            let decoded: std::collections::BTreeMap<String, Value> =
                codec.decode(&text, &password).unwrap();
            prop_assert_eq!(decoded, entries);
        }
    }
}
