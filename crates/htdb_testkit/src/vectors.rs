//! Artifact test vectors.
//!
//! Store artifacts produced outside HtDB by the OpenSSL passphrase scheme
//! (`openssl enc -aes-256-cbc -md md5 -base64`), which is also what CryptoJS
//! writes for `AES.encrypt(text, passphrase)`. Opening them proves the
//! on-disk format is interchangeable with those tools.

use htdb_core::{record, StoreState};

/// Password for every vector in this module.
pub const VECTOR_PASSWORD: &str = "password";

/// Plaintext snapshot sealed by every vector in this module.
pub const VECTOR_SNAPSHOT: &str =
    r#"{"users":{"columns":["name","email"],"records":[{"email":"j@x.com","name":"John"}]}}"#;

/// [`VECTOR_SNAPSHOT`] sealed with MD5 key derivation and salt
/// `0102030405060708`.
pub const OPENSSL_MD5_FIXED_SALT: &str = "U2FsdGVkX18BAgMEBQYHCAl/FB44hFMP7Atl6TKDKmJnQtZ0A7nBGgkSQdasyHC+I9nsLcue2mINoS/Q+Y2oFJxg9uvZZ7XlbAxCutvCBRT767ScNyE9idxI85tzoKyhFi89rE32jqSn26yQqzxWcA==";

/// [`VECTOR_SNAPSHOT`] sealed with MD5 key derivation and a random salt.
pub const OPENSSL_MD5_RANDOM_SALT: &str = "U2FsdGVkX1+YJS1wPDkWIn1wgJHimmj9Bz2k5z8bLqUnGX1IQ1DVeChnExzDiNoEQQ58xZX8lQhkIjEV3jD9WOCsK3YpWf1py4DWo7gVfsaLWzBPV+RN8KrnyOUt3ZJI4FjJvqOKcco7M6YxCM1AbQ==";

/// [`VECTOR_SNAPSHOT`] sealed with SHA-256 key derivation
/// (`-md sha256`) and salt `0102030405060708`.
pub const OPENSSL_SHA256_FIXED_SALT: &str = "U2FsdGVkX18BAgMEBQYHCG+eWWXZ4qmKVkBAhpz+geWvtoMFQrIxIwlIkGm4fHcHCiNJbNNkJVCkTY8I9PogB+Dt48wea7lvgIfmuZRjmhFRHJBi1iNtrm1MtXk6SjHYB3fszAQObnCM4p73INHupg==";

/// The store every vector decodes to.
pub fn vector_store() -> StoreState {
    let mut state = StoreState::new();
    state
        .create_table("users", vec!["name".into(), "email".into()])
        .expect("Failed to create table");
    state
        .insert("users", &record([("name", "John"), ("email", "j@x.com")]))
        .expect("Failed to insert record");
    state
}
