//! Store configuration.

use htdb_codec::KeyDigest;

/// Artifact path used when the caller passes an empty path.
pub const DEFAULT_PATH: &str = "./database.ht";

/// Extension every persisted artifact path must carry.
pub const DEFAULT_EXTENSION: &str = "ht";

/// What a reload does when the artifact exists but cannot be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeFailurePolicy {
    /// Treat the store as empty and log a warning.
    ///
    /// A wrong password therefore looks like an empty store, and the next
    /// write replaces the unreadable artifact.
    #[default]
    Empty,
    /// Return [`CoreError::DecryptionFailed`](crate::CoreError::DecryptionFailed).
    Surface,
}

/// Configuration for opening a store.
#[derive(Debug, Clone)]
pub struct Config {
    /// Extension (without the dot) the artifact path must end with to be
    /// saved.
    pub required_extension: String,

    /// Behavior when the artifact cannot be decrypted or parsed.
    pub decode_failure: DecodeFailurePolicy,

    /// Digest used to derive the key and IV from the password.
    pub key_digest: KeyDigest,

    /// Whether saves write a temporary file and rename it into place.
    pub atomic_writes: bool,

    /// Whether missing parent directories are created on save.
    pub create_parent_dirs: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            required_extension: DEFAULT_EXTENSION.to_string(),
            decode_failure: DecodeFailurePolicy::Empty,
            key_digest: KeyDigest::Md5,
            atomic_writes: true,
            create_parent_dirs: true,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the required artifact extension.
    #[must_use]
    pub fn required_extension(mut self, extension: impl Into<String>) -> Self {
        self.required_extension = extension.into();
        self
    }

    /// Sets the decode failure policy.
    #[must_use]
    pub const fn decode_failure(mut self, policy: DecodeFailurePolicy) -> Self {
        self.decode_failure = policy;
        self
    }

    /// Sets the key derivation digest.
    #[must_use]
    pub const fn key_digest(mut self, digest: KeyDigest) -> Self {
        self.key_digest = digest;
        self
    }

    /// Sets whether saves are atomic.
    #[must_use]
    pub const fn atomic_writes(mut self, value: bool) -> Self {
        self.atomic_writes = value;
        self
    }

    /// Sets whether parent directories are created on save.
    #[must_use]
    pub const fn create_parent_dirs(mut self, value: bool) -> Self {
        self.create_parent_dirs = value;
        self
    }
}
