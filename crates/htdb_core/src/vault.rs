//! Loading and saving the encrypted artifact.

use crate::config::{Config, DecodeFailurePolicy};
use crate::error::{CoreError, CoreResult};
use crate::store::StoreState;
use htdb_codec::{Codec, CodecError};
use htdb_storage::StorageBackend;
use std::path::Path;
use tracing::{debug, warn};
use zeroize::Zeroizing;

/// Binds a storage backend, the store password and the codec.
pub struct Vault {
    backend: Box<dyn StorageBackend>,
    password: Zeroizing<String>,
    codec: Codec,
    policy: DecodeFailurePolicy,
    required_extension: String,
}

impl Vault {
    /// Creates a vault over `backend`.
    pub fn new(backend: Box<dyn StorageBackend>, password: String, config: &Config) -> Self {
        Self {
            backend,
            password: Zeroizing::new(password),
            codec: Codec::new().with_digest(config.key_digest),
            policy: config.decode_failure,
            required_extension: config.required_extension.clone(),
        }
    }

    /// Returns the artifact path, if the backend has one.
    pub fn path(&self) -> Option<&Path> {
        self.backend.path()
    }

    /// Reads and decrypts the store.
    ///
    /// A missing artifact is an empty store. An artifact that fails to
    /// decode is an empty store under [`DecodeFailurePolicy::Empty`] and a
    /// [`CoreError::DecryptionFailed`] under [`DecodeFailurePolicy::Surface`].
    pub fn load(&self) -> CoreResult<StoreState> {
        let Some(bytes) = self.backend.read()? else {
            debug!("reload: no artifact, store is empty");
            return Ok(StoreState::new());
        };

        match self.decode(&bytes) {
            Ok(state) => {
                debug!(tables = state.tables().len(), "reload: artifact decoded");
                Ok(state)
            }
            Err(source) => match self.policy {
                DecodeFailurePolicy::Empty => {
                    warn!(error = %source, "reload: artifact could not be opened, treating store as empty");
                    Ok(StoreState::new())
                }
                DecodeFailurePolicy::Surface => Err(CoreError::DecryptionFailed { source }),
            },
        }
    }

    /// Encrypts and writes the store.
    ///
    /// Fails with `InvalidPath` if the artifact path lacks the required
    /// extension. Nothing is written in that case.
    pub fn save(&self, state: &StoreState) -> CoreResult<()> {
        self.check_path()?;
        let text = self.codec.encode(state, &self.password)?;
        self.backend.write(text.as_bytes())?;
        debug!(bytes = text.len(), "persist: artifact written");
        Ok(())
    }

    /// Checks the artifact path against the required extension.
    pub fn check_path(&self) -> CoreResult<()> {
        let Some(path) = self.backend.path() else {
            return Ok(());
        };
        if self.required_extension.is_empty() {
            return Ok(());
        }
        let suffix = format!(".{}", self.required_extension);
        if path.to_string_lossy().ends_with(&suffix) {
            Ok(())
        } else {
            Err(CoreError::invalid_path(path, self.required_extension.as_str()))
        }
    }

    fn decode(&self, bytes: &[u8]) -> Result<StoreState, CodecError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| CodecError::invalid_base64(format!("artifact is not text: {e}")))?;
        self.codec.decode(text, &self.password)
    }
}

impl std::fmt::Debug for Vault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault")
            .field("path", &self.backend.path())
            .field("policy", &self.policy)
            .field("required_extension", &self.required_extension)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::record;
    use htdb_storage::{FileBackend, InMemoryBackend};
    use std::sync::Arc;

    /// Shares one in-memory artifact between vaults.
    struct Shared(Arc<InMemoryBackend>);

    impl StorageBackend for Shared {
        fn read(&self) -> htdb_storage::StorageResult<Option<Vec<u8>>> {
            self.0.read()
        }
        fn write(&self, data: &[u8]) -> htdb_storage::StorageResult<()> {
            self.0.write(data)
        }
        fn exists(&self) -> htdb_storage::StorageResult<bool> {
            self.0.exists()
        }
    }

    fn vault(backend: &Arc<InMemoryBackend>, password: &str, config: &Config) -> Vault {
        Vault::new(Box::new(Shared(Arc::clone(backend))), password.into(), config)
    }

    fn sample() -> StoreState {
        let mut state = StoreState::new();
        state
            .create_table("users", vec!["name".into(), "email".into()])
            .unwrap();
        state
            .insert("users", &record([("name", "John"), ("email", "j@x.com")]))
            .unwrap();
        state
    }

    #[test]
    fn missing_artifact_is_empty() {
        let backend = Arc::new(InMemoryBackend::new());
        let v = vault(&backend, "pw", &Config::default());
        assert!(v.load().unwrap().is_empty());
    }

    #[test]
    fn save_then_load() {
        let backend = Arc::new(InMemoryBackend::new());
        let v = vault(&backend, "pw", &Config::default());
        v.save(&sample()).unwrap();

        let text = String::from_utf8(backend.data().unwrap()).unwrap();
        assert!(text.starts_with("U2FsdGVkX1"));
        assert_eq!(v.load().unwrap(), sample());
    }

    #[test]
    fn wrong_password_reads_empty_by_default() {
        let backend = Arc::new(InMemoryBackend::new());
        vault(&backend, "right", &Config::default()).save(&sample()).unwrap();

        let other = vault(&backend, "wrong", &Config::default());
        assert!(other.load().unwrap().is_empty());
    }

    #[test]
    fn wrong_password_surfaces_when_configured() {
        let backend = Arc::new(InMemoryBackend::new());
        vault(&backend, "right", &Config::default()).save(&sample()).unwrap();

        let config = Config::new().decode_failure(DecodeFailurePolicy::Surface);
        let other = vault(&backend, "wrong", &config);
        assert!(matches!(
            other.load(),
            Err(CoreError::DecryptionFailed { .. })
        ));
    }

    #[test]
    fn garbage_artifact_handling() {
        let backend = Arc::new(InMemoryBackend::with_data(vec![0xff, 0xfe, 0x00]));
        assert!(vault(&backend, "pw", &Config::default())
            .load()
            .unwrap()
            .is_empty());

        let config = Config::new().decode_failure(DecodeFailurePolicy::Surface);
        assert!(vault(&backend, "pw", &config).load().is_err());
    }

    #[test]
    fn save_rejects_wrong_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        let v = Vault::new(
            Box::new(FileBackend::new(&path)),
            "pw".into(),
            &Config::default(),
        );

        assert!(matches!(
            v.save(&sample()),
            Err(CoreError::InvalidPath { .. })
        ));
        assert!(!path.exists());
        // Loading does not check the extension.
        assert!(v.load().unwrap().is_empty());
    }

    #[test]
    fn empty_extension_accepts_any_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        let config = Config::new().required_extension("");
        let v = Vault::new(Box::new(FileBackend::new(&path)), "pw".into(), &config);

        v.save(&sample()).unwrap();
        assert_eq!(v.load().unwrap(), sample());
    }
}
