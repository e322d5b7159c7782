//! Storage backend trait definition.

use crate::error::StorageResult;
use std::path::Path;

/// A whole-artifact storage backend for HtDB.
///
/// Backends are **opaque blob stores**. The store engine owns the artifact
/// format; a backend only reads back the last written blob or replaces it.
///
/// # Invariants
///
/// - `read` returns `None` until the first successful `write`
/// - `read` returns exactly the bytes of the last successful `write`
/// - a failed `write` leaves the previous blob readable
/// - Backends must be `Send + Sync` so a store handle can cross threads
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing
/// - [`super::FileBackend`] - For persistent storage
pub trait StorageBackend: Send + Sync {
    /// Reads the whole artifact.
    ///
    /// Returns `Ok(None)` if nothing has been written yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifact exists but cannot be read.
    fn read(&self) -> StorageResult<Option<Vec<u8>>>;

    /// Replaces the whole artifact with `data`.
    ///
    /// # Errors
    ///
    /// Returns an error if the data cannot be made durable.
    fn write(&self, data: &[u8]) -> StorageResult<()>;

    /// Returns whether an artifact currently exists.
    ///
    /// # Errors
    ///
    /// Returns an error if existence cannot be determined.
    fn exists(&self) -> StorageResult<bool>;

    /// Returns the filesystem location of the artifact, if it has one.
    fn path(&self) -> Option<&Path> {
        None
    }
}

impl<B: StorageBackend + ?Sized> StorageBackend for Box<B> {
    fn read(&self) -> StorageResult<Option<Vec<u8>>> {
        (**self).read()
    }

    fn write(&self, data: &[u8]) -> StorageResult<()> {
        (**self).write(data)
    }

    fn exists(&self) -> StorageResult<bool> {
        (**self).exists()
    }

    fn path(&self) -> Option<&Path> {
        (**self).path()
    }
}
