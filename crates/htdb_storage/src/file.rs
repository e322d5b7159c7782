//! File-based storage backend for persistent storage.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::Mutex;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Suffix appended to the artifact file name for the temporary write target.
pub const TEMP_SUFFIX: &str = ".tmp";

/// A file-based storage backend.
///
/// The artifact lives in a single file. Nothing touches the filesystem until
/// the first `read` or `write`.
///
/// # Durability
///
/// With atomic writes enabled (the default), `write` uses the
/// write-then-rename pattern:
/// 1. Write to `<file>.tmp` next to the artifact
/// 2. Sync the temporary file to disk
/// 3. Rename it over the artifact
/// 4. Fsync the parent directory so the rename is durable
///
/// A crash at any point leaves either the old or the new artifact, never a
/// truncated one. With atomic writes disabled the artifact is overwritten in
/// place.
///
/// # Thread Safety
///
/// Writes through one backend are serialized by an internal lock.
///
/// # Example
///
/// ```no_run
/// use htdb_storage::{StorageBackend, FileBackend};
///
/// let backend = FileBackend::new("data/store.ht");
/// backend.write(b"persistent data").unwrap();
/// ```
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    atomic: bool,
    create_dirs: bool,
    write_lock: Mutex<()>,
}

impl FileBackend {
    /// Creates a backend for the artifact at `path`.
    ///
    /// Atomic writes and parent directory creation are enabled.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            atomic: true,
            create_dirs: true,
            write_lock: Mutex::new(()),
        }
    }

    /// Sets whether writes go through a temporary file and rename.
    #[must_use]
    pub fn atomic(mut self, value: bool) -> Self {
        self.atomic = value;
        self
    }

    /// Sets whether missing parent directories are created on write.
    #[must_use]
    pub fn create_dirs(mut self, value: bool) -> Self {
        self.create_dirs = value;
        self
    }

    /// Returns the path of the temporary file used by atomic writes.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifact path has no file name.
    pub fn temp_path(&self) -> StorageResult<PathBuf> {
        let name = self
            .path
            .file_name()
            .ok_or_else(|| StorageError::InvalidPath {
                path: self.path.clone(),
            })?;
        let mut temp_name = name.to_os_string();
        temp_name.push(TEMP_SUFFIX);
        Ok(self.path.with_file_name(temp_name))
    }

    fn parent_dir(&self) -> Option<&Path> {
        self.path.parent().filter(|p| !p.as_os_str().is_empty())
    }

    fn write_atomic(&self, data: &[u8]) -> StorageResult<()> {
        let temp_path = self.temp_path()?;

        let mut file = File::create(&temp_path)?;
        file.write_all(data)?;
        file.sync_all()?;
        drop(file);

        if let Err(err) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(err.into());
        }

        self.sync_parent()
    }

    fn write_in_place(&self, data: &[u8]) -> StorageResult<()> {
        let mut file = File::create(&self.path)?;
        file.write_all(data)?;
        file.sync_all()?;
        Ok(())
    }

    /// Syncs the parent directory so the rename reaches the disk.
    ///
    /// Windows NTFS journals metadata, so there is nothing to do there.
    #[cfg(unix)]
    fn sync_parent(&self) -> StorageResult<()> {
        let dir = self.parent_dir().unwrap_or_else(|| Path::new("."));
        File::open(dir)?.sync_all()?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_parent(&self) -> StorageResult<()> {
        Ok(())
    }
}

impl StorageBackend for FileBackend {
    fn read(&self) -> StorageResult<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, data: &[u8]) -> StorageResult<()> {
        let _guard = self.write_lock.lock();

        if self.create_dirs {
            if let Some(parent) = self.parent_dir() {
                fs::create_dir_all(parent)?;
            }
        }

        debug!(path = %self.path.display(), bytes = data.len(), atomic = self.atomic, "writing artifact");
        if self.atomic {
            self.write_atomic(data)
        } else {
            self.write_in_place(data)
        }
    }

    fn exists(&self) -> StorageResult<bool> {
        Ok(self.path.try_exists()?)
    }

    fn path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}
