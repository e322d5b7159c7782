//! Test fixtures and store helpers.
//!
//! Provides convenience functions for setting up test stores
//! and common test scenarios.

use htdb_core::{Config, Database};
use std::path::{Path, PathBuf};
use std::sync::Once;
use tempfile::TempDir;

/// Password used by every fixture store.
pub const TEST_PASSWORD: &str = "testkit-password";

/// A test store with automatic cleanup.
pub struct TestStore {
    /// The store handle.
    pub db: Database,
    /// The temporary directory (kept alive to prevent cleanup).
    temp_dir: Option<TempDir>,
}

impl TestStore {
    /// Creates a new in-memory test store.
    pub fn memory() -> Self {
        Self {
            db: Database::open_in_memory(TEST_PASSWORD).expect("Failed to open in-memory store"),
            temp_dir: None,
        }
    }

    /// Creates a new file-backed test store in a temporary directory.
    pub fn file() -> Self {
        Self::file_with_config(Config::default())
    }

    /// Creates a new file-backed test store with a custom configuration.
    pub fn file_with_config(config: Config) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("test.ht");
        let db = Database::open_with_config(&path, TEST_PASSWORD, config)
            .expect("Failed to open file store");

        Self {
            db,
            temp_dir: Some(temp_dir),
        }
    }

    /// Returns the artifact path if file-backed, None if in-memory.
    pub fn path(&self) -> Option<PathBuf> {
        self.temp_dir.as_ref().map(|d| d.path().join("test.ht"))
    }

    /// Opens a second handle on the same artifact.
    ///
    /// # Panics
    ///
    /// Panics for in-memory stores.
    pub fn reopen(&self, password: &str) -> Database {
        let path = self.path().expect("Only file stores can be reopened");
        Database::open(path, password).expect("Failed to reopen store")
    }
}

impl std::ops::Deref for TestStore {
    type Target = Database;

    fn deref(&self) -> &Self::Target {
        &self.db
    }
}

/// Runs a test with a temporary in-memory store.
///
/// # Example
///
/// ```rust
/// use htdb_testkit::with_temp_store;
///
/// with_temp_store(|db| {
///     db.create_table("test", ["a"]).unwrap();
///     assert!(db.has_table("test").unwrap());
/// });
/// ```
pub fn with_temp_store<F, R>(f: F) -> R
where
    F: FnOnce(&Database) -> R,
{
    let store = TestStore::memory();
    f(&store.db)
}

/// Runs a test with a temporary file-backed store.
pub fn with_file_store<F, R>(f: F) -> R
where
    F: FnOnce(&Database, &Path) -> R,
{
    let store = TestStore::file();
    let path = store.path().expect("File store should have a path");
    f(&store.db, &path)
}

/// Installs a `tracing` subscriber for tests, once per process.
///
/// The filter comes from `RUST_LOG` and defaults to `warn`.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;
    use htdb_core::record;

    /// Creates a store with a `users` table holding `count` records.
    pub fn populated_store(count: usize) -> TestStore {
        let store = TestStore::memory();
        store
            .create_table("users", ["name", "email"])
            .expect("Failed to create table");

        for i in 0..count {
            store
                .insert(
                    "users",
                    record([
                        ("name", format!("user{i}")),
                        ("email", format!("user{i}@example.com")),
                    ]),
                )
                .expect("Failed to insert record");
        }

        store
    }

    /// Creates a store with `table_count` tables of one record each.
    pub fn multi_table_store(table_count: usize) -> TestStore {
        let store = TestStore::memory();

        for i in 0..table_count {
            let name = format!("table_{i}");
            store
                .create_table(&name, ["index"])
                .expect("Failed to create table");
            store
                .insert(&name, record([("index", i + 1)]))
                .expect("Failed to insert record");
        }

        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store() {
        let store = TestStore::memory();
        assert!(store.path().is_none());
        assert!(store.table_names().unwrap().is_empty());
    }

    #[test]
    fn file_store_reopens() {
        let store = TestStore::file();
        store.create_table("t", ["a"]).unwrap();

        let again = store.reopen(TEST_PASSWORD);
        assert!(again.has_table("t").unwrap());
    }

    #[test]
    fn with_file_store_passes_path() {
        with_file_store(|db, path| {
            db.create_table("t", ["a"]).unwrap();
            assert!(path.exists());
        });
    }

    #[test]
    fn populated_scenario() {
        init_tracing();
        let store = scenarios::populated_store(10);
        assert_eq!(store.record_count("users").unwrap(), 10);
    }

    #[test]
    fn multi_table_scenario() {
        let store = scenarios::multi_table_store(3);
        assert_eq!(store.table_names().unwrap().len(), 3);
        assert_eq!(store.record_count("table_2").unwrap(), 1);
    }
}
