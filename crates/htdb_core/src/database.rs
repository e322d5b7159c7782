//! Database facade and the write drain.

use crate::config::{Config, DecodeFailurePolicy, DEFAULT_PATH};
use crate::error::{CoreError, CoreResult};
use crate::migration::{
    MigrationDescriptor, MigrationRecord, MigrationState, MIGRATIONS_TABLE, MIGRATION_COLUMNS,
};
use crate::mutation::{Admission, MigrationBody, Mutation, MutationQueue, Operation};
use crate::query::Predicate;
use crate::record::{Record, Value};
use crate::store::StoreState;
use crate::vault::Vault;
use htdb_storage::{FileBackend, InMemoryBackend, StorageBackend};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// The main store handle.
///
/// `Database` is the entry point for HtDB. It provides:
/// - Table and column management
/// - Record insert, update, delete and select
/// - At-most-once migrations
///
/// Every operation reloads the store from its encrypted artifact. Writes go
/// through a single-flight queue: the first writer drains it, applying each
/// queued write as reload, mutate, persist. Reads are not queued.
///
/// # Opening a Store
///
/// ```rust,no_run
/// use htdb_core::{Database, Predicate, record};
///
/// let db = Database::open("data/app.ht", "secret")?;
/// db.create_table_if_not_exists("users", ["name", "email"])?;
/// db.insert("users", record([("name", "John"), ("email", "j@x.com")]))?;
///
/// let johns = db.select("users", &Predicate::new().eq("name", "John"))?;
/// assert_eq!(johns.len(), 1);
/// # Ok::<(), htdb_core::CoreError>(())
/// ```
///
/// # Thread Safety
///
/// `Database` is `Send + Sync`. A write submitted while another thread is
/// draining is queued and the call returns at once; its effect becomes
/// visible when the drainer reaches it, and its error (if any) goes to the
/// drainer.
pub struct Database {
    /// Configuration.
    config: Config,
    /// Artifact access.
    vault: Vault,
    /// Pending writes.
    queue: Mutex<MutationQueue>,
    /// Migrations registered through this handle.
    migrations: Mutex<MigrationState>,
    /// Whether `enable_migrations` has been called.
    migrations_enabled: AtomicBool,
}

impl Database {
    /// Opens the store at `path` with the default configuration.
    ///
    /// An empty path means [`DEFAULT_PATH`]. The file is not touched until
    /// the first operation.
    ///
    /// # Errors
    ///
    /// Never fails with the default configuration; see
    /// [`open_with_config`](Self::open_with_config).
    pub fn open(path: impl AsRef<Path>, password: impl Into<String>) -> CoreResult<Self> {
        Self::open_with_config(path, password, Config::default())
    }

    /// Opens the store at `path` with a custom configuration.
    ///
    /// # Errors
    ///
    /// With [`DecodeFailurePolicy::Surface`], fails if the artifact exists
    /// and cannot be opened with `password`.
    pub fn open_with_config(
        path: impl AsRef<Path>,
        password: impl Into<String>,
        config: Config,
    ) -> CoreResult<Self> {
        let path = path.as_ref();
        let path = if path.as_os_str().is_empty() {
            Path::new(DEFAULT_PATH)
        } else {
            path
        };
        let backend = FileBackend::new(path)
            .atomic(config.atomic_writes)
            .create_dirs(config.create_parent_dirs);
        Self::open_with_backend(Box::new(backend), password, config)
    }

    /// Opens a store over any storage backend.
    pub fn open_with_backend(
        backend: Box<dyn StorageBackend>,
        password: impl Into<String>,
        config: Config,
    ) -> CoreResult<Self> {
        let vault = Vault::new(backend, password.into(), &config);
        if config.decode_failure == DecodeFailurePolicy::Surface {
            vault.load()?;
        }
        debug!(path = ?vault.path(), "store opened");

        Ok(Self {
            config,
            vault,
            queue: Mutex::new(MutationQueue::new()),
            migrations: Mutex::new(MigrationState::new()),
            migrations_enabled: AtomicBool::new(false),
        })
    }

    /// Opens an empty store held in memory.
    pub fn open_in_memory(password: impl Into<String>) -> CoreResult<Self> {
        Self::open_with_backend(Box::new(InMemoryBackend::new()), password, Config::default())
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the artifact path, if the store is file-backed.
    pub fn path(&self) -> Option<&Path> {
        self.vault.path()
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Returns the matching records of `table`, in table order.
    pub fn select(&self, table: &str, predicate: &Predicate) -> CoreResult<Vec<Record>> {
        self.reload()?.select(table, predicate)
    }

    /// Returns every record of `table`.
    pub fn select_all(&self, table: &str) -> CoreResult<Vec<Record>> {
        self.select(table, &Predicate::all())
    }

    /// Returns the whole store.
    pub fn read_tables(&self) -> CoreResult<StoreState> {
        self.reload()
    }

    /// Returns the table names in lexicographic order.
    pub fn table_names(&self) -> CoreResult<Vec<String>> {
        Ok(self.reload()?.table_names())
    }

    /// Returns the columns of `table` in schema order.
    pub fn column_names(&self, table: &str) -> CoreResult<Vec<String>> {
        self.reload()?.column_names(table)
    }

    /// Returns the number of records in `table`.
    pub fn record_count(&self, table: &str) -> CoreResult<usize> {
        self.reload()?.record_count(table)
    }

    /// Returns true if `table` exists.
    pub fn has_table(&self, table: &str) -> CoreResult<bool> {
        Ok(self.reload()?.contains(table))
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Creates a table. Fails with `AlreadyExists` if it exists.
    pub fn create_table<I, S>(&self, table: &str, columns: I) -> CoreResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.submit(Operation::CreateTable {
            table: table.to_string(),
            columns: columns.into_iter().map(Into::into).collect(),
            if_not_exists: false,
        })
    }

    /// Creates a table unless it exists.
    pub fn create_table_if_not_exists<I, S>(&self, table: &str, columns: I) -> CoreResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.submit(Operation::CreateTable {
            table: table.to_string(),
            columns: columns.into_iter().map(Into::into).collect(),
            if_not_exists: true,
        })
    }

    /// Deletes a table. Fails with `NotFound` if it is absent.
    pub fn delete_table(&self, table: &str) -> CoreResult<()> {
        self.submit(Operation::DeleteTable {
            table: table.to_string(),
            if_exists: false,
        })
    }

    /// Deletes a table if it exists.
    pub fn delete_table_if_exists(&self, table: &str) -> CoreResult<()> {
        self.submit(Operation::DeleteTable {
            table: table.to_string(),
            if_exists: true,
        })
    }

    /// Appends a column, back-filling existing records with `default`.
    pub fn add_column(&self, table: &str, column: &str, default: Option<Value>) -> CoreResult<()> {
        self.submit(Operation::AddColumn {
            table: table.to_string(),
            column: column.to_string(),
            default,
        })
    }

    /// Removes a column from the schema and every record.
    pub fn delete_column(&self, table: &str, column: &str) -> CoreResult<()> {
        self.submit(Operation::DeleteColumn {
            table: table.to_string(),
            column: column.to_string(),
        })
    }

    /// Renames a table.
    pub fn rename_table(&self, from: &str, to: &str) -> CoreResult<()> {
        self.submit(Operation::RenameTable {
            from: from.to_string(),
            to: to.to_string(),
        })
    }

    /// Renames a column, keeping its schema position.
    pub fn rename_column(&self, table: &str, from: &str, to: &str) -> CoreResult<()> {
        self.submit(Operation::RenameColumn {
            table: table.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        })
    }

    /// Inserts a record.
    ///
    /// Each schema column takes the supplied value unless it is missing or
    /// falsy (`null`, `false`, `0`, `""`), in which case it is null. Keys
    /// outside the schema are dropped.
    pub fn insert(&self, table: &str, record: Record) -> CoreResult<()> {
        self.submit(Operation::Insert {
            table: table.to_string(),
            record,
        })
    }

    /// Writes `changes` into the matching records of `table`.
    ///
    /// Columns outside the schema are ignored.
    pub fn update(&self, table: &str, predicate: Predicate, changes: Record) -> CoreResult<()> {
        self.submit(Operation::Update {
            table: table.to_string(),
            predicate,
            changes,
        })
    }

    /// Deletes the matching records of `table`.
    pub fn delete(&self, table: &str, predicate: Predicate) -> CoreResult<()> {
        self.submit(Operation::Delete {
            table: table.to_string(),
            predicate,
        })
    }

    /// Clears every table's records, keeping the schemas.
    pub fn drop_all(&self) -> CoreResult<()> {
        self.submit(Operation::DropAll)
    }

    /// Returns the number of writes waiting behind an in-flight drain.
    pub fn pending_writes(&self) -> usize {
        self.queue.lock().len()
    }

    // ========================================================================
    // Migrations
    // ========================================================================

    /// Turns on migration support and ensures the migrations table exists.
    pub fn enable_migrations(&self) -> CoreResult<()> {
        self.create_table_if_not_exists(MIGRATIONS_TABLE, MIGRATION_COLUMNS)?;
        self.migrations_enabled.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Returns true once `enable_migrations` has succeeded.
    pub fn migrations_enabled(&self) -> bool {
        self.migrations_enabled.load(Ordering::SeqCst)
    }

    /// Registers a migration and runs it unless it was already applied.
    ///
    /// The body runs as one queued step. Writes it performs on the store
    /// complete before it returns to the body. On success the migration row
    /// is marked applied; on failure it stays pending and
    /// [`CoreError::MigrationFailed`] is returned, so a later call with the
    /// same id retries it.
    ///
    /// # Errors
    ///
    /// `MigrationsNotEnabled` if [`enable_migrations`](Self::enable_migrations)
    /// has not been called on this handle.
    pub fn create_migration<F>(&self, descriptor: MigrationDescriptor, body: F) -> CoreResult<()>
    where
        F: FnOnce(&Database) -> CoreResult<()> + Send + 'static,
    {
        if !self.migrations_enabled() {
            return Err(CoreError::MigrationsNotEnabled);
        }

        let rows = self.migration_rows(&descriptor.id)?;
        if rows.iter().any(|m| m.applied) {
            debug!(migration = %descriptor.id, "migration already applied, skipping");
            return Ok(());
        }

        let pending = MigrationRecord::pending(&descriptor);
        self.migrations.lock().record(pending.clone());
        if rows.is_empty() {
            self.submit(Operation::Insert {
                table: MIGRATIONS_TABLE.to_string(),
                record: pending.to_record(),
            })?;
        } else {
            self.submit(Operation::Update {
                table: MIGRATIONS_TABLE.to_string(),
                predicate: Predicate::new().eq("id", pending.id.as_str()),
                changes: Record::from([
                    (
                        "description".to_string(),
                        Value::from(pending.description.as_str()),
                    ),
                    ("timestamp".to_string(), Value::from(pending.timestamp)),
                ]),
            })?;
        }

        self.submit(Mutation::ApplyMigration {
            id: descriptor.id,
            body: Box::new(body),
        })
    }

    /// Returns the rows of the migrations table whose `applied` flag is set.
    ///
    /// Pending and failed migrations are left out.
    pub fn applied_migrations(&self) -> CoreResult<Vec<MigrationRecord>> {
        let state = self.reload()?;
        let Ok(table) = state.table(MIGRATIONS_TABLE) else {
            return Ok(Vec::new());
        };
        Ok(table
            .records
            .iter()
            .filter_map(MigrationRecord::from_record)
            .filter(|m| m.applied)
            .collect())
    }

    /// Returns the migrations registered through this handle, in order.
    pub fn migration_history(&self) -> Vec<MigrationRecord> {
        self.migrations.lock().entries().to_vec()
    }

    // ========================================================================
    // Drain
    // ========================================================================

    fn reload(&self) -> CoreResult<StoreState> {
        self.vault.load()
    }

    fn migration_rows(&self, id: &str) -> CoreResult<Vec<MigrationRecord>> {
        let state = self.reload()?;
        let Ok(table) = state.table(MIGRATIONS_TABLE) else {
            return Ok(Vec::new());
        };
        Ok(table
            .matching(&Predicate::new().eq("id", id))
            .filter_map(MigrationRecord::from_record)
            .collect())
    }

    fn submit(&self, mutation: impl Into<Mutation>) -> CoreResult<()> {
        let admission = self.queue.lock().admit(mutation.into());
        match admission {
            Admission::Drain => self.drain(),
            Admission::Inline(mutation) => self.step(mutation),
            Admission::Queued { position } => {
                debug!(position, "write queued behind in-flight drain");
                Ok(())
            }
        }
    }

    fn drain(&self) -> CoreResult<()> {
        let _guard = DrainGuard { queue: &self.queue };
        let mut first_error = None;

        loop {
            let next = self.queue.lock().next();
            let Some(mutation) = next else {
                break;
            };
            let kind = mutation.kind();
            if let Err(error) = self.step(mutation) {
                if first_error.is_none() {
                    first_error = Some(error);
                } else {
                    warn!(kind, error = %error, "drain step failed");
                }
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    fn step(&self, mutation: Mutation) -> CoreResult<()> {
        match mutation {
            Mutation::Write(op) => {
                debug!(kind = op.kind(), table = ?op.table(), "drain step");
                let mut state = self.reload()?;
                op.apply(&mut state)?;
                self.vault.save(&state)
            }
            Mutation::ApplyMigration { id, body } => self.apply_migration(&id, body),
        }
    }

    fn apply_migration(&self, id: &str, body: MigrationBody) -> CoreResult<()> {
        if self.migration_rows(id)?.iter().any(|m| m.applied) {
            debug!(migration = %id, "migration applied while queued, skipping");
            self.migrations.lock().mark_applied(id);
            return Ok(());
        }

        debug!(migration = %id, "running migration");
        body(self).map_err(|e| CoreError::migration_failed(id, e))?;

        let mut state = self.reload()?;
        state.update(
            MIGRATIONS_TABLE,
            &Predicate::new().eq("id", id),
            &Record::from([("applied".to_string(), Value::Bool(true))]),
        )?;
        self.vault.save(&state)?;
        self.migrations.lock().mark_applied(id);
        info!(migration = %id, "migration applied");
        Ok(())
    }
}

/// Frees the drainer slot when a drain ends, including by unwinding.
struct DrainGuard<'a> {
    queue: &'a Mutex<MutationQueue>,
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.queue.lock().release();
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let queue = self.queue.lock();
        f.debug_struct("Database")
            .field("path", &self.path())
            .field("pending_writes", &queue.len())
            .field("draining", &queue.is_draining())
            .field("migrations_enabled", &self.migrations_enabled())
            .finish_non_exhaustive()
    }
}
