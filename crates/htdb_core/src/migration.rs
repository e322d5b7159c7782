//! Migration tracking.
//!
//! Migrations in HtDB are:
//! - **Identity-keyed**: each migration is known by a caller-chosen string id
//! - **At-most-once**: a migration whose durable row reads `applied = true`
//!   is never run again, on this instance or any later one
//! - **Queued**: the body runs as one step of the mutation queue, and the
//!   writes it issues execute inline before the step completes
//!
//! Durable state lives as ordinary rows in the reserved [`MIGRATIONS_TABLE`].
//!
//! ## Usage
//!
//! ```ignore
//! use htdb_core::{Database, MigrationDescriptor};
//!
//! db.enable_migrations()?;
//! db.create_migration(
//!     MigrationDescriptor::new("001_users", "create the users table"),
//!     |db| db.create_table("users", ["name", "email"]),
//! )?;
//! ```

use crate::record::{Record, Value};
use std::time::{SystemTime, UNIX_EPOCH};

/// Name of the reserved table holding migration rows.
pub const MIGRATIONS_TABLE: &str = "migrations";

/// Columns of [`MIGRATIONS_TABLE`], in order.
pub const MIGRATION_COLUMNS: [&str; 4] = ["id", "description", "timestamp", "applied"];

/// Identity and metadata of a migration to register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationDescriptor {
    /// Unique identity.
    pub id: String,
    /// Human-readable description.
    pub description: String,
    /// Creation time (Unix timestamp in milliseconds).
    pub timestamp: i64,
}

impl MigrationDescriptor {
    /// Creates a descriptor stamped with the current time.
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            timestamp: now_millis(),
        }
    }

    /// Overrides the timestamp.
    #[must_use]
    pub const fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// A migration as stored in [`MIGRATIONS_TABLE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationRecord {
    /// Unique identity.
    pub id: String,
    /// Human-readable description.
    pub description: String,
    /// Creation time (Unix timestamp in milliseconds).
    pub timestamp: i64,
    /// Whether the body completed successfully.
    pub applied: bool,
}

impl MigrationRecord {
    /// Creates the not-yet-applied record for a descriptor.
    #[must_use]
    pub fn pending(descriptor: &MigrationDescriptor) -> Self {
        Self {
            id: descriptor.id.clone(),
            description: descriptor.description.clone(),
            timestamp: descriptor.timestamp,
            applied: false,
        }
    }

    /// Converts the record into a table row.
    #[must_use]
    pub fn to_record(&self) -> Record {
        Record::from([
            ("id".to_string(), Value::from(self.id.as_str())),
            (
                "description".to_string(),
                Value::from(self.description.as_str()),
            ),
            ("timestamp".to_string(), Value::from(self.timestamp)),
            ("applied".to_string(), Value::from(self.applied)),
        ])
    }

    /// Parses a table row.
    ///
    /// Returns `None` if the row has no string `id`. Only `applied == true`
    /// reads as applied; a pending row stores null there.
    #[must_use]
    pub fn from_record(record: &Record) -> Option<Self> {
        let id = record.get("id")?.as_str()?.to_string();
        Some(Self {
            id,
            description: record
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            timestamp: record
                .get("timestamp")
                .and_then(Value::as_i64)
                .unwrap_or_default(),
            applied: record.get("applied") == Some(&Value::Bool(true)),
        })
    }
}

/// Migrations registered through one store instance.
#[derive(Debug, Clone, Default)]
pub struct MigrationState {
    entries: Vec<MigrationRecord>,
}

impl MigrationState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a registration, replacing an earlier entry with the same id.
    pub fn record(&mut self, entry: MigrationRecord) {
        match self.entries.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Marks the entry for `id` as applied.
    ///
    /// Returns false if no such entry exists.
    pub fn mark_applied(&mut self, id: &str) -> bool {
        match self.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.applied = true;
                true
            }
            None => false,
        }
    }

    /// Checks if `id` has been applied through this instance.
    #[must_use]
    pub fn is_applied(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.id == id && e.applied)
    }

    /// Returns the entries in registration order.
    #[must_use]
    pub fn entries(&self) -> &[MigrationRecord] {
        &self.entries
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or_default()
}
