//! Error types for HtDB core.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in HtDB core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] htdb_storage::StorageError),

    /// Snapshot codec error.
    #[error("codec error: {0}")]
    Codec(#[from] htdb_codec::CodecError),

    /// A table with this name already exists.
    #[error("table \"{table}\" already exists")]
    AlreadyExists {
        /// Name of the table.
        table: String,
    },

    /// The table does not exist.
    #[error("table \"{table}\" does not exist")]
    NotFound {
        /// Name of the table.
        table: String,
    },

    /// The column already exists in the table.
    #[error("column \"{column}\" already exists in table \"{table}\"")]
    ColumnExists {
        /// Name of the table.
        table: String,
        /// Name of the column.
        column: String,
    },

    /// The column does not exist in the table.
    #[error("column \"{column}\" does not exist in table \"{table}\"")]
    ColumnNotFound {
        /// Name of the table.
        table: String,
        /// Name of the column.
        column: String,
    },

    /// `create_migration` was called before `enable_migrations`.
    #[error("migrations are not enabled, call enable_migrations() first")]
    MigrationsNotEnabled,

    /// The artifact path lacks the required extension.
    #[error("file path must end with '.{extension}': {}", path.display())]
    InvalidPath {
        /// The rejected path.
        path: PathBuf,
        /// The required extension, without the dot.
        extension: String,
    },

    /// The artifact exists but could not be decrypted or parsed.
    ///
    /// Only returned when the store is configured to surface decode failures.
    #[error("decryption failed: {source}")]
    DecryptionFailed {
        /// The underlying codec failure.
        source: htdb_codec::CodecError,
    },

    /// A migration body returned an error; the migration stays unapplied.
    #[error("migration \"{id}\" failed: {source}")]
    MigrationFailed {
        /// Identity of the migration.
        id: String,
        /// The error returned by the body.
        source: Box<CoreError>,
    },
}

impl CoreError {
    /// Creates a table already exists error.
    pub fn already_exists(table: impl Into<String>) -> Self {
        Self::AlreadyExists {
            table: table.into(),
        }
    }

    /// Creates a table not found error.
    pub fn not_found(table: impl Into<String>) -> Self {
        Self::NotFound {
            table: table.into(),
        }
    }

    /// Creates a column exists error.
    pub fn column_exists(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::ColumnExists {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Creates a column not found error.
    pub fn column_not_found(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::ColumnNotFound {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Creates an invalid path error.
    pub fn invalid_path(path: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            extension: extension.into(),
        }
    }

    /// Creates a migration failed error.
    pub fn migration_failed(id: impl Into<String>, source: CoreError) -> Self {
        Self::MigrationFailed {
            id: id.into(),
            source: Box::new(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_table_and_column() {
        assert_eq!(
            CoreError::already_exists("users").to_string(),
            "table \"users\" already exists"
        );
        assert_eq!(
            CoreError::column_not_found("users", "age").to_string(),
            "column \"age\" does not exist in table \"users\""
        );
        assert_eq!(
            CoreError::invalid_path("db.json", "ht").to_string(),
            "file path must end with '.ht': db.json"
        );
    }
}
