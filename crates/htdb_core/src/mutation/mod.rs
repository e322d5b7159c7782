//! Write requests and the single-flight queue that drains them.
//!
//! Every write to a store is an [`Operation`] wrapped in a [`Mutation`] and
//! submitted to the store's [`MutationQueue`]. Each drain step reloads the
//! store from its artifact, applies one mutation and persists the result.

mod queue;

pub(crate) use queue::{Admission, MutationQueue};

use crate::database::Database;
use crate::error::CoreResult;
use crate::query::Predicate;
use crate::record::{Record, Value};
use crate::store::StoreState;
use std::fmt;

/// A migration body: runs once against the store, inside the drain.
pub type MigrationBody = Box<dyn FnOnce(&Database) -> CoreResult<()> + Send>;

/// A write that only touches the table data.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Create a table.
    CreateTable {
        /// Table name.
        table: String,
        /// Column names in order.
        columns: Vec<String>,
        /// Skip silently if the table exists.
        if_not_exists: bool,
    },
    /// Delete a table.
    DeleteTable {
        /// Table name.
        table: String,
        /// Skip silently if the table is absent.
        if_exists: bool,
    },
    /// Append a column, back-filling `default`.
    AddColumn {
        /// Table name.
        table: String,
        /// New column name.
        column: String,
        /// Back-fill value; null when `None`.
        default: Option<Value>,
    },
    /// Remove a column.
    DeleteColumn {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },
    /// Insert one record.
    Insert {
        /// Table name.
        table: String,
        /// Supplied values.
        record: Record,
    },
    /// Overwrite columns of matching records.
    Update {
        /// Table name.
        table: String,
        /// Which records to change.
        predicate: Predicate,
        /// New values.
        changes: Record,
    },
    /// Remove matching records.
    Delete {
        /// Table name.
        table: String,
        /// Which records to remove.
        predicate: Predicate,
    },
    /// Clear every table's records.
    DropAll,
    /// Rename a table.
    RenameTable {
        /// Current name.
        from: String,
        /// New name.
        to: String,
    },
    /// Rename a column.
    RenameColumn {
        /// Table name.
        table: String,
        /// Current column name.
        from: String,
        /// New column name.
        to: String,
    },
}

impl Operation {
    /// Returns a short name for logging.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateTable { .. } => "create_table",
            Self::DeleteTable { .. } => "delete_table",
            Self::AddColumn { .. } => "add_column",
            Self::DeleteColumn { .. } => "delete_column",
            Self::Insert { .. } => "insert",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
            Self::DropAll => "drop_all",
            Self::RenameTable { .. } => "rename_table",
            Self::RenameColumn { .. } => "rename_column",
        }
    }

    /// Returns the table the operation targets, if it targets one.
    #[must_use]
    pub fn table(&self) -> Option<&str> {
        match self {
            Self::CreateTable { table, .. }
            | Self::DeleteTable { table, .. }
            | Self::AddColumn { table, .. }
            | Self::DeleteColumn { table, .. }
            | Self::Insert { table, .. }
            | Self::Update { table, .. }
            | Self::Delete { table, .. }
            | Self::RenameColumn { table, .. } => Some(table),
            Self::RenameTable { from, .. } => Some(from),
            Self::DropAll => None,
        }
    }

    /// Applies the operation to `state`.
    ///
    /// On error `state` may be partially changed and must not be persisted.
    pub fn apply(&self, state: &mut StoreState) -> CoreResult<()> {
        match self {
            Self::CreateTable {
                table,
                columns,
                if_not_exists: true,
            } => state.create_table_if_not_exists(table, columns.clone()).map(drop),
            Self::CreateTable { table, columns, .. } => state.create_table(table, columns.clone()),
            Self::DeleteTable {
                table,
                if_exists: true,
            } => {
                state.delete_table_if_exists(table);
                Ok(())
            }
            Self::DeleteTable { table, .. } => state.delete_table(table).map(drop),
            Self::AddColumn {
                table,
                column,
                default,
            } => state.add_column(table, column, default.clone()),
            Self::DeleteColumn { table, column } => state.delete_column(table, column),
            Self::Insert { table, record } => state.insert(table, record).map(drop),
            Self::Update {
                table,
                predicate,
                changes,
            } => state.update(table, predicate, changes).map(drop),
            Self::Delete { table, predicate } => state.delete(table, predicate).map(drop),
            Self::DropAll => {
                state.drop_all();
                Ok(())
            }
            Self::RenameTable { from, to } => state.rename_table(from, to),
            Self::RenameColumn { table, from, to } => state.rename_column(table, from, to),
        }
    }
}

/// One entry of the mutation queue.
pub enum Mutation {
    /// A data write.
    Write(Operation),
    /// Run a registered migration and mark it applied.
    ApplyMigration {
        /// Identity of the migration.
        id: String,
        /// The transformation to run.
        body: MigrationBody,
    },
}

impl Mutation {
    /// Returns a short name for logging.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Write(op) => op.kind(),
            Self::ApplyMigration { .. } => "apply_migration",
        }
    }
}

impl From<Operation> for Mutation {
    fn from(op: Operation) -> Self {
        Self::Write(op)
    }
}

impl fmt::Debug for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Write(op) => f.debug_tuple("Write").field(op).finish(),
            Self::ApplyMigration { id, .. } => f
                .debug_struct("ApplyMigration")
                .field("id", id)
                .finish_non_exhaustive(),
        }
    }
}
