//! Cross-crate integration test helpers.
//!
//! Provides a harness that drives a store through its public API while
//! applying the same writes to an in-memory model, so the two can be
//! compared after every step.

use htdb_core::{CoreResult, Database, Operation, StoreState};
use htdb_storage::StorageBackend;

/// A store paired with a model of what it should contain.
pub struct IntegrationHarness {
    /// The store handle.
    pub db: Database,
    /// The expected contents.
    model: StoreState,
}

impl IntegrationHarness {
    /// Creates a harness over an in-memory store.
    pub fn new() -> Self {
        Self {
            db: Database::open_in_memory("harness").expect("Failed to open store"),
            model: StoreState::new(),
        }
    }

    /// Returns the expected contents.
    pub fn model(&self) -> &StoreState {
        &self.model
    }

    /// Applies `op` to both the store and the model.
    ///
    /// # Panics
    ///
    /// Panics if the store and the model disagree on whether `op` fails.
    pub fn apply(&mut self, op: &Operation) -> CoreResult<()> {
        let expected = op.apply(&mut self.model);
        let actual = self.submit(op);
        assert_eq!(
            expected.is_ok(),
            actual.is_ok(),
            "store and model disagree on {op:?}: model {expected:?}, store {actual:?}"
        );
        actual
    }

    /// Asserts that the store holds exactly the model contents.
    pub fn verify(&self) {
        let actual = self.db.read_tables().expect("Failed to read tables");
        assert_eq!(actual, self.model, "store diverged from model");
    }

    fn submit(&self, op: &Operation) -> CoreResult<()> {
        let db = &self.db;
        match op.clone() {
            Operation::CreateTable {
                table,
                columns,
                if_not_exists: false,
            } => db.create_table(&table, columns),
            Operation::CreateTable { table, columns, .. } => {
                db.create_table_if_not_exists(&table, columns)
            }
            Operation::DeleteTable {
                table,
                if_exists: false,
            } => db.delete_table(&table),
            Operation::DeleteTable { table, .. } => db.delete_table_if_exists(&table),
            Operation::AddColumn {
                table,
                column,
                default,
            } => db.add_column(&table, &column, default),
            Operation::DeleteColumn { table, column } => db.delete_column(&table, &column),
            Operation::Insert { table, record } => db.insert(&table, record),
            Operation::Update {
                table,
                predicate,
                changes,
            } => db.update(&table, predicate, changes),
            Operation::Delete { table, predicate } => db.delete(&table, predicate),
            Operation::DropAll => db.drop_all(),
            Operation::RenameTable { from, to } => db.rename_table(&from, &to),
            Operation::RenameColumn { table, from, to } => db.rename_column(&table, &from, &to),
        }
    }
}

impl Default for IntegrationHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Reusable integration checks.
pub mod checks {
    use super::*;

    /// Writes `data` through a backend and checks it reads back intact.
    pub fn test_storage_persistence(backend: &dyn StorageBackend, data: &[u8]) {
        backend.write(data).expect("Failed to write");
        assert!(backend.exists().expect("Failed to check existence"));
        let read = backend.read().expect("Failed to read");
        assert_eq!(read.as_deref(), Some(data), "artifact mismatch");
    }

    /// Checks that every record of every table holds exactly its columns.
    pub fn assert_schema_conformance(state: &StoreState) {
        for (name, table) in state.tables() {
            let mut columns = table.columns.clone();
            columns.sort();
            for record in &table.records {
                let keys: Vec<_> = record.keys().cloned().collect();
                assert_eq!(keys, columns, "record in {name} does not match its schema");
            }
        }
    }
}
