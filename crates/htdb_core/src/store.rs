//! The store aggregate: every table, keyed by name.

use crate::error::{CoreError, CoreResult};
use crate::query::Predicate;
use crate::record::{Record, Value};
use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// All tables of a store.
///
/// Serializes as a JSON object from table name to
/// `{"columns": [...], "records": [...]}`. Table names iterate in
/// lexicographic order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreState {
    tables: BTreeMap<String, Table>,
}

impl StoreState {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the store has no tables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Returns the tables keyed by name.
    #[must_use]
    pub fn tables(&self) -> &BTreeMap<String, Table> {
        &self.tables
    }

    /// Consumes the store and returns its tables.
    #[must_use]
    pub fn into_tables(self) -> BTreeMap<String, Table> {
        self.tables
    }

    /// Returns true if a table named `name` exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Returns the table names in lexicographic order.
    #[must_use]
    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    /// Returns the table named `name`.
    pub fn table(&self, name: &str) -> CoreResult<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| CoreError::not_found(name))
    }

    /// Returns the table named `name` mutably.
    pub fn table_mut(&mut self, name: &str) -> CoreResult<&mut Table> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| CoreError::not_found(name))
    }

    /// Returns the columns of `table` in schema order.
    pub fn column_names(&self, table: &str) -> CoreResult<Vec<String>> {
        Ok(self.table(table)?.columns.clone())
    }

    /// Returns the number of records in `table`.
    pub fn record_count(&self, table: &str) -> CoreResult<usize> {
        Ok(self.table(table)?.len())
    }

    /// Creates an empty table.
    ///
    /// Fails with `AlreadyExists` if the name is taken and with
    /// `ColumnExists` if `columns` repeats a name.
    pub fn create_table(&mut self, name: &str, columns: Vec<String>) -> CoreResult<()> {
        if self.contains(name) {
            return Err(CoreError::already_exists(name));
        }
        ensure_unique(name, &columns)?;
        self.tables.insert(name.to_string(), Table::new(columns));
        Ok(())
    }

    /// Creates an empty table unless one with that name exists.
    ///
    /// Returns true if a table was created.
    pub fn create_table_if_not_exists(
        &mut self,
        name: &str,
        columns: Vec<String>,
    ) -> CoreResult<bool> {
        if self.contains(name) {
            return Ok(false);
        }
        self.create_table(name, columns)?;
        Ok(true)
    }

    /// Removes a table and returns it.
    pub fn delete_table(&mut self, name: &str) -> CoreResult<Table> {
        self.tables
            .remove(name)
            .ok_or_else(|| CoreError::not_found(name))
    }

    /// Removes a table if it exists.
    pub fn delete_table_if_exists(&mut self, name: &str) -> Option<Table> {
        self.tables.remove(name)
    }

    /// Moves table `from` to the name `to`.
    pub fn rename_table(&mut self, from: &str, to: &str) -> CoreResult<()> {
        if !self.contains(from) {
            return Err(CoreError::not_found(from));
        }
        if self.contains(to) {
            return Err(CoreError::already_exists(to));
        }
        if let Some(table) = self.tables.remove(from) {
            self.tables.insert(to.to_string(), table);
        }
        Ok(())
    }

    /// Appends a column and back-fills it with `default` (null when `None`).
    pub fn add_column(
        &mut self,
        table: &str,
        column: &str,
        default: Option<Value>,
    ) -> CoreResult<()> {
        let t = self.table_mut(table)?;
        if t.has_column(column) {
            return Err(CoreError::column_exists(table, column));
        }
        t.push_column(column.to_string(), default.unwrap_or(Value::Null));
        Ok(())
    }

    /// Removes a column from the schema and from every record.
    pub fn delete_column(&mut self, table: &str, column: &str) -> CoreResult<()> {
        let t = self.table_mut(table)?;
        if !t.has_column(column) {
            return Err(CoreError::column_not_found(table, column));
        }
        t.remove_column(column);
        Ok(())
    }

    /// Renames a column in place.
    pub fn rename_column(&mut self, table: &str, from: &str, to: &str) -> CoreResult<()> {
        let t = self.table_mut(table)?;
        if !t.has_column(from) {
            return Err(CoreError::column_not_found(table, from));
        }
        if t.has_column(to) {
            return Err(CoreError::column_exists(table, to));
        }
        t.rename_column(from, to);
        Ok(())
    }

    /// Inserts a record, normalized to the table schema.
    pub fn insert(&mut self, table: &str, record: &Record) -> CoreResult<Record> {
        Ok(self.table_mut(table)?.insert(record).clone())
    }

    /// Updates matching records. Returns how many matched.
    pub fn update(
        &mut self,
        table: &str,
        predicate: &Predicate,
        changes: &Record,
    ) -> CoreResult<usize> {
        Ok(self.table_mut(table)?.update(predicate, changes))
    }

    /// Deletes matching records. Returns how many were removed.
    pub fn delete(&mut self, table: &str, predicate: &Predicate) -> CoreResult<usize> {
        Ok(self.table_mut(table)?.delete(predicate))
    }

    /// Returns copies of the matching records in table order.
    pub fn select(&self, table: &str, predicate: &Predicate) -> CoreResult<Vec<Record>> {
        Ok(self.table(table)?.select(predicate))
    }

    /// Clears the records of every table, keeping the schemas.
    pub fn drop_all(&mut self) {
        for table in self.tables.values_mut() {
            table.clear();
        }
    }
}

impl From<BTreeMap<String, Table>> for StoreState {
    fn from(tables: BTreeMap<String, Table>) -> Self {
        Self { tables }
    }
}

fn ensure_unique(table: &str, columns: &[String]) -> CoreResult<()> {
    for (i, column) in columns.iter().enumerate() {
        if columns[..i].contains(column) {
            return Err(CoreError::column_exists(table, column.as_str()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::record;
    use serde_json::json;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    fn with_users() -> StoreState {
        let mut state = StoreState::new();
        state.create_table("users", cols(&["name", "email"])).unwrap();
        state
    }

    #[test]
    fn snapshot_json_shape() {
        let mut state = with_users();
        state
            .insert("users", &record([("name", "John"), ("email", "j@x.com")]))
            .unwrap();

        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(
            json,
            r#"{"users":{"columns":["name","email"],"records":[{"email":"j@x.com","name":"John"}]}}"#
        );

        let back: StoreState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn create_table_rejects_duplicates() {
        let mut state = with_users();
        assert!(matches!(
            state.create_table("users", cols(&["x"])),
            Err(CoreError::AlreadyExists { .. })
        ));
        assert!(matches!(
            state.create_table("pets", cols(&["name", "name"])),
            Err(CoreError::ColumnExists { .. })
        ));
        assert!(!state.create_table_if_not_exists("users", cols(&["x"])).unwrap());
        assert_eq!(state.column_names("users").unwrap(), cols(&["name", "email"]));
    }

    #[test]
    fn delete_table_variants() {
        let mut state = with_users();
        assert!(matches!(
            state.delete_table("pets"),
            Err(CoreError::NotFound { .. })
        ));
        assert!(state.delete_table_if_exists("pets").is_none());
        assert!(state.delete_table("users").is_ok());
        assert!(state.is_empty());
    }

    #[test]
    fn table_names_are_sorted() {
        let mut state = StoreState::new();
        for name in ["zebra", "apple", "mango"] {
            state.create_table(name, cols(&["a"])).unwrap();
        }
        assert_eq!(state.table_names(), cols(&["apple", "mango", "zebra"]));
    }

    #[test]
    fn column_errors() {
        let mut state = with_users();
        assert!(matches!(
            state.add_column("pets", "age", None),
            Err(CoreError::NotFound { .. })
        ));
        assert!(matches!(
            state.add_column("users", "name", None),
            Err(CoreError::ColumnExists { .. })
        ));
        assert!(matches!(
            state.delete_column("users", "age"),
            Err(CoreError::ColumnNotFound { .. })
        ));
        assert!(matches!(
            state.rename_column("users", "age", "years"),
            Err(CoreError::ColumnNotFound { .. })
        ));
        assert!(matches!(
            state.rename_column("users", "name", "email"),
            Err(CoreError::ColumnExists { .. })
        ));
    }

    #[test]
    fn add_column_backfills_default() {
        let mut state = with_users();
        state.insert("users", &record([("name", "John")])).unwrap();
        state.add_column("users", "age", Some(json!(0))).unwrap();
        state.add_column("users", "nick", None).unwrap();

        let rows = state.select("users", &Predicate::all()).unwrap();
        assert_eq!(rows[0]["age"], json!(0));
        assert_eq!(rows[0]["nick"], Value::Null);
    }

    #[test]
    fn rename_table_moves_contents() {
        let mut state = with_users();
        state.insert("users", &record([("name", "John")])).unwrap();
        state.create_table("admins", cols(&["name"])).unwrap();

        assert!(matches!(
            state.rename_table("users", "admins"),
            Err(CoreError::AlreadyExists { .. })
        ));
        assert!(matches!(
            state.rename_table("pets", "animals"),
            Err(CoreError::NotFound { .. })
        ));

        state.rename_table("users", "customers").unwrap();
        assert!(!state.contains("users"));
        assert_eq!(state.record_count("customers").unwrap(), 1);
        assert_eq!(state.column_names("customers").unwrap(), cols(&["name", "email"]));
    }

    #[test]
    fn drop_all_keeps_schemas() {
        let mut state = with_users();
        state.create_table("pets", cols(&["kind"])).unwrap();
        state.insert("users", &record([("name", "John")])).unwrap();
        state.insert("pets", &record([("kind", "cat")])).unwrap();

        state.drop_all();

        assert_eq!(state.record_count("users").unwrap(), 0);
        assert_eq!(state.record_count("pets").unwrap(), 0);
        assert_eq!(state.column_names("pets").unwrap(), cols(&["kind"]));
    }

    #[test]
    fn row_operations_need_the_table() {
        let mut state = StoreState::new();
        let p = Predicate::all();
        assert!(state.insert("users", &Record::new()).is_err());
        assert!(state.update("users", &p, &Record::new()).is_err());
        assert!(state.delete("users", &p).is_err());
        assert!(state.select("users", &p).is_err());
        assert!(state.record_count("users").is_err());
    }
}
