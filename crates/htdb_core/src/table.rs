//! Tables: an ordered column schema plus ordered records.

use crate::query::Predicate;
use crate::record::{is_falsy, Record, Value};
use serde::{Deserialize, Serialize};

/// A table.
///
/// After an insert normalizes a record, every record holds exactly the
/// table's columns. Record order is insertion order.
///
/// The methods here trust their caller to have checked column existence;
/// the checked operations live on [`StoreState`](crate::StoreState).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Column names, in schema order.
    pub columns: Vec<String>,
    /// Records, in insertion order.
    #[serde(default)]
    pub records: Vec<Record>,
}

impl Table {
    /// Creates an empty table with the given columns.
    #[must_use]
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            records: Vec::new(),
        }
    }

    /// Returns true if the schema contains `column`.
    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the table has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends a record shaped to the schema.
    ///
    /// Each column takes the supplied value when present and not falsy,
    /// otherwise null. Keys outside the schema are dropped.
    pub fn insert(&mut self, record: &Record) -> &Record {
        let normalized = self
            .columns
            .iter()
            .map(|column| {
                let value = record
                    .get(column)
                    .filter(|v| !is_falsy(v))
                    .cloned()
                    .unwrap_or(Value::Null);
                (column.clone(), value)
            })
            .collect();
        self.records.push(normalized);
        &self.records[self.records.len() - 1]
    }

    /// Writes `changes` into every matching record.
    ///
    /// Only columns present in the schema are written. Returns the number of
    /// records that matched.
    pub fn update(&mut self, predicate: &Predicate, changes: &Record) -> usize {
        let columns = &self.columns;
        let writable: Vec<(&String, &Value)> = changes
            .iter()
            .filter(|(column, _)| columns.iter().any(|c| c == *column))
            .collect();

        let mut matched = 0;
        for record in self.records.iter_mut().filter(|r| predicate.matches(r)) {
            matched += 1;
            for (column, value) in &writable {
                record.insert((*column).clone(), (*value).clone());
            }
        }
        matched
    }

    /// Removes every matching record, keeping the rest in order.
    ///
    /// Returns the number of records removed.
    pub fn delete(&mut self, predicate: &Predicate) -> usize {
        let before = self.records.len();
        self.records.retain(|r| !predicate.matches(r));
        before - self.records.len()
    }

    /// Iterates over matching records in table order.
    pub fn matching<'a>(&'a self, predicate: &'a Predicate) -> impl Iterator<Item = &'a Record> {
        self.records.iter().filter(move |r| predicate.matches(r))
    }

    /// Returns copies of the matching records in table order.
    #[must_use]
    pub fn select(&self, predicate: &Predicate) -> Vec<Record> {
        self.matching(predicate).cloned().collect()
    }

    /// Appends `column` and back-fills every record with `default`.
    pub fn push_column(&mut self, column: String, default: Value) {
        for record in &mut self.records {
            record.insert(column.clone(), default.clone());
        }
        self.columns.push(column);
    }

    /// Removes `column` from the schema and from every record.
    pub fn remove_column(&mut self, column: &str) {
        self.columns.retain(|c| c != column);
        for record in &mut self.records {
            record.remove(column);
        }
    }

    /// Renames `from` to `to`, keeping the schema position.
    pub fn rename_column(&mut self, from: &str, to: &str) {
        for c in self.columns.iter_mut().filter(|c| *c == from) {
            *c = to.to_string();
        }
        for record in &mut self.records {
            let value = record.remove(from).unwrap_or(Value::Null);
            record.insert(to.to_string(), value);
        }
    }

    /// Removes every record, keeping the schema.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::record;
    use serde_json::json;

    fn users() -> Table {
        Table::new(vec!["name".into(), "email".into()])
    }

    #[test]
    fn insert_normalizes_to_schema() {
        let mut table = users();
        let inserted = table
            .insert(&record([("name", "John"), ("role", "admin")]))
            .clone();

        assert_eq!(
            inserted,
            record([("name", json!("John")), ("email", Value::Null)])
        );
    }

    #[test]
    fn insert_nulls_falsy_values() {
        let mut table = Table::new(vec!["n".into(), "b".into(), "s".into()]);
        table.insert(&record([("n", json!(0)), ("b", json!(false)), ("s", json!(""))]));

        assert!(table.records[0].values().all(Value::is_null));
    }

    #[test]
    fn update_writes_schema_columns_of_matches() {
        let mut table = users();
        table.insert(&record([("name", "John"), ("email", "a@x.com")]));
        table.insert(&record([("name", "Jane"), ("email", "b@x.com")]));

        let matched = table.update(
            &Predicate::new().eq("name", "John"),
            &record([("email", "new@x.com"), ("phone", "555")]),
        );

        assert_eq!(matched, 1);
        assert_eq!(table.records[0]["email"], json!("new@x.com"));
        assert!(!table.records[0].contains_key("phone"));
        assert_eq!(table.records[1]["email"], json!("b@x.com"));
    }

    #[test]
    fn update_evaluates_predicate_before_writing() {
        let mut table = users();
        table.insert(&record([("name", "John"), ("email", "a@x.com")]));

        // Changing the predicate column must not stop the other column from
        // being written.
        table.update(
            &Predicate::new().eq("email", "a@x.com"),
            &record([("email", "b@x.com"), ("name", "Johnny")]),
        );

        assert_eq!(
            table.records[0],
            record([("name", "Johnny"), ("email", "b@x.com")])
        );
    }

    #[test]
    fn delete_keeps_order_of_survivors() {
        let mut table = Table::new(vec!["n".into()]);
        for n in 1..=5 {
            table.insert(&record([("n", n)]));
        }

        let removed = table.delete(&Predicate::new().eq("n", 3));

        assert_eq!(removed, 1);
        let left: Vec<_> = table.records.iter().map(|r| r["n"].clone()).collect();
        assert_eq!(left, vec![json!(1), json!(2), json!(4), json!(5)]);
    }

    #[test]
    fn column_changes_touch_every_record() {
        let mut table = users();
        table.insert(&record([("name", "John")]));
        table.insert(&record([("name", "Jane")]));

        table.push_column("age".into(), json!(0));
        assert_eq!(table.columns, vec!["name", "email", "age"]);
        assert!(table.records.iter().all(|r| r["age"] == json!(0)));

        table.rename_column("name", "full_name");
        assert_eq!(table.columns, vec!["full_name", "email", "age"]);
        assert_eq!(table.records[1]["full_name"], json!("Jane"));
        assert!(!table.records[1].contains_key("name"));

        table.remove_column("age");
        assert_eq!(table.columns, vec!["full_name", "email"]);
        assert!(table.records.iter().all(|r| !r.contains_key("age")));
    }

    #[test]
    fn deserializes_without_records_field() {
        let table: Table = serde_json::from_str(r#"{"columns":["a"]}"#).unwrap();
        assert_eq!(table.columns, vec!["a"]);
        assert!(table.is_empty());
    }
}
