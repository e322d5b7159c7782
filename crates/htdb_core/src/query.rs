//! Equality predicates over records.

use crate::record::{Record, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An equality filter: column name to expected value.
///
/// A record matches when every listed column holds exactly the expected
/// value. A column the record does not hold matches nothing, not even
/// `null`. The empty predicate matches every record.
///
/// ```
/// use htdb_core::{record, Predicate};
///
/// let row = record([("name", "John"), ("email", "j@x.com")]);
/// assert!(Predicate::new().eq("name", "John").matches(&row));
/// assert!(!Predicate::new().eq("name", "Jane").matches(&row));
/// assert!(Predicate::all().matches(&row));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Predicate {
    conditions: BTreeMap<String, Value>,
}

impl Predicate {
    /// Creates an empty predicate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the predicate that matches every record.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the condition `column == value`.
    #[must_use]
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.insert(column.into(), value.into());
        self
    }

    /// Returns true if the predicate has no conditions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Returns the number of conditions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Iterates over the `(column, expected)` conditions.
    pub fn conditions(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.conditions.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Evaluates the predicate against a record.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        self.conditions
            .iter()
            .all(|(column, expected)| record.get(column) == Some(expected))
    }
}

impl From<BTreeMap<String, Value>> for Predicate {
    fn from(conditions: BTreeMap<String, Value>) -> Self {
        Self { conditions }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Predicate {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            conditions: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
