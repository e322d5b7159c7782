//! Records and the scalar value domain.
//!
//! Values are [`serde_json::Value`]: string, number, boolean, null, array or
//! object. Equality is exact: `1` and `"1"` differ, and so do the integer
//! `1` and the float `1.0`.

use std::collections::BTreeMap;

pub use serde_json::Value;

/// A row: column name to value.
pub type Record = BTreeMap<String, Value>;

/// Builds a record from `(column, value)` pairs.
///
/// ```
/// use htdb_core::{record, Value};
///
/// let row = record([("name", "John"), ("email", "j@x.com")]);
/// assert_eq!(row["name"], Value::from("John"));
/// ```
pub fn record<K, V, I>(pairs: I) -> Record
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Returns true for values an insert replaces with null: `null`, `false`,
/// `0` and the empty string.
#[must_use]
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}
