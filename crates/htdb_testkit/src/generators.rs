//! Property-based test generators using proptest.
//!
//! Provides strategies for generating random test data
//! that maintains required invariants.

use htdb_core::{Operation, Predicate, Record, StoreState, Table, Value};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

/// Columns of the table that [`operation_strategy`] targets.
pub const OPERATION_COLUMNS: [&str; 3] = ["a", "b", "c"];

/// Strategy for generating valid table and column names.
pub fn name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,15}").expect("Invalid regex")
}

/// Strategy for generating finite floats across the whole `f64` range.
pub fn float_strategy() -> impl Strategy<Value = f64> {
    any::<f64>().prop_filter("finite", |f| f.is_finite())
}

/// Strategy for generating scalar values.
pub fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        float_strategy().prop_map(Value::from),
        "[ -~]{0,24}".prop_map(Value::String),
    ]
}

/// Strategy for generating values, including shallow arrays and objects.
pub fn value_strategy() -> impl Strategy<Value = Value> {
    scalar_strategy().prop_recursive(2, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

/// Strategy for generating a record over arbitrary keys.
pub fn record_strategy() -> impl Strategy<Value = Record> {
    prop::collection::btree_map(name_strategy(), value_strategy(), 0..6)
}

/// Strategy for generating a record over the given columns plus extras.
pub fn record_for_columns(columns: Vec<String>) -> impl Strategy<Value = Record> {
    let known = prop::collection::vec(prop::option::of(value_strategy()), columns.len());
    (known, record_strategy()).prop_map(move |(values, extra)| {
        let mut record: Record = extra;
        for (column, value) in columns.iter().zip(values) {
            match value {
                Some(v) => {
                    record.insert(column.clone(), v);
                }
                None => {
                    record.remove(column);
                }
            }
        }
        record
    })
}

/// Strategy for generating a unique, ordered column list.
pub fn columns_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set(name_strategy(), 1..6)
        .prop_map(|set: BTreeSet<String>| set.into_iter().collect())
}

/// Strategy for generating a table whose records conform to its schema.
pub fn table_strategy() -> impl Strategy<Value = Table> {
    columns_strategy().prop_flat_map(|columns| {
        let rows = prop::collection::vec(record_for_columns(columns.clone()), 0..6);
        rows.prop_map(move |rows| {
            let mut table = Table::new(columns.clone());
            for row in &rows {
                table.insert(row);
            }
            table
        })
    })
}

/// Strategy for generating a whole store.
pub fn store_state_strategy() -> impl Strategy<Value = StoreState> {
    prop::collection::btree_map(name_strategy(), table_strategy(), 0..4)
        .prop_map(|tables: BTreeMap<String, Table>| StoreState::from(tables))
}

/// Strategy for generating passwords.
pub fn password_strategy() -> impl Strategy<Value = String> {
    "[ -~]{1,32}"
}

fn small_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        (0i64..4).prop_map(Value::from),
        "[xy]".prop_map(Value::String),
    ]
}

fn small_record() -> impl Strategy<Value = Record> {
    prop::collection::btree_map(
        prop::sample::select(OPERATION_COLUMNS.to_vec()).prop_map(String::from),
        small_value(),
        0..3,
    )
}

/// Strategy for generating row writes against table `t` with
/// [`OPERATION_COLUMNS`].
///
/// Values are drawn from a small domain so predicates actually match.
pub fn operation_strategy() -> impl Strategy<Value = Operation> {
    prop_oneof![
        3 => small_record().prop_map(|record| Operation::Insert {
            table: "t".into(),
            record,
        }),
        2 => (small_record(), small_record()).prop_map(|(p, changes)| Operation::Update {
            table: "t".into(),
            predicate: Predicate::from(p),
            changes,
        }),
        1 => small_record().prop_map(|p| Operation::Delete {
            table: "t".into(),
            predicate: Predicate::from(p),
        }),
        1 => Just(Operation::DropAll),
    ]
}
