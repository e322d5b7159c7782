//! Property tests across the codec, the data model and the write queue.

use htdb_codec::Codec;
use htdb_core::{
    Config, Database, InMemoryBackend, Operation, Predicate, StoreState, Table,
};
use htdb_testkit::checks::assert_schema_conformance;
use htdb_testkit::{
    columns_strategy, init_tracing, operation_strategy, password_strategy, record_strategy,
    store_state_strategy, IntegrationHarness, OPERATION_COLUMNS,
};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn codec_round_trips_any_store(state in store_state_strategy(), password in password_strategy()) {
        let codec = Codec::new();
        let text = codec.encode(&state, &password).unwrap();
        let back: StoreState = codec.decode(&text, &password).unwrap();
        prop_assert_eq!(back, state);
    }

    #[test]
    fn wrong_password_never_yields_records(
        state in store_state_strategy(),
        password in password_strategy(),
        other in password_strategy(),
    ) {
        prop_assume!(password != other);
        let text = Codec::new().encode(&state, &password).unwrap();

        prop_assert!(Codec::new().decode::<StoreState>(&text, &other).is_err());

        let backend = InMemoryBackend::with_data(text.into_bytes());
        let db = Database::open_with_backend(Box::new(backend), other, Config::default()).unwrap();
        prop_assert!(db.read_tables().unwrap().is_empty());
    }

    #[test]
    fn inserts_conform_to_schema(
        columns in columns_strategy(),
        rows in prop::collection::vec(record_strategy(), 0..8),
    ) {
        let db = Database::open_in_memory("pw").unwrap();
        db.create_table("t", columns.clone()).unwrap();
        for row in rows {
            db.insert("t", row).unwrap();
        }

        let state = db.read_tables().unwrap();
        assert_schema_conformance(&state);
        prop_assert_eq!(state.column_names("t").unwrap(), columns);
    }

    #[test]
    fn queued_writes_equal_sequential_application(
        ops in prop::collection::vec(operation_strategy(), 0..24),
    ) {
        init_tracing();
        let mut harness = IntegrationHarness::new();
        harness
            .apply(&Operation::CreateTable {
                table: "t".into(),
                columns: OPERATION_COLUMNS.iter().map(|c| (*c).to_string()).collect(),
                if_not_exists: false,
            })
            .unwrap();

        for op in &ops {
            harness.apply(op).unwrap();
        }
        harness.verify();
        assert_schema_conformance(harness.model());
    }

    #[test]
    fn select_returns_matches_in_table_order(
        columns in columns_strategy(),
        rows in prop::collection::vec(record_strategy(), 0..8),
    ) {
        let mut table = Table::new(columns.clone());
        for row in &rows {
            table.insert(row);
        }
        let column = columns[0].clone();
        let Some(probe) = table.records.first().map(|r| r[&column].clone()) else {
            return Ok(());
        };

        let predicate = Predicate::new().eq(column.clone(), probe.clone());
        let selected = table.select(&predicate);

        let expected: Vec<_> = table
            .records
            .iter()
            .filter(|r| r[&column] == probe)
            .cloned()
            .collect();
        prop_assert_eq!(selected, expected);
    }
}
