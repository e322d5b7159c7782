//! Benchmark utilities.

#![warn(missing_docs)]

use htdb_codec::Codec;
use htdb_core::{record, Config, Database, InMemoryBackend, Record, StoreState, Value};
use rand::distributions::Alphanumeric;
use rand::Rng;

/// Columns of the benchmark `users` table.
pub const USER_COLUMNS: [&str; 3] = ["name", "email", "age"];

/// Generate a random alphanumeric string of the specified length.
pub fn random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Generate a random user record.
pub fn random_user() -> Record {
    let mut rng = rand::thread_rng();
    let name = random_string(12);
    record([
        ("email", Value::from(format!("{name}@example.com"))),
        ("name", Value::from(name)),
        ("age", Value::from(rng.gen_range(1..100))),
    ])
}

/// Build a store holding a `users` table with `count` random records.
pub fn users_state(count: usize) -> StoreState {
    let mut state = StoreState::new();
    state
        .create_table("users", USER_COLUMNS.iter().map(|c| (*c).to_string()).collect())
        .expect("Failed to create table");
    for _ in 0..count {
        state
            .insert("users", &random_user())
            .expect("Failed to insert record");
    }
    state
}

/// Password of every benchmark store.
pub const BENCH_PASSWORD: &str = "bench";

/// Open an in-memory store holding a `users` table with `count` records.
///
/// The artifact is sealed once up front rather than through `count` inserts.
pub fn users_store(count: usize) -> Database {
    let text = Codec::new()
        .encode(&users_state(count), BENCH_PASSWORD)
        .expect("Failed to encode store");
    let backend = InMemoryBackend::with_data(text.into_bytes());
    Database::open_with_backend(Box::new(backend), BENCH_PASSWORD, Config::default())
        .expect("Failed to open store")
}
