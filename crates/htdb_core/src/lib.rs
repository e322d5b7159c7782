//! # HtDB Core
//!
//! Core table store engine for HtDB.
//!
//! This crate provides:
//! - Named tables with an ordered column schema and ordered records
//! - Equality predicates for select, update and delete
//! - A single-flight write queue: every write is reload, mutate, persist
//! - At-most-once migrations tracked in the reserved `migrations` table
//! - Persistence as one password-encrypted artifact via [`htdb_codec`]
//!
//! ## Example
//!
//! ```rust
//! use htdb_core::{record, Database, Predicate};
//!
//! let db = Database::open_in_memory("secret")?;
//! db.create_table("users", ["name", "email"])?;
//! db.insert("users", record([("name", "John"), ("email", "j@x.com")]))?;
//!
//! let rows = db.select("users", &Predicate::new().eq("name", "John"))?;
//! assert_eq!(rows[0]["email"], "j@x.com");
//! # Ok::<(), htdb_core::CoreError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod database;
mod error;
mod migration;
mod mutation;
mod query;
mod record;
mod store;
mod table;
mod vault;

pub use config::{Config, DecodeFailurePolicy, DEFAULT_EXTENSION, DEFAULT_PATH};
pub use database::Database;
pub use error::{CoreError, CoreResult};
pub use migration::{
    MigrationDescriptor, MigrationRecord, MigrationState, MIGRATIONS_TABLE, MIGRATION_COLUMNS,
};
pub use mutation::{MigrationBody, Mutation, Operation};
pub use query::Predicate;
pub use record::{is_falsy, record, Record, Value};
pub use store::StoreState;
pub use table::Table;
pub use vault::Vault;

pub use htdb_codec::KeyDigest;
pub use htdb_storage::{FileBackend, InMemoryBackend, StorageBackend};
