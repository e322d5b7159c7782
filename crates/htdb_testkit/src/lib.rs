//! # HtDB Testkit
//!
//! Test utilities for HtDB.
//!
//! This crate provides:
//! - Test fixtures and store helpers
//! - Property-based test generators using proptest
//! - A model-checking harness for cross-crate integration tests
//! - Artifact vectors produced by the OpenSSL passphrase scheme
//!
//! ## Usage
//!
//! ```rust
//! use htdb_testkit::prelude::*;
//!
//! with_temp_store(|db| {
//!     db.create_table("test", ["a"]).unwrap();
//!     // ... test operations
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod integration;
pub mod vectors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::integration::*;
    pub use crate::vectors::*;
}

pub use fixtures::*;
pub use generators::*;
pub use integration::*;
pub use vectors::*;
