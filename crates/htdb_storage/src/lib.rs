//! # HtDB Storage
//!
//! Blob storage backends for HtDB.
//!
//! An HtDB store is persisted as a single opaque artifact. Backends in this
//! crate hold that artifact and nothing else: they never look inside it, and
//! every write replaces the previous contents as a whole.
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral stores
//! - [`FileBackend`] - For persistent storage, with atomic replacement
//!
//! ## Example
//!
//! ```rust
//! use htdb_storage::{StorageBackend, InMemoryBackend};
//!
//! let backend = InMemoryBackend::new();
//! assert!(backend.read().unwrap().is_none());
//!
//! backend.write(b"hello world").unwrap();
//! assert_eq!(backend.read().unwrap().as_deref(), Some(&b"hello world"[..]));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::{FileBackend, TEMP_SUFFIX};
pub use memory::InMemoryBackend;
