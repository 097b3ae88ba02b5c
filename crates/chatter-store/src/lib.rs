//! # chatter-store
//!
//! Concrete realtime backends for the Chatter sync engine.
//!
//! - [`SqliteBackend`]: a durable local realtime collection store. Records
//!   live in SQLite as JSON; every committed append re-reads the affected
//!   collection and pushes the whole snapshot to its listeners.
//! - [`MemoryBackend`]: the same semantics in memory, with hooks for
//!   injecting snapshots, listener errors, and write or key failures.
//! - [`FileBlobStore`]: a blob uploader that copies files into a directory
//!   and hands back `file://` URLs.

pub mod blobs;
pub mod database;
pub mod listeners;
pub mod memory;
pub mod migrations;
pub mod records;
pub mod sqlite;

mod error;

pub use blobs::FileBlobStore;
pub use database::Database;
pub use error::StoreError;
pub use listeners::ListenerRegistry;
pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;
